// Turns a raw assistant reply into structured display blocks. The raw string
// stays canonical on the message; blocks are re-derived at render time. The
// renderer escapes block text by default, so no markup string ever crosses
// this boundary.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Top-level enumerated line (`1. ...`) or a capitalized run of words
    /// followed by a colon. Rendered emphasized.
    Heading,
    /// Enumerated line nested under a heading (leading indentation).
    SubItem,
    /// `* ` bullet line.
    Bullet,
    Paragraph,
    /// Blank source line, kept as a vertical spacing marker.
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub strong: bool,
    pub text: String,
}

impl Span {
    fn plain(text: &str) -> Self {
        Span { strong: false, text: text.to_string() }
    }

    fn strong(text: &str) -> Self {
        Span { strong: true, text: text.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// The full source line, minus paired `**` delimiters, split into
    /// plain/strong runs. Empty for Blank blocks.
    pub spans: Vec<Span>,
}

impl Block {
    /// Concatenated text content, markup ignored.
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Classify every line of a reply. Blank lines are preserved; nothing is
/// dropped or reordered.
pub fn format_reply(raw: &str) -> Vec<Block> {
    raw.lines().map(classify_line).collect()
}

fn classify_line(line: &str) -> Block {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        return Block { kind: BlockKind::Blank, spans: Vec::new() };
    }

    let indented = line.starts_with(' ') || line.starts_with('\t');
    let trimmed = line.trim_start();
    let spans = parse_spans(line);

    let kind = if is_enumerated(trimmed) {
        if indented {
            BlockKind::SubItem
        } else {
            BlockKind::Heading
        }
    } else if trimmed.starts_with("* ") {
        BlockKind::Bullet
    } else if is_capitalized_heading(&text_of(&spans)) {
        BlockKind::Heading
    } else {
        BlockKind::Paragraph
    };

    Block { kind, spans }
}

fn text_of(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

// `<number>. ` at the start of the (already trimmed) line.
fn is_enumerated(trimmed: &str) -> bool {
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && trimmed[digits..].starts_with(". ")
}

// An uppercase-led run of words ending at a colon, e.g. "Home Remedies:" or
// "Recommended Medications: (Before use please consult the doctor)".
fn is_capitalized_heading(text: &str) -> bool {
    let text = text.trim_start();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    match text.find(':') {
        Some(pos) => text[..pos].chars().all(|c| c.is_alphabetic() || c == ' '),
        None => false,
    }
}

// Split on paired ** delimiters. An unpaired trailing delimiter is kept
// literally so no text is lost.
fn parse_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = line;
    loop {
        match rest.find("**") {
            None => {
                if !rest.is_empty() {
                    spans.push(Span::plain(rest));
                }
                break;
            }
            Some(start) => {
                if start > 0 {
                    spans.push(Span::plain(&rest[..start]));
                }
                let after = &rest[start + 2..];
                match after.find("**") {
                    Some(end) => {
                        if end > 0 {
                            spans.push(Span::strong(&after[..end]));
                        }
                        rest = &after[end + 2..];
                    }
                    None => {
                        spans.push(Span::plain(&format!("**{}", after)));
                        break;
                    }
                }
            }
        }
    }
    spans
}
