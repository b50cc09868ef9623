// Interactive terminal chat against the same session manager the web API
// uses. One blocking stdin read per turn; the session enforces the rest.

use std::io::Write;

use anyhow::Result;
use tracing::info;

use crate::formatter::{format_reply, BlockKind};
use crate::session::{Message, Sender, Session, SubmitOutcome};

pub async fn run_chat(session: Session, handoff: Option<String>) -> Result<()> {
    info!("Starting interactive chat session");
    let persona = session.persona().name.clone();

    print_message(&persona, &session.messages()[0]);

    if let Some(text) = handoff {
        let before = session.messages().len();
        session.bootstrap_from_handoff(&text).await;
        print_new_messages(&persona, &session, before);
    }

    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input == "/quit" || input == "/exit" {
            break;
        }

        let before = session.messages().len();
        match session.submit(input).await {
            SubmitOutcome::Completed => print_new_messages(&persona, &session, before),
            // Empty input is rejected silently, same as the web surface.
            SubmitOutcome::RejectedEmpty => continue,
            SubmitOutcome::RejectedBusy | SubmitOutcome::AlreadyBootstrapped => continue,
        }
    }

    info!("Chat session ended");
    Ok(())
}

fn print_new_messages(persona: &str, session: &Session, from: usize) {
    for msg in &session.messages()[from..] {
        print_message(persona, msg);
    }
}

fn print_message(persona: &str, msg: &Message) {
    match msg.sender {
        Sender::Assistant => {
            println!("{}:", persona);
            for block in format_reply(&msg.text) {
                match block.kind {
                    BlockKind::Blank => println!(),
                    _ => println!("  {}", block.text()),
                }
            }
            println!();
        }
        Sender::User => {
            // The user already sees what they typed; only surface the
            // recommendations their message matched.
            for item in &msg.recommendations {
                println!("  [sponsored] {} - {}", item.name, item.description);
                println!("              {}", item.purchase_link);
            }
        }
    }
}
