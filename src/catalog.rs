// Static product catalog and the keyword matcher used to annotate user
// messages with sponsored recommendations.

use serde::Serialize;

/// One recommendable product. Read-only; the catalog is process-wide
/// configuration loaded once, never owned by a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub purchase_link: String,
    /// Lowercase keywords; an item matches when any keyword appears as a
    /// substring of the lowercased input.
    #[serde(skip)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<RecommendedItem>,
}

impl Catalog {
    pub fn new(items: Vec<RecommendedItem>) -> Self {
        Catalog { items }
    }

    pub fn items(&self) -> &[RecommendedItem] {
        &self.items
    }

    /// Pure keyword lookup: lowercase the input, return every item with a
    /// matching keyword in catalog order, capped at `cap`. No scoring, no
    /// stemming. Always succeeds; an empty result is the common case.
    pub fn recommend(&self, text: &str, cap: usize) -> Vec<RecommendedItem> {
        let lowered = text.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.keywords.iter().any(|kw| lowered.contains(kw.as_str())))
            .take(cap)
            .cloned()
            .collect()
    }
}

fn item(
    id: &str,
    name: &str,
    description: &str,
    image_url: &str,
    purchase_link: &str,
    keywords: &[&str],
) -> RecommendedItem {
    RecommendedItem {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        image_url: image_url.to_string(),
        purchase_link: purchase_link.to_string(),
        keywords: keywords.iter().map(|kw| kw.to_string()).collect(),
    }
}

/// The built-in health product catalog. Order matters: matches are returned
/// in catalog order.
pub fn default_catalog() -> Catalog {
    Catalog::new(vec![
        item(
            "pain-relief-balm",
            "CoolEase Pain Relief Balm",
            "Fast-acting topical balm for headaches and muscle tension.",
            "/static/products/pain-relief-balm.jpg",
            "https://shop.example.com/pain-relief-balm",
            &["headache", "migraine", "muscle pain", "tension"],
        ),
        item(
            "fever-patch",
            "ChillAid Cooling Fever Patches",
            "Soft gel patches that help bring down temperature comfortably.",
            "/static/products/fever-patch.jpg",
            "https://shop.example.com/fever-patch",
            &["fever", "temperature", "chills"],
        ),
        item(
            "honey-lozenges",
            "Golden Throat Honey Lozenges",
            "Soothing honey-lemon lozenges for coughs and sore throats.",
            "/static/products/honey-lozenges.jpg",
            "https://shop.example.com/honey-lozenges",
            &["cough", "sore throat", "throat"],
        ),
        item(
            "decongestant-inhaler",
            "BreatheFree Herbal Inhaler",
            "Eucalyptus inhaler stick for blocked noses and sinus pressure.",
            "/static/products/decongestant-inhaler.jpg",
            "https://shop.example.com/decongestant-inhaler",
            &["cold", "congestion", "blocked nose", "sinus", "runny nose"],
        ),
        item(
            "digestive-tea",
            "TummyCalm Ginger Tea",
            "Caffeine-free ginger and fennel blend for upset stomachs.",
            "/static/products/digestive-tea.jpg",
            "https://shop.example.com/digestive-tea",
            &["stomach", "nausea", "indigestion", "bloating", "digestion"],
        ),
        item(
            "sleep-tea",
            "MoonRest Chamomile Blend",
            "Chamomile and valerian tea to help you wind down at night.",
            "/static/products/sleep-tea.jpg",
            "https://shop.example.com/sleep-tea",
            &["sleep", "insomnia", "can't sleep", "restless"],
        ),
        item(
            "stress-roller",
            "CalmWave Aromatherapy Roller",
            "Lavender roll-on for moments of stress and anxiety.",
            "/static/products/stress-roller.jpg",
            "https://shop.example.com/stress-roller",
            &["stress", "anxiety", "anxious", "overwhelmed"],
        ),
        item(
            "joint-support",
            "FlexiCare Joint Support Capsules",
            "Glucosamine supplement supporting joint comfort and mobility.",
            "/static/products/joint-support.jpg",
            "https://shop.example.com/joint-support",
            &["joint", "knee", "arthritis", "stiffness"],
        ),
        item(
            "multivitamin",
            "SunnyDay Daily Multivitamin",
            "A daily multivitamin covering the essentials for general wellness.",
            "/static/products/multivitamin.jpg",
            "https://shop.example.com/multivitamin",
            &["tired", "fatigue", "vitamin", "low energy"],
        ),
    ])
}
