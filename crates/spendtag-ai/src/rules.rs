//! Keyword rules for expense classification.
//!
//! Two ordered tables drive classification:
//!
//! - [`HARD_RULES`]: a short list of high-precision predicates. A match is
//!   final and no other stage runs. The same table is re-applied by the
//!   normaliser as text evidence that outranks a vague model label.
//! - [`FALLBACK_RULES`]: broader predicates covering every label, consulted
//!   after the hard table when guessing from the full text. Anything left
//!   over is `misc`.
//!
//! Within a table the first matching rule wins, so the order of entries is
//! the tie-break for overlapping keywords ("apple" the brand is checked
//! before "apple" the fruit).

use spendtag_core::Label;

/// A predicate over lower-cased text.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Any keyword appears as a substring.
    Contains(&'static [&'static str]),
    /// Any keyword appears as a whole token. Used for short keywords that
    /// would otherwise fire inside unrelated words ("bus" in "business").
    Word(&'static [&'static str]),
    /// `term` appears as a substring together with either a `context`
    /// substring or a `context_words` whole token.
    WithContext {
        term: &'static str,
        context: &'static [&'static str],
        context_words: &'static [&'static str],
    },
}

impl Predicate {
    /// `text` must already be lower-cased.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Contains(keywords) => keywords.iter().any(|k| text.contains(k)),
            Self::Word(keywords) => tokens(text).any(|t| keywords.contains(&t)),
            Self::WithContext {
                term,
                context,
                context_words,
            } => {
                text.contains(term)
                    && (context.iter().any(|c| text.contains(c))
                        || tokens(text).any(|t| context_words.contains(&t)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub predicate: Predicate,
    pub label: Label,
}

const fn rule(predicate: Predicate, label: Label) -> Rule {
    Rule { predicate, label }
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
}

// ── Rule tables ──

pub static HARD_RULES: &[Rule] = &[
    rule(
        Predicate::WithContext {
            term: "apple",
            context: &["store", "iphone", "ipad", "macbook", "imac", "airpods", "watch"],
            // "mac" alone would fire inside "macaroni".
            context_words: &["mac"],
        },
        Label::Electronics,
    ),
    rule(
        Predicate::Contains(&[
            "banana",
            "watermelon",
            "apple",
            "mango",
            "grape",
            "fruit",
            "vegetable",
            "veggie",
            "milk",
            "bread",
            "cheese",
            "yogurt",
            "tomato",
            "potato",
            "avocado",
        ]),
        Label::Grocery,
    ),
    rule(
        Predicate::Word(&["orange", "oranges", "egg", "eggs", "rice", "flour"]),
        Label::Grocery,
    ),
    rule(
        Predicate::Contains(&[
            "chocolate",
            "candy",
            "dessert",
            "ice cream",
            "cookie",
            "cupcake",
            "pastry",
            "donut",
            "doughnut",
            "lollipop",
        ]),
        Label::Treat,
    ),
    rule(
        Predicate::Word(&["snack", "snacks", "cake", "sweets"]),
        Label::Treat,
    ),
    rule(
        Predicate::Contains(&["metro", "subway", "taxi", "uber", "lyft"]),
        Label::Transit,
    ),
    rule(
        Predicate::Word(&["bus", "buses", "train", "trains", "tram", "fare", "commute"]),
        Label::Transit,
    ),
    rule(
        Predicate::Contains(&[
            "laptop",
            "iphone",
            "ipad",
            "macbook",
            "smartphone",
            "headphone",
            "earbuds",
            "charger",
            "keyboard",
            "monitor",
            "television",
            "playstation",
            "xbox",
            "nintendo",
        ]),
        Label::Electronics,
    ),
    rule(Predicate::Word(&["tv", "usb", "hdmi"]), Label::Electronics),
];

pub static FALLBACK_RULES: &[Rule] = &[
    rule(
        Predicate::Word(&["rent", "lease", "landlord", "mortgage"]),
        Label::Rent,
    ),
    rule(
        Predicate::Contains(&[
            "flight", "airline", "airfare", "airport", "hotel", "hostel", "airbnb", "travel",
            "vacation", "luggage",
        ]),
        Label::Travel,
    ),
    rule(
        Predicate::Contains(&[
            "grocery",
            "groceries",
            "supermarket",
            "food",
            "restaurant",
            "lunch",
            "dinner",
            "breakfast",
        ]),
        Label::Grocery,
    ),
    rule(
        Predicate::Contains(&["electric", "utility", "utilities", "internet", "wifi", "broadband"]),
        Label::Utilities,
    ),
    rule(
        Predicate::Word(&["gas", "water", "power", "bill", "bills", "sewer"]),
        Label::Utilities,
    ),
    rule(
        Predicate::Contains(&[
            "medical",
            "doctor",
            "pharmacy",
            "hospital",
            "clinic",
            "dentist",
            "medicine",
            "prescription",
            "vitamin",
        ]),
        Label::Health,
    ),
    rule(
        Predicate::Contains(&[
            "movie",
            "cinema",
            "netflix",
            "spotify",
            "concert",
            "entertainment",
            "theater",
            "theatre",
            "streaming",
            "game",
        ]),
        Label::Entertainment,
    ),
    rule(
        Predicate::Word(&["ticket", "tickets", "parking", "toll", "petrol", "fuel"]),
        Label::Transit,
    ),
    rule(
        Predicate::Contains(&["electronic", "computer", "tablet", "camera", "gadget", "printer"]),
        Label::Electronics,
    ),
    rule(Predicate::Word(&["phone", "pc", "ssd"]), Label::Electronics),
    rule(
        Predicate::Contains(&[
            "amazon", "shopping", "store", "mall", "clothes", "clothing", "shoes", "ikea",
        ]),
        Label::Shopping,
    ),
    rule(
        Predicate::Contains(&[
            "education",
            "tuition",
            "course",
            "school",
            "textbook",
            "university",
            "college",
            "tutor",
        ]),
        Label::Education,
    ),
];

// ── Engine ──

/// Ordered keyword matcher over the static rule tables.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine {
    hard: &'static [Rule],
    fallback: &'static [Rule],
}

impl RuleEngine {
    /// The canonical tables.
    pub fn standard() -> Self {
        Self::with_tables(HARD_RULES, FALLBACK_RULES)
    }

    pub fn with_tables(hard: &'static [Rule], fallback: &'static [Rule]) -> Self {
        Self { hard, fallback }
    }

    /// First hard rule matching `text`, if any.
    pub fn classify_hard(&self, text: &str) -> Option<Label> {
        first_match(self.hard, &text.to_lowercase())
    }

    /// Best rule-based guess for `text`. Never fails: unmatched text is `misc`.
    pub fn classify_fallback(&self, text: &str) -> Label {
        let text = text.to_lowercase();
        first_match(self.hard, &text)
            .or_else(|| first_match(self.fallback, &text))
            .unwrap_or(Label::Misc)
    }

    /// Number of rules across both tables.
    pub fn rule_count(&self) -> usize {
        self.hard.len() + self.fallback.len()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

fn first_match(rules: &[Rule], text: &str) -> Option<Label> {
    rules
        .iter()
        .find(|r| r.predicate.matches(text))
        .map(|r| r.label)
}
