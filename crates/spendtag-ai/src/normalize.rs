//! Snap arbitrary label strings onto the canonical [`Label`] set.
//!
//! Candidates come from humans, legacy records, rule guesses, or a language
//! model. Normalisation runs, in order:
//!
//! 1. clean the candidate (trim, strip surrounding punctuation, lower-case);
//! 2. text override: if the hard rule table matches the source text, that
//!    label wins outright;
//! 3. exact label match, then synonym folding (whole candidate, then per word);
//! 4. fragment snap (`"elect"` → electronics, `"groc"` → grocery, ...);
//! 5. `misc`.
//!
//! The result is always a [`Label`], and normalising a result again against
//! the same text yields the same label.

use spendtag_core::Label;

use crate::rules::RuleEngine;

const SYNONYMS: &[(&str, Label)] = &[
    ("food", Label::Grocery),
    ("foods", Label::Grocery),
    ("groceries", Label::Grocery),
    ("supermarket", Label::Grocery),
    ("restaurant", Label::Grocery),
    ("restaurants", Label::Grocery),
    ("dining", Label::Grocery),
    ("produce", Label::Grocery),
    ("meal", Label::Grocery),
    ("meals", Label::Grocery),
    ("transport", Label::Transit),
    ("transportation", Label::Transit),
    ("commute", Label::Transit),
    ("commuting", Label::Transit),
    ("rideshare", Label::Transit),
    ("healthcare", Label::Health),
    ("medicine", Label::Health),
    ("medical", Label::Health),
    ("pharmacy", Label::Health),
    ("wellness", Label::Health),
    ("technology", Label::Electronics),
    ("tech", Label::Electronics),
    ("gadget", Label::Electronics),
    ("gadgets", Label::Electronics),
    ("device", Label::Electronics),
    ("devices", Label::Electronics),
    ("sweets", Label::Treat),
    ("snack", Label::Treat),
    ("snacks", Label::Treat),
    ("dessert", Label::Treat),
    ("desserts", Label::Treat),
    ("confectionery", Label::Treat),
    ("utility", Label::Utilities),
    ("bills", Label::Utilities),
    ("electricity", Label::Utilities),
    ("leisure", Label::Entertainment),
    ("movies", Label::Entertainment),
    ("streaming", Label::Entertainment),
    ("retail", Label::Shopping),
    ("clothing", Label::Shopping),
    ("apparel", Label::Shopping),
    ("tuition", Label::Education),
    ("school", Label::Education),
    ("books", Label::Education),
    ("housing", Label::Rent),
    ("rental", Label::Rent),
    ("rents", Label::Rent),
    ("lease", Label::Rent),
    ("mortgage", Label::Rent),
    ("vacation", Label::Travel),
    ("lodging", Label::Travel),
    ("flights", Label::Travel),
    ("miscellaneous", Label::Misc),
    ("other", Label::Misc),
    ("uncategorized", Label::Misc),
];

/// Checked in order; longer fragments precede the shorter ones they contain
/// (`"electric"` before `"elect"`, `"treatment"` before `"treat"`). "rent" is
/// left to whole-word folding since it sits inside "current" and "parent".
const FRAGMENTS: &[(&str, Label)] = &[
    ("electric", Label::Utilities),
    ("elect", Label::Electronics),
    ("groc", Label::Grocery),
    ("treatment", Label::Health),
    ("treat", Label::Treat),
    ("sweet", Label::Treat),
    ("transit", Label::Transit),
    ("transp", Label::Transit),
    ("util", Label::Utilities),
    ("health", Label::Health),
    ("medic", Label::Health),
    ("entertain", Label::Entertainment),
    ("shop", Label::Shopping),
    ("educ", Label::Education),
    ("travel", Label::Travel),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    rules: RuleEngine,
}

impl Normalizer {
    pub fn new(rules: RuleEngine) -> Self {
        Self { rules }
    }

    /// Map `candidate` onto the label set, letting strong keywords in
    /// `source_text` override it.
    pub fn normalize(&self, candidate: &str, source_text: &str) -> Label {
        if let Some(label) = self.rules.classify_hard(source_text) {
            return label;
        }

        let candidate = clean(candidate);
        if candidate.is_empty() {
            return Label::Misc;
        }

        fold(&candidate)
            .or_else(|| snap(&candidate))
            .unwrap_or(Label::Misc)
    }
}

/// [`Normalizer::normalize`] with the standard rule tables.
pub fn normalize(candidate: &str, source_text: &str) -> Label {
    Normalizer::default().normalize(candidate, source_text)
}

fn clean(candidate: &str) -> String {
    candidate
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

fn lookup(word: &str) -> Option<Label> {
    Label::from_name(word).or_else(|| {
        SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == word)
            .map(|&(_, label)| label)
    })
}

/// Exact label or synonym for the whole candidate, then for each word in turn.
fn fold(candidate: &str) -> Option<Label> {
    lookup(candidate).or_else(|| {
        candidate
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .find_map(lookup)
    })
}

fn snap(candidate: &str) -> Option<Label> {
    FRAGMENTS
        .iter()
        .find(|(fragment, _)| candidate.contains(fragment))
        .map(|&(_, label)| label)
}
