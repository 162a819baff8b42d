//! Request and response shapes for expense classification.

use serde::{Deserialize, Deserializer, Serialize};

use crate::label::Label;

/// A free-text expense description to classify.
///
/// Both fields are optional on the wire; absent or `null` values become empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationInput {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

impl ClassificationInput {
    pub fn new(title: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: notes.into(),
        }
    }

    /// Lower-cased `title + " " + notes`, the text every matcher runs against.
    pub fn canonical_text(&self) -> String {
        format!("{} {}", self.title, self.notes).to_lowercase()
    }
}

/// Where the final label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "rule-based")]
    RuleBased,
    #[serde(rename = "model")]
    Model,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RuleBased => "rule-based",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Label,
    pub source: Provenance,
}

impl ClassificationResult {
    pub fn rule_based(category: Label) -> Self {
        Self {
            category,
            source: Provenance::RuleBased,
        }
    }

    pub fn model(category: Label) -> Self {
        Self {
            category,
            source: Provenance::Model,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_joins_and_lowercases() {
        let input = ClassificationInput::new("Bus Ticket", "Downtown");
        assert_eq!(input.canonical_text(), "bus ticket downtown");
    }

    #[test]
    fn missing_and_null_fields_become_empty() {
        let input: ClassificationInput = serde_json::from_str(r#"{"title": "milk"}"#).unwrap();
        assert_eq!(input.title, "milk");
        assert_eq!(input.notes, "");

        let input: ClassificationInput =
            serde_json::from_str(r#"{"title": null, "notes": null}"#).unwrap();
        assert_eq!(input, ClassificationInput::default());

        let input: ClassificationInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.canonical_text(), " ");
    }

    #[test]
    fn result_wire_shape() {
        let result = ClassificationResult::rule_based(Label::Transit);
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"category": "transit", "source": "rule-based"})
        );

        let json = serde_json::to_string(&ClassificationResult::model(Label::Health)).unwrap();
        assert_eq!(json, r#"{"category":"health","source":"model"}"#);
    }

    #[test]
    fn provenance_str_matches_serde() {
        for p in [Provenance::RuleBased, Provenance::Model] {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }
}
