//! The canonical expense label set.
//!
//! Every classification ends in exactly one of these labels. The order of
//! [`Label::ALL`] is the order presented to the language model and listed by
//! the `/api/categories` endpoint; `misc` is last and is the universal default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Electronics,
    Grocery,
    Treat,
    Transit,
    Utilities,
    Health,
    Entertainment,
    Shopping,
    Education,
    Rent,
    Travel,
    #[default]
    Misc,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label: {0:?}")]
pub struct ParseLabelError(pub String);

impl Label {
    pub const ALL: [Label; 12] = [
        Label::Electronics,
        Label::Grocery,
        Label::Treat,
        Label::Transit,
        Label::Utilities,
        Label::Health,
        Label::Entertainment,
        Label::Shopping,
        Label::Education,
        Label::Rent,
        Label::Travel,
        Label::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Grocery => "grocery",
            Self::Treat => "treat",
            Self::Transit => "transit",
            Self::Utilities => "utilities",
            Self::Health => "health",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Education => "education",
            Self::Rent => "rent",
            Self::Travel => "travel",
            Self::Misc => "misc",
        }
    }

    /// Exact lookup of a canonical name. No synonym folding happens here.
    pub fn from_name(name: &str) -> Option<Label> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| ParseLabelError(s.to_string()))
    }
}
