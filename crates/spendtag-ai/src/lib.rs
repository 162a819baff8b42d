//! Expense classification: keyword rules, label normalisation, and optional
//! LLM-assisted suggestion behind a bounded timeout.

pub mod config;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod rules;

pub use config::{ConfigError, ModelConfig, Provider};
pub use model::{CategorySuggester, HttpModelClient, ModelError};
pub use normalize::{Normalizer, normalize};
pub use pipeline::{Decision, Pipeline, Stage};
pub use rules::{Predicate, Rule, RuleEngine};
