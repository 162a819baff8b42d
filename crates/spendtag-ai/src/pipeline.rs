//! The classification pipeline.
//!
//! ```text
//! hard rule on title ──match──────────────────────────────▶ rule-based
//!        │ no match
//!        ▼
//! fallback guess ── no model ──▶ normalise(guess) ────────▶ rule-based
//!        │ model configured
//!        ▼
//! model call (bounded) ── ok ──▶ normalise(suggestion) ───▶ model
//!                      └─ err ─▶ normalise(guess) ────────▶ rule-based
//! ```
//!
//! Every path ends in exactly one [`ClassificationResult`]; model failures
//! only change the provenance.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use spendtag_core::{ClassificationInput, ClassificationResult, Label};
use tracing::{info, warn};

use crate::config::{DEFAULT_TIMEOUT, ModelConfig};
use crate::model::{CategorySuggester, HttpModelClient, ModelError};
use crate::normalize::Normalizer;
use crate::rules::RuleEngine;

/// Which stage produced the final label. Logged, never sent to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// A hard rule matched the title.
    HardRule,
    /// The model answered and its suggestion was normalised.
    ModelAssisted,
    /// No model configured; the fallback guess was normalised.
    FallbackOnly,
    /// The model call failed or timed out; the fallback guess was normalised.
    ModelFailed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HardRule => "hard-rule",
            Self::ModelAssisted => "model",
            Self::FallbackOnly => "fallback",
            Self::ModelFailed => "model-failed",
        }
    }
}

/// A result plus the stage that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub result: ClassificationResult,
    pub stage: Stage,
}

/// Stateless classifier. Cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct Pipeline {
    rules: RuleEngine,
    normalizer: Normalizer,
    suggester: Option<Arc<dyn CategorySuggester>>,
    model_timeout: Duration,
}

impl Pipeline {
    /// Rules only; never touches the network.
    pub fn rule_based() -> Self {
        Self {
            rules: RuleEngine::standard(),
            normalizer: Normalizer::default(),
            suggester: None,
            model_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Rules plus `suggester`, each call bounded by `timeout`.
    pub fn with_suggester(suggester: Arc<dyn CategorySuggester>, timeout: Duration) -> Self {
        Self {
            suggester: Some(suggester),
            model_timeout: timeout,
            ..Self::rule_based()
        }
    }

    /// Build from optional provider config: `None` means rules only.
    pub fn from_config(config: Option<ModelConfig>) -> Result<Self, ModelError> {
        match config {
            None => Ok(Self::rule_based()),
            Some(config) => {
                let timeout = config.timeout;
                let client = HttpModelClient::new(config)?;
                Ok(Self::with_suggester(Arc::new(client), timeout))
            }
        }
    }

    pub fn model_enabled(&self) -> bool {
        self.suggester.is_some()
    }

    pub fn model_timeout(&self) -> Duration {
        self.model_timeout
    }

    pub async fn classify(&self, input: &ClassificationInput) -> ClassificationResult {
        self.classify_detailed(input).await.result
    }

    pub async fn classify_detailed(&self, input: &ClassificationInput) -> Decision {
        let decision = self.decide(input).await;
        info!(
            stage = decision.stage.as_str(),
            category = %decision.result.category,
            source = decision.result.source.as_str(),
            "classified expense"
        );
        decision
    }

    /// Classify independent inputs concurrently. Results keep input order.
    pub async fn classify_many(&self, inputs: &[ClassificationInput]) -> Vec<ClassificationResult> {
        join_all(inputs.iter().map(|input| self.classify(input))).await
    }

    async fn decide(&self, input: &ClassificationInput) -> Decision {
        if let Some(label) = self.rules.classify_hard(&input.title) {
            return Decision {
                result: ClassificationResult::rule_based(label),
                stage: Stage::HardRule,
            };
        }

        let text = input.canonical_text();
        let guess = self.rules.classify_fallback(&text);

        let Some(suggester) = &self.suggester else {
            return self.fallback(guess, &text, Stage::FallbackOnly);
        };

        match self.ask(suggester.as_ref(), input).await {
            Ok(suggestion) => Decision {
                result: ClassificationResult::model(self.normalizer.normalize(&suggestion, &text)),
                stage: Stage::ModelAssisted,
            },
            Err(err) => {
                warn!(
                    provider = suggester.name(),
                    error = %err,
                    "model suggestion failed, using rule fallback"
                );
                self.fallback(guess, &text, Stage::ModelFailed)
            }
        }
    }

    async fn ask(
        &self,
        suggester: &dyn CategorySuggester,
        input: &ClassificationInput,
    ) -> Result<String, ModelError> {
        let call = suggester.suggest(&input.title, &input.notes);
        let suggestion = tokio::time::timeout(self.model_timeout, call)
            .await
            .map_err(|_| ModelError::Timeout(self.model_timeout))??;
        if suggestion.trim().is_empty() {
            return Err(ModelError::MalformedResponse("empty suggestion".to_string()));
        }
        Ok(suggestion)
    }

    fn fallback(&self, guess: Label, text: &str, stage: Stage) -> Decision {
        Decision {
            result: ClassificationResult::rule_based(self.normalizer.normalize(guess.as_str(), text)),
            stage,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::rule_based()
    }
}
