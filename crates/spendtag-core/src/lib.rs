pub mod expense;
pub mod label;

pub use expense::{ClassificationInput, ClassificationResult, Provenance};
pub use label::{Label, ParseLabelError};
