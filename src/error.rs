// Errors surfaced by the clustering engine.
//
// Only three conditions are actual errors: a configuration value outside its
// valid range, a request exceeding its time budget, and a language tag we
// have no linguistic resources for. Degenerate inputs (too few documents,
// empty feature space, rank-deficient matrices) are handled inside the
// pipeline and produce a valid all-residual result instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// A configuration value was outside its valid range. The request was
    /// rejected before the pipeline started.
    #[error("invalid configuration: {field} {reason}")]
    ConfigurationInvalid {
        field: &'static str,
        reason: String,
    },

    /// The request exceeded its time budget. Checked between stages; the
    /// in-flight pipeline state is dropped and no partial result escapes.
    #[error("clustering timed out after the {stage} stage (budget {budget_ms} ms)")]
    Timeout {
        stage: &'static str,
        budget_ms: u64,
    },

    /// No stemmer/stop-word bundle is available for the requested language.
    #[error("unsupported language tag: {0:?}")]
    UnsupportedLanguage(String),
}
