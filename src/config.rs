// Central configuration for a clustering request.
//
// A plain struct with documented defaults, validated by a pure function
// before the pipeline starts. Validation failures are per-request errors,
// never panics. The binary can pre-populate defaults from CAIRN_* env vars;
// the library itself never reads the environment.

use std::env;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClusterError;

/// Tunable knobs for one clustering request.
///
/// The numeric defaults are starting points validated against the test
/// scenarios, not canonical constants; callers are expected to tune them
/// for their corpus.
#[derive(Debug, Clone)]
pub struct ClusteringConfig {
    /// Upper bound on the number of non-residual clusters returned.
    pub desired_cluster_count: usize,
    /// Multiplier on `desired_cluster_count` when choosing the reduction
    /// rank k, so label induction has surplus basis vectors to choose from.
    pub oversampling_factor: f64,
    /// Label candidates scoring below this are dropped before assignment.
    pub min_alignment_score: f64,
    /// Cosine similarity (0-1) a document must reach against a label's
    /// basis direction to be assigned to it.
    pub assignment_threshold: f64,
    /// Jaccard similarity (0-1) above which two candidates' document sets
    /// are merged into one cluster.
    pub merge_threshold: f64,
    /// Clusters with fewer documents than this are discarded.
    pub min_cluster_size: usize,
    /// Clusters whose normalized score falls below this are discarded.
    pub min_cluster_score: f64,
    /// Score multiplier favoring multi-word labels over single terms.
    pub phrase_boost: f64,
    /// Fixed iteration count for the matrix factorization. Fixed (rather
    /// than tolerance-driven) so results are reproducible at any thread
    /// count.
    pub reduction_iterations: usize,
    /// Optional wall-clock budget for the whole request, checked between
    /// stages.
    pub timeout: Option<Duration>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            desired_cluster_count: 10,
            oversampling_factor: 1.5,
            min_alignment_score: 0.05,
            assignment_threshold: 0.25,
            merge_threshold: 0.6,
            min_cluster_size: 2,
            min_cluster_score: 0.0,
            phrase_boost: 1.5,
            reduction_iterations: 15,
            timeout: None,
        }
    }
}

impl ClusteringConfig {
    /// Defaults overridden by CAIRN_* environment variables where set.
    ///
    /// Unparseable values are rejected rather than silently ignored, so a
    /// typo in an env var does not quietly run with defaults.
    pub fn from_env() -> Result<Self, ClusterError> {
        let mut config = Self::default();
        config.desired_cluster_count =
            env_or("CAIRN_CLUSTER_COUNT", config.desired_cluster_count)?;
        config.oversampling_factor =
            env_or("CAIRN_OVERSAMPLING_FACTOR", config.oversampling_factor)?;
        config.min_alignment_score =
            env_or("CAIRN_MIN_ALIGNMENT_SCORE", config.min_alignment_score)?;
        config.assignment_threshold =
            env_or("CAIRN_ASSIGNMENT_THRESHOLD", config.assignment_threshold)?;
        config.merge_threshold = env_or("CAIRN_MERGE_THRESHOLD", config.merge_threshold)?;
        config.min_cluster_size = env_or("CAIRN_MIN_CLUSTER_SIZE", config.min_cluster_size)?;
        config.min_cluster_score = env_or("CAIRN_MIN_CLUSTER_SCORE", config.min_cluster_score)?;
        config.phrase_boost = env_or("CAIRN_PHRASE_BOOST", config.phrase_boost)?;
        config.reduction_iterations =
            env_or("CAIRN_REDUCTION_ITERATIONS", config.reduction_iterations)?;
        Ok(config)
    }

    /// Validate every option's range. Consumes the config and returns a
    /// proof-of-validation wrapper the pipeline requires.
    pub fn validate(self) -> Result<ValidatedConfig, ClusterError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ClusterError {
            ClusterError::ConfigurationInvalid {
                field,
                reason: reason.into(),
            }
        }

        if self.desired_cluster_count < 1 {
            return Err(invalid("desired_cluster_count", "must be at least 1"));
        }
        if !self.oversampling_factor.is_finite() || self.oversampling_factor < 1.0 {
            return Err(invalid(
                "oversampling_factor",
                format!("must be >= 1.0, got {}", self.oversampling_factor),
            ));
        }
        if !self.min_alignment_score.is_finite() || self.min_alignment_score < 0.0 {
            return Err(invalid(
                "min_alignment_score",
                format!("must be non-negative, got {}", self.min_alignment_score),
            ));
        }
        for (field, value) in [
            ("assignment_threshold", self.assignment_threshold),
            ("merge_threshold", self.merge_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(
                    field,
                    format!("must be within 0.0..=1.0, got {value}"),
                ));
            }
        }
        if self.min_cluster_size < 1 {
            return Err(invalid("min_cluster_size", "must be at least 1"));
        }
        if !self.min_cluster_score.is_finite() || self.min_cluster_score < 0.0 {
            return Err(invalid(
                "min_cluster_score",
                format!("must be non-negative, got {}", self.min_cluster_score),
            ));
        }
        if !self.phrase_boost.is_finite() || self.phrase_boost < 1.0 {
            return Err(invalid(
                "phrase_boost",
                format!("must be >= 1.0, got {}", self.phrase_boost),
            ));
        }
        if self.reduction_iterations < 1 {
            return Err(invalid("reduction_iterations", "must be at least 1"));
        }
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(invalid("timeout", "must be non-zero when set"));
            }
        }

        Ok(ValidatedConfig(self))
    }
}

fn env_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ClusterError> {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ClusterError::ConfigurationInvalid {
                field: var,
                reason: format!("cannot parse {raw:?}"),
            }),
        Err(_) => Ok(default),
    }
}

/// A `ClusteringConfig` that has passed range validation. Only `validate`
/// constructs this, so a pipeline holding one never re-checks ranges.
#[derive(Debug, Clone)]
pub struct ValidatedConfig(ClusteringConfig);

impl Deref for ValidatedConfig {
    type Target = ClusteringConfig;

    fn deref(&self) -> &ClusteringConfig {
        &self.0
    }
}
