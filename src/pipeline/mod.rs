// Pipeline orchestration: the six stages in strict sequence.
//
// One request owns all of its intermediate state (features, matrices,
// bitsets) and drops it when the result is produced; only the linguistic
// resource bundle is shared, read-only, across concurrent requests. The
// time budget is checked between stages — an expired budget aborts the
// request with a recoverable error and never leaks a partial cluster list.

mod pool;

pub use pool::{PipelinePool, PooledPipeline};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::cluster::{Cluster, Clustering, OTHER_TOPICS_LABEL};
use crate::config::{ClusteringConfig, ValidatedConfig};
use crate::document::Document;
use crate::error::ClusterError;
use crate::language::LinguisticResources;
use crate::{assign, finalize, label, preprocess, reduce, vsm};

/// One clustering worker. Cheap to construct; holds nothing but the shared
/// resource handle, so a pool can keep a bounded number of them and every
/// request still gets exclusively-owned state.
pub struct Pipeline {
    resources: Arc<LinguisticResources>,
}

impl Pipeline {
    pub fn new(resources: Arc<LinguisticResources>) -> Self {
        Self { resources }
    }

    /// Run the full pipeline over one document batch.
    pub fn run(
        &self,
        documents: &[Document],
        config: &ValidatedConfig,
    ) -> Result<Clustering, ClusterError> {
        let deadline = Deadline::start(config.timeout);

        let corpus = preprocess::extract(documents, &self.resources);
        deadline.check("preprocess")?;

        // Degenerate input: nothing to cluster, everything is residual.
        if corpus.non_empty_documents < 2 || corpus.features.is_empty() {
            debug!(
                documents = documents.len(),
                non_empty = corpus.non_empty_documents,
                "Degenerate input, returning all-residual clustering"
            );
            return Ok(residual_only(documents));
        }

        let tdm = vsm::build(&corpus, documents.len());
        deadline.check("vector-space")?;

        let Some(basis) = reduce::reduce(
            &tdm,
            config.desired_cluster_count,
            config.oversampling_factor,
            config.reduction_iterations,
        ) else {
            return Ok(residual_only(documents));
        };
        deadline.check("reduce")?;

        let mut candidates = label::induce(&corpus, &tdm, &basis, config, documents.len());
        deadline.check("label")?;
        if candidates.is_empty() {
            return Ok(residual_only(documents));
        }

        let unassigned = assign::assign(&mut candidates, &basis, config.assignment_threshold);
        deadline.check("assign")?;

        let clustering = finalize::finalize(candidates, &corpus, documents, config);

        info!(
            documents = documents.len(),
            clusters = clustering.topical().count(),
            residual = clustering.residual().size(),
            unassigned_before_finalize = unassigned.count(),
            "Clustering complete"
        );
        Ok(clustering)
    }
}

/// Validate the config, build the resource bundle, and cluster one batch.
/// Convenience entry point for callers without a pool.
pub fn cluster_documents(
    documents: &[Document],
    language: &str,
    config: ClusteringConfig,
) -> Result<Clustering, ClusterError> {
    let config = config.validate()?;
    let resources = Arc::new(LinguisticResources::for_language(language)?);
    Pipeline::new(resources).run(documents, &config)
}

/// Everything in one residual cluster — the degenerate-input result.
fn residual_only(documents: &[Document]) -> Clustering {
    Clustering {
        clusters: vec![Cluster {
            label: OTHER_TOPICS_LABEL.to_string(),
            score: 0.0,
            documents: documents.iter().map(|d| d.id.clone()).collect(),
            sub_clusters: Vec::new(),
            residual: true,
        }],
        document_count: documents.len(),
    }
}

/// Per-request time budget, checked between stages only.
struct Deadline {
    expires_at: Option<Instant>,
    budget_ms: u64,
}

impl Deadline {
    fn start(budget: Option<Duration>) -> Self {
        Self {
            expires_at: budget.map(|b| Instant::now() + b),
            budget_ms: budget.map(|b| b.as_millis() as u64).unwrap_or(0),
        }
    }

    fn check(&self, stage: &'static str) -> Result<(), ClusterError> {
        match self.expires_at {
            Some(expires_at) if Instant::now() > expires_at => Err(ClusterError::Timeout {
                stage,
                budget_ms: self.budget_ms,
            }),
            _ => Ok(()),
        }
    }
}
