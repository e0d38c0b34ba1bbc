// Final cluster output types.
//
// What the engine hands back to callers: an ordered list of labeled
// clusters with normalized scores and document id sets, the residual
// "Other Topics" cluster always last. Serializable as-is; the driver wraps
// it with file-level metadata before writing.

use serde::{Deserialize, Serialize};

/// Label given to the residual cluster.
pub const OTHER_TOPICS_LABEL: &str = "Other Topics";

/// One final cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Human-readable label, title-cased from the winning feature's most
    /// frequent surface form.
    pub label: String,
    /// Normalized score in [0, 1]. The residual cluster scores 0.
    pub score: f64,
    /// Ids of member documents, in input order.
    pub documents: Vec<String>,
    /// Single level of optional nesting, kept for callers that build
    /// hierarchies around the engine.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_clusters: Vec<Cluster>,
    /// True only for the trailing "Other Topics" cluster.
    #[serde(default)]
    pub residual: bool,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.documents.len()
    }
}

/// The full result of one clustering request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clustering {
    /// Ordered clusters; the residual cluster is always present and always
    /// last, even when empty.
    pub clusters: Vec<Cluster>,
    /// Number of input documents.
    pub document_count: usize,
}

impl Clustering {
    /// The non-residual clusters, in rank order.
    pub fn topical(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| !c.residual)
    }

    /// The trailing residual cluster.
    pub fn residual(&self) -> &Cluster {
        self.clusters
            .last()
            .filter(|c| c.residual)
            .expect("a clustering always ends with the residual cluster")
    }
}
