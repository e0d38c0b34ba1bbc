// Cluster finalization: merge, score, prune, order, and the residual.
//
// Candidates whose document sets substantially overlap describe the same
// topic and are merged (transitively, under the stronger label). Final
// scores combine the label's alignment with the cluster's size, normalized
// to [0, 1] over the request. Clusters under the size or score floor are
// dropped and their documents fall back to the pool; the residual "Other
// Topics" cluster picks up everything no surviving cluster claimed and is
// always emitted last, even when empty.

use tracing::debug;

use crate::cluster::{Cluster, Clustering, OTHER_TOPICS_LABEL};
use crate::config::ValidatedConfig;
use crate::document::{DocSet, Document};
use crate::label::LabelCandidate;
use crate::preprocess::PreprocessedCorpus;

/// Produce the ordered final cluster list from assigned candidates.
pub fn finalize(
    candidates: Vec<LabelCandidate>,
    corpus: &PreprocessedCorpus,
    documents: &[Document],
    config: &ValidatedConfig,
) -> Clustering {
    let merged = merge_overlapping(candidates, config.merge_threshold);

    // Final score: alignment × ln(1 + size), normalized by the maximum so
    // scores land in [0, 1]. An empty candidate scores 0 and is pruned.
    let mut scored: Vec<(LabelCandidate, f64)> = merged
        .into_iter()
        .map(|c| {
            let raw = c.score * (1.0 + c.docs.count() as f64).ln();
            (c, raw)
        })
        .collect();
    let max_raw = scored.iter().map(|(_, s)| *s).fold(0.0, f64::max);
    if max_raw > 0.0 {
        for (_, score) in &mut scored {
            *score /= max_raw;
        }
    }

    let mut survivors: Vec<(LabelCandidate, f64)> = scored
        .into_iter()
        .filter(|(c, score)| {
            c.docs.count() >= config.min_cluster_size && *score >= config.min_cluster_score
        })
        .collect();

    // Rank: score desc, size desc, label asc; then cap at the requested
    // cluster count. Documents of clusters cut here fall to the residual
    // pool like any other unassigned document.
    survivors.sort_by(|(a, sa), (b, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.docs.count().cmp(&a.docs.count()))
            .then(label_of(a, corpus).cmp(&label_of(b, corpus)))
    });
    survivors.truncate(config.desired_cluster_count);

    let mut clusters: Vec<Cluster> = survivors
        .iter()
        .map(|(candidate, score)| Cluster {
            label: title_case(&label_of(candidate, corpus)),
            score: *score,
            documents: candidate.docs.iter().map(|d| documents[d].id.clone()).collect(),
            sub_clusters: Vec::new(),
            residual: false,
        })
        .collect();

    let claimed: Vec<&DocSet> = survivors.iter().map(|(c, _)| &c.docs).collect();
    let residual = DocSet::complement_of_union(&claimed, documents.len());
    clusters.push(Cluster {
        label: OTHER_TOPICS_LABEL.to_string(),
        score: 0.0,
        documents: residual.iter().map(|d| documents[d].id.clone()).collect(),
        sub_clusters: Vec::new(),
        residual: true,
    });

    debug!(
        clusters = clusters.len() - 1,
        residual = clusters.last().map(|c| c.size()).unwrap_or(0),
        "Clusters finalized"
    );

    Clustering {
        clusters,
        document_count: documents.len(),
    }
}

/// Repeatedly merge the candidate pair with the highest Jaccard overlap at
/// or above the threshold, so merging is transitive. The higher-scoring
/// side keeps its label and alignment score; document sets are unioned.
fn merge_overlapping(
    mut candidates: Vec<LabelCandidate>,
    threshold: f64,
) -> Vec<LabelCandidate> {
    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..candidates.len() {
            for j in i + 1..candidates.len() {
                let overlap = candidates[i].docs.jaccard(&candidates[j].docs);
                if overlap >= threshold && best.map_or(true, |(_, _, b)| overlap > b) {
                    best = Some((i, j, overlap));
                }
            }
        }
        let Some((i, j, _)) = best else {
            return candidates;
        };
        let absorbed = candidates.swap_remove(j);
        let keeper = &mut candidates[i];
        if absorbed.score > keeper.score {
            keeper.feature = absorbed.feature;
            keeper.score = absorbed.score;
            keeper.basis_dim = absorbed.basis_dim;
        }
        keeper.docs.union_with(&absorbed.docs);
    }
}

fn label_of(candidate: &LabelCandidate, corpus: &PreprocessedCorpus) -> String {
    corpus.features[candidate.feature].text.clone()
}

/// "rust programming" -> "Rust Programming".
fn title_case(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
