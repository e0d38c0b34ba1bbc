// Label induction: pair every basis vector with its best-aligned feature.
//
// Each basis vector spans one latent topic; the candidate label for that
// topic is the non-common term or phrase whose tf-idf direction aligns
// best with it, weighted by document frequency and a boost for multi-word
// phrases (more specific, better labels). Candidates under the minimum
// alignment score are dropped, and candidates that resolve to overlapping
// word sequences are deduplicated in favor of the higher scorer.

use tracing::debug;

use crate::config::ValidatedConfig;
use crate::document::DocSet;
use crate::preprocess::{Feature, PreprocessedCorpus};
use crate::reduce::ReducedBasis;
use crate::vsm::TermDocumentMatrix;

/// One cluster-label hypothesis: a feature paired with the basis dimension
/// it labels. `docs` is empty until the assignment stage fills it.
#[derive(Debug, Clone)]
pub struct LabelCandidate {
    pub feature: usize,
    pub basis_dim: usize,
    pub score: f64,
    pub docs: DocSet,
}

/// Induce label candidates from the reduced basis, ordered by descending
/// score.
pub fn induce(
    corpus: &PreprocessedCorpus,
    tdm: &TermDocumentMatrix,
    basis: &ReducedBasis,
    config: &ValidatedConfig,
    document_count: usize,
) -> Vec<LabelCandidate> {
    let mut candidates: Vec<LabelCandidate> = Vec::new();

    for dim in 0..basis.rank() {
        let mut best: Option<(&Feature, f64)> = None;

        for feature in corpus.features.iter().filter(|f| !f.common) {
            let alignment = alignment(feature, tdm, basis, dim);
            let df_weight = 1.0 + (1.0 + feature.document_frequency as f64).ln();
            let boost = if feature.is_phrase() {
                config.phrase_boost
            } else {
                1.0
            };
            let score = alignment * df_weight * boost;

            let better = match best {
                None => true,
                Some((current, current_score)) => {
                    score > current_score
                        || (score == current_score && prefer(feature, current))
                }
            };
            if better {
                best = Some((feature, score));
            }
        }

        if let Some((feature, score)) = best {
            if score >= config.min_alignment_score {
                candidates.push(LabelCandidate {
                    feature: feature.index,
                    basis_dim: dim,
                    score,
                    docs: DocSet::new(document_count),
                });
            }
        }
    }

    // Deduplicate: walk candidates best-first and keep each only if its
    // stem sequence does not overlap an already-kept one.
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.feature.cmp(&b.feature))
    });
    let mut kept: Vec<LabelCandidate> = Vec::new();
    for candidate in candidates {
        let conflicts = kept.iter().any(|k| {
            k.feature == candidate.feature
                || sequences_overlap(
                    &corpus.features[k.feature].stems,
                    &corpus.features[candidate.feature].stems,
                )
        });
        if !conflicts {
            kept.push(candidate);
        }
    }

    debug!(candidates = kept.len(), rank = basis.rank(), "Labels induced");
    kept
}

/// Cosine alignment of a feature's direction with one basis vector.
///
/// A single term is a unit axis vector, so its alignment is just the basis
/// component at its row. A phrase's direction is the idf-weighted sum of
/// its member-term axes, normalized.
fn alignment(feature: &Feature, tdm: &TermDocumentMatrix, basis: &ReducedBasis, dim: usize) -> f64 {
    if !feature.is_phrase() {
        return basis.basis.at(feature.index, dim);
    }
    let mut dot = 0.0;
    let mut norm_sq = 0.0;
    for &member in &feature.member_terms {
        let idf = tdm.idf[member];
        dot += idf * basis.basis.at(member, dim);
        norm_sq += idf * idf;
    }
    if norm_sq > 0.0 {
        dot / norm_sq.sqrt()
    } else {
        0.0
    }
}

/// Tie-break on exactly equal scores: phrase over term, then higher
/// document frequency, then earlier feature index.
fn prefer(a: &Feature, b: &Feature) -> bool {
    (a.is_phrase(), a.document_frequency, std::cmp::Reverse(a.index))
        > (b.is_phrase(), b.document_frequency, std::cmp::Reverse(b.index))
}

/// Whether one stem sequence is a prefix or suffix of the other (equality
/// included).
fn sequences_overlap(a: &[String], b: &[String]) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    long.starts_with(short) || long.ends_with(short)
}
