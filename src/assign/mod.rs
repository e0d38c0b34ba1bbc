// Content assignment: attach documents to label candidates.
//
// A document joins a candidate when the cosine between its coefficient
// vector in reduced space and the candidate's basis direction reaches the
// assignment threshold. Soft clustering: one document may satisfy several
// candidates. Documents with a zero coefficient column (empty documents,
// or content the factorization captured nothing of) stay unassigned.

use tracing::debug;

use crate::document::DocSet;
use crate::label::LabelCandidate;
use crate::reduce::ReducedBasis;

/// Fill every candidate's document bit-vector. Returns the set of
/// documents no candidate claimed.
pub fn assign(
    candidates: &mut [LabelCandidate],
    basis: &ReducedBasis,
    threshold: f64,
) -> DocSet {
    let coefficients = &basis.coefficients;
    let document_count = coefficients.cols();

    for d in 0..document_count {
        let column = coefficients.column(d);
        let norm = column.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        for candidate in candidates.iter_mut() {
            // The basis direction is a unit axis in reduced space, so the
            // cosine is the matching coordinate over the column norm.
            let similarity = column[candidate.basis_dim] / norm;
            if similarity >= threshold {
                candidate.docs.set(d);
            }
        }
    }

    let claimed: Vec<&DocSet> = candidates.iter().map(|c| &c.docs).collect();
    let unassigned = DocSet::complement_of_union(&claimed, document_count);

    debug!(
        candidates = candidates.len(),
        unassigned = unassigned.count(),
        "Documents assigned"
    );
    unassigned
}
