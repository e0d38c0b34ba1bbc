// Matrix reduction stage: rank-k approximation of the term-document matrix.
//
// The factorization preserves the dominant latent topics: k basis vectors
// in feature space plus a k × documents coefficient matrix. k is the
// requested cluster count times the oversampling factor, clamped to the
// rank actually available; a rank-deficient corpus shrinks k instead of
// failing, and an entirely zero matrix yields no basis at all (the caller
// short-circuits to an all-residual result).

mod nmf;

use tracing::debug;

use crate::vsm::{DenseMatrix, TermDocumentMatrix};

/// Low-rank approximation of the term-document matrix.
#[derive(Debug)]
pub struct ReducedBasis {
    /// features × rank; each column is a unit-length basis vector spanning
    /// one latent topic.
    pub basis: DenseMatrix,
    /// rank × documents; column d holds document d's coordinates in the
    /// reduced space.
    pub coefficients: DenseMatrix,
}

impl ReducedBasis {
    pub fn rank(&self) -> usize {
        self.basis.cols()
    }
}

/// Compute the reduced basis, or `None` when the matrix has no usable
/// content.
pub fn reduce(
    tdm: &TermDocumentMatrix,
    desired_cluster_count: usize,
    oversampling_factor: f64,
    iterations: usize,
) -> Option<ReducedBasis> {
    let matrix = &tdm.weights;
    if matrix.is_zero() {
        return None;
    }

    let requested = (desired_cluster_count as f64 * oversampling_factor).ceil() as usize;
    // Insufficient rank reduces k rather than failing.
    let k = requested
        .max(1)
        .min(matrix.non_zero_rows())
        .min(matrix.non_zero_cols());
    if k == 0 {
        return None;
    }

    let (basis, coefficients) = nmf::factorize(matrix, k, iterations);

    debug!(
        requested,
        rank = k,
        iterations,
        "Term-document matrix reduced"
    );

    Some(ReducedBasis {
        basis,
        coefficients,
    })
}
