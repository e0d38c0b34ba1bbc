// Term-document matrix construction: tf × idf weighting with
// cosine-normalized columns.
//
// The idf formula is the smoothed logarithm ln((1 + N) / (1 + df)) + 1: it
// never divides by zero, dampens very frequent terms, and keeps every
// weight strictly positive for terms that occur at all. Unit-length columns
// make later cosine comparisons scale-invariant; all-zero columns (empty
// documents) are left as zero vectors.

use tracing::debug;

use crate::preprocess::PreprocessedCorpus;

use super::matrix::SparseRowMajorMatrix;

/// The weighted feature-by-document matrix plus the idf weight per feature
/// (the label stage reuses idf to build phrase directions).
#[derive(Debug)]
pub struct TermDocumentMatrix {
    pub weights: SparseRowMajorMatrix,
    pub idf: Vec<f64>,
}

/// Build the weighted matrix from preprocessed occurrence vectors.
pub fn build(corpus: &PreprocessedCorpus, document_count: usize) -> TermDocumentMatrix {
    let idf: Vec<f64> = corpus
        .features
        .iter()
        .map(|f| {
            ((1.0 + document_count as f64) / (1.0 + f.document_frequency as f64)).ln() + 1.0
        })
        .collect();

    // Transpose the per-document vectors into per-feature rows. Documents
    // are visited in ordinal order, so each row comes out sorted by column.
    let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); corpus.features.len()];
    for (doc, vector) in corpus.doc_vectors.iter().enumerate() {
        for &(feature, count) in vector {
            rows[feature].push((doc, count * idf[feature]));
        }
    }

    let mut weights = SparseRowMajorMatrix::from_rows(rows, document_count);

    let factors: Vec<f64> = weights
        .column_l2_norms()
        .into_iter()
        .map(|n| if n > 0.0 { 1.0 / n } else { 0.0 })
        .collect();
    weights.scale_columns(&factors);

    debug!(
        rows = weights.rows(),
        cols = weights.cols(),
        nnz = weights.nnz(),
        "Term-document matrix built"
    );

    TermDocumentMatrix { weights, idf }
}
