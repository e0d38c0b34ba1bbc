// Vector space model: the weighted term-document matrix.
//
// Rows are features, columns are documents (by ordinal), weights are
// tf × idf with cosine-normalized columns. Built once per request and
// read-only afterward.

mod builder;
mod matrix;

pub use builder::{build, TermDocumentMatrix};
pub use matrix::{DenseMatrix, SparseRowMajorMatrix};
