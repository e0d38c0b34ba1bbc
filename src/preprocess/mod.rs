// Preprocessing stage: tokenize, normalize, stem, and extract features.
//
// Consumes the raw documents and produces the feature space every later
// stage works in: single-term features, repeated-phrase features, and one
// sparse occurrence vector per document. Feature indices are assigned once
// here and never reused within a request; every downstream matrix row and
// label refers back to them.

mod features;
mod tokenize;

pub use features::{extract, MAX_PHRASE_LEN};

/// A stemmed term or phrase with a stable index — the unit of the vector
/// space.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Display form: the most frequent original (lowercased) surface for
    /// this feature across the corpus. Labels are rendered from this, not
    /// from the stems.
    pub text: String,
    /// One stem for a single term, two or more for a phrase.
    pub stems: Vec<String>,
    /// Stable index; also the feature's row in the term-document matrix.
    pub index: usize,
    /// Number of documents the feature occurs in.
    pub document_frequency: u32,
    /// Common (stop-listed or non-alphabetic) words stay in the vector
    /// space for weighting but are never promoted to cluster labels.
    pub common: bool,
    /// For a phrase: indices of the member term features, distinct, in
    /// first-appearance order. For a single term: just its own index.
    pub member_terms: Vec<usize>,
}

impl Feature {
    pub fn is_phrase(&self) -> bool {
        self.stems.len() > 1
    }
}

/// Output of the preprocessing stage.
#[derive(Debug)]
pub struct PreprocessedCorpus {
    /// All features, ordered by index: terms by descending document
    /// frequency, then promoted phrases, ties broken by first occurrence.
    pub features: Vec<Feature>,
    /// Per document, (feature index, raw occurrence count) pairs sorted by
    /// index. A document that yielded no usable tokens has an empty vector
    /// and is retained — it will land in the residual cluster.
    pub doc_vectors: Vec<Vec<(usize, f64)>>,
    /// Documents that produced at least one token.
    pub non_empty_documents: usize,
}
