// Input documents and document-ordinal bitsets.
//
// A document's position in the input sequence is its canonical ordinal: it
// is the matrix column index in the vector space, the bit position in every
// cluster's document set, and the order documents are reported in. Documents
// are immutable once ingested.

use serde::{Deserialize, Serialize};

/// One retrieved document: an opaque identifier plus an ordered sequence of
/// named text fields (typically title and snippet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Ordered (field name, text) pairs. Field boundaries matter: phrases
    /// never span two fields.
    pub fields: Vec<(String, String)>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Convenience constructor for the common title + snippet shape.
    pub fn from_title_snippet(
        id: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self::new(
            id,
            vec![
                ("title".to_string(), title.into()),
                ("snippet".to_string(), snippet.into()),
            ],
        )
    }
}

/// Fixed-width set of document ordinals, one bit per input document.
///
/// Every `DocSet` in a request is exactly `len` bits wide, where `len` is
/// the number of input documents. Backed by u64 blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSet {
    blocks: Vec<u64>,
    len: usize,
}

impl DocSet {
    pub fn new(len: usize) -> Self {
        Self {
            blocks: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Width in bits (the number of input documents), not the popcount.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    pub fn set(&mut self, ordinal: usize) {
        debug_assert!(ordinal < self.len);
        self.blocks[ordinal / 64] |= 1 << (ordinal % 64);
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        ordinal < self.len && self.blocks[ordinal / 64] & (1 << (ordinal % 64)) != 0
    }

    /// Number of set bits.
    pub fn count(&self) -> usize {
        self.blocks.iter().map(|b| b.count_ones() as usize).sum()
    }

    pub fn union_with(&mut self, other: &DocSet) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.blocks.iter_mut().zip(&other.blocks) {
            *a |= b;
        }
    }

    pub fn intersection_count(&self, other: &DocSet) -> usize {
        self.blocks
            .iter()
            .zip(&other.blocks)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Jaccard similarity of two sets: |A ∩ B| / |A ∪ B|, 0.0 when both are
    /// empty.
    pub fn jaccard(&self, other: &DocSet) -> f64 {
        let inter = self.intersection_count(other);
        let union = self.count() + other.count() - inter;
        if union == 0 {
            0.0
        } else {
            inter as f64 / union as f64
        }
    }

    /// Iterate set ordinals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.contains(i))
    }

    /// Ordinals of this width that are NOT set in any of `sets`.
    pub fn complement_of_union(sets: &[&DocSet], len: usize) -> DocSet {
        let mut union = DocSet::new(len);
        for s in sets {
            union.union_with(s);
        }
        let mut out = DocSet::new(len);
        for i in 0..len {
            if !union.contains(i) {
                out.set(i);
            }
        }
        out
    }
}
