// Feature extraction: single-term features and repeated-phrase features.
//
// Terms: one feature per distinct stem (or per lowercased surface for
// common words, which are not stemmed). Phrases: windows of 2..=4 adjacent
// non-common stems, promoted to features only when the same stem sequence
// occurs in at least two documents.
//
// Everything here is deterministic: corpus statistics are accumulated in
// token order, and feature indices come from sorting on (document
// frequency, first occurrence position) — never from hash-map iteration
// order.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::document::Document;
use crate::language::LinguisticResources;

use super::tokenize::{tokenize, word_regex};
use super::{Feature, PreprocessedCorpus};

/// Longest phrase window, in stems.
pub const MAX_PHRASE_LEN: usize = 4;

/// (document ordinal, field index, token index) — a token's position in the
/// corpus, used for deterministic first-occurrence ordering.
type Position = (usize, usize, usize);

/// Corpus-wide statistics for one term or phrase.
struct Stat {
    document_frequency: u32,
    first_position: Position,
    /// surface form -> (occurrence count, first position); the display form
    /// is the most frequent surface, earliest position on ties.
    surfaces: HashMap<String, (u32, Position)>,
}

impl Stat {
    fn new(position: Position) -> Self {
        Self {
            document_frequency: 0,
            first_position: position,
            surfaces: HashMap::new(),
        }
    }

    fn record_surface(&mut self, surface: &str, position: Position) {
        let entry = self
            .surfaces
            .entry(surface.to_string())
            .or_insert((0, position));
        entry.0 += 1;
    }

    fn display_form(&self) -> String {
        self.surfaces
            .iter()
            .max_by(|(_, (ca, pa)), (_, (cb, pb))| ca.cmp(cb).then(pb.cmp(pa)))
            .map(|(surface, _)| surface.clone())
            .unwrap_or_default()
    }
}

/// One token after normalization. `key` pairs the stem (or surface, for
/// common words) with the common flag so a stop word can never collide with
/// a stem of the same spelling.
#[derive(Clone)]
struct Token {
    key: (String, bool),
    surface: String,
}

/// Run preprocessing over the whole document sequence.
pub fn extract(documents: &[Document], resources: &LinguisticResources) -> PreprocessedCorpus {
    let word = word_regex();

    // Pass 1: tokenize every field, stem non-common tokens, and keep the
    // per-document token sequences (field boundaries preserved — phrases
    // never span fields).
    let mut sequences: Vec<Vec<Vec<Token>>> = Vec::with_capacity(documents.len());
    let mut non_empty_documents = 0;

    for document in documents {
        let mut fields = Vec::with_capacity(document.fields.len());
        let mut any_token = false;
        for (_, text) in &document.fields {
            let tokens: Vec<Token> = tokenize(text, &word)
                .into_iter()
                .map(|lower| {
                    let common = resources.is_stop_word(&lower)
                        || !lower.chars().any(|c| c.is_alphabetic());
                    let key = if common {
                        (lower.clone(), true)
                    } else {
                        (resources.stem(&lower), false)
                    };
                    Token {
                        key,
                        surface: lower,
                    }
                })
                .collect();
            any_token |= !tokens.is_empty();
            fields.push(tokens);
        }
        if any_token {
            non_empty_documents += 1;
        }
        sequences.push(fields);
    }

    // Pass 2: accumulate term and phrase statistics in token order.
    let mut term_stats: HashMap<(String, bool), Stat> = HashMap::new();
    let mut phrase_stats: HashMap<Vec<String>, Stat> = HashMap::new();
    // Per-document raw counts, needed again when building the vectors.
    let mut term_counts: Vec<HashMap<(String, bool), f64>> = Vec::with_capacity(documents.len());
    let mut phrase_counts: Vec<HashMap<Vec<String>, f64>> = Vec::with_capacity(documents.len());

    for (d, fields) in sequences.iter().enumerate() {
        let mut terms_seen: HashSet<(String, bool)> = HashSet::new();
        let mut phrases_seen: HashSet<Vec<String>> = HashSet::new();
        let mut doc_terms: HashMap<(String, bool), f64> = HashMap::new();
        let mut doc_phrases: HashMap<Vec<String>, f64> = HashMap::new();

        for (f, tokens) in fields.iter().enumerate() {
            for (t, token) in tokens.iter().enumerate() {
                let position = (d, f, t);
                let stat = term_stats
                    .entry(token.key.clone())
                    .or_insert_with(|| Stat::new(position));
                stat.record_surface(&token.surface, position);
                if terms_seen.insert(token.key.clone()) {
                    stat.document_frequency += 1;
                }
                *doc_terms.entry(token.key.clone()).or_insert(0.0) += 1.0;
            }

            // Phrase windows: every run of adjacent non-common tokens.
            for len in 2..=MAX_PHRASE_LEN {
                if tokens.len() < len {
                    break;
                }
                for start in 0..=tokens.len() - len {
                    let window = &tokens[start..start + len];
                    if window.iter().any(|tok| tok.key.1) {
                        continue;
                    }
                    let stems: Vec<String> =
                        window.iter().map(|tok| tok.key.0.clone()).collect();
                    let surface = window
                        .iter()
                        .map(|tok| tok.surface.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    let position = (d, f, start);
                    let stat = phrase_stats
                        .entry(stems.clone())
                        .or_insert_with(|| Stat::new(position));
                    stat.record_surface(&surface, position);
                    if phrases_seen.insert(stems.clone()) {
                        stat.document_frequency += 1;
                    }
                    *doc_phrases.entry(stems).or_insert(0.0) += 1.0;
                }
            }
        }

        term_counts.push(doc_terms);
        phrase_counts.push(doc_phrases);
    }

    // Pass 3: assign indices. Terms first, by descending document frequency
    // then first occurrence; promoted phrases after, same order.
    let mut terms: Vec<((String, bool), Stat)> = term_stats.into_iter().collect();
    terms.sort_by(|(_, a), (_, b)| {
        b.document_frequency
            .cmp(&a.document_frequency)
            .then(a.first_position.cmp(&b.first_position))
    });

    let mut phrases: Vec<(Vec<String>, Stat)> = phrase_stats
        .into_iter()
        .filter(|(_, stat)| stat.document_frequency >= 2)
        .collect();
    phrases.sort_by(|(_, a), (_, b)| {
        b.document_frequency
            .cmp(&a.document_frequency)
            .then(a.first_position.cmp(&b.first_position))
    });

    let mut features = Vec::with_capacity(terms.len() + phrases.len());
    let mut term_index: HashMap<(String, bool), usize> = HashMap::new();

    for (key, stat) in terms {
        let index = features.len();
        term_index.insert(key.clone(), index);
        features.push(Feature {
            text: stat.display_form(),
            stems: vec![key.0],
            index,
            document_frequency: stat.document_frequency,
            common: key.1,
            member_terms: vec![index],
        });
    }

    let mut phrase_index: HashMap<Vec<String>, usize> = HashMap::new();
    for (stems, stat) in phrases {
        let index = features.len();
        // Members are non-common, so each stem is guaranteed to exist as a
        // term feature. Distinct, first-appearance order.
        let mut member_terms = Vec::new();
        for stem in &stems {
            let member = term_index[&(stem.clone(), false)];
            if !member_terms.contains(&member) {
                member_terms.push(member);
            }
        }
        phrase_index.insert(stems.clone(), index);
        features.push(Feature {
            text: stat.display_form(),
            stems,
            index,
            document_frequency: stat.document_frequency,
            common: false,
            member_terms,
        });
    }

    // Pass 4: per-document sparse occurrence vectors, sorted by index.
    let doc_vectors = term_counts
        .into_iter()
        .zip(phrase_counts)
        .map(|(doc_terms, doc_phrases)| {
            let mut vector: Vec<(usize, f64)> = doc_terms
                .into_iter()
                .map(|(key, count)| (term_index[&key], count))
                .chain(doc_phrases.into_iter().filter_map(|(stems, count)| {
                    phrase_index.get(&stems).map(|&index| (index, count))
                }))
                .collect();
            vector.sort_by_key(|&(index, _)| index);
            vector
        })
        .collect();

    debug!(
        features = features.len(),
        documents = documents.len(),
        non_empty = non_empty_documents,
        "Preprocessing complete"
    );

    PreprocessedCorpus {
        features,
        doc_vectors,
        non_empty_documents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resources() -> LinguisticResources {
        LinguisticResources::for_language("en").unwrap()
    }

    fn doc(id: &str, text: &str) -> Document {
        Document::new(id, vec![("text".to_string(), text.to_string())])
    }

    #[test]
    fn test_terms_indexed_by_descending_df() {
        let docs = vec![
            doc("1", "coffee beans"),
            doc("2", "coffee grinder"),
            doc("3", "coffee roast"),
        ];
        let corpus = extract(&docs, &resources());
        // "coffee" occurs in all three documents and must take index 0.
        assert_eq!(corpus.features[0].text, "coffee");
        assert_eq!(corpus.features[0].document_frequency, 3);
        assert!(!corpus.features[0].common);
    }

    #[test]
    fn test_stop_words_flagged_common() {
        let docs = vec![doc("1", "the coffee"), doc("2", "the grinder")];
        let corpus = extract(&docs, &resources());
        let the = corpus.features.iter().find(|f| f.text == "the").unwrap();
        assert!(the.common);
        assert_eq!(the.document_frequency, 2);
    }

    #[test]
    fn test_numeric_tokens_flagged_common() {
        let docs = vec![doc("1", "error 404"), doc("2", "page 404")];
        let corpus = extract(&docs, &resources());
        let num = corpus.features.iter().find(|f| f.text == "404").unwrap();
        assert!(num.common);
    }

    #[test]
    fn test_phrase_requires_two_documents() {
        let docs = vec![
            doc("1", "rust programming rocks"),
            doc("2", "rust programming rules"),
            doc("3", "coffee brewing guide"),
        ];
        let corpus = extract(&docs, &resources());
        let phrases: Vec<&Feature> = corpus.features.iter().filter(|f| f.is_phrase()).collect();
        // "rust programming" repeats; "coffee brewing" is seen once only.
        assert!(phrases.iter().any(|f| f.text == "rust programming"));
        assert!(!phrases.iter().any(|f| f.text.starts_with("coffee")));
    }

    #[test]
    fn test_phrase_does_not_span_stop_words() {
        let docs = vec![
            doc("1", "coffee and beans"),
            doc("2", "coffee and beans"),
        ];
        let corpus = extract(&docs, &resources());
        // "and" is common, so no window containing it becomes a phrase.
        assert!(corpus.features.iter().all(|f| !f.is_phrase()));
    }

    #[test]
    fn test_phrase_does_not_span_fields() {
        let make = |id: &str| {
            Document::new(
                id,
                vec![
                    ("title".to_string(), "quantum".to_string()),
                    ("snippet".to_string(), "computing".to_string()),
                ],
            )
        };
        let corpus = extract(&[make("1"), make("2")], &resources());
        assert!(corpus.features.iter().all(|f| !f.is_phrase()));
    }

    #[test]
    fn test_empty_document_retained() {
        let docs = vec![doc("1", "coffee beans"), doc("2", "...!!!")];
        let corpus = extract(&docs, &resources());
        assert_eq!(corpus.doc_vectors.len(), 2);
        assert!(corpus.doc_vectors[1].is_empty());
        assert_eq!(corpus.non_empty_documents, 1);
    }

    #[test]
    fn test_stemmed_variants_share_a_feature() {
        let docs = vec![doc("1", "brewing coffee"), doc("2", "brews coffee")];
        let corpus = extract(&docs, &resources());
        let brew = corpus
            .features
            .iter()
            .find(|f| f.stems == vec![resources().stem("brewing")])
            .unwrap();
        assert_eq!(brew.document_frequency, 2);
    }

    #[test]
    fn test_vectors_sorted_by_index() {
        let docs = vec![
            doc("1", "alpha beta gamma alpha"),
            doc("2", "beta gamma delta"),
        ];
        let corpus = extract(&docs, &resources());
        for vector in &corpus.doc_vectors {
            for pair in vector.windows(2) {
                assert!(pair[0].0 < pair[1].0);
            }
        }
    }

    #[test]
    fn test_phrase_members_point_at_term_rows() {
        let docs = vec![
            doc("1", "machine learning models"),
            doc("2", "machine learning wins"),
        ];
        let corpus = extract(&docs, &resources());
        let phrase = corpus
            .features
            .iter()
            .find(|f| f.text == "machine learning")
            .unwrap();
        assert_eq!(phrase.member_terms.len(), 2);
        for &member in &phrase.member_terms {
            assert!(!corpus.features[member].is_phrase());
            assert!(!corpus.features[member].common);
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let docs = vec![
            doc("1", "rust programming language"),
            doc("2", "rust programming tutorial"),
            doc("3", "coffee brewing at home"),
            doc("4", "coffee brewing gear"),
        ];
        let res = resources();
        let a = extract(&docs, &res);
        let b = extract(&docs, &res);
        let render = |c: &PreprocessedCorpus| {
            c.features
                .iter()
                .map(|f| format!("{}:{}:{}", f.index, f.text, f.document_frequency))
                .collect::<Vec<_>>()
        };
        assert_eq!(render(&a), render(&b));
        assert_eq!(a.doc_vectors, b.doc_vectors);
    }
}
