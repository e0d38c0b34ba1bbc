// Unit tests for label induction over a real reduced corpus.

use cairn::config::ClusteringConfig;
use cairn::document::Document;
use cairn::language::LinguisticResources;
use cairn::{label, preprocess, reduce, vsm};

struct Stage {
    corpus: preprocess::PreprocessedCorpus,
    tdm: vsm::TermDocumentMatrix,
    basis: reduce::ReducedBasis,
    document_count: usize,
}

fn stages(texts: &[&str], clusters: usize) -> Stage {
    let resources = LinguisticResources::for_language("en").unwrap();
    let docs: Vec<Document> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Document::new(i.to_string(), vec![("text".to_string(), t.to_string())]))
        .collect();
    let corpus = preprocess::extract(&docs, &resources);
    let tdm = vsm::build(&corpus, docs.len());
    let basis = reduce::reduce(&tdm, clusters, 1.5, 60).unwrap();
    Stage {
        corpus,
        tdm,
        basis,
        document_count: docs.len(),
    }
}

fn two_topic_texts() -> Vec<&'static str> {
    vec![
        "rust programming language borrow checker",
        "rust programming language cargo tooling",
        "rust programming language memory safety",
        "coffee brewing espresso grinder",
        "coffee brewing filter kettle",
    ]
}

#[test]
fn candidates_reference_only_label_worthy_features() {
    let s = stages(&two_topic_texts(), 2);
    let config = ClusteringConfig::default().validate().unwrap();
    let candidates = label::induce(&s.corpus, &s.tdm, &s.basis, &config, s.document_count);
    assert!(!candidates.is_empty());
    for candidate in &candidates {
        assert!(!s.corpus.features[candidate.feature].common);
    }
}

#[test]
fn candidates_meet_the_minimum_alignment_score() {
    let s = stages(&two_topic_texts(), 2);
    let config = ClusteringConfig {
        min_alignment_score: 0.3,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let candidates = label::induce(&s.corpus, &s.tdm, &s.basis, &config, s.document_count);
    for candidate in &candidates {
        assert!(candidate.score >= 0.3);
    }
}

#[test]
fn impossible_alignment_floor_drops_everything() {
    let s = stages(&two_topic_texts(), 2);
    let config = ClusteringConfig {
        min_alignment_score: 1e9,
        ..Default::default()
    }
    .validate()
    .unwrap();
    let candidates = label::induce(&s.corpus, &s.tdm, &s.basis, &config, s.document_count);
    assert!(candidates.is_empty());
}

#[test]
fn overlapping_word_sequences_are_deduplicated() {
    let s = stages(&two_topic_texts(), 3);
    let config = ClusteringConfig::default().validate().unwrap();
    let candidates = label::induce(&s.corpus, &s.tdm, &s.basis, &config, s.document_count);
    // "rust programming", "programming language", and "rust programming
    // language" all overlap pairwise; at most one may survive, and no two
    // surviving candidates may share a prefix or suffix stem sequence.
    for (i, a) in candidates.iter().enumerate() {
        for b in &candidates[i + 1..] {
            let sa = &s.corpus.features[a.feature].stems;
            let sb = &s.corpus.features[b.feature].stems;
            let (short, long) = if sa.len() <= sb.len() { (sa, sb) } else { (sb, sa) };
            assert!(
                !(long.starts_with(short.as_slice()) || long.ends_with(short.as_slice())),
                "candidates {:?} and {:?} overlap",
                s.corpus.features[a.feature].text,
                s.corpus.features[b.feature].text,
            );
        }
    }
}

#[test]
fn candidates_come_out_ordered_by_score() {
    let s = stages(&two_topic_texts(), 3);
    let config = ClusteringConfig::default().validate().unwrap();
    let candidates = label::induce(&s.corpus, &s.tdm, &s.basis, &config, s.document_count);
    for pair in candidates.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn bit_vectors_start_empty_and_full_width() {
    let s = stages(&two_topic_texts(), 2);
    let config = ClusteringConfig::default().validate().unwrap();
    let candidates = label::induce(&s.corpus, &s.tdm, &s.basis, &config, s.document_count);
    for candidate in &candidates {
        assert_eq!(candidate.docs.len(), s.document_count);
        assert!(candidate.docs.is_empty());
    }
}
