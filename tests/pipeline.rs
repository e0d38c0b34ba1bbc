// End-to-end pipeline properties and scenarios.
//
// Covers the behavior callers rely on: bit-for-bit determinism, document
// coverage, residual-cluster correctness, degenerate inputs, threshold
// monotonicity, and the canonical two-topic corpus.

use cairn::cluster::Clustering;
use cairn::config::ClusteringConfig;
use cairn::document::Document;
use cairn::error::ClusterError;
use cairn::language::LinguisticResources;
use cairn::pipeline::cluster_documents;
use cairn::{assign, label, preprocess, reduce, vsm};

fn doc(id: &str, text: &str) -> Document {
    Document::new(id, vec![("text".to_string(), text.to_string())])
}

/// Three documents about rust, two about coffee, fully disjoint content
/// vocabulary.
fn two_topic_corpus() -> Vec<Document> {
    vec![
        doc("rust-1", "Rust programming language borrow checker"),
        doc("rust-2", "Rust programming language cargo tooling"),
        doc("rust-3", "Rust programming language memory safety"),
        doc("coffee-1", "Coffee brewing espresso grinder"),
        doc("coffee-2", "Coffee brewing filter kettle"),
    ]
}

fn two_topic_config() -> ClusteringConfig {
    ClusteringConfig {
        desired_cluster_count: 2,
        // More update steps than the default so the factorization settles
        // fully on this tiny corpus; still a fixed, deterministic count.
        reduction_iterations: 60,
        ..Default::default()
    }
}

// ============================================================
// Determinism
// ============================================================

#[test]
fn identical_runs_produce_identical_output() {
    let documents = two_topic_corpus();
    let a = cluster_documents(&documents, "en", two_topic_config()).unwrap();
    let b = cluster_documents(&documents, "en", two_topic_config()).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn thread_count_does_not_change_output() {
    let documents = two_topic_corpus();
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| cluster_documents(&documents, "en", two_topic_config()).unwrap());
    let parallel = cluster_documents(&documents, "en", two_topic_config()).unwrap();
    assert_eq!(
        serde_json::to_string(&single).unwrap(),
        serde_json::to_string(&parallel).unwrap()
    );
}

// ============================================================
// Coverage and residual correctness
// ============================================================

fn assert_coverage(documents: &[Document], clustering: &Clustering) {
    for document in documents {
        let appearances = clustering
            .clusters
            .iter()
            .filter(|c| c.documents.contains(&document.id))
            .count();
        assert!(
            appearances >= 1,
            "document {} appears in no cluster",
            document.id
        );
    }
}

#[test]
fn every_document_lands_somewhere() {
    let mut documents = two_topic_corpus();
    documents.push(doc("empty", "")); // yields no tokens at all
    let clustering = cluster_documents(&documents, "en", two_topic_config()).unwrap();
    assert_coverage(&documents, &clustering);
    assert_eq!(clustering.document_count, 6);
}

#[test]
fn residual_holds_exactly_the_unclustered_documents() {
    let mut documents = two_topic_corpus();
    documents.push(doc("stray", "zebra xylophone quasar"));
    let clustering = cluster_documents(&documents, "en", two_topic_config()).unwrap();

    let residual = clustering.residual();
    for document in &documents {
        let in_topical = clustering
            .topical()
            .any(|c| c.documents.contains(&document.id));
        assert_eq!(
            residual.documents.contains(&document.id),
            !in_topical,
            "residual membership wrong for {}",
            document.id
        );
    }
}

#[test]
fn residual_is_always_present_and_last() {
    let clustering =
        cluster_documents(&two_topic_corpus(), "en", two_topic_config()).unwrap();
    let last = clustering.clusters.last().unwrap();
    assert!(last.residual);
    assert_eq!(clustering.clusters.iter().filter(|c| c.residual).count(), 1);
}

// ============================================================
// Degenerate inputs
// ============================================================

#[test]
fn zero_documents_yield_one_empty_residual_cluster() {
    let clustering = cluster_documents(&[], "en", ClusteringConfig::default()).unwrap();
    assert_eq!(clustering.clusters.len(), 1);
    assert!(clustering.clusters[0].residual);
    assert!(clustering.clusters[0].documents.is_empty());
}

#[test]
fn one_document_yields_one_residual_cluster_containing_it() {
    let documents = vec![doc("only", "rust programming language")];
    let clustering = cluster_documents(&documents, "en", ClusteringConfig::default()).unwrap();
    assert_eq!(clustering.clusters.len(), 1);
    assert!(clustering.clusters[0].residual);
    assert_eq!(clustering.clusters[0].documents, vec!["only"]);
}

#[test]
fn all_stop_word_documents_collapse_to_residual() {
    let documents = vec![
        doc("a", "the and of to"),
        doc("b", "a an the with"),
        doc("c", "of and the"),
    ];
    let clustering = cluster_documents(&documents, "en", ClusteringConfig::default()).unwrap();
    assert_eq!(clustering.topical().count(), 0);
    assert_eq!(clustering.residual().size(), 3);
}

// ============================================================
// Threshold monotonicity (at the assignment stage, where the
// property is defined)
// ============================================================

#[test]
fn raising_assignment_threshold_never_adds_pairs() {
    let documents = two_topic_corpus();
    let resources = LinguisticResources::for_language("en").unwrap();
    let corpus = preprocess::extract(&documents, &resources);
    let tdm = vsm::build(&corpus, documents.len());
    let basis = reduce::reduce(&tdm, 2, 1.5, 15).unwrap();
    let config = two_topic_config().validate().unwrap();

    let mut previous = usize::MAX;
    for threshold in [0.0, 0.2, 0.4, 0.6, 0.8, 1.0] {
        let mut candidates = label::induce(&corpus, &tdm, &basis, &config, documents.len());
        assign::assign(&mut candidates, &basis, threshold);
        let pairs: usize = candidates.iter().map(|c| c.docs.count()).sum();
        assert!(
            pairs <= previous,
            "assignment pairs grew from {previous} to {pairs} at threshold {threshold}"
        );
        previous = pairs;
    }
}

// ============================================================
// Scenarios
// ============================================================

#[test]
fn two_topics_partition_three_two() {
    let documents = two_topic_corpus();
    let clustering = cluster_documents(&documents, "en", two_topic_config()).unwrap();

    let topical: Vec<_> = clustering.topical().collect();
    assert_eq!(topical.len(), 2, "expected two topical clusters");

    let mut sizes: Vec<usize> = topical.iter().map(|c| c.size()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);

    // The bigger cluster is the rust one, the smaller the coffee one, and
    // each label is drawn from its own topic's vocabulary.
    for cluster in &topical {
        let label = cluster.label.to_lowercase();
        if cluster.size() == 3 {
            assert!(cluster.documents.iter().all(|id| id.starts_with("rust")));
            assert!(
                ["rust", "programming", "language", "borrow", "cargo", "memory"]
                    .iter()
                    .any(|w| label.contains(w)),
                "rust cluster labeled {label:?}"
            );
        } else {
            assert!(cluster.documents.iter().all(|id| id.starts_with("coffee")));
            assert!(
                ["coffee", "brewing", "espresso", "filter"]
                    .iter()
                    .any(|w| label.contains(w)),
                "coffee cluster labeled {label:?}"
            );
        }
    }

    assert!(clustering.residual().documents.is_empty());
}

#[test]
fn fully_disjoint_documents_all_fall_to_residual() {
    // Ten documents sharing no vocabulary at all: every candidate cluster
    // is a singleton and dies at the min_cluster_size floor.
    let documents: Vec<Document> = (0..10)
        .map(|i| {
            doc(
                &format!("doc-{i}"),
                &format!("unique{i}alpha unique{i}beta unique{i}gamma"),
            )
        })
        .collect();
    let config = ClusteringConfig {
        min_cluster_size: 2,
        reduction_iterations: 60,
        ..Default::default()
    };
    let clustering = cluster_documents(&documents, "en", config).unwrap();
    assert_eq!(clustering.topical().count(), 0);
    assert_eq!(clustering.residual().size(), 10);
}

// ============================================================
// Request-level failures
// ============================================================

#[test]
fn invalid_configuration_is_rejected_before_the_pipeline() {
    let config = ClusteringConfig {
        assignment_threshold: 2.0,
        ..Default::default()
    };
    let result = cluster_documents(&two_topic_corpus(), "en", config);
    assert!(matches!(
        result,
        Err(ClusterError::ConfigurationInvalid { .. })
    ));
}

#[test]
fn unsupported_language_is_rejected() {
    let result = cluster_documents(&two_topic_corpus(), "xx", ClusteringConfig::default());
    assert!(matches!(result, Err(ClusterError::UnsupportedLanguage(_))));
}

#[test]
fn timeout_aborts_without_partial_output() {
    let config = ClusteringConfig {
        timeout: Some(std::time::Duration::from_nanos(1)),
        ..Default::default()
    };
    let result = cluster_documents(&two_topic_corpus(), "en", config);
    assert!(matches!(result, Err(ClusterError::Timeout { .. })));
}
