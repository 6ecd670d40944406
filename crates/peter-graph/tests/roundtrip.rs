//! Build → persist → load round-trip behaviour of the full graph.

use std::sync::Arc;

use peter_core::{
    ClassifiedContext, ClassifiedReference, ContextPolarity, PaperAnnotated,
    PaperWithClassifiedContexts,
};
use peter_embeddings::{Encoder, HashEncoder};
use peter_graph::{citations::CitationGraph, semantic::SemanticGraph};
use peter_graph::{Graph, GraphError, METADATA_FILENAME};

fn context(text: &str, prediction: ContextPolarity) -> ClassifiedContext {
    ClassifiedContext {
        text: text.to_string(),
        prediction,
        gold: None,
    }
}

fn annotated_corpus() -> Vec<PaperAnnotated> {
    vec![
        PaperAnnotated {
            title: "dense retrieval for scientific papers".to_string(),
            abstract_: "We retrieve papers with dual encoders.".to_string(),
            background: "finding related scientific papers".to_string(),
            target: "dual encoder dense retrieval".to_string(),
        },
        PaperAnnotated {
            title: "sparse retrieval baselines revisited".to_string(),
            abstract_: "BM25 remains strong.".to_string(),
            background: "finding related scientific papers efficiently".to_string(),
            target: "inverted index sparse retrieval".to_string(),
        },
        PaperAnnotated {
            title: "novelty assessment with polarised graphs".to_string(),
            abstract_: "Citations argue for or against novelty.".to_string(),
            background: "assessing paper novelty claims".to_string(),
            target: "polarised citation graph retrieval".to_string(),
        },
    ]
}

fn context_corpus() -> Vec<PaperWithClassifiedContexts> {
    vec![PaperWithClassifiedContexts {
        // Same title/abstract as the first annotated paper, so both
        // subgraphs know the same paper id.
        title: "dense retrieval for scientific papers".to_string(),
        abstract_: "We retrieve papers with dual encoders.".to_string(),
        references: vec![
            ClassifiedReference {
                title: "sparse retrieval baselines revisited".to_string(),
                abstract_: "BM25 remains strong.".to_string(),
                contexts: vec![
                    context("we improve over sparse baselines", ContextPolarity::Negative),
                    context("sparse methods fail on paraphrase", ContextPolarity::Negative),
                ],
            },
            ClassifiedReference {
                title: "novelty assessment with polarised graphs".to_string(),
                abstract_: "Citations argue for or against novelty.".to_string(),
                contexts: vec![context("we adopt the graph formulation", ContextPolarity::Positive)],
            },
        ],
    }]
}

fn encoder() -> Arc<dyn Encoder> {
    Arc::new(HashEncoder::new(64))
}

fn in_memory_graph() -> Graph {
    let encoder = encoder();
    let citation = CitationGraph::from_papers(encoder.as_ref(), &context_corpus()).unwrap();
    let semantic = SemanticGraph::from_papers(encoder.clone(), &annotated_corpus()).unwrap();
    Graph::new(citation, semantic, encoder.model_name().to_string())
}

#[test]
fn loaded_graph_answers_like_the_in_memory_graph() {
    let dir = tempfile::tempdir().unwrap();
    Graph::build(encoder(), &annotated_corpus(), &context_corpus(), dir.path()).unwrap();

    let loaded = Graph::load(dir.path()).unwrap();
    let reference = in_memory_graph();
    assert_eq!(loaded.encoder_model(), reference.encoder_model());

    let query_paper = &annotated_corpus()[0];
    let id = query_paper.id();

    let from_disk = loaded
        .query_all(&id, &query_paper.background, &query_paper.target, 5, 5)
        .unwrap();
    let from_memory = reference
        .query_all(&id, &query_paper.background, &query_paper.target, 5, 5)
        .unwrap();
    assert_eq!(from_disk, from_memory);
    assert!(!from_disk.is_empty());

    let threshold_disk = loaded
        .query_threshold(&id, &query_paper.background, &query_paper.target, 0.1, 0.1, 100)
        .unwrap();
    let threshold_memory = reference
        .query_threshold(&id, &query_paper.background, &query_paper.target, 0.1, 0.1, 100)
        .unwrap();
    assert_eq!(threshold_disk, threshold_memory);
}

#[test]
fn query_buckets_respect_polarity_and_k() {
    let dir = tempfile::tempdir().unwrap();
    Graph::build(encoder(), &annotated_corpus(), &context_corpus(), dir.path()).unwrap();
    let graph = Graph::load(dir.path()).unwrap();

    let query_paper = &annotated_corpus()[0];
    let result = graph
        .query_all(&query_paper.id(), &query_paper.background, &query_paper.target, 1, 5)
        .unwrap();

    // Two annotated papers besides the query, but semantic_k = 1.
    assert_eq!(result.semantic_positive.len(), 1);
    assert_eq!(result.semantic_negative.len(), 1);
    // One positively and one negatively cited reference.
    assert_eq!(result.citations_positive.len(), 1);
    assert_eq!(result.citations_negative.len(), 1);
    assert_eq!(
        result.citations_negative[0].title,
        "sparse retrieval baselines revisited"
    );
}

#[test]
fn snapshot_round_trip_preserves_queries() {
    let graph = in_memory_graph();
    let json = serde_json::to_string(&graph.to_snapshot()).unwrap();
    let snapshot: peter_graph::GraphSnapshot = serde_json::from_str(&json).unwrap();
    let restored = snapshot.into_graph().unwrap();

    let query_paper = &annotated_corpus()[0];
    let id = query_paper.id();
    let before = graph
        .query_all(&id, &query_paper.background, &query_paper.target, 5, 5)
        .unwrap();
    let after = restored
        .query_all(&id, &query_paper.background, &query_paper.target, 5, 5)
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn missing_metadata_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    Graph::build(encoder(), &annotated_corpus(), &context_corpus(), dir.path()).unwrap();

    let metadata = dir.path().join(METADATA_FILENAME);
    std::fs::remove_file(&metadata).unwrap();

    let err = Graph::load(dir.path()).err().expect("load should fail");
    match err {
        GraphError::MissingGraphFiles(missing) => assert_eq!(missing, vec![metadata]),
        other => panic!("expected MissingGraphFiles, got {other:?}"),
    }
}

#[test]
fn empty_directory_reports_all_three_files() {
    let dir = tempfile::tempdir().unwrap();
    let err = Graph::load(dir.path()).err().expect("load should fail");
    match err {
        GraphError::MissingGraphFiles(missing) => assert_eq!(missing.len(), 3),
        other => panic!("expected MissingGraphFiles, got {other:?}"),
    }
}

#[test]
fn corrupt_subgraph_file_is_a_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    Graph::build(encoder(), &annotated_corpus(), &context_corpus(), dir.path()).unwrap();

    std::fs::write(dir.path().join(peter_graph::CITATION_FILENAME), b"junk").unwrap();
    assert!(matches!(
        Graph::load(dir.path()),
        Err(GraphError::Schema { .. })
    ));
}

#[test]
fn unknown_paper_id_fails_the_whole_query() {
    let dir = tempfile::tempdir().unwrap();
    Graph::build(encoder(), &annotated_corpus(), &context_corpus(), dir.path()).unwrap();
    let graph = Graph::load(dir.path()).unwrap();

    let unknown = peter_core::PaperId::from_raw("ffff");
    assert!(matches!(
        graph.query_all(&unknown, "goal", "method", 5, 5),
        Err(GraphError::PaperNotFound(_))
    ));
}
