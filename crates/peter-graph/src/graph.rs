//! Full graph containing citation and semantic subgraphs.
//!
//! The composite graph retrieves positive and negative related papers:
//! - Negative papers: negatively cited references, or papers sharing the
//!   goal but not the method.
//! - Positive papers: positively cited references, or papers sharing the
//!   method but not the goal.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use peter_core::{
    ContextPolarity, PaperAnnotated, PaperId, PaperRelated, PaperSource,
    PaperWithClassifiedContexts, QueryResult,
};
use peter_embeddings::{load_encoder, Encoder};

use crate::citations::{CitationGraph, CitationQueryResult};
use crate::error::{GraphError, Result};
use crate::semantic::{SemanticGraph, SemanticGraphData, SemanticQueryResult};
use crate::store;

/// Default per-bucket result count for citation queries.
pub const CITATION_TOP_K: usize = 5;
/// Default per-bucket result count for semantic queries.
pub const SEMANTIC_TOP_K: usize = 5;

pub const CITATION_FILENAME: &str = "citation_graph.json.zst";
pub const SEMANTIC_FILENAME: &str = "semantic_graph.json.zst";
pub const METADATA_FILENAME: &str = "metadata.json";

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    encoder_model: String,
}

/// The full retrieval graph: one citation subgraph, one semantic subgraph,
/// and the identifier of the encoder that produced every vector in both.
pub struct Graph {
    citation: CitationGraph,
    semantic: SemanticGraph,
    encoder_model: String,
}

impl Graph {
    pub fn new(citation: CitationGraph, semantic: SemanticGraph, encoder_model: String) -> Self {
        Self {
            citation,
            semantic,
            encoder_model,
        }
    }

    /// Model identifier of the encoder bound to this graph.
    pub fn encoder_model(&self) -> &str {
        &self.encoder_model
    }

    pub fn citation(&self) -> &CitationGraph {
        &self.citation
    }

    pub fn semantic(&self) -> &SemanticGraph {
        &self.semantic
    }

    /// Build both subgraphs from upstream records and persist them to
    /// `output_dir`.
    ///
    /// The two phases run sequentially and the semantic graph is dropped
    /// before the citation graph is allocated, so peak memory is bounded by
    /// the larger subgraph rather than their sum.
    pub fn build(
        encoder: Arc<dyn Encoder>,
        annotated: &[PaperAnnotated],
        contexts: &[PaperWithClassifiedContexts],
        output_dir: &Path,
    ) -> Result<()> {
        fs::create_dir_all(output_dir)?;

        let citation_file = output_dir.join(CITATION_FILENAME);
        let semantic_file = output_dir.join(SEMANTIC_FILENAME);
        let metadata_file = output_dir.join(METADATA_FILENAME);

        {
            debug!("Building semantic graph");
            let started = Instant::now();
            let semantic = SemanticGraph::from_papers(encoder.clone(), annotated)?;
            store::write_compressed(&semantic_file, &semantic.to_data())?;
            debug!(papers = semantic.len(), elapsed = ?started.elapsed(), "Semantic graph saved");
        }

        {
            debug!("Building citation graph");
            let started = Instant::now();
            let citation = CitationGraph::from_papers(encoder.as_ref(), contexts)?;
            store::write_compressed(&citation_file, &citation)?;
            debug!(
                papers = citation.paper_count(),
                edges = citation.edge_count(),
                elapsed = ?started.elapsed(),
                "Citation graph saved"
            );
        }

        let metadata = Metadata {
            encoder_model: encoder.model_name().to_string(),
        };
        fs::write(&metadata_file, serde_json::to_vec_pretty(&metadata)?)?;
        Ok(())
    }

    /// Load a graph from a directory written by [`Graph::build`].
    ///
    /// Fails with [`GraphError::MissingGraphFiles`] naming every absent
    /// required file, or [`GraphError::Schema`] if a file's content does not
    /// validate. The encoder is re-instantiated from the stored model
    /// identifier, so query text lands in the same vector space as the
    /// indexed vectors.
    pub fn load(graph_dir: &Path) -> Result<Self> {
        let citation_file = graph_dir.join(CITATION_FILENAME);
        let semantic_file = graph_dir.join(SEMANTIC_FILENAME);
        let metadata_file = graph_dir.join(METADATA_FILENAME);

        let missing: Vec<PathBuf> = [&citation_file, &semantic_file, &metadata_file]
            .into_iter()
            .filter(|f| !f.exists())
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(GraphError::MissingGraphFiles(missing));
        }

        let metadata: Metadata = serde_json::from_slice(&fs::read(&metadata_file)?)
            .map_err(|e| GraphError::Schema {
                path: metadata_file.clone(),
                reason: e.to_string(),
            })?;
        let encoder = load_encoder(&metadata.encoder_model)?;

        let citation: CitationGraph = store::read_compressed(&citation_file)?;
        let semantic_data: SemanticGraphData = store::read_compressed(&semantic_file)?;
        let semantic = semantic_data.into_graph(encoder);

        debug!(
            model = %metadata.encoder_model,
            citation_papers = citation.paper_count(),
            semantic_papers = semantic.len(),
            "Graph loaded"
        );
        Ok(Self::new(citation, semantic, metadata.encoder_model))
    }

    /// Find papers related to a paper through citations and semantic
    /// similarity, up to `k` per bucket.
    pub fn query_all(
        &self,
        paper_id: &PaperId,
        background: &str,
        target: &str,
        semantic_k: usize,
        citation_k: usize,
    ) -> Result<QueryResult> {
        let papers_semantic = self.semantic.query(background, target, semantic_k)?;
        let papers_citation = self.citation.query(paper_id, citation_k)?;
        Ok(merge_results(papers_semantic, papers_citation))
    }

    /// Find related papers scoring at or above the per-subgraph thresholds.
    pub fn query_threshold(
        &self,
        paper_id: &PaperId,
        background: &str,
        target: &str,
        semantic_threshold: f32,
        citation_threshold: f32,
        retrieved_k: usize,
    ) -> Result<QueryResult> {
        let papers_semantic =
            self.semantic
                .query_threshold(background, target, semantic_threshold, retrieved_k)?;
        let papers_citation = self.citation.query_threshold(paper_id, citation_threshold)?;
        Ok(merge_results(papers_semantic, papers_citation))
    }
}

/// Serializable form of the full graph: both subgraphs plus the encoder
/// model identifier. Useful when a graph has to travel as a single value
/// instead of the three-file directory layout.
#[derive(Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub citation: CitationGraph,
    pub semantic: SemanticGraphData,
    pub encoder_model: String,
}

impl Graph {
    /// Convert to the serializable snapshot form.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            citation: self.citation.clone(),
            semantic: self.semantic.to_data(),
            encoder_model: self.encoder_model.clone(),
        }
    }
}

impl GraphSnapshot {
    /// Reconstruct the full graph, re-instantiating the encoder binding from
    /// the stored model identifier.
    pub fn into_graph(self) -> Result<Graph> {
        let encoder = load_encoder(&self.encoder_model)?;
        Ok(Graph::new(
            self.citation,
            self.semantic.into_graph(encoder),
            self.encoder_model,
        ))
    }
}

/// Map both subgraphs' native results into the four polarised buckets and
/// collapse within-bucket duplicates.
///
/// Target-similarity hits become semantic positives (precedent for the
/// method); background-similarity hits become semantic negatives (competing
/// approaches to the same goal).
fn merge_results(
    semantic: SemanticQueryResult,
    citation: CitationQueryResult,
) -> QueryResult {
    let semantic_related = |m: crate::semantic::SemanticMatch, polarity| PaperRelated {
        id: m.id,
        title: m.title,
        score: m.score,
        source: PaperSource::Semantic,
        polarity,
        background: Some(m.background),
        target: Some(m.target),
        contexts: None,
    };
    let citation_related = |e: crate::citations::CitationEdge, polarity| PaperRelated {
        id: e.id,
        title: e.title,
        score: e.score,
        source: PaperSource::Citations,
        polarity,
        background: None,
        target: None,
        contexts: Some(e.contexts),
    };

    QueryResult {
        semantic_positive: semantic
            .targets
            .into_iter()
            .map(|m| semantic_related(m, ContextPolarity::Positive))
            .collect(),
        semantic_negative: semantic
            .backgrounds
            .into_iter()
            .map(|m| semantic_related(m, ContextPolarity::Negative))
            .collect(),
        citations_positive: citation
            .positive
            .into_iter()
            .map(|e| citation_related(e, ContextPolarity::Positive))
            .collect(),
        citations_negative: citation
            .negative
            .into_iter()
            .map(|e| citation_related(e, ContextPolarity::Negative))
            .collect(),
    }
    .deduplicated()
}
