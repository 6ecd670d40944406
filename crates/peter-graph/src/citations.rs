//! Citation subgraph: per-paper references partitioned by polarity.
//!
//! Each indexed paper owns outgoing edges to the papers it cites. An edge
//! carries the reference's aggregate context polarity and the cosine
//! similarity between the two papers' title embeddings. Edges are stored
//! pre-sorted, so queries only partition and truncate.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use peter_core::{ClassifiedContext, ContextPolarity, PaperId, PaperWithClassifiedContexts};
use peter_embeddings::{cosine_similarity, Encoder};

use crate::error::{validate_k, validate_threshold, GraphError, Result};

/// An outgoing edge from an indexed paper to one of its references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationEdge {
    /// Id of the referenced paper.
    pub id: PaperId,
    pub title: String,
    /// Aggregate polarity of the reference's citation contexts.
    pub polarity: ContextPolarity,
    /// Cosine similarity between the citing and cited title embeddings.
    pub score: f32,
    /// The contexts the polarity was aggregated from.
    pub contexts: Vec<ClassifiedContext>,
}

/// Citation query result: references split by aggregate polarity.
///
/// Both buckets are sorted by descending score with ties broken by paper id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationQueryResult {
    pub positive: Vec<CitationEdge>,
    pub negative: Vec<CitationEdge>,
}

/// Immutable citation subgraph. Built once from classified papers, then
/// queried read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationGraph {
    edges: BTreeMap<PaperId, Vec<CitationEdge>>,
}

impl CitationGraph {
    /// Build the citation graph from papers with classified reference contexts.
    ///
    /// For each paper, every reference becomes an outgoing edge scored by
    /// title similarity and labelled with its aggregate polarity.
    pub fn from_papers(
        encoder: &dyn Encoder,
        papers: &[PaperWithClassifiedContexts],
    ) -> Result<Self> {
        let mut edges: BTreeMap<PaperId, Vec<CitationEdge>> = BTreeMap::new();

        for paper in papers {
            let source_vector = encoder.embed(&paper.title)?;

            let mut outgoing = Vec::with_capacity(paper.references.len());
            for reference in &paper.references {
                let reference_vector = encoder.embed(&reference.title)?;
                outgoing.push(CitationEdge {
                    id: reference.id(),
                    title: reference.title.clone(),
                    polarity: reference.polarity(),
                    score: cosine_similarity(&source_vector, &reference_vector),
                    contexts: reference.contexts.clone(),
                });
            }
            sort_edges(&mut outgoing);
            edges.insert(paper.id(), outgoing);
        }

        debug!(papers = edges.len(), "Citation graph built");
        Ok(Self { edges })
    }

    /// Number of indexed papers.
    pub fn paper_count(&self) -> usize {
        self.edges.len()
    }

    /// Total number of edges across all papers.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Return up to `k` highest-similarity references per polarity bucket.
    ///
    /// Fails with [`GraphError::PaperNotFound`] if `paper_id` has no edges
    /// recorded.
    pub fn query(&self, paper_id: &PaperId, k: usize) -> Result<CitationQueryResult> {
        validate_k("citation_k", k)?;
        let edges = self.outgoing(paper_id)?;
        Ok(partition(edges.iter().cloned(), Some(k)))
    }

    /// Return every reference with similarity at or above `min_score` per
    /// polarity bucket, still sorted descending, without a count cap.
    pub fn query_threshold(
        &self,
        paper_id: &PaperId,
        min_score: f32,
    ) -> Result<CitationQueryResult> {
        validate_threshold("citation_threshold", min_score)?;
        let edges = self.outgoing(paper_id)?;
        Ok(partition(
            edges.iter().filter(|e| e.score >= min_score).cloned(),
            None,
        ))
    }

    fn outgoing(&self, paper_id: &PaperId) -> Result<&[CitationEdge]> {
        self.edges
            .get(paper_id)
            .map(Vec::as_slice)
            .ok_or_else(|| GraphError::PaperNotFound(paper_id.clone()))
    }
}

/// Descending score, ties broken by ascending paper id for reproducibility.
fn sort_edges(edges: &mut [CitationEdge]) {
    edges.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn partition(
    edges: impl Iterator<Item = CitationEdge>,
    cap: Option<usize>,
) -> CitationQueryResult {
    let mut result = CitationQueryResult::default();
    for edge in edges {
        let bucket = match edge.polarity {
            ContextPolarity::Positive => &mut result.positive,
            ContextPolarity::Negative => &mut result.negative,
        };
        if cap.map_or(true, |k| bucket.len() < k) {
            bucket.push(edge);
        }
    }
    result
}
