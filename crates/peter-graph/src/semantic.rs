//! Semantic subgraph: corpus-wide retrieval by concept rather than citation.
//!
//! Every paper is indexed under two independent embeddings: its background
//! (stated problem/goal) and its target (stated method/solution). Searching
//! by target surfaces papers sharing the approach, which supports the
//! method's precedent and is labelled positive downstream. Searching by
//! background surfaces papers attacking the same problem with potentially
//! different methods, labelled negative. That assignment is fixed; swapping
//! it would invert every downstream novelty argument.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use peter_core::{PaperAnnotated, PaperId};
use peter_embeddings::{cosine_similarity, Encoder};

use crate::error::{validate_k, validate_threshold, Result};

/// An indexed paper with its annotation texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticNode {
    pub id: PaperId,
    pub title: String,
    pub background: String,
    pub target: String,
}

/// A paper matched by one of the two similarity searches.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
    pub id: PaperId,
    pub title: String,
    pub background: String,
    pub target: String,
    pub score: f32,
}

/// Semantic query result: matches from the two independent searches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SemanticQueryResult {
    /// Papers near the query's target vector (shared method).
    pub targets: Vec<SemanticMatch>,
    /// Papers near the query's background vector (shared goal).
    pub backgrounds: Vec<SemanticMatch>,
}

/// Immutable semantic subgraph bound to the encoder that produced its
/// vectors. Built once, then queried read-only.
pub struct SemanticGraph {
    nodes: Vec<SemanticNode>,
    background_vectors: Vec<Vec<f32>>,
    target_vectors: Vec<Vec<f32>>,
    encoder: Arc<dyn Encoder>,
}

impl SemanticGraph {
    /// Build the semantic graph by embedding every paper's background and
    /// target with `encoder`.
    pub fn from_papers(encoder: Arc<dyn Encoder>, papers: &[PaperAnnotated]) -> Result<Self> {
        let mut nodes = Vec::with_capacity(papers.len());
        let mut background_vectors = Vec::with_capacity(papers.len());
        let mut target_vectors = Vec::with_capacity(papers.len());

        for paper in papers {
            nodes.push(SemanticNode {
                id: paper.id(),
                title: paper.title.clone(),
                background: paper.background.clone(),
                target: paper.target.clone(),
            });
            background_vectors.push(encoder.embed(&paper.background)?);
            target_vectors.push(encoder.embed(&paper.target)?);
        }

        debug!(papers = nodes.len(), "Semantic graph built");
        Ok(Self {
            nodes,
            background_vectors,
            target_vectors,
            encoder,
        })
    }

    /// Number of indexed papers.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Convert to the encoder-free serializable form.
    pub fn to_data(&self) -> SemanticGraphData {
        SemanticGraphData {
            nodes: self.nodes.clone(),
            background_vectors: self.background_vectors.clone(),
            target_vectors: self.target_vectors.clone(),
        }
    }

    /// Retrieve the `k` nearest neighbours of the query's target vector and,
    /// independently, the `k` nearest of its background vector.
    ///
    /// The querying paper itself (the indexed node whose background and
    /// target both equal the query texts) is excluded from both searches.
    pub fn query(&self, background: &str, target: &str, k: usize) -> Result<SemanticQueryResult> {
        validate_k("semantic_k", k)?;
        self.search_both(background, target, k, None)
    }

    /// Two-stage threshold query: retrieve `retrieved_k` nearest candidates
    /// per search, then keep those scoring at or above `min_score`. Bounds
    /// search cost while allowing a variable-size result.
    pub fn query_threshold(
        &self,
        background: &str,
        target: &str,
        min_score: f32,
        retrieved_k: usize,
    ) -> Result<SemanticQueryResult> {
        validate_threshold("semantic_threshold", min_score)?;
        validate_k("retrieved_k", retrieved_k)?;
        self.search_both(background, target, retrieved_k, Some(min_score))
    }

    fn search_both(
        &self,
        background: &str,
        target: &str,
        k: usize,
        min_score: Option<f32>,
    ) -> Result<SemanticQueryResult> {
        let background_query = self.encoder.embed(background)?;
        let target_query = self.encoder.embed(target)?;

        let self_index = self
            .nodes
            .iter()
            .position(|n| n.background == background && n.target == target);

        Ok(SemanticQueryResult {
            targets: self.search(&self.target_vectors, &target_query, k, min_score, self_index),
            backgrounds: self.search(
                &self.background_vectors,
                &background_query,
                k,
                min_score,
                self_index,
            ),
        })
    }

    /// Brute-force exact nearest-neighbour search over one vector index.
    fn search(
        &self,
        vectors: &[Vec<f32>],
        query: &[f32],
        k: usize,
        min_score: Option<f32>,
        exclude: Option<usize>,
    ) -> Vec<SemanticMatch> {
        let mut scored: Vec<(usize, f32)> = vectors
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .map(|(i, v)| (i, cosine_similarity(query, v)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.nodes[a.0].id.cmp(&self.nodes[b.0].id))
        });

        scored
            .into_iter()
            .take(k)
            .filter(|(_, score)| min_score.map_or(true, |t| *score >= t))
            .map(|(i, score)| {
                let node = &self.nodes[i];
                SemanticMatch {
                    id: node.id.clone(),
                    title: node.title.clone(),
                    background: node.background.clone(),
                    target: node.target.clone(),
                    score,
                }
            })
            .collect()
    }
}

/// Serialization format for [`SemanticGraph`]: the vectors without the
/// encoder binding. The encoder is reconstructed separately from the model
/// identifier persisted in the graph metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticGraphData {
    pub nodes: Vec<SemanticNode>,
    pub background_vectors: Vec<Vec<f32>>,
    pub target_vectors: Vec<Vec<f32>>,
}

impl SemanticGraphData {
    /// Rebind the stored vectors to an encoder, producing a queryable graph.
    pub fn into_graph(self, encoder: Arc<dyn Encoder>) -> SemanticGraph {
        SemanticGraph {
            nodes: self.nodes,
            background_vectors: self.background_vectors,
            target_vectors: self.target_vectors,
            encoder,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peter_embeddings::{EncoderResult, HashEncoder};

    /// Encoder with hand-picked vectors, for controlling search geometry.
    #[derive(Debug)]
    struct StubEncoder;

    impl Encoder for StubEncoder {
        fn embed(&self, text: &str) -> EncoderResult<Vec<f32>> {
            Ok(match text {
                "goal a" => vec![1.0, 0.0, 0.0],
                "goal b" => vec![0.9, 0.1, 0.0],
                "goal c" => vec![0.0, 1.0, 0.0],
                "method a" => vec![0.0, 0.0, 1.0],
                "method b" => vec![0.0, 0.3, 0.9],
                "method c" => vec![0.0, 1.0, 0.1],
                _ => vec![0.0, 0.0, 0.0],
            })
        }

        fn dimension(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn paper(name: &str, background: &str, target: &str) -> PaperAnnotated {
        PaperAnnotated {
            title: name.to_string(),
            abstract_: format!("{name} abstract"),
            background: background.to_string(),
            target: target.to_string(),
        }
    }

    fn abc_graph() -> SemanticGraph {
        let papers = vec![
            paper("A", "goal a", "method a"),
            paper("B", "goal b", "method b"),
            paper("C", "goal c", "method c"),
        ];
        SemanticGraph::from_papers(Arc::new(StubEncoder), &papers).unwrap()
    }

    #[test]
    fn nearest_target_wins_with_k_one() {
        let graph = abc_graph();
        // B's method vector is closer to A's than C's is.
        let result = graph.query("goal a", "method a", 1).unwrap();
        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].title, "B");
    }

    #[test]
    fn querying_paper_is_excluded_from_both_searches() {
        let graph = abc_graph();
        let result = graph.query("goal a", "method a", 3).unwrap();
        assert!(result.targets.iter().all(|m| m.title != "A"));
        assert!(result.backgrounds.iter().all(|m| m.title != "A"));
        assert_eq!(result.targets.len(), 2);
        assert_eq!(result.backgrounds.len(), 2);
    }

    #[test]
    fn background_search_ranks_shared_goal_first() {
        let graph = abc_graph();
        let result = graph.query("goal a", "method a", 2).unwrap();
        assert_eq!(result.backgrounds[0].title, "B");
        assert!(result.backgrounds[0].score > result.backgrounds[1].score);
    }

    #[test]
    fn results_are_sorted_descending() {
        let graph = abc_graph();
        let result = graph.query("goal a", "method a", 3).unwrap();
        for bucket in [&result.targets, &result.backgrounds] {
            for pair in bucket.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }
    }

    #[test]
    fn threshold_filters_retrieved_candidates() {
        let graph = abc_graph();
        let result = graph
            .query_threshold("goal a", "method a", 0.8, 10)
            .unwrap();
        for m in result.targets.iter().chain(&result.backgrounds) {
            assert!(m.score >= 0.8);
        }
        // "goal b" is the only background within 0.8 of "goal a".
        assert_eq!(result.backgrounds.len(), 1);
    }

    #[test]
    fn retrieved_k_bounds_the_candidate_pool() {
        let graph = abc_graph();
        let result = graph
            .query_threshold("goal a", "method a", 0.0, 1)
            .unwrap();
        assert!(result.targets.len() <= 1);
        assert!(result.backgrounds.len() <= 1);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let graph = abc_graph();
        assert!(graph.query("goal a", "method a", 0).is_err());
        assert!(graph.query_threshold("goal a", "method a", -0.2, 5).is_err());
        assert!(graph.query_threshold("goal a", "method a", 0.5, 0).is_err());
    }

    #[test]
    fn data_round_trip_preserves_results() {
        let encoder: Arc<dyn Encoder> = Arc::new(HashEncoder::new(64));
        let papers = vec![
            paper("A", "sparse retrieval", "inverted index"),
            paper("B", "dense retrieval", "dual encoder"),
            paper("C", "question answering", "reader model"),
        ];
        let graph = SemanticGraph::from_papers(encoder.clone(), &papers).unwrap();
        let restored = graph.to_data().into_graph(encoder);

        let before = graph.query("dense retrieval", "dual encoder", 2).unwrap();
        let after = restored.query("dense retrieval", "dual encoder", 2).unwrap();
        assert_eq!(before, after);
    }
}
