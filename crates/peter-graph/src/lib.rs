//! # PETER Graph
//!
//! Retrieval graph engine for assessing a scientific paper's novelty.
//! Two complementary subgraphs find papers arguing for or against a target
//! paper's novelty claim:
//!
//! - [`CitationGraph`]: references partitioned by aggregate citation-context
//!   polarity, ranked by title similarity.
//! - [`SemanticGraph`]: corpus-wide nearest-neighbour search over background
//!   (goal) and target (method) embeddings.
//! - [`Graph`]: owns both, manages the build/persist/load lifecycle, and
//!   merges query results into four polarised buckets.
//!
//! Graphs are built once, persisted to a directory, and queried read-only.
//! A corpus change requires a full rebuild.

pub mod citations;
pub mod error;
pub mod graph;
pub mod semantic;
mod store;

pub use citations::{CitationEdge, CitationGraph, CitationQueryResult};
pub use error::{GraphError, Result};
pub use graph::{
    Graph, GraphSnapshot, CITATION_FILENAME, CITATION_TOP_K, METADATA_FILENAME,
    SEMANTIC_FILENAME, SEMANTIC_TOP_K,
};
pub use semantic::{SemanticGraph, SemanticGraphData, SemanticMatch, SemanticQueryResult};
