//! Related-paper results grouped into four polarised buckets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::id::PaperId;
use crate::polarity::{ClassifiedContext, ContextPolarity};

/// Which subgraph produced a related paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSource {
    Semantic,
    Citations,
}

/// A related paper found by one of the subgraphs.
///
/// Semantic hits carry the matched background/target text; citation hits
/// carry the contexts the polarity was aggregated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRelated {
    pub id: PaperId,
    pub title: String,
    pub score: f32,
    pub source: PaperSource,
    pub polarity: ContextPolarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<ClassifiedContext>>,
}

/// Result of querying the full graph: four ordered buckets of related papers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub semantic_positive: Vec<PaperRelated>,
    pub semantic_negative: Vec<PaperRelated>,
    pub citations_positive: Vec<PaperRelated>,
    pub citations_negative: Vec<PaperRelated>,
}

impl QueryResult {
    /// Remove duplicate papers within each bucket, keeping the first
    /// (highest-ranked) occurrence.
    ///
    /// A paper may still appear in more than one bucket: a semantic hit and a
    /// citation hit for the same paper are independent signals.
    pub fn deduplicated(self) -> Self {
        Self {
            semantic_positive: dedup_bucket(self.semantic_positive),
            semantic_negative: dedup_bucket(self.semantic_negative),
            citations_positive: dedup_bucket(self.citations_positive),
            citations_negative: dedup_bucket(self.citations_negative),
        }
    }

    /// Total number of related papers across all buckets.
    pub fn len(&self) -> usize {
        self.semantic_positive.len()
            + self.semantic_negative.len()
            + self.citations_positive.len()
            + self.citations_negative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn dedup_bucket(bucket: Vec<PaperRelated>) -> Vec<PaperRelated> {
    let mut seen: HashSet<PaperId> = HashSet::new();
    bucket
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}
