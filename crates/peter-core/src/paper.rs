//! Input paper records consumed during graph construction.
//!
//! These mirror the upstream pipeline output: annotated papers carry an
//! extracted background (problem/goal) and target (method/solution);
//! context papers carry references whose citation contexts were classified
//! by polarity.

use serde::{Deserialize, Serialize};

use crate::id::PaperId;
use crate::polarity::{aggregate_polarity, ClassifiedContext, ContextPolarity};

/// A paper annotated with its extracted background and target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperAnnotated {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    /// The paper's stated problem or goal.
    pub background: String,
    /// The paper's stated method or solution.
    pub target: String,
}

impl PaperAnnotated {
    pub fn id(&self) -> PaperId {
        PaperId::from_title_abstract(&self.title, &self.abstract_)
    }
}

/// A referenced paper with its classified citation contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReference {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub contexts: Vec<ClassifiedContext>,
}

impl ClassifiedReference {
    pub fn id(&self) -> PaperId {
        PaperId::from_title_abstract(&self.title, &self.abstract_)
    }

    /// Overall polarity of the reference across all of its contexts.
    pub fn polarity(&self) -> ContextPolarity {
        aggregate_polarity(&self.contexts)
    }
}

/// A paper with all of its references' contexts classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperWithClassifiedContexts {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_: String,
    pub references: Vec<ClassifiedReference>,
}

impl PaperWithClassifiedContexts {
    pub fn id(&self) -> PaperId {
        PaperId::from_title_abstract(&self.title, &self.abstract_)
    }
}
