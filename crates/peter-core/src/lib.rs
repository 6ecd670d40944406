//! # PETER Core
//!
//! Data model for the PETER retrieval graphs:
//! - Paper records with deterministic content-derived ids
//! - Citation-context polarity and its aggregation rule
//! - Related-paper results grouped into four polarised buckets

mod id;
mod paper;
mod polarity;
mod related;

pub use id::PaperId;
pub use paper::{ClassifiedReference, PaperAnnotated, PaperWithClassifiedContexts};
pub use polarity::{aggregate_polarity, ClassifiedContext, ContextPolarity};
pub use related::{PaperRelated, PaperSource, QueryResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{aggregate_polarity, ClassifiedContext, ContextPolarity};
    pub use crate::{ClassifiedReference, PaperAnnotated, PaperWithClassifiedContexts};
    pub use crate::{PaperId, PaperRelated, PaperSource, QueryResult};
}
