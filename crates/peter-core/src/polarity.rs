//! Citation-context polarity and the aggregation rule for references.

use serde::{Deserialize, Serialize};

/// Polarity of a relation towards a paper's novelty claim.
///
/// Positive contexts support the claim; negative contexts argue against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextPolarity {
    Positive,
    Negative,
}

/// A citation context with its classified polarity.
///
/// Classification happens upstream in the LLM pipeline; this engine only
/// consumes the predictions. The gold label, when present, is carried along
/// for evaluation but never influences retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedContext {
    /// The sentence(s) where the citing paper mentions the reference.
    pub text: String,
    /// Predicted polarity.
    pub prediction: ContextPolarity,
    /// Gold label, if annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gold: Option<ContextPolarity>,
}

/// Aggregate polarity of a reference from its classified contexts.
///
/// A reference is negative only when a strict majority of its contexts are
/// negative; everything else, including an empty context list, is positive.
pub fn aggregate_polarity(contexts: &[ClassifiedContext]) -> ContextPolarity {
    let negative = contexts
        .iter()
        .filter(|c| c.prediction == ContextPolarity::Negative)
        .count();
    if negative * 2 > contexts.len() {
        ContextPolarity::Negative
    } else {
        ContextPolarity::Positive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(prediction: ContextPolarity) -> ClassifiedContext {
        ClassifiedContext {
            text: "as shown in [1]".to_string(),
            prediction,
            gold: None,
        }
    }

    #[test]
    fn strict_majority_is_negative() {
        let contexts = vec![
            ctx(ContextPolarity::Negative),
            ctx(ContextPolarity::Negative),
            ctx(ContextPolarity::Positive),
        ];
        assert_eq!(aggregate_polarity(&contexts), ContextPolarity::Negative);
    }

    #[test]
    fn exact_half_is_positive() {
        let contexts = vec![ctx(ContextPolarity::Positive), ctx(ContextPolarity::Negative)];
        assert_eq!(aggregate_polarity(&contexts), ContextPolarity::Positive);
    }

    #[test]
    fn empty_contexts_default_to_positive() {
        assert_eq!(aggregate_polarity(&[]), ContextPolarity::Positive);
    }

    #[test]
    fn polarity_serializes_lowercase() {
        let json = serde_json::to_string(&ContextPolarity::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }
}
