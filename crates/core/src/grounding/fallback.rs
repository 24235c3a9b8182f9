use std::collections::BTreeMap;

use crate::domain::reasoning::ReasoningOutput;

/// Why the pipeline substituted a fixed response for reasoning output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackReason {
    /// Retrieval produced zero candidates; the provider was never invoked.
    NoInventory,
    /// Truth-Mode filtering left nothing recommendable.
    ValidationFailed,
    /// The provider failed (transport, timeout, malformed payload).
    ProviderUnavailable,
    /// Anything unanticipated, caught at the orchestrator boundary.
    SystemError,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoInventory => "no_inventory",
            Self::ValidationFailed => "validation_failed",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::SystemError => "system_error",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::NoInventory => {
                "I couldn't find any matching products in our current inventory. Could you tell \
                 me more about what you're looking for, or I can check if we have similar items? \
                 Alternatively, you can ask an associate to verify our stock in this area."
            }
            Self::ValidationFailed => {
                "I'm having trouble confirming product availability right now. Please ask an \
                 associate to help verify our current stock for this request."
            }
            Self::ProviderUnavailable => {
                "I'm having trouble processing your request right now. Could you please rephrase \
                 your question, or I can help you find a store associate?"
            }
            Self::SystemError => {
                "I'm experiencing a technical issue. Please try again in a moment, or ask an \
                 associate for help."
            }
        }
    }
}

/// The fixed, non-hallucinating output used whenever upstream reasoning
/// cannot be trusted: empty recommendation lists, confidence 0.
pub fn safe_fallback(reason: FallbackReason) -> ReasoningOutput {
    let follow_up_questions = match reason {
        FallbackReason::NoInventory => vec![
            "What specific task are you trying to accomplish?".to_string(),
            "Do you have any preferences like damage-free or budget limits?".to_string(),
        ],
        _ => Vec::new(),
    };

    ReasoningOutput {
        assistant_message: reason.message().to_string(),
        follow_up_questions,
        recommended_skus: Vec::new(),
        add_on_skus: Vec::new(),
        cart: Vec::new(),
        safety_notes: Vec::new(),
        reasoning: BTreeMap::new(),
        confidence: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{safe_fallback, FallbackReason};

    #[test]
    fn fallbacks_recommend_nothing_with_zero_confidence() {
        for reason in [
            FallbackReason::NoInventory,
            FallbackReason::ValidationFailed,
            FallbackReason::ProviderUnavailable,
            FallbackReason::SystemError,
        ] {
            let output = safe_fallback(reason);
            assert!(output.recommended_skus.is_empty(), "{reason:?}");
            assert!(output.add_on_skus.is_empty(), "{reason:?}");
            assert!(output.cart.is_empty(), "{reason:?}");
            assert_eq!(output.confidence, 0.0, "{reason:?}");
        }
    }

    #[test]
    fn only_no_inventory_carries_follow_ups() {
        assert_eq!(safe_fallback(FallbackReason::NoInventory).follow_up_questions.len(), 2);
        assert!(safe_fallback(FallbackReason::ValidationFailed).follow_up_questions.is_empty());
    }

    #[test]
    fn messages_are_distinct_per_reason() {
        let no_inventory = safe_fallback(FallbackReason::NoInventory).assistant_message;
        let validation = safe_fallback(FallbackReason::ValidationFailed).assistant_message;
        let system = safe_fallback(FallbackReason::SystemError).assistant_message;
        assert!(no_inventory.contains("couldn't find any matching products"));
        assert!(validation.contains("trouble confirming product availability"));
        assert!(system.contains("technical issue"));
    }
}
