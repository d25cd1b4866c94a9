//! Step action parser
//!
//! Converts one step's free text into a structured [`StepAction`] with
//! a reliability score. The rule-based pass always runs first and is
//! the fallback of record; an optional completion client may refine
//! low-confidence parses. `parse_step` never fails to return a value.

pub mod action;
pub mod refine;
pub mod rules;
pub mod vocabulary;

pub use action::{ActionType, StepAction};
pub use vocabulary::IngredientVocabulary;

use tracing::debug;

use crate::completion::SharedCompletion;

/// Default confidence below which the refinement call is attempted
pub const DEFAULT_REFINE_THRESHOLD: f64 = 0.7;

/// Parses recipe steps into structured actions
pub struct StepParser {
    vocabulary: IngredientVocabulary,
    completion: SharedCompletion,
    refine_threshold: f64,
}

impl StepParser {
    /// Create a parser over a recipe's ingredient vocabulary
    ///
    /// Passing `None` for the completion client disables refinement
    /// entirely; the decision is made here, once, not per call.
    pub fn new(
        ingredients: &[String],
        completion: SharedCompletion,
        refine_threshold: f64,
    ) -> Self {
        Self {
            vocabulary: IngredientVocabulary::new(ingredients),
            completion,
            refine_threshold,
        }
    }

    /// Parse a step into a structured action. Never fails.
    pub async fn parse_step(&self, step_text: &str, step_number: usize) -> StepAction {
        let action = self.rule_based_parse(step_text, step_number);
        debug!(
            step = step_number,
            action = %action.action_type,
            confidence = action.confidence,
            "rule-based parse"
        );

        if action.confidence >= self.refine_threshold {
            return action;
        }
        match &self.completion {
            Some(client) => {
                refine::refine(client.as_ref(), step_text, &self.vocabulary, action).await
            }
            None => action,
        }
    }

    /// The deterministic first pass
    fn rule_based_parse(&self, step_text: &str, step_number: usize) -> StepAction {
        let action_type = rules::classify_action(step_text);
        let (added, removed) = rules::classify_mentions(step_text, &self.vocabulary);
        let visible_change = rules::detect_visible_changes(step_text, &added);
        let pan_state = rules::detect_pan_state(step_text);
        let confidence = rules::score_confidence(
            step_text,
            action_type,
            !added.is_empty() || !removed.is_empty(),
        );

        StepAction::new(
            step_number,
            action_type,
            added,
            removed,
            visible_change,
            pan_state,
            confidence,
            step_text.to_string(),
        )
    }

    pub fn vocabulary(&self) -> &IngredientVocabulary {
        &self.vocabulary
    }
}
