//! Session orchestration
//!
//! Ties the parser, state manager, and prompt generator together for
//! one recipe session. Steps are parsed and applied in order, every
//! applied step is recorded, and prompt generation reads the current
//! cumulative state without mutating it.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{SessionConfig, StepRecord};
use crate::completion::SharedCompletion;
use crate::error::Result;
use crate::parser::{StepAction, StepParser};
use crate::prompt::{GeneratedPrompt, PromptGenerator};
use crate::state::{VisualState, VisualStateManager};

/// One cooking session for one recipe
pub struct RecipeSession {
    config: SessionConfig,
    parser: StepParser,
    generator: PromptGenerator,
    manager: Option<VisualStateManager>,
    records: Vec<StepRecord>,
}

impl RecipeSession {
    /// Create a fresh session, validating the configuration
    pub fn new(config: SessionConfig, completion: SharedCompletion) -> Result<Self> {
        config.validate()?;
        let parser = StepParser::new(
            &config.ingredients,
            completion.clone(),
            config.refine_threshold,
        );
        let generator = PromptGenerator::new(
            config.recipe_name.clone(),
            config.confidence_threshold,
            completion,
        );
        Ok(Self {
            config,
            parser,
            generator,
            manager: None,
            records: Vec::new(),
        })
    }

    /// Parse and apply one step, returning the resulting visual state
    ///
    /// Never fails: an unrecognized instruction degrades to a
    /// low-confidence generic action rather than an error. An index
    /// that does not advance past the previous step is applied anyway
    /// and logged, since callers may legitimately re-send a step.
    pub async fn add_step(&mut self, step_index: usize, text: &str) -> VisualState {
        if let Some(last) = self.records.last() {
            if step_index <= last.step_index {
                warn!(
                    step = step_index,
                    previous = last.step_index,
                    "step index does not advance, applying anyway"
                );
            }
        }

        let action = self.parser.parse_step(text, step_index).await;
        let manager = self
            .manager
            .get_or_insert_with(|| VisualStateManager::new(&self.config.ingredients));
        let state = manager.apply_action(&action);

        debug!(
            step = step_index,
            visible = %state.visible_description(),
            absent = state.absent_ingredients.len(),
            confidence = action.confidence,
            "step applied"
        );

        self.records.push(StepRecord {
            step_index,
            description: text.to_string(),
            action,
            visual_state: state.clone(),
            applied_at: Utc::now(),
        });
        state
    }

    /// Generate the image prompt for the current cumulative state
    ///
    /// Before any step has been applied this produces the conservative
    /// early-preparation prompt. The confidence gated on is the last
    /// applied step's, since the prompt depicts that step's outcome.
    pub async fn cumulative_prompt(&self, step_text: &str) -> GeneratedPrompt {
        let state = self.manager.as_ref().map(|m| m.current_state());
        let last_action = self.last_action();
        let confidence = last_action.map_or(0.0, |a| a.confidence);
        let action_type = last_action.map(|a| a.action_type);
        self.generator
            .generate(state, action_type, step_text, confidence)
            .await
    }

    /// Read-only summary of the session so far
    pub fn state_summary(&self) -> StateSummary {
        let current = self.manager.as_ref().map(|m| m.current_state().clone());
        let (visible, absent) = current
            .as_ref()
            .map(|s| {
                (
                    s.visible_names().iter().map(|n| n.to_string()).collect(),
                    s.absent_ingredients.clone(),
                )
            })
            .unwrap_or_default();
        StateSummary {
            recipe_name: self.config.recipe_name.clone(),
            steps_completed: self.records.len(),
            visible_ingredients: visible,
            absent_ingredients: absent,
            average_confidence: self.average_confidence(),
            current_visual_state: current,
            step_history: self.records.clone(),
        }
    }

    /// Mean confidence over applied steps, 0.0 before the first step
    pub fn average_confidence(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: f64 = self.records.iter().map(|r| r.action.confidence).sum();
        total / self.records.len() as f64
    }

    /// Discard all applied steps, returning to the pre-first-step state
    pub fn reset(&mut self) {
        self.manager = None;
        self.records.clear();
    }

    pub fn recipe_name(&self) -> &str {
        &self.config.recipe_name
    }

    pub fn steps_completed(&self) -> usize {
        self.records.len()
    }

    pub fn current_state(&self) -> Option<&VisualState> {
        self.manager.as_ref().map(|m| m.current_state())
    }

    fn last_action(&self) -> Option<&StepAction> {
        self.manager.as_ref().and_then(|m| m.last_action())
    }

    /// Capture everything needed to rebuild this session later
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            config: self.config.clone(),
            current_state: self.manager.as_ref().map(|m| m.current_state().clone()),
            state_history: self
                .manager
                .as_ref()
                .map(|m| m.state_history().to_vec())
                .unwrap_or_default(),
            actions_history: self
                .manager
                .as_ref()
                .map(|m| m.actions_history().to_vec())
                .unwrap_or_default(),
            records: self.records.clone(),
        }
    }

    /// Rebuild a session from a snapshot
    ///
    /// The completion client is supplied fresh since it is not
    /// serializable.
    pub fn restore(snapshot: SessionSnapshot, completion: SharedCompletion) -> Result<Self> {
        let mut session = Self::new(snapshot.config, completion)?;
        if let Some(current) = snapshot.current_state {
            session.manager = Some(VisualStateManager::from_parts(
                &session.config.ingredients,
                current,
                snapshot.state_history,
                snapshot.actions_history,
            ));
        }
        session.records = snapshot.records;
        Ok(session)
    }
}

/// Serializable point-in-time capture of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub config: SessionConfig,
    pub current_state: Option<VisualState>,
    pub state_history: Vec<VisualState>,
    pub actions_history: Vec<StepAction>,
    pub records: Vec<StepRecord>,
}

/// Read-only view of a session's progress
#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub recipe_name: String,
    pub steps_completed: usize,
    pub visible_ingredients: Vec<String>,
    pub absent_ingredients: Vec<String>,
    pub average_confidence: f64,
    pub current_visual_state: Option<VisualState>,
    pub step_history: Vec<StepRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(ingredients: &[&str]) -> RecipeSession {
        let config = SessionConfig::new(
            "Paneer Butter Masala",
            ingredients.iter().map(|s| s.to_string()).collect(),
        );
        RecipeSession::new(config, None).unwrap()
    }

    #[tokio::test]
    async fn test_new_session_has_no_state() {
        let session = session(&["oil", "onion"]);
        assert!(session.current_state().is_none());
        assert_eq!(session.steps_completed(), 0);
        assert_eq!(session.average_confidence(), 0.0);
    }

    #[tokio::test]
    async fn test_add_step_applies_and_records() {
        let mut session = session(&["oil", "onion"]);
        let state = session.add_step(1, "Heat oil in a pan").await;
        assert!(state.is_visible("oil"));
        assert_eq!(session.steps_completed(), 1);
        assert!(session.average_confidence() > 0.0);
    }

    #[tokio::test]
    async fn test_steps_accumulate() {
        let mut session = session(&["oil", "onion", "paneer"]);
        session.add_step(1, "Heat oil in a pan").await;
        let state = session.add_step(2, "Add chopped onions and saute").await;
        assert!(state.is_visible("oil"));
        assert!(state.is_visible("onion"));
        assert!(state.absent_ingredients.contains(&"paneer".to_string()));
    }

    #[tokio::test]
    async fn test_out_of_order_step_still_applies() {
        let mut session = session(&["oil", "onion"]);
        session.add_step(2, "Heat oil in a pan").await;
        let state = session.add_step(1, "Add onions").await;
        assert!(state.is_visible("onion"));
        assert_eq!(session.steps_completed(), 2);
    }

    #[tokio::test]
    async fn test_prompt_before_first_step_is_conservative() {
        let session = session(&["oil", "onion"]);
        let prompt = session.cumulative_prompt("Heat oil in a pan").await;
        assert!(prompt.metadata.fallback);
        assert!(prompt.positive.contains("early cooking preparation"));
    }

    #[tokio::test]
    async fn test_prompt_reads_without_mutating() {
        let mut session = session(&["oil", "onion"]);
        session.add_step(1, "Heat oil in a pan").await;
        let first = session.cumulative_prompt("Heat oil in a pan").await;
        let second = session.cumulative_prompt("Heat oil in a pan").await;
        assert_eq!(first.positive, second.positive);
        assert_eq!(first.negative, second.negative);
        assert_eq!(session.steps_completed(), 1);
    }

    #[tokio::test]
    async fn test_reset_returns_to_fresh_state() {
        let mut session = session(&["oil", "onion"]);
        session.add_step(1, "Heat oil in a pan").await;
        session.reset();
        assert!(session.current_state().is_none());
        assert_eq!(session.steps_completed(), 0);
        let prompt = session.cumulative_prompt("anything").await;
        assert!(prompt.metadata.fallback);
    }

    #[tokio::test]
    async fn test_summary_reflects_progress() {
        let mut session = session(&["oil", "onion"]);
        session.add_step(1, "Heat oil in a pan").await;
        let summary = session.state_summary();
        assert_eq!(summary.recipe_name, "Paneer Butter Masala");
        assert_eq!(summary.steps_completed, 1);
        assert!(summary.visible_ingredients.contains(&"oil".to_string()));
        assert!(summary.absent_ingredients.contains(&"onion".to_string()));
        assert_eq!(summary.step_history.len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_restore_round_trip() {
        let mut session = session(&["oil", "onion", "paneer"]);
        session.add_step(1, "Heat oil in a pan").await;
        session.add_step(2, "Add chopped onions and saute").await;

        let json = serde_json::to_string(&session.snapshot()).unwrap();
        let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();
        let restored = RecipeSession::restore(snapshot, None).unwrap();

        assert_eq!(restored.steps_completed(), 2);
        assert_eq!(
            restored.current_state().unwrap(),
            session.current_state().unwrap()
        );
        let original = session.cumulative_prompt("next step").await;
        let rebuilt = restored.cumulative_prompt("next step").await;
        assert_eq!(original.positive, rebuilt.positive);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = SessionConfig::new("", vec![]);
        assert!(RecipeSession::new(config, None).is_err());
    }
}
