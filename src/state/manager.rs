//! Visual state transitions
//!
//! Applies parsed step actions to the current [`VisualState`] and
//! keeps the append-only history. Each transition depends only on the
//! immediately preceding stored state, so per-step cost is independent
//! of recipe length.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{FlameLevel, Ingredient, VisualState};
use crate::parser::{ActionType, StepAction};
use crate::visuals::normalize_name;

/// Manages the visual state throughout a recipe
#[derive(Debug, Clone)]
pub struct VisualStateManager {
    all_ingredients: HashSet<String>,
    current_state: VisualState,
    state_history: Vec<VisualState>,
    actions_history: Vec<StepAction>,
}

impl VisualStateManager {
    /// Create a manager with everything absent and a clean pan
    pub fn new(all_ingredients: &[String]) -> Self {
        Self {
            all_ingredients: all_ingredients.iter().map(|n| normalize_name(n)).collect(),
            current_state: VisualState::initial(all_ingredients),
            state_history: Vec::new(),
            actions_history: Vec::new(),
        }
    }

    /// Rebuild a manager from a persisted snapshot's parts
    pub fn from_parts(
        all_ingredients: &[String],
        current_state: VisualState,
        state_history: Vec<VisualState>,
        actions_history: Vec<StepAction>,
    ) -> Self {
        Self {
            all_ingredients: all_ingredients.iter().map(|n| normalize_name(n)).collect(),
            current_state,
            state_history,
            actions_history,
        }
    }

    /// Apply a step action, producing and storing the next state
    pub fn apply_action(&mut self, action: &StepAction) -> VisualState {
        self.state_history.push(self.current_state.clone());
        self.actions_history.push(action.clone());

        let mut visible = self.current_state.visible_ingredients.clone();
        let mut absent = self.current_state.absent_ingredients.clone();

        for name in &action.ingredients_removed {
            let normalized = normalize_name(name);
            visible.retain(|ing| normalize_name(&ing.name) != normalized);
            if self.all_ingredients.contains(&normalized) && !absent.contains(&normalized) {
                absent.push(normalized);
            }
        }

        for name in &action.ingredients_added {
            let normalized = normalize_name(name);
            absent.retain(|a| *a != normalized);
            if !visible
                .iter()
                .any(|ing| normalize_name(&ing.name) == normalized)
            {
                // An explicit visible_change override beats the
                // preparation inferred from the action type
                let preparation = action
                    .visible_change
                    .get(&normalized)
                    .cloned()
                    .or_else(|| inferred_preparation(action.action_type));
                visible.push(Ingredient::visible(normalized, preparation));
            }
        }

        for ing in &mut visible {
            if let Some(change) = action.visible_change.get(&normalize_name(&ing.name)) {
                ing.preparation = Some(change.clone());
            }
        }

        let pan_state = action
            .pan_state_text
            .clone()
            .unwrap_or_else(|| self.current_state.pan_state.clone());

        self.current_state = VisualState {
            step_number: action.step_number,
            visible_ingredients: visible,
            absent_ingredients: absent,
            pan_state,
            utensil: self.current_state.utensil.clone(),
            flame_level: flame_for(action.action_type),
            lighting: self.current_state.lighting.clone(),
            camera_angle: self.current_state.camera_angle.clone(),
        };

        if !self.current_state.names_disjoint() {
            warn!(
                step = action.step_number,
                "visible/absent sets overlapped after transition, re-deriving absent set"
            );
            let visible_names: HashSet<String> = self
                .current_state
                .visible_ingredients
                .iter()
                .map(|ing| normalize_name(&ing.name))
                .collect();
            self.current_state
                .absent_ingredients
                .retain(|name| !visible_names.contains(&normalize_name(name)));
        }
        debug_assert!(self.current_state.names_disjoint());

        debug!(
            step = action.step_number,
            visible = self.current_state.visible_ingredients.len(),
            absent = self.current_state.absent_ingredients.len(),
            "applied step action"
        );

        self.current_state.clone()
    }

    /// The historical snapshot recorded at a step, if any
    pub fn state_at_step(&self, step_number: usize) -> Option<&VisualState> {
        if self.current_state.step_number == step_number && !self.state_history.is_empty() {
            return Some(&self.current_state);
        }
        self.state_history
            .iter()
            .find(|s| s.step_number == step_number)
    }

    /// Rewind to a recorded step. Unknown step numbers are a no-op.
    pub fn reset_to_step(&mut self, step_number: usize) {
        let Some(snapshot) = self.state_at_step(step_number).cloned() else {
            return;
        };
        self.current_state = snapshot;
        self.state_history.retain(|s| s.step_number <= step_number);
        self.actions_history.retain(|a| a.step_number <= step_number);
    }

    pub fn current_state(&self) -> &VisualState {
        &self.current_state
    }

    pub fn state_history(&self) -> &[VisualState] {
        &self.state_history
    }

    pub fn actions_history(&self) -> &[StepAction] {
        &self.actions_history
    }

    /// Last applied action, if any step has been processed
    pub fn last_action(&self) -> Option<&StepAction> {
        self.actions_history.last()
    }
}

/// Flame level reflects the current action, not history
fn flame_for(action_type: ActionType) -> FlameLevel {
    match action_type {
        ActionType::Fry | ActionType::Saute => FlameLevel::High,
        ActionType::Simmer => FlameLevel::Low,
        _ => FlameLevel::Medium,
    }
}

/// Preparation implied by the action when no explicit override exists
fn inferred_preparation(action_type: ActionType) -> Option<String> {
    match action_type {
        ActionType::Prepare => Some("chopped".to_string()),
        ActionType::Fry | ActionType::Saute => Some("frying".to_string()),
        _ => None,
    }
}
