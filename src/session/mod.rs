//! Per-recipe session layer
//!
//! A [`RecipeSession`] owns the parser, the state manager, and the
//! prompt generator for one cooking session, and records every applied
//! step. The [`SessionRegistry`] hands out shared sessions keyed by
//! [`SessionId`] so concurrent callers for the same session see the
//! same cumulative state.

pub mod orchestrator;
pub mod registry;

pub use orchestrator::{RecipeSession, SessionSnapshot, StateSummary};
pub use registry::SessionRegistry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::parser::StepAction;
use crate::state::VisualState;

/// Unique identifier for a cooking session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a new random session ID
    pub fn new() -> Self {
        Self(format!("session-{}", Uuid::new_v4()))
    }

    /// Create from an existing string, e.g. a caller-supplied key
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Configuration for one recipe session
///
/// Thresholds are validated eagerly so a bad value surfaces at session
/// creation rather than silently skewing every later gate decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Display name of the recipe, used in negative prompts
    pub recipe_name: String,
    /// Full ingredient list for the recipe
    pub ingredients: Vec<String>,
    /// Below this parse confidence, prompts fall back to a conservative view
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
    /// Below this rule-based confidence, a completion client (if any) refines the parse
    #[serde(default = "default_threshold")]
    pub refine_threshold: f64,
}

fn default_threshold() -> f64 {
    0.7
}

impl SessionConfig {
    pub fn new(recipe_name: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            ingredients,
            confidence_threshold: default_threshold(),
            refine_threshold: default_threshold(),
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_refine_threshold(mut self, threshold: f64) -> Self {
        self.refine_threshold = threshold;
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.recipe_name.trim().is_empty() {
            return Err(EngineError::config("recipe_name must not be empty"));
        }
        for (label, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("refine_threshold", self.refine_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(EngineError::config(format!(
                    "{label} must be within [0.0, 1.0], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// One applied step, kept for summaries and snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Caller-supplied step index
    pub step_index: usize,
    /// The raw instruction text
    pub description: String,
    /// The parsed action that was applied
    pub action: StepAction,
    /// The visual state after applying the action
    pub visual_state: VisualState,
    /// When the step was applied
    pub applied_at: DateTime<Utc>,
}
