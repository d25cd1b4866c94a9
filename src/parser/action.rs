//! Structured step actions
//!
//! A [`StepAction`] is the parsed effect of one natural-language
//! cooking instruction. It is produced once per step and immutable
//! after creation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Classified cooking action for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Heat,
    Fry,
    Saute,
    Add,
    Simmer,
    Remove,
    Mix,
    Prepare,
    /// Default when no keyword matches
    Cook,
}

impl ActionType {
    /// Parse from the wire form used in refinement responses
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "heat" => Some(Self::Heat),
            "fry" => Some(Self::Fry),
            "saute" | "sauté" => Some(Self::Saute),
            "add" => Some(Self::Add),
            "simmer" => Some(Self::Simmer),
            "remove" => Some(Self::Remove),
            "mix" | "stir" => Some(Self::Mix),
            "prepare" | "chop" | "dice" => Some(Self::Prepare),
            "cook" => Some(Self::Cook),
            _ => None,
        }
    }

    /// Present-tense cooking state used by the prompt generator
    pub fn cooking_state(&self) -> &'static str {
        match self {
            Self::Heat => "heating",
            Self::Fry => "frying",
            Self::Saute => "sauteing",
            Self::Add => "mixing",
            Self::Simmer => "simmering",
            Self::Remove => "cooking",
            Self::Mix => "stirring",
            Self::Prepare => "cooking",
            Self::Cook => "cooking",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Heat => "heat",
            Self::Fry => "fry",
            Self::Saute => "saute",
            Self::Add => "add",
            Self::Simmer => "simmer",
            Self::Remove => "remove",
            Self::Mix => "mix",
            Self::Prepare => "prepare",
            Self::Cook => "cook",
        };
        write!(f, "{name}")
    }
}

/// Parsed action from a recipe step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepAction {
    pub step_number: usize,
    pub action_type: ActionType,
    pub ingredients_added: Vec<String>,
    pub ingredients_removed: Vec<String>,
    /// Per-ingredient visible-state overrides, e.g. {"onion": "browning"}
    pub visible_change: BTreeMap<String, String>,
    pub pan_state_text: Option<String>,
    /// Reliability of this parse, clamped to [0, 1] at construction
    pub confidence: f64,
    pub raw_text: String,
}

impl StepAction {
    /// Create a step action, clamping confidence into [0, 1]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        step_number: usize,
        action_type: ActionType,
        ingredients_added: Vec<String>,
        ingredients_removed: Vec<String>,
        visible_change: BTreeMap<String, String>,
        pan_state_text: Option<String>,
        confidence: f64,
        raw_text: String,
    ) -> Self {
        Self {
            step_number,
            action_type,
            ingredients_added,
            ingredients_removed,
            visible_change,
            pan_state_text,
            confidence: confidence.clamp(0.0, 1.0),
            raw_text,
        }
    }

    /// Whether the rule pass detected any ingredient mentions
    pub fn has_ingredients(&self) -> bool {
        !self.ingredients_added.is_empty() || !self.ingredients_removed.is_empty()
    }
}
