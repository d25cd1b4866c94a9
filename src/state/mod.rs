//! Visual state model
//!
//! The canonical snapshot of everything observably "on screen" at a
//! given recipe step: visible and absent ingredients, pan state, flame
//! level, lighting, and camera angle.

pub mod manager;

pub use manager::VisualStateManager;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::visuals::normalize_name;

/// State of a single visible ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub visible: bool,
    /// "frying", "chopped", "browning", ...
    pub preparation: Option<String>,
    pub quantity: Option<String>,
}

impl Ingredient {
    pub fn visible(name: impl Into<String>, preparation: Option<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            preparation,
            quantity: None,
        }
    }
}

/// Stove flame intensity, derived from the current action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlameLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for FlameLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{name}")
    }
}

/// Complete visual state at a specific step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub step_number: usize,
    pub visible_ingredients: Vec<Ingredient>,
    /// Names known to the recipe but not in the pan
    pub absent_ingredients: Vec<String>,
    /// Free text, e.g. "oil shimmering", "sauce thickening"
    pub pan_state: String,
    pub utensil: String,
    pub flame_level: FlameLevel,
    pub lighting: String,
    pub camera_angle: String,
}

impl VisualState {
    /// The initial state before any step: everything absent, clean pan
    pub fn initial(all_ingredients: &[String]) -> Self {
        Self {
            step_number: 0,
            visible_ingredients: Vec::new(),
            absent_ingredients: all_ingredients.iter().map(|n| normalize_name(n)).collect(),
            pan_state: "empty, clean pan".to_string(),
            utensil: "pan".to_string(),
            flame_level: FlameLevel::Medium,
            lighting: "natural".to_string(),
            camera_angle: "slightly top-down".to_string(),
        }
    }

    /// Names of currently visible ingredients
    pub fn visible_names(&self) -> Vec<&str> {
        self.visible_ingredients
            .iter()
            .filter(|ing| ing.visible)
            .map(|ing| ing.name.as_str())
            .collect()
    }

    /// Whether a name is currently visible (case-insensitive)
    pub fn is_visible(&self, name: &str) -> bool {
        let normalized = normalize_name(name);
        self.visible_ingredients
            .iter()
            .any(|ing| normalize_name(&ing.name) == normalized)
    }

    /// Prompt-facing ingredient list: "empty pan" when nothing is visible
    pub fn visible_description(&self) -> String {
        let names = self.visible_names();
        if names.is_empty() {
            "empty pan".to_string()
        } else {
            names.join(", ")
        }
    }

    /// The disjointness invariant: no name is both visible and absent
    pub fn names_disjoint(&self) -> bool {
        self.visible_ingredients.iter().all(|ing| {
            let name = normalize_name(&ing.name);
            !self
                .absent_ingredients
                .iter()
                .any(|absent| normalize_name(absent) == name)
        })
    }
}
