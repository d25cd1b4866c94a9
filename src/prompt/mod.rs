//! Visual prompt generation
//!
//! Turns a [`VisualState`] and the most recent parse confidence into a
//! positive/negative prompt pair. Low-confidence state falls back to a
//! conservative generic rendering so a bad parse never compounds into
//! a bad image.

pub mod enhancer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::completion::SharedCompletion;
use crate::parser::ActionType;
use crate::state::VisualState;
use crate::visuals;

/// Default confidence below which the conservative prompt is used
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Metadata describing how a prompt was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub confidence: f64,
    pub step_number: usize,
    pub visible_count: usize,
    pub absent_count: usize,
    pub fallback: bool,
}

/// A generated positive/negative prompt pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPrompt {
    pub positive: String,
    pub negative: String,
    pub style_suffix: String,
    pub metadata: PromptMetadata,
}

impl GeneratedPrompt {
    /// Render as a single string for APIs without a separate
    /// negative-prompt field
    pub fn combined(&self) -> String {
        let mut combined = format!(
            "{}\n\nSTRICT REQUIREMENTS - MUST NOT SHOW:\n{}\n\n{}",
            self.positive, self.negative, self.style_suffix
        );
        if self.metadata.fallback {
            combined = format!("[Low confidence - showing conservative view]\n\n{combined}");
        }
        combined
    }
}

/// Generates image prompts from visual state with negative prompting
pub struct PromptGenerator {
    recipe_name: String,
    confidence_threshold: f64,
    completion: SharedCompletion,
}

impl PromptGenerator {
    pub fn new(
        recipe_name: impl Into<String>,
        confidence_threshold: f64,
        completion: SharedCompletion,
    ) -> Self {
        Self {
            recipe_name: recipe_name.into(),
            confidence_threshold,
            completion,
        }
    }

    /// Generate a prompt pair for the current state
    ///
    /// `state` is `None` before the first step; that always takes the
    /// conservative path. `last_action` is the most recent step's
    /// classified action, used to phrase the cooking state. Both
    /// returned prompts are non-empty for any valid input.
    pub async fn generate(
        &self,
        state: Option<&VisualState>,
        last_action: Option<ActionType>,
        step_text: &str,
        confidence: f64,
    ) -> GeneratedPrompt {
        let Some(state) = state else {
            return self.conservative(None, confidence);
        };
        if confidence < self.confidence_threshold {
            return self.conservative(Some(state), confidence);
        }

        let visible = state.visible_names();
        let preparations: BTreeMap<String, String> = state
            .visible_ingredients
            .iter()
            .filter_map(|ing| {
                ing.preparation
                    .as_ref()
                    .map(|p| (visuals::normalize_name(&ing.name), p.clone()))
            })
            .collect();
        let cooking_state = last_action.map_or("cooking", |a| a.cooking_state());

        let description = match &self.completion {
            Some(client) => {
                enhancer::enhance(
                    client.as_ref(),
                    &visible,
                    cooking_state,
                    step_text,
                    &preparations,
                )
                .await
            }
            None => enhancer::describe(&visible, cooking_state, &preparations),
        };

        let positive = format!(
            "Professional food photography: {description} \
             Shown in a {utensil}, contents: {contents}, pan state: {pan_state}. \
             Gas flame {flame}. Natural lighting, slightly top-down angle. \
             Realistic, in-progress cooking, NOT a finished plated dish.",
            utensil = state.utensil,
            contents = state.visible_description(),
            pan_state = state.pan_state,
            flame = state.flame_level,
        );

        let negative = self.negative_prompt(&state.absent_ingredients);

        GeneratedPrompt {
            positive,
            negative,
            style_suffix: style_suffix(),
            metadata: PromptMetadata {
                confidence,
                step_number: state.step_number,
                visible_count: visible.len(),
                absent_count: state.absent_ingredients.len(),
                fallback: false,
            },
        }
    }

    /// Conservative fallback: generic early-preparation scene, no
    /// specific ingredients named
    fn conservative(&self, state: Option<&VisualState>, confidence: f64) -> GeneratedPrompt {
        let positive = "Professional food photography of early cooking preparation stage. \
                        Clean cooking setup with basic cooking equipment. \
                        Natural lighting, slightly overhead angle. \
                        Realistic cooking scene, NOT finished dish. \
                        Warm, inviting kitchen atmosphere."
            .to_string();

        let negative = format!(
            "Do not show {recipe} finished. \
             No completed dishes, no plating, no garnishing. \
             No specific food ingredients. \
             No text, labels, or watermarks.",
            recipe = self.recipe_name
        );

        GeneratedPrompt {
            positive,
            negative,
            style_suffix: style_suffix(),
            metadata: PromptMetadata {
                confidence,
                step_number: state.map_or(0, |s| s.step_number),
                visible_count: state.map_or(0, |s| s.visible_names().len()),
                absent_count: state.map_or(0, |s| s.absent_ingredients.len()),
                fallback: true,
            },
        }
    }

    /// Negative prompt from the absent set and the fixed forbidden block
    ///
    /// Cooking media (oil, ghee, butter, water) are always exempt: they
    /// are typically already rendered from an earlier step and
    /// suppressing them visually contradicts the scene.
    fn negative_prompt(&self, absent: &[String]) -> String {
        let mut negatives: Vec<String> = Vec::new();
        for ingredient in absent {
            if visuals::is_cooking_medium(ingredient) {
                continue;
            }
            negatives.push(ingredient.clone());
            negatives.push(format!("visible {ingredient}"));
        }

        negatives.extend([
            format!("completed {}", self.recipe_name),
            format!("finished {}", self.recipe_name),
            format!("plated {}", self.recipe_name),
            format!("garnished {}", self.recipe_name),
            "final plated dish".to_string(),
            "serving presentation".to_string(),
            "restaurant plating".to_string(),
            "garnishing".to_string(),
            "fresh herbs on top".to_string(),
        ]);

        format!("Do not show: {}. No text or labels.", negatives.join(", "))
    }
}

/// Fixed style directive appended to every prompt
fn style_suffix() -> String {
    "REQUIREMENTS: HORIZONTAL landscape format (1024x680), \
     professional food photography quality, \
     ABSOLUTELY NO TEXT or watermarks"
        .to_string()
}
