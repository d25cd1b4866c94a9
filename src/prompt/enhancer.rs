//! Visual description enhancement
//!
//! Turns ingredient names and an action-derived cooking state into the
//! sensory description the positive prompt is built from. The
//! rule-based concatenation is the path of record; an optional
//! completion call can replace it with richer prose but is never a
//! dependency for correctness.

use std::collections::BTreeMap;

use tracing::warn;

use crate::completion::CompletionClient;
use crate::visuals;

/// Rule-based sensory description from the lookup tables
///
/// Ingredients missing from the tables degrade to their bare name.
pub fn describe(
    ingredients: &[&str],
    cooking_state: &str,
    preparations: &BTreeMap<String, String>,
) -> String {
    let mut visual_ingredients = Vec::with_capacity(ingredients.len());
    for ingredient in ingredients {
        let mut base = visuals::ingredient_visual(ingredient)
            .map(str::to_string)
            .unwrap_or_else(|| (*ingredient).to_string());
        if let Some(preparation) = preparations.get(&visuals::normalize_name(ingredient)) {
            if let Some(phrase) = visuals::preparation_visual(preparation) {
                base = format!("{base} ({phrase})");
            }
        }
        visual_ingredients.push(base);
    }

    let state_visual = visuals::cooking_state_visual(cooking_state);

    if visual_ingredients.is_empty() {
        if cooking_state.contains("heat") || cooking_state.contains("oil") {
            return "Thin shimmering layer of oil coating the cooking surface, \
                    reflecting overhead light with gentle ripples from heat. \
                    Slight heat haze visible rising from the surface. \
                    Clean metallic cooking vessel on stove."
                .to_string();
        }
        return format!(
            "Cooking vessel {state_visual}. \
             Clean metallic surface reflecting overhead light. \
             Kitchen stove setting ready for cooking."
        );
    }

    format!(
        "{} - {state_visual}. \
         Close-up view showing texture and details. \
         Natural kitchen lighting highlighting the ingredients. \
         Steam and heat visible where appropriate.",
        visual_ingredients.join(", ")
    )
}

/// Build the enrichment request for richer sensory prose
pub fn enrichment_prompt(ingredients: &[&str], cooking_state: &str, step_text: &str) -> String {
    let listed = if ingredients.is_empty() {
        "none yet".to_string()
    } else {
        ingredients.join(", ")
    };
    format!(
        r#"Convert this cooking step into a VISUAL description for image generation.

Step: {step_text}
Ingredients visible: {listed}
Cooking state: {cooking_state}

Describe what this scene LOOKS like, not what is being done. Focus on
colors, textures, reflections, physical state, and light.

Bad example: "Heat oil in pan"
Good example: "Thin layer of oil coating the pan surface, shimmering with heat, creating small ripples and light reflections"

Write ONLY the visual description, 2-4 sentences, specific and sensory."#
    )
}

/// Enrich the description with one completion call
///
/// Any failure falls back to the deterministic [`describe`] output.
pub async fn enhance(
    client: &dyn CompletionClient,
    ingredients: &[&str],
    cooking_state: &str,
    step_text: &str,
    preparations: &BTreeMap<String, String>,
) -> String {
    let prompt = enrichment_prompt(ingredients, cooking_state, step_text);
    match client.complete(&prompt).await {
        Ok(description) if !description.trim().is_empty() => description.trim().to_string(),
        Ok(_) => {
            warn!("enrichment returned empty text, using rule-based description");
            describe(ingredients, cooking_state, preparations)
        }
        Err(e) => {
            warn!("enrichment failed: {e}, using rule-based description");
            describe(ingredients, cooking_state, preparations)
        }
    }
}
