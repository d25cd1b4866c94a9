//! LLM-assisted parse refinement
//!
//! When the rule-based pass scores below the refinement threshold, one
//! completion request may sharpen the parse. Returned ingredient names
//! are validated against the vocabulary and any failure keeps the
//! rule-based result, so this path can improve confidence but never
//! fail the parse.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use super::action::{ActionType, StepAction};
use super::vocabulary::IngredientVocabulary;
use crate::completion::CompletionClient;
use crate::visuals::normalize_name;

/// Wire shape of a refinement response
#[derive(Debug, Deserialize)]
struct RefinedParse {
    action_type: Option<String>,
    #[serde(default)]
    ingredients_added: Vec<String>,
    #[serde(default)]
    ingredients_removed: Vec<String>,
    #[serde(default)]
    visible_change: BTreeMap<String, String>,
    pan_state: Option<String>,
    confidence: Option<f64>,
}

/// Build the single completion request for a low-confidence step
pub fn refinement_prompt(
    step_text: &str,
    vocabulary: &IngredientVocabulary,
    initial: &StepAction,
) -> String {
    let all_ingredients = vocabulary.names().collect::<Vec<_>>().join(", ");
    format!(
        r#"Parse this cooking step into structured information.

Recipe step: "{step_text}"
Available ingredients: {all_ingredients}

Initial parse:
- Action: {action}
- Ingredients added: {added}
- Ingredients removed: {removed}

Provide a more accurate parse as JSON only:
{{
    "action_type": "one of: heat, add, fry, saute, cook, simmer, remove, mix, prepare",
    "ingredients_added": ["ingredients being added to the pan"],
    "ingredients_removed": ["ingredients being removed from the pan"],
    "visible_change": {{"ingredient": "state change like 'browning' or 'softening'"}},
    "pan_state": "description of how the pan contents look",
    "confidence": 0.0
}}

Be very precise about which ingredients are actually being added vs just mentioned."#,
        action = initial.action_type,
        added = initial.ingredients_added.join(", "),
        removed = initial.ingredients_removed.join(", "),
    )
}

/// Refine a low-confidence parse with one completion call
///
/// Returns the refined action on success, or the initial action
/// unchanged on any request, parse, or validation failure. The refined
/// confidence never drops below the rule-based score.
pub async fn refine(
    client: &dyn CompletionClient,
    step_text: &str,
    vocabulary: &IngredientVocabulary,
    initial: StepAction,
) -> StepAction {
    let prompt = refinement_prompt(step_text, vocabulary, &initial);

    let raw = match client.complete(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(step = initial.step_number, "refinement request failed: {e}");
            return initial;
        }
    };

    let Some(parsed) = extract_json::<RefinedParse>(&raw) else {
        warn!(
            step = initial.step_number,
            "refinement returned no parseable JSON, keeping rule-based parse"
        );
        return initial;
    };

    let valid_added = validate_names(parsed.ingredients_added, vocabulary);
    let valid_removed = validate_names(parsed.ingredients_removed, vocabulary);
    let visible_change: BTreeMap<String, String> = parsed
        .visible_change
        .into_iter()
        .filter(|(name, _)| vocabulary.contains(name))
        .map(|(name, state)| (normalize_name(&name), state))
        .collect();

    let action_type = parsed
        .action_type
        .as_deref()
        .and_then(ActionType::from_keyword)
        .unwrap_or(initial.action_type);

    let confidence = parsed
        .confidence
        .unwrap_or(0.8)
        .max(initial.confidence);

    debug!(
        step = initial.step_number,
        %action_type,
        confidence,
        "refined low-confidence parse"
    );

    StepAction::new(
        initial.step_number,
        action_type,
        valid_added,
        valid_removed,
        visible_change,
        parsed.pan_state.or(initial.pan_state_text),
        confidence,
        initial.raw_text,
    )
}

/// Keep only names the vocabulary recognizes, normalized and deduplicated
fn validate_names(names: Vec<String>, vocabulary: &IngredientVocabulary) -> Vec<String> {
    let mut valid = Vec::new();
    for name in names {
        if !vocabulary.contains(&name) {
            continue;
        }
        let normalized = normalize_name(&name);
        if !valid.contains(&normalized) {
            valid.push(normalized);
        }
    }
    valid
}

/// Pull the first top-level JSON object out of a completion response
///
/// Models sometimes wrap the object in prose or code fences, so this
/// takes everything between the first `{` and the last `}`.
fn extract_json<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletionClient;

    fn vocab(names: &[&str]) -> IngredientVocabulary {
        IngredientVocabulary::new(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    fn low_confidence_action() -> StepAction {
        StepAction::new(
            3,
            ActionType::Cook,
            vec![],
            vec![],
            BTreeMap::new(),
            None,
            0.4,
            "a convoluted optional step".to_string(),
        )
    }

    #[tokio::test]
    async fn test_refine_applies_validated_response() {
        let client = MockCompletionClient::new();
        client
            .add_response(
                r#"Sure! {"action_type": "add", "ingredients_added": ["onion", "unicorn"],
                    "ingredients_removed": [], "confidence": 0.9}"#,
            )
            .await;
        let v = vocab(&["onion", "oil"]);

        let refined = refine(&client, "text", &v, low_confidence_action()).await;
        assert_eq!(refined.action_type, ActionType::Add);
        // Unknown names are dropped
        assert_eq!(refined.ingredients_added, vec!["onion"]);
        assert!((refined.confidence - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_refine_keeps_initial_on_malformed_json() {
        let client = MockCompletionClient::new();
        client.add_response("I could not parse that step, sorry.").await;
        let v = vocab(&["onion"]);

        let initial = low_confidence_action();
        let refined = refine(&client, "text", &v, initial.clone()).await;
        assert_eq!(refined, initial);
    }

    #[tokio::test]
    async fn test_refine_keeps_initial_on_request_error() {
        let client = MockCompletionClient::new();
        client.add_error("timeout").await;
        let v = vocab(&["onion"]);

        let initial = low_confidence_action();
        let refined = refine(&client, "text", &v, initial.clone()).await;
        assert_eq!(refined, initial);
    }

    #[tokio::test]
    async fn test_refinement_never_lowers_confidence() {
        let client = MockCompletionClient::new();
        client
            .add_response(r#"{"action_type": "add", "confidence": 0.1}"#)
            .await;
        let v = vocab(&["onion"]);

        let refined = refine(&client, "text", &v, low_confidence_action()).await;
        assert!((refined.confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_extract_json_from_fenced_response() {
        let raw = "```json\n{\"action_type\": \"fry\"}\n```";
        let parsed: RefinedParse = extract_json(raw).unwrap();
        assert_eq!(parsed.action_type.as_deref(), Some("fry"));
    }
}
