//! Rule-based step parsing
//!
//! The deterministic first pass over a step's text: action keyword
//! classification, per-mention add/remove detection, visible-state
//! indicators, pan-state heuristics, and the confidence score. This
//! pass always produces a result and is the fallback of record for the
//! optional refinement path.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::action::ActionType;
use super::vocabulary::IngredientVocabulary;

/// Action keyword table, first match wins
const ACTION_KEYWORDS: &[(ActionType, &[&str])] = &[
    (ActionType::Heat, &["heat", "warm"]),
    (
        ActionType::Fry,
        &["fry", "deep fry", "shallow fry", "pan fry"],
    ),
    (ActionType::Saute, &["saute", "sauté", "toss", "stir fry"]),
    (
        ActionType::Add,
        &["add", "put", "place", "throw", "pour", "sprinkle"],
    ),
    (ActionType::Simmer, &["simmer", "boil", "reduce"]),
    (
        ActionType::Remove,
        &["remove", "take out", "drain", "strain", "discard"],
    ),
    (ActionType::Mix, &["mix", "stir", "combine", "blend", "whisk"]),
    (
        ActionType::Prepare,
        &["chop", "dice", "slice", "mince", "grate", "crush"],
    ),
];

/// Visible-state indicator words, first match wins per ingredient
const STATE_INDICATORS: &[(&str, &[&str])] = &[
    ("browning", &["brown", "golden", "caramelized"]),
    ("softening", &["soft", "tender", "translucent"]),
    ("thickening", &["thick", "reduced", "coating"]),
    ("bubbling", &["boiling", "simmering", "bubbling"]),
    ("melting", &["melted", "melting"]),
];

/// Verbs that introduce an ingredient into the pan when they precede it
const ADD_VERBS: &[&str] = &[
    "add", "put", "pour", "place", "throw", "sprinkle", "mix", "stir", "heat", "warm", "tip",
];

/// Verbs that take an ingredient out of the pan when they precede it
const REMOVE_VERBS: &[&str] = &["remove", "take", "drain", "strain", "discard"];

/// Filler words allowed between a verb and the ingredient it governs
const FILLER_WORDS: &[&str] = &["the", "in", "out", "a", "an", "some", "your"];

static PAN_STATE_HEURISTICS: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    let compile = |patterns: &[&str]| {
        patterns
            .iter()
            .map(|p| Regex::new(p).expect("static pan-state pattern"))
            .collect::<Vec<_>>()
    };
    vec![
        (
            "oil shimmering",
            compile(&["oil.*hot", "oil.*shimmer", "heat.*oil"]),
        ),
        ("ingredients browning", compile(&["brown", "golden", "carameliz"])),
        ("sauce thickening", compile(&["thick", "reduce", "coating"])),
        (
            "mixture simmering",
            compile(&["simmer", "bubbl", "gentle boil"]),
        ),
        (
            "dry roasting",
            compile(&["dry roast", "no oil", "without oil"]),
        ),
    ]
});

/// Compiled word-boundary patterns for the action keywords, tolerating
/// common verb suffixes ("heats", "heated", "heating")
static ACTION_PATTERNS: Lazy<Vec<(ActionType, Vec<Regex>)>> = Lazy::new(|| {
    ACTION_KEYWORDS
        .iter()
        .map(|(action, keywords)| {
            let patterns = keywords
                .iter()
                .map(|kw| {
                    let pattern = format!(r"(?i)\b{}(?:e?[sd]|ing)?\b", regex::escape(kw));
                    Regex::new(&pattern).expect("static action pattern")
                })
                .collect();
            (*action, patterns)
        })
        .collect()
});

static HEDGE_OR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bor\b").expect("static hedge pattern"));

/// Confidence formula weights. Heuristic starting points, not a contract.
pub(crate) const BASE_CONFIDENCE: f64 = 0.5;
pub(crate) const NON_DEFAULT_ACTION_BONUS: f64 = 0.2;
pub(crate) const INGREDIENTS_DETECTED_BONUS: f64 = 0.2;
pub(crate) const SHORT_TEXT_BONUS: f64 = 0.1;
pub(crate) const HEDGING_PENALTY: f64 = 0.2;
const SHORT_TEXT_WORDS: usize = 20;

/// Classify the step's dominant action from its keywords
///
/// Keywords match at word boundaries, so "wheat" never reads as "heat".
pub fn classify_action(text: &str) -> ActionType {
    for (action, patterns) in ACTION_PATTERNS.iter() {
        if patterns.iter().any(|re| re.is_match(text)) {
            return *action;
        }
    }
    ActionType::Cook
}

/// How a mentioned ingredient participates in the step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionRole {
    Added,
    Removed,
    /// Mentioned in passing, no state change
    Mentioned,
}

/// Split the step's mentions into added and removed names
///
/// A mention counts as removed when a removal verb governs it, and as
/// added when an addition verb precedes it or a list pattern ("X and",
/// "X,") follows it. A bare mention with neither changes nothing, which
/// keeps narrative references ("until the onion is soft") from
/// re-adding ingredients.
pub fn classify_mentions(
    text: &str,
    vocabulary: &IngredientVocabulary,
) -> (Vec<String>, Vec<String>) {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    for name in vocabulary.find_mentions(text) {
        match mention_role(text, &name) {
            MentionRole::Added if !added.contains(&name) => added.push(name),
            MentionRole::Removed if !removed.contains(&name) => removed.push(name),
            _ => {}
        }
    }
    (added, removed)
}

/// Decide the role of one ingredient's first mention in the text
fn mention_role(text: &str, name: &str) -> MentionRole {
    let pattern = format!(r"(?i)\b{}(?:e?s)?\b", regex::escape(name));
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return MentionRole::Mentioned,
    };
    let lower = text.to_lowercase();
    for m in re.find_iter(&lower) {
        // Up to three words immediately before the mention
        let preceding: Vec<&str> = lower[..m.start()]
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .rev()
            .take(3)
            .collect();
        let governing = preceding
            .iter()
            .find(|w| !FILLER_WORDS.contains(w))
            .copied();
        if let Some(verb) = governing {
            if REMOVE_VERBS.contains(&verb) {
                return MentionRole::Removed;
            }
            if ADD_VERBS.contains(&verb) {
                return MentionRole::Added;
            }
        }
        // List patterns after the mention: "onion and ...", "onion, ...".
        // The list inherits the step's governing verb.
        let tail = lower[m.end()..].trim_start();
        if tail.starts_with(',') || tail.starts_with("and ") {
            let words: Vec<&str> = lower
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .collect();
            if words.iter().any(|w| ADD_VERBS.contains(w)) {
                return MentionRole::Added;
            }
            if words.iter().any(|w| REMOVE_VERBS.contains(w)) {
                return MentionRole::Removed;
            }
        }
    }
    MentionRole::Mentioned
}

/// Map state indicator words onto the ingredients added this step
pub fn detect_visible_changes(text: &str, added: &[String]) -> BTreeMap<String, String> {
    let lower = text.to_lowercase();
    let mut changes = BTreeMap::new();
    for ingredient in added {
        for (state, indicators) in STATE_INDICATORS {
            if indicators.iter().any(|word| lower.contains(word)) {
                changes.insert(ingredient.clone(), (*state).to_string());
                break;
            }
        }
    }
    changes
}

/// Detect a free-text pan state from the step's wording
pub fn detect_pan_state(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    for (state, patterns) in PAN_STATE_HEURISTICS.iter() {
        if patterns.iter().any(|re| re.is_match(&lower)) {
            return Some((*state).to_string());
        }
    }
    None
}

/// Score the reliability of a rule-based parse
pub fn score_confidence(text: &str, action_type: ActionType, has_ingredients: bool) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if action_type != ActionType::Cook {
        confidence += NON_DEFAULT_ACTION_BONUS;
    }
    if has_ingredients {
        confidence += INGREDIENTS_DETECTED_BONUS;
    }
    if text.split_whitespace().count() < SHORT_TEXT_WORDS {
        confidence += SHORT_TEXT_BONUS;
    }
    let lower = text.to_lowercase();
    if HEDGE_OR.is_match(&lower) || lower.contains("optional") {
        confidence -= HEDGING_PENALTY;
    }
    confidence.clamp(0.0, 1.0)
}
