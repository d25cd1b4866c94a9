//! Ingredient vocabulary matching
//!
//! Detects ingredient mentions in free text using case-insensitive
//! word-boundary matching over normalized names, longest name first so
//! "red bell pepper" wins over "pepper". A trailing plural suffix on a
//! mention still matches its singular vocabulary entry ("onions" ->
//! "onion").

use regex::Regex;

use crate::visuals::normalize_name;

/// A recipe's known ingredient names, prepared for text matching
#[derive(Debug, Clone)]
pub struct IngredientVocabulary {
    /// (normalized name, compiled pattern), longest name first
    entries: Vec<(String, Regex)>,
}

impl IngredientVocabulary {
    /// Build a vocabulary from the recipe's full ingredient list
    ///
    /// Unparseable names (empty after normalization) are skipped.
    pub fn new(ingredients: &[String]) -> Self {
        let mut entries: Vec<(String, Regex)> = Vec::with_capacity(ingredients.len());
        for raw in ingredients {
            let name = normalize_name(raw);
            if name.is_empty() {
                continue;
            }
            if entries.iter().any(|(existing, _)| *existing == name) {
                continue;
            }
            let pattern = format!(r"(?i)\b{}(?:e?s)?\b", regex::escape(&name));
            if let Ok(re) = Regex::new(&pattern) {
                entries.push((name, re));
            }
        }
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// Normalized names mentioned in the text, longest-first, no overlaps
    ///
    /// Once a span of text has matched an ingredient it cannot also
    /// match a shorter one, so "red bell pepper" suppresses "pepper".
    pub fn find_mentions(&self, text: &str) -> Vec<String> {
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut found = Vec::new();
        for (name, re) in &self.entries {
            let mut matched = false;
            for m in re.find_iter(text) {
                let span = (m.start(), m.end());
                let overlaps = claimed
                    .iter()
                    .any(|&(s, e)| span.0 < e && s < span.1);
                if !overlaps {
                    claimed.push(span);
                    matched = true;
                }
            }
            if matched {
                found.push(name.clone());
            }
        }
        found
    }

    /// Whether a (possibly unnormalized) name is in the vocabulary
    pub fn contains(&self, name: &str) -> bool {
        let normalized = normalize_name(name);
        self.entries.iter().any(|(n, _)| *n == normalized)
    }

    /// All normalized names, longest first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
