//! Ingredient visual lookup tables
//!
//! Static mappings from ingredient names, cooking states, and
//! preparation states to the sensory phrases the prompt generator
//! composes. Ingredients missing from the tables degrade to their bare
//! name rather than failing.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cooking media that must never be listed in a negative prompt, even
/// while formally absent. Suppressing them visually contradicts scenes
/// rendered from earlier steps.
pub const COOKING_MEDIA: [&str; 4] = ["oil", "ghee", "butter", "water"];

/// Visual appearance phrases for common ingredients
static INGREDIENT_VISUALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            "oil",
            "thin shimmering layer of oil coating the surface, reflecting light",
        ),
        ("ghee", "glossy melted ghee with a golden sheen"),
        ("butter", "melted butter with slight browning at edges"),
        ("water", "clear water with small bubbles forming"),
        ("onion", "translucent onion pieces"),
        ("onions", "translucent onion pieces"),
        ("tomato", "red tomato pieces with visible juice"),
        ("tomatoes", "red tomato pieces with visible juice"),
        ("garlic", "minced garlic pieces scattered"),
        ("ginger", "finely chopped ginger visible"),
        ("spices", "aromatic spice powder coating ingredients"),
        ("salt", "fine salt crystals sprinkled"),
        ("paneer", "white paneer cubes with golden edges"),
        ("vegetables", "colorful vegetable pieces"),
        ("rice", "white rice grains"),
        ("dal", "yellow lentils with thick consistency"),
        ("gravy", "rich, thick sauce coating ingredients"),
        ("curry", "thick curry with visible spices"),
    ])
});

/// Visual phrases for cooking states
static STATE_VISUALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("heating", "beginning to shimmer with heat waves visible"),
        (
            "hot",
            "shimmering and reflecting light, slight ripples from heat",
        ),
        ("boiling", "vigorous bubbles breaking the surface"),
        ("simmering", "gentle bubbles rising slowly"),
        ("frying", "sizzling with oil bubbling around ingredients"),
        ("sauteing", "ingredients glistening, slight browning visible"),
        ("browning", "golden-brown color developing on surfaces"),
        ("golden", "rich golden-brown color with crispy edges"),
        ("caramelizing", "deep golden brown with glossy surface"),
        ("mixing", "ingredients swirling together, colors blending"),
        ("stirring", "ingredients moving, visible motion blur"),
        (
            "cooking",
            "steam rising, moisture evaporating, colors deepening",
        ),
        ("thickening", "sauce reducing, becoming viscous and glossy"),
        (
            "melting",
            "transitioning from solid to liquid, edges softening",
        ),
    ])
});

/// Visual phrases for preparation states
static PREPARATION_VISUALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("chopped", "cut into small uniform pieces with clean edges"),
        ("diced", "cut into small cubes, evenly sized"),
        ("sliced", "thin slices with visible layers"),
        ("minced", "very finely chopped, almost paste-like"),
        ("crushed", "roughly broken with irregular pieces"),
        ("whole", "intact with natural shape"),
        ("halved", "cut in half showing inner texture"),
        ("frying", "sizzling at the edges, glistening with oil"),
        ("fried", "golden-brown with crisped surfaces"),
    ])
});

/// Normalize an ingredient name for matching
///
/// Lowercases, strips parenthetical qualifiers ("bell pepper (red)" ->
/// "bell pepper"), and collapses internal whitespace. Both the
/// vocabulary and the state manager route names through here so
/// matching stays consistent regardless of table construction order.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for ch in name.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.extend(ch.to_lowercase()),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whether a name refers to a cooking medium (oil, ghee, butter, water)
pub fn is_cooking_medium(name: &str) -> bool {
    let normalized = normalize_name(name);
    COOKING_MEDIA.contains(&normalized.as_str())
}

/// Visual phrase for an ingredient, if the table has one
pub fn ingredient_visual(name: &str) -> Option<&'static str> {
    INGREDIENT_VISUALS.get(normalize_name(name).as_str()).copied()
}

/// Visual phrase for a cooking state, falling back to the state itself
pub fn cooking_state_visual(state: &str) -> &str {
    STATE_VISUALS
        .get(normalize_name(state).as_str())
        .copied()
        .unwrap_or(state)
}

/// Visual phrase for a preparation state, if the table has one
pub fn preparation_visual(preparation: &str) -> Option<&'static str> {
    PREPARATION_VISUALS
        .get(normalize_name(preparation).as_str())
        .copied()
}
