//! End-to-end tests driving full sessions through parsing, state
//! accumulation, and prompt generation.

use std::sync::Arc;

use stovelight::completion::MockCompletionClient;
use stovelight::session::{RecipeSession, SessionConfig, SessionId, SessionRegistry};
use stovelight::state::FlameLevel;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn masala_config() -> SessionConfig {
    SessionConfig::new(
        "Paneer Butter Masala",
        vec![
            "oil".to_string(),
            "onion".to_string(),
            "paneer".to_string(),
            "tomato".to_string(),
        ],
    )
}

fn masala_session() -> RecipeSession {
    RecipeSession::new(masala_config(), None).unwrap()
}

#[tokio::test]
async fn three_step_progression_tracks_visibility() {
    init_tracing();
    let mut session = masala_session();

    let state = session.add_step(1, "Heat oil in a pan").await;
    assert!(state.is_visible("oil"));
    assert!(!state.is_visible("onion"));
    assert_eq!(state.flame_level, FlameLevel::Medium);

    let state = session
        .add_step(2, "Add chopped onions and saute until golden")
        .await;
    assert!(state.is_visible("oil"));
    assert!(state.is_visible("onion"));
    assert_eq!(state.flame_level, FlameLevel::High);

    let state = session
        .add_step(3, "Remove the onions, add paneer and fry until golden")
        .await;
    assert!(state.is_visible("paneer"));
    assert!(!state.is_visible("onion"));
    assert!(state.absent_ingredients.contains(&"onion".to_string()));
}

#[tokio::test]
async fn prompt_forbids_unadded_ingredients_but_not_media() {
    let mut session = masala_session();
    session.add_step(1, "Heat oil in a pan").await;

    let prompt = session.cumulative_prompt("Heat oil in a pan").await;
    assert!(!prompt.metadata.fallback);
    assert!(prompt.negative.contains("visible paneer"));
    assert!(prompt.negative.contains("visible tomato"));
    // Oil is a cooking medium, already on screen from this step
    assert!(!prompt.negative.contains("oil"));
    assert!(prompt.negative.contains("completed Paneer Butter Masala"));
    assert!(prompt.positive.contains("NOT a finished plated dish"));
}

#[tokio::test]
async fn removed_ingredient_returns_to_negative_prompt() {
    let mut session = masala_session();
    session.add_step(1, "Heat oil in a pan").await;
    session
        .add_step(2, "Add chopped onions and saute until golden")
        .await;

    let before = session.cumulative_prompt("saute onions").await;
    assert!(!before.negative.contains("visible onion"));

    session
        .add_step(3, "Remove the onions, add paneer and fry until golden")
        .await;
    let after = session.cumulative_prompt("fry paneer").await;
    assert!(after.negative.contains("visible onion"));
    assert!(after.positive.contains("Gas flame high"));
}

#[tokio::test]
async fn low_confidence_step_yields_conservative_prompt() {
    init_tracing();
    let mut session = masala_session();
    // No recognized action, no ingredient, hedging "or"
    session.add_step(1, "Wait for a while or so").await;

    let prompt = session.cumulative_prompt("Wait for a while or so").await;
    assert!(prompt.metadata.fallback);
    assert!(prompt.positive.contains("early cooking preparation"));
    assert!(prompt
        .negative
        .contains("Do not show Paneer Butter Masala finished"));
    assert!(prompt
        .combined()
        .starts_with("[Low confidence - showing conservative view]"));
}

#[tokio::test]
async fn confident_prompt_carries_style_suffix() {
    let mut session = masala_session();
    session.add_step(1, "Heat oil in a pan").await;

    let combined = session.cumulative_prompt("Heat oil in a pan").await.combined();
    assert!(!combined.starts_with("[Low confidence"));
    assert!(combined.contains("STRICT REQUIREMENTS - MUST NOT SHOW:"));
    assert!(combined.contains("HORIZONTAL"));
}

#[tokio::test]
async fn replaying_steps_is_deterministic() {
    let steps = [
        "Heat oil in a pan",
        "Add chopped onions and saute until golden",
        "Add pureed tomatoes and simmer",
    ];

    let mut first = masala_session();
    let mut second = masala_session();
    for (i, step) in steps.iter().enumerate() {
        first.add_step(i + 1, step).await;
        second.add_step(i + 1, step).await;
    }

    assert_eq!(first.current_state(), second.current_state());
    let a = first.cumulative_prompt("next").await;
    let b = second.cumulative_prompt("next").await;
    assert_eq!(a.positive, b.positive);
    assert_eq!(a.negative, b.negative);
}

#[tokio::test]
async fn visible_and_absent_never_overlap() {
    let mut session = masala_session();
    let steps = [
        "Heat oil in a pan",
        "Add chopped onions and saute until golden",
        "Remove the onions, add paneer and fry until golden",
        "Add onions back with the tomatoes and simmer",
    ];
    for (i, step) in steps.iter().enumerate() {
        let state = session.add_step(i + 1, step).await;
        for ingredient in &state.visible_ingredients {
            assert!(
                !state
                    .absent_ingredients
                    .contains(&ingredient.name.to_lowercase()),
                "{} is both visible and absent after {:?}",
                ingredient.name,
                step
            );
        }
    }
}

#[tokio::test]
async fn every_parsed_ingredient_is_tracked_after_its_step() {
    let mut session = masala_session();
    let steps = [
        "Heat oil in a pan",
        "Add chopped onions and saute until golden",
        "Remove the onions, add paneer and fry until golden",
        "Add pureed tomatoes and simmer",
    ];
    for (i, step) in steps.iter().enumerate() {
        session.add_step(i + 1, step).await;
    }

    for record in session.state_summary().step_history {
        let visible: Vec<String> = record
            .visual_state
            .visible_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let mentioned = record
            .action
            .ingredients_added
            .iter()
            .chain(record.action.ingredients_removed.iter());
        for name in mentioned {
            assert!(
                visible.contains(name)
                    || record.visual_state.absent_ingredients.contains(name),
                "{name} untracked after step {}",
                record.step_index
            );
        }
    }
}

#[tokio::test]
async fn mock_refinement_recovers_vague_step() {
    let client = Arc::new(MockCompletionClient::new());
    client
        .add_response(
            r#"{"action_type": "add", "ingredients_added": ["paneer"],
                "pan_state": "paneer cubes resting in sauce", "confidence": 0.9}"#,
        )
        .await;
    // Second queued response feeds the prompt enhancement call
    client
        .add_response("Golden paneer cubes nestled in a glossy orange sauce.")
        .await;

    let mut session = RecipeSession::new(masala_config(), Some(client.clone())).unwrap();
    // Vague wording, no recognized action verb or ingredient mention
    let state = session.add_step(1, "Gently slide in the cubes now or later").await;
    assert!(state.is_visible("paneer"));

    let prompt = session.cumulative_prompt("slide in the cubes").await;
    assert!(!prompt.metadata.fallback);
    assert!(prompt.positive.contains("Golden paneer cubes"));

    let prompts = client.recorded_prompts().await;
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("Available ingredients"));
}

#[tokio::test]
async fn registry_shares_state_across_handles() {
    let registry = SessionRegistry::new();
    let id = SessionId::from_string("kitchen-1");

    let handle = registry
        .get_or_create(&id, None, masala_config)
        .await
        .unwrap();
    handle.lock().await.add_step(1, "Heat oil in a pan").await;
    drop(handle);

    let handle = registry
        .get_or_create(&id, None, masala_config)
        .await
        .unwrap();
    let session = handle.lock().await;
    assert_eq!(session.steps_completed(), 1);
    assert!(session.current_state().unwrap().is_visible("oil"));
}

#[tokio::test]
async fn registry_eviction_forgets_session_state() {
    let registry = SessionRegistry::new();
    let id = SessionId::from_string("kitchen-2");

    let handle = registry
        .get_or_create(&id, None, masala_config)
        .await
        .unwrap();
    handle.lock().await.add_step(1, "Heat oil in a pan").await;
    drop(handle);

    registry.retain_active(&[]).await;
    assert!(registry.is_empty().await);

    let handle = registry
        .get_or_create(&id, None, masala_config)
        .await
        .unwrap();
    assert_eq!(handle.lock().await.steps_completed(), 0);
}

#[tokio::test]
async fn summary_and_average_confidence() {
    let mut session = masala_session();
    session.add_step(1, "Heat oil in a pan").await;
    session.add_step(2, "Wait for a while or so").await;

    let summary = session.state_summary();
    assert_eq!(summary.steps_completed, 2);
    // (1.0 + 0.4) / 2
    assert!((summary.average_confidence - 0.7).abs() < 1e-9);
    assert_eq!(summary.step_history[0].step_index, 1);
    assert!(summary.step_history[0].action.confidence > summary.step_history[1].action.confidence);
}
