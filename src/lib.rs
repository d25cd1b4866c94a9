//! # Stovelight
//!
//! Turns free-text recipe step instructions into image generation
//! prompts that track what is actually visible in the pan. Each
//! session accumulates visual state step by step, so a prompt for
//! step 5 knows which ingredients went in during steps 1 through 4
//! and which must not appear yet.
//!
//! ## Usage
//!
//! ```no_run
//! use stovelight::session::{RecipeSession, SessionConfig};
//!
//! # async fn run() -> stovelight::error::Result<()> {
//! let config = SessionConfig::new(
//!     "Paneer Butter Masala",
//!     vec!["oil".to_string(), "onion".to_string(), "paneer".to_string()],
//! );
//! let mut session = RecipeSession::new(config, None)?;
//! session.add_step(1, "Heat oil in a pan").await;
//! let prompt = session.cumulative_prompt("Heat oil in a pan").await;
//! println!("{}", prompt.combined());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `completion` - Trait-based abstraction over text completion backends
//! - `error` - Error types for configuration and session failures
//! - `parser` - Rule-based step parsing with optional completion refinement
//! - `prompt` - Positive/negative prompt generation with confidence gating
//! - `session` - Per-recipe session orchestration and shared registry
//! - `state` - Cumulative visual state and its transition logic
//! - `visuals` - Ingredient, cooking state, and preparation vocabulary
pub mod completion;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod state;
pub mod visuals;

pub use error::{EngineError, Result};
pub use session::{RecipeSession, SessionConfig, SessionId, SessionRegistry};
