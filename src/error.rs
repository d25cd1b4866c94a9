//! Unified error type for the engine
//!
//! Errors surface only at construction and registry boundaries. The
//! per-step hot path (`add_step`, prompt generation) never returns an
//! error: completion failures degrade to the rule-based result and are
//! logged, never propagated.

use thiserror::Error;

/// The unified error type for the stovelight engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session error: {message}")]
    Session {
        message: String,
        session_id: Option<String>,
    },
}

impl EngineError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
            session_id: None,
        }
    }

    /// Create a session error tagged with a session id
    pub fn session_with_id(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
            session_id: Some(session_id.into()),
        }
    }
}

/// Convenience result type using [`EngineError`]
pub type Result<T> = std::result::Result<T, EngineError>;
