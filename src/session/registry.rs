//! Shared session storage
//!
//! Sessions live behind the registry so concurrent callers working on
//! the same session id share one cumulative state. Each session gets
//! its own [`Mutex`], so a slow step in one session never blocks
//! another.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::orchestrator::RecipeSession;
use super::{SessionConfig, SessionId};
use crate::completion::SharedCompletion;
use crate::error::{EngineError, Result};

/// In-memory registry of active recipe sessions
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<RecipeSession>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session for an id, creating it on first use
    ///
    /// The config closure only runs when the session does not exist
    /// yet, and its validation errors surface here rather than later.
    pub async fn get_or_create<F>(
        &self,
        id: &SessionId,
        completion: SharedCompletion,
        config: F,
    ) -> Result<Arc<Mutex<RecipeSession>>>
    where
        F: FnOnce() -> SessionConfig,
    {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return Ok(Arc::clone(session));
            }
        }

        let mut sessions = self.sessions.write().await;
        // A racing caller may have created it between the locks
        if let Some(session) = sessions.get(id) {
            return Ok(Arc::clone(session));
        }
        let session = Arc::new(Mutex::new(RecipeSession::new(config(), completion)?));
        debug!(session = %id, "session created");
        sessions.insert(id.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Look up an existing session without creating one
    pub async fn get(&self, id: &SessionId) -> Option<Arc<Mutex<RecipeSession>>> {
        self.sessions.read().await.get(id).map(Arc::clone)
    }

    /// Look up a session that must already exist
    pub async fn require(&self, id: &SessionId) -> Result<Arc<Mutex<RecipeSession>>> {
        self.get(id).await.ok_or_else(|| {
            EngineError::session_with_id("session not found in registry", id.as_str())
        })
    }

    /// Drop a single session, returning whether it existed
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Evict every session whose id is not in the active set
    pub async fn retain_active(&self, active: &[SessionId]) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, _| active.contains(id));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "evicted inactive sessions");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
