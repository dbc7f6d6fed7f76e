//! Player session management for the HTTP API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use derive_more::Display;
use interview_core::{Progression, SessionView};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::reporter::{DeliveryOutcome, DeliveryStatus, ReportGuard};

/// Unique identifier for a session.
pub type SessionId = String;

/// One player's session: the state machine and its report guard.
#[derive(Debug, Clone, Default)]
pub struct SessionEntry {
    /// Progression controller.
    pub progression: Progression,
    /// One-shot report guard.
    pub report: ReportGuard,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session id.
    pub id: SessionId,
    /// Progression view.
    #[serde(flatten)]
    pub view: SessionView,
    /// Report delivery state.
    pub delivery: DeliveryStatus,
}

impl SessionSnapshot {
    fn of(id: &str, entry: &SessionEntry) -> Self {
        Self {
            id: id.to_string(),
            view: entry.progression.view(),
            delivery: entry.report.status().clone(),
        }
    }
}

/// Session lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("Session '{_0}' not found")]
pub struct SessionNotFound(pub SessionId);

impl std::error::Error for SessionNotFound {}

/// Manages all sessions.
///
/// Each action holds the map lock for the whole transition, so one session
/// never sees two actions interleave.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<SessionId, SessionEntry>>>,
}

impl SessionManager {
    /// Creates an empty session manager.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a session with a fresh uuid and returns its snapshot.
    #[instrument(skip(self))]
    pub fn create(&self) -> SessionSnapshot {
        self.insert(uuid::Uuid::new_v4().to_string(), SessionEntry::default())
    }

    /// Inserts a session under an explicit id, replacing any previous one.
    #[instrument(skip(self, entry))]
    pub fn insert(&self, id: SessionId, entry: SessionEntry) -> SessionSnapshot {
        let snapshot = SessionSnapshot::of(&id, &entry);
        let mut sessions = self.lock();
        if sessions.insert(id.clone(), entry).is_some() {
            warn!(session_id = %id, "Replaced existing session");
        }
        info!(session_id = %id, count = sessions.len(), "Session created");
        snapshot
    }

    /// Returns the snapshot of a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn snapshot(&self, id: &str) -> Result<SessionSnapshot, SessionNotFound> {
        let sessions = self.lock();
        sessions
            .get(id)
            .map(|entry| SessionSnapshot::of(id, entry))
            .ok_or_else(|| {
                debug!(session_id = id, "Session not found");
                SessionNotFound(id.to_string())
            })
    }

    /// Runs `action` on a session while holding the lock, then snapshots it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionNotFound`] for an unknown id.
    #[instrument(skip(self, action))]
    pub fn with_session<R>(
        &self,
        id: &str,
        action: impl FnOnce(&mut SessionEntry) -> R,
    ) -> Result<(R, SessionSnapshot), SessionNotFound> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(id).ok_or_else(|| {
            debug!(session_id = id, "Session not found");
            SessionNotFound(id.to_string())
        })?;
        let result = action(entry);
        Ok((result, SessionSnapshot::of(id, entry)))
    }

    /// Stores the outcome of a finished report task.
    #[instrument(skip(self, outcome), fields(notified = outcome.notified()))]
    pub fn complete_report(&self, id: &str, generation: u64, outcome: DeliveryOutcome) {
        match self.lock().get_mut(id) {
            Some(entry) => {
                if entry.report.complete(generation, outcome) {
                    info!(session_id = id, status = ?entry.report.status(), "Report completed");
                }
            }
            None => warn!(session_id = id, "Report finished for a vanished session"),
        }
    }

    /// Drops a session. A report still running for it finds nothing to update.
    ///
    /// # Errors
    ///
    /// Returns [`SessionNotFound`] for an unknown id.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Result<(), SessionNotFound> {
        let mut sessions = self.lock();
        match sessions.remove(id) {
            Some(_) => {
                info!(session_id = id, count = sessions.len(), "Session closed");
                Ok(())
            }
            None => {
                debug!(session_id = id, "Session not found");
                Err(SessionNotFound(id.to_string()))
            }
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no session exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
