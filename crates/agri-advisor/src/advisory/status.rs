use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::domain::{InferenceKind, RequestId, SessionId};

/// Progress line handed to whatever renders the session's status bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub session: SessionId,
    pub request: RequestId,
    pub kind: InferenceKind,
    pub message: String,
    pub busy: bool,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn new(
        request: &RequestId,
        kind: InferenceKind,
        message: impl Into<String>,
        busy: bool,
    ) -> Self {
        Self {
            session: request.session.clone(),
            request: request.clone(),
            kind,
            message: message.into(),
            busy,
            at: Utc::now(),
        }
    }
}

/// How an accepted submit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Completed,
    Failed,
    Superseded,
}

/// Outbound status hook. Reports are fire-and-forget; a reporter must not block.
pub trait StatusReporter: Send + Sync {
    fn report(&self, update: StatusUpdate);

    /// Called exactly once per accepted submit, just before its handle resolves.
    fn settled(&self, _request: &RequestId, _settlement: Settlement) {}
}

/// Writes every update to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusReporter;

impl StatusReporter for TracingStatusReporter {
    fn report(&self, update: StatusUpdate) {
        info!(
            session = %update.session,
            request = %update.request,
            kind = %update.kind,
            busy = update.busy,
            "{}",
            update.message
        );
    }
}

/// Keeps the latest update per session so HTTP callers can poll it.
#[derive(Debug, Default)]
pub struct StatusBoard {
    latest: Mutex<HashMap<SessionId, StatusUpdate>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self, session: &SessionId) -> Option<StatusUpdate> {
        let guard = self.latest.lock().expect("status board mutex poisoned");
        guard.get(session).cloned()
    }

    pub fn forget(&self, session: &SessionId) {
        let mut guard = self.latest.lock().expect("status board mutex poisoned");
        guard.remove(session);
    }
}

impl StatusReporter for StatusBoard {
    fn report(&self, update: StatusUpdate) {
        debug!(
            session = %update.session,
            request = %update.request,
            busy = update.busy,
            "{}",
            update.message
        );
        let mut guard = self.latest.lock().expect("status board mutex poisoned");
        guard.insert(update.session.clone(), update);
    }
}
