use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::info;

use super::catalog::Catalog;
use super::composer::Recommendation;
use super::domain::{InferenceKind, RawRequest, RequestId, SessionId};
use super::engine::AdvisoryEngine;
use super::errors::AdvisoryError;
use super::session::{AdvisorySession, ConcurrencyPolicy, RequestHandle, SessionSnapshot};
use super::status::{Settlement, StatusBoard, StatusReporter, StatusUpdate};
use crate::config::EngineConfig;

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

/// Running totals across every session of a service.
#[derive(Debug, Default)]
struct AdvisoryStats {
    crop: AtomicU64,
    fertilizer: AtomicU64,
    yield_requests: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    busy_rejections: AtomicU64,
    superseded: AtomicU64,
}

impl AdvisoryStats {
    fn submitted(&self, kind: InferenceKind) -> &AtomicU64 {
        match kind {
            InferenceKind::Crop => &self.crop,
            InferenceKind::Fertilizer => &self.fertilizer,
            InferenceKind::Yield => &self.yield_requests,
        }
    }

    fn settled(&self, settlement: Settlement) -> &AtomicU64 {
        match settlement {
            Settlement::Completed => &self.completed,
            Settlement::Failed => &self.failed,
            Settlement::Superseded => &self.superseded,
        }
    }
}

/// What every session of the service reports to: the shared board plus the outcome totals.
struct ServiceReporter {
    board: Arc<StatusBoard>,
    stats: Arc<AdvisoryStats>,
}

impl StatusReporter for ServiceReporter {
    fn report(&self, update: StatusUpdate) {
        self.board.report(update);
    }

    fn settled(&self, _request: &RequestId, settlement: Settlement) {
        self.stats.settled(settlement).fetch_add(1, Ordering::Relaxed);
    }
}

/// Service-wide totals. Outcome counters cover every accepted submit, whether or not its
/// handle is awaited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub sessions_open: usize,
    pub requests: BTreeMap<&'static str, u64>,
    pub completed: u64,
    pub failed: u64,
    pub busy_rejections: u64,
    pub superseded: u64,
}

/// Session snapshot joined with the last status line reported for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
    pub status: Option<StatusUpdate>,
}

/// Registry of advisory sessions sharing one engine and one status board.
pub struct AdvisoryService {
    engine: Arc<AdvisoryEngine>,
    board: Arc<StatusBoard>,
    reporter: Arc<ServiceReporter>,
    policy: ConcurrencyPolicy,
    sessions: RwLock<HashMap<SessionId, AdvisorySession>>,
    stats: Arc<AdvisoryStats>,
}

impl AdvisoryService {
    pub fn new(engine: Arc<AdvisoryEngine>, policy: ConcurrencyPolicy) -> Self {
        let board = Arc::new(StatusBoard::new());
        let stats = Arc::new(AdvisoryStats::default());
        let reporter = Arc::new(ServiceReporter {
            board: board.clone(),
            stats: stats.clone(),
        });

        Self {
            engine,
            board,
            reporter,
            policy,
            sessions: RwLock::new(HashMap::new()),
            stats,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(AdvisoryEngine::from_config(config)),
            config.concurrency,
        )
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.engine.catalog()
    }

    pub fn engine(&self) -> &Arc<AdvisoryEngine> {
        &self.engine
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    pub fn open_session(&self) -> SessionId {
        let id = next_session_id();
        let session = AdvisorySession::new(
            id.clone(),
            self.engine.clone(),
            self.reporter.clone(),
            self.policy,
        );

        let mut sessions = self.sessions.write().expect("session registry poisoned");
        sessions.insert(id.clone(), session);
        info!(session = %id, policy = self.policy.as_str(), "session opened");
        id
    }

    pub fn session(&self, id: &SessionId) -> Result<AdvisorySession, AdvisoryError> {
        let sessions = self.sessions.read().expect("session registry poisoned");
        sessions
            .get(id)
            .cloned()
            .ok_or_else(|| AdvisoryError::SessionNotFound(id.clone()))
    }

    /// Drop a session. A request still running finishes in the background without touching
    /// the status board.
    pub fn close_session(&self, id: &SessionId) -> Result<(), AdvisoryError> {
        let mut sessions = self.sessions.write().expect("session registry poisoned");
        let session = sessions
            .remove(id)
            .ok_or_else(|| AdvisoryError::SessionNotFound(id.clone()))?;
        drop(sessions);

        session.close();
        self.board.forget(id);
        info!(session = %id, "session closed");
        Ok(())
    }

    pub fn submit(
        &self,
        id: &SessionId,
        request: RawRequest,
        kind: InferenceKind,
    ) -> Result<RequestHandle, AdvisoryError> {
        let session = self.session(id)?;
        match session.submit(request, kind) {
            Ok(handle) => {
                self.stats.submitted(kind).fetch_add(1, Ordering::Relaxed);
                Ok(handle)
            }
            Err(busy) => {
                self.stats.busy_rejections.fetch_add(1, Ordering::Relaxed);
                Err(busy.into())
            }
        }
    }

    /// Submit and wait for the outcome.
    pub async fn advise(
        &self,
        id: &SessionId,
        request: RawRequest,
        kind: InferenceKind,
    ) -> Result<Recommendation, AdvisoryError> {
        let handle = self.submit(id, request, kind)?;
        handle.outcome().await
    }

    pub fn view(&self, id: &SessionId) -> Result<SessionView, AdvisoryError> {
        let session = self.session(id)?;
        Ok(SessionView {
            snapshot: session.snapshot(),
            status: self.latest_status(id),
        })
    }

    /// Last status line on the board for `id`; closed sessions have none.
    pub fn latest_status(&self, id: &SessionId) -> Option<StatusUpdate> {
        self.board.latest(id)
    }

    pub fn session_count(&self) -> usize {
        let sessions = self.sessions.read().expect("session registry poisoned");
        sessions.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        let requests = InferenceKind::ordered()
            .into_iter()
            .map(|kind| (kind.slug(), self.stats.submitted(kind).load(Ordering::Relaxed)))
            .collect();

        StatsSnapshot {
            sessions_open: self.session_count(),
            requests,
            completed: self.stats.completed.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            busy_rejections: self.stats.busy_rejections.load(Ordering::Relaxed),
            superseded: self.stats.superseded.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for AdvisoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryService")
            .field("policy", &self.policy)
            .field("sessions", &self.session_count())
            .finish_non_exhaustive()
    }
}
