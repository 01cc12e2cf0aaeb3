//! Per-user request lifecycle.
//!
//! A session runs at most one request at a time:
//! `Idle -> Validating -> Inferring -> Done`, with any stage able to end in `Failed`.
//! Validation happens synchronously inside [`AdvisorySession::submit`]; inference runs on a
//! Tokio task and is delivered through the returned [`RequestHandle`]. Every transition is
//! reported while the session lock is held, so status updates of one session never reorder.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::composer::Recommendation;
use super::domain::{InferenceKind, RawRequest, RequestId, SessionId};
use super::engine::{AdvisoryEngine, PreparedRequest};
use super::errors::{AdvisoryError, BusyError, ErrorKind, InferenceError};
use super::status::{Settlement, StatusReporter, StatusUpdate};

/// What a session does with a submit that arrives while a request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    /// Refuse the new submit with [`BusyError`].
    #[default]
    Reject,
    /// Start the new request; the old one's result is discarded when it arrives.
    Supersede,
}

impl ConcurrencyPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "supersede" => Some(Self::Supersede),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Supersede => "supersede",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RequestState {
    Idle,
    Validating,
    Inferring,
    Done(Recommendation),
    Failed(ErrorKind),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::Validating | RequestState::Inferring)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Validating => "validating",
            RequestState::Inferring => "inferring",
            RequestState::Done(_) => "done",
            RequestState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug)]
struct SessionSlot {
    /// Sequence of the newest accepted submit. Results from older sequences are stale.
    sequence: u64,
    current: Option<(RequestId, InferenceKind)>,
    state: RequestState,
    /// Set once the owning service dropped the session; transitions are no longer reported.
    closed: bool,
}

/// Serializable view of a session for polling clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub policy: ConcurrencyPolicy,
    pub request: Option<RequestId>,
    pub kind: Option<InferenceKind>,
    pub state: RequestState,
}

/// Receives the terminal outcome of one submit.
#[derive(Debug)]
pub struct RequestHandle {
    id: RequestId,
    kind: InferenceKind,
    receiver: oneshot::Receiver<Result<Recommendation, AdvisoryError>>,
}

impl RequestHandle {
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    pub fn kind(&self) -> InferenceKind {
        self.kind
    }

    /// Wait for the recommendation or the failure that ended this request.
    pub async fn outcome(self) -> Result<Recommendation, AdvisoryError> {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(AdvisoryError::Inference(InferenceError::new(
                "request ended without an outcome",
            ))),
        }
    }
}

/// One user's advisory workspace; cheap to clone, clones share state.
#[derive(Clone)]
pub struct AdvisorySession {
    id: SessionId,
    engine: Arc<AdvisoryEngine>,
    reporter: Arc<dyn StatusReporter>,
    policy: ConcurrencyPolicy,
    slot: Arc<Mutex<SessionSlot>>,
}

impl AdvisorySession {
    pub fn new(
        id: SessionId,
        engine: Arc<AdvisoryEngine>,
        reporter: Arc<dyn StatusReporter>,
        policy: ConcurrencyPolicy,
    ) -> Self {
        Self {
            id,
            engine,
            reporter,
            policy,
            slot: Arc::new(Mutex::new(SessionSlot {
                sequence: 0,
                current: None,
                state: RequestState::Idle,
                closed: false,
            })),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    pub fn state(&self) -> RequestState {
        let slot = self.slot.lock().expect("session mutex poisoned");
        slot.state.clone()
    }

    /// State of the request behind `handle`, or `None` once a newer submit replaced it.
    pub fn state_of(&self, handle: &RequestHandle) -> Option<RequestState> {
        let slot = self.slot.lock().expect("session mutex poisoned");
        (slot.sequence == handle.id.sequence).then(|| slot.state.clone())
    }

    /// Stop reporting status for this session. A request still in flight runs to the end and
    /// resolves its handle as usual.
    pub fn close(&self) {
        let mut slot = self.slot.lock().expect("session mutex poisoned");
        slot.closed = true;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let slot = self.slot.lock().expect("session mutex poisoned");
        SessionSnapshot {
            session_id: self.id.clone(),
            policy: self.policy,
            request: slot.current.as_ref().map(|(id, _)| id.clone()),
            kind: slot.current.as_ref().map(|(_, kind)| *kind),
            state: slot.state.clone(),
        }
    }

    /// Start a request. Validation failures resolve the handle immediately; only a submit
    /// that collides with an in-flight request under [`ConcurrencyPolicy::Reject`] errors.
    pub fn submit(
        &self,
        request: RawRequest,
        kind: InferenceKind,
    ) -> Result<RequestHandle, BusyError> {
        let mut slot = self.slot.lock().expect("session mutex poisoned");

        if slot.state.is_in_flight() {
            if let Some((in_flight, in_flight_kind)) = slot.current.clone() {
                match self.policy {
                    ConcurrencyPolicy::Reject => {
                        debug!(session = %self.id, request = %in_flight, "rejecting submit while busy");
                        return Err(BusyError {
                            in_flight,
                            in_flight_kind,
                        });
                    }
                    ConcurrencyPolicy::Supersede => {
                        debug!(session = %self.id, request = %in_flight, "superseding in-flight request");
                    }
                }
            }
        }

        slot.sequence += 1;
        let id = RequestId {
            session: self.id.clone(),
            sequence: slot.sequence,
        };
        slot.current = Some((id.clone(), kind));
        info!(session = %self.id, request = %id, kind = %kind, fields = request.len(), "request submitted");

        let (sender, receiver) = oneshot::channel();
        let handle = RequestHandle {
            id: id.clone(),
            kind,
            receiver,
        };

        self.transition(
            &mut slot,
            &id,
            kind,
            RequestState::Validating,
            kind.validating_message(),
            true,
        );

        let prepared = match self.engine.prepare(&request, kind) {
            Ok(prepared) => prepared,
            Err(err) => {
                debug!(session = %self.id, request = %id, error = %err, "validation failed");
                let failure = ErrorKind::Validation(err.clone());
                let message = failure.status_message();
                self.transition(&mut slot, &id, kind, RequestState::Failed(failure), message, false);
                self.reporter.settled(&id, Settlement::Failed);
                let _ = sender.send(Err(AdvisoryError::Validation(err)));
                return Ok(handle);
            }
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                let err = InferenceError::new("no async runtime available to run inference");
                warn!(session = %self.id, request = %id, error = %err, "inference failed");
                let failure = ErrorKind::Inference(err.clone());
                let message = failure.status_message();
                self.transition(&mut slot, &id, kind, RequestState::Failed(failure), message, false);
                self.reporter.settled(&id, Settlement::Failed);
                let _ = sender.send(Err(AdvisoryError::Inference(err)));
                return Ok(handle);
            }
        };

        self.transition(
            &mut slot,
            &id,
            kind,
            RequestState::Inferring,
            kind.progress_message(),
            true,
        );
        drop(slot);

        let session = self.clone();
        runtime.spawn(async move {
            session.supervise(id, prepared, sender).await;
        });

        Ok(handle)
    }

    /// Runs inference on its own task so that a panicking strategy still settles the request
    /// and frees the session.
    async fn supervise(
        self,
        id: RequestId,
        prepared: PreparedRequest,
        sender: oneshot::Sender<Result<Recommendation, AdvisoryError>>,
    ) {
        let kind = prepared.kind();
        let engine = self.engine.clone();
        let inference = tokio::spawn(async move {
            let result = engine.infer(&prepared.features).await?;
            Ok::<_, InferenceError>(engine.compose(result, &prepared))
        });

        let outcome = match inference.await {
            Ok(outcome) => outcome,
            Err(join_err) if join_err.is_panic() => {
                Err(InferenceError::new("inference task panicked"))
            }
            Err(_) => Err(InferenceError::new("inference task was cancelled")),
        };

        let mut slot = self.slot.lock().expect("session mutex poisoned");
        if slot.sequence != id.sequence {
            debug!(session = %self.id, request = %id, "discarding superseded result");
            self.reporter.settled(&id, Settlement::Superseded);
            let _ = sender.send(Err(AdvisoryError::Superseded { request: id }));
            return;
        }

        match outcome {
            Ok(recommendation) => {
                let message = recommendation.headline.clone();
                self.transition(
                    &mut slot,
                    &id,
                    kind,
                    RequestState::Done(recommendation.clone()),
                    message,
                    false,
                );
                self.reporter.settled(&id, Settlement::Completed);
                let _ = sender.send(Ok(recommendation));
            }
            Err(err) => {
                warn!(session = %self.id, request = %id, error = %err, "inference failed");
                let failure = ErrorKind::Inference(err.clone());
                let message = failure.status_message();
                self.transition(&mut slot, &id, kind, RequestState::Failed(failure), message, false);
                self.reporter.settled(&id, Settlement::Failed);
                let _ = sender.send(Err(AdvisoryError::Inference(err)));
            }
        }
    }

    fn transition(
        &self,
        slot: &mut SessionSlot,
        id: &RequestId,
        kind: InferenceKind,
        state: RequestState,
        message: impl Into<String>,
        busy: bool,
    ) {
        slot.state = state;
        if slot.closed {
            return;
        }
        self.reporter
            .report(StatusUpdate::new(id, kind, message, busy));
    }
}

impl std::fmt::Debug for AdvisorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorySession")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
