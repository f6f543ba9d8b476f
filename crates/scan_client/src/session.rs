use std::collections::HashSet;
use std::sync::Arc;

use checkin_core::extract_identifier;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{CheckinSubmitter, RegistrationResult};
use crate::config::DisplayDurations;
use crate::session_types::*;

/// Drives one scanning station: takes decoded payloads from the camera,
/// decides whether each needs a round trip to the registration service,
/// and paces the operator feedback.
///
/// At most one decode is resolved at a time; decodes arriving while a
/// result is in flight or on display are dropped.
pub struct ScanSession {
    id: Uuid,
    submitter: Arc<dyn CheckinSubmitter>,
    camera: Arc<dyn CameraHandle>,
    feedback: Arc<dyn FeedbackSink>,
    durations: DisplayDurations,
    state: Arc<RwLock<SessionState>>,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,

    /// Identifiers accepted by the service during this session
    checked_in: HashSet<String>,

    /// Most recent identifier whose answer is final for this session
    last_processed: Option<String>,

    /// Bumped on every start and stop; a resolution only resumes the
    /// camera if the epoch it began in is still current.
    epoch: u64,

    /// A submission is pending; survives stop/start so a restarted run
    /// cannot overlap it.
    in_flight: bool,
}

impl ScanSession {
    /// Create a new, idle scan session with an empty cache
    pub fn new(
        submitter: Arc<dyn CheckinSubmitter>,
        camera: Arc<dyn CameraHandle>,
        feedback: Arc<dyn FeedbackSink>,
        durations: DisplayDurations,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitter,
            camera,
            feedback,
            durations,
            state: Arc::new(RwLock::new(SessionState {
                phase: SessionPhase::Idle,
                checked_in: HashSet::new(),
                last_processed: None,
                epoch: 0,
                in_flight: false,
            })),
        }
    }

    /// Session identifier used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current phase
    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.phase
    }

    /// Identifiers accepted during this session, ascending
    pub async fn checked_in(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut ids: Vec<String> = state.checked_in.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Activates the camera and starts listening. Returns `false` if the
    /// session was not idle.
    pub async fn start(&self) -> bool {
        let mut state = self.state.write().await;
        if state.phase != SessionPhase::Idle {
            debug!("Session {} already running", self.id);
            return false;
        }

        state.phase = SessionPhase::Listening;
        state.last_processed = None;
        state.epoch += 1;
        self.camera.activate();
        self.feedback.on_phase_changed(SessionPhase::Listening);

        info!("▶️ Scan session {} started", self.id);
        true
    }

    /// Releases the camera and goes idle. A submission already in flight
    /// still completes and updates the cache, but scanning does not resume.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if state.phase == SessionPhase::Idle {
            return;
        }

        state.phase = SessionPhase::Idle;
        state.epoch += 1;
        self.camera.release();
        self.feedback.on_phase_changed(SessionPhase::Idle);

        info!("⏹️ Scan session {} stopped", self.id);
    }

    /// Processes one decoded payload.
    ///
    /// Returns `None` when the decode was dropped because the session was
    /// not listening or an earlier submission is still pending. Otherwise returns once the result has been displayed.
    pub async fn handle_decode(&self, decoded_text: &str) -> Option<ScanOutcome> {
        let epoch = self.begin_resolution().await?;

        let outcome = self.resolve(decoded_text, epoch).await;
        self.finish(&outcome, epoch).await;
        Some(outcome)
    }

    /// Reports a camera failure. Ignored unless the session is listening.
    pub async fn handle_scanner_error(&self, message: &str) -> Option<ScanOutcome> {
        let epoch = self.begin_resolution().await?;

        warn!("Scanner error in session {}: {}", self.id, message);
        let outcome = ScanOutcome::ScannerError {
            message: message.to_string(),
        };
        self.finish(&outcome, epoch).await;
        Some(outcome)
    }

    /// Moves Listening to Resolving atomically; the winner gets the epoch.
    async fn begin_resolution(&self) -> Option<u64> {
        let mut state = self.state.write().await;
        if state.phase != SessionPhase::Listening {
            debug!("Session {} dropped a decode while {:?}", self.id, state.phase);
            return None;
        }
        if state.in_flight {
            debug!("Session {} dropped a decode; previous submission pending", self.id);
            return None;
        }

        state.phase = SessionPhase::Resolving;
        state.in_flight = true;
        self.camera.suspend();
        self.feedback.on_phase_changed(SessionPhase::Resolving);
        Some(state.epoch)
    }

    async fn resolve(&self, decoded_text: &str, epoch: u64) -> ScanOutcome {
        let id = match extract_identifier(decoded_text) {
            Ok(id) => id,
            Err(e) => {
                debug!("Session {}: {}", self.id, e);
                return ScanOutcome::InvalidCode;
            }
        };

        {
            let mut state = self.state.write().await;
            if state.last_processed.as_deref() == Some(id.as_str()) {
                return ScanOutcome::DuplicateImmediate { id };
            }
            if state.checked_in.contains(&id) {
                state.last_processed = Some(id.clone());
                return ScanOutcome::DuplicateKnown { id };
            }
        }

        let result = self.submitter.submit(&id).await;

        let mut state = self.state.write().await;
        // A restart in the meantime cleared last_processed; leave it cleared.
        let current = state.epoch == epoch;
        match &result {
            RegistrationResult::Accepted { .. } => {
                state.checked_in.insert(id.clone());
                if current {
                    state.last_processed = Some(id.clone());
                }
            }
            RegistrationResult::AlreadyRegistered { .. } | RegistrationResult::Rejected { .. } => {
                if current {
                    state.last_processed = Some(id.clone());
                }
            }
            // Transient or unconfirmed; the next scan of this id is submitted again.
            RegistrationResult::Unknown { .. }
            | RegistrationResult::ServiceError { .. }
            | RegistrationResult::TransportError { .. } => {}
        }

        ScanOutcome::from_registration(id, result)
    }

    /// Shows the outcome, holds for its display duration and resumes
    /// listening if the session was not stopped or restarted meanwhile.
    async fn finish(&self, outcome: &ScanOutcome, epoch: u64) {
        let display_for = self.durations.for_tone(outcome.tone());
        info!("Session {}: {:?} {}", self.id, outcome.tone(), outcome);
        self.feedback.on_outcome(outcome, display_for);

        {
            let mut state = self.state.write().await;
            state.in_flight = false;
            if state.epoch != epoch {
                debug!("Session {} stopped while resolving", self.id);
                return;
            }
        }

        tokio::time::sleep(display_for).await;

        let mut state = self.state.write().await;
        if state.epoch == epoch && state.phase == SessionPhase::Resolving {
            state.phase = SessionPhase::Listening;
            self.camera.resume();
            self.feedback.on_phase_changed(SessionPhase::Listening);
        }
    }
}
