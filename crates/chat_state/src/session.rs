//! Chat session controller
//!
//! `ChatSession` is the single owner of a conversation: the turn log, the
//! draft buffer and the submission phase. Front-ends read its state and call
//! `update_draft` / `submit`; nothing else mutates it.

use std::sync::Arc;

use chat_core::Turn;
use chat_gateway::{ChatGateway, ChatReply, GatewayError};
use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::machine::{SessionEvent, SessionPhase, StateMachine, StateTransition};

/// Content of the assistant turn appended when the gateway fails.
pub const BACKEND_ERROR_MESSAGE: &str = "Error calling backend.";

/// Recorded as `last_error` when a submission is dropped before its reply.
const ABANDONED_CAUSE: &str = "request abandoned before the router answered";

/// Why a submission did not start, or could not be completed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    #[error("draft is empty")]
    EmptyDraft,

    #[error("a request is already outstanding")]
    Busy,

    #[error("submission belongs to another session")]
    ForeignSubmission,
}

/// Result of [`ChatSession::submit`]. Gateway failures are not errors here:
/// they are already recorded in the log as an assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Draft was blank; nothing changed.
    Skipped,
    /// Another request is outstanding; nothing changed.
    Busy,
    /// The router answered; holds the appended assistant turn.
    Answered(Turn),
    /// The request failed; holds the appended error turn.
    Failed(Turn),
}

impl SubmitOutcome {
    pub fn turn(&self) -> Option<&Turn> {
        match self {
            Self::Answered(turn) | Self::Failed(turn) => Some(turn),
            Self::Skipped | Self::Busy => None,
        }
    }
}

/// A submission that has been accepted and is waiting for its reply.
///
/// Only [`ChatSession::begin_submit`] creates one, and only the session that
/// created it accepts it back in [`ChatSession::complete_submit`]. Dropping
/// it unfinished records a failure turn and leaves the session idle.
#[must_use = "an accepted submission must be completed"]
pub struct PendingSubmission {
    message: String,
    user_id: String,
    state: Arc<RwLock<SessionState>>,
    settled: bool,
}

impl PendingSubmission {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("user_id", &self.user_id)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("[{}] submission dropped before its reply", self.user_id);

        if let Ok(mut state) = self.state.try_write() {
            state.settle(&self.user_id, &self.message, Err(ABANDONED_CAUSE.to_string()));
            return;
        }

        // Lock is contended; finish on the runtime.
        let state = Arc::clone(&self.state);
        let user_id = std::mem::take(&mut self.user_id);
        let message = std::mem::take(&mut self.message);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    state
                        .write()
                        .await
                        .settle(&user_id, &message, Err(ABANDONED_CAUSE.to_string()));
                });
            }
            Err(_) => error!("[{}] no runtime to settle dropped submission; session stays busy", user_id),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    log: Vec<Turn>,
    draft: String,
    machine: StateMachine,
    last_error: Option<String>,
}

impl SessionState {
    /// Append the assistant turn for the submission in flight and go idle.
    fn settle(&mut self, user_id: &str, message: &str, result: Result<ChatReply, String>) -> SubmitOutcome {
        let (event, outcome) = match result {
            Ok(reply) => {
                let route = reply.route.clone();
                info!("[{}] answer received via route {}", user_id, route);
                (
                    SessionEvent::ResponseReceived { route },
                    SubmitOutcome::Answered(reply.into_turn()),
                )
            }
            Err(error) => {
                error!("[{}] gateway failed for message {:?}: {}", user_id, message, error);
                self.last_error = Some(error.clone());
                (
                    SessionEvent::GatewayFailed { error },
                    SubmitOutcome::Failed(Turn::assistant_error(BACKEND_ERROR_MESSAGE)),
                )
            }
        };

        if let Err(e) = self.machine.try_handle_event(event) {
            warn!("[{}] {}", user_id, e);
        }
        if let Some(turn) = outcome.turn() {
            self.log.push(turn.clone());
        }
        outcome
    }
}

pub struct ChatSession {
    user_id: String,
    gateway: Arc<dyn ChatGateway>,
    state: Arc<RwLock<SessionState>>,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    pub fn new(gateway: Arc<dyn ChatGateway>, user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            gateway,
            state: Arc::new(RwLock::new(SessionState::default())),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Replace the draft. Allowed while a request is outstanding.
    pub async fn update_draft(&self, text: impl Into<String>) {
        self.state.write().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.state.read().await.draft.clone()
    }

    /// Snapshot of the conversation, oldest turn first.
    pub async fn current_log(&self) -> Vec<Turn> {
        self.state.read().await.log.clone()
    }

    pub async fn turn_count(&self) -> usize {
        self.state.read().await.log.len()
    }

    pub async fn is_busy(&self) -> bool {
        self.state.read().await.machine.state().is_busy()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.read().await.machine.state()
    }

    /// Diagnostic text of the most recent gateway failure.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn transitions(&self) -> Vec<StateTransition> {
        self.state.read().await.machine.history().to_vec()
    }

    /// Send the draft to the router and record the outcome in the log.
    ///
    /// Suspends only while the gateway call is in flight. The draft is
    /// cleared and the user turn appended before that point. If this future
    /// is dropped mid-flight, the error turn is appended and the session
    /// goes idle.
    pub async fn submit(&self) -> SubmitOutcome {
        let pending = match self.begin_submit().await {
            Ok(pending) => pending,
            Err(SubmitRejected::Busy) => return SubmitOutcome::Busy,
            Err(_) => return SubmitOutcome::Skipped,
        };

        let result = self.gateway.chat(&self.user_id, pending.message()).await;
        self.finish(pending, result).await
    }

    /// First half of [`submit`](Self::submit): validate and accept the draft.
    ///
    /// On success the user turn is in the log, the draft is empty and the
    /// session is busy. All of that happens under one write lock, so two
    /// concurrent callers can never both be accepted.
    pub async fn begin_submit(&self) -> Result<PendingSubmission, SubmitRejected> {
        let mut state = self.state.write().await;

        if !state.machine.state().accepts_submission() {
            debug!("[{}] submit rejected: request outstanding", self.user_id);
            return Err(SubmitRejected::Busy);
        }

        let message = state.draft.trim().to_string();
        if message.is_empty() {
            return Err(SubmitRejected::EmptyDraft);
        }

        state.log.push(Turn::user(message.clone()));
        state.draft.clear();
        state.machine.handle_event(SessionEvent::UserMessageSent);
        info!(
            "[{}] submitted message ({} chars), log length {}",
            self.user_id,
            message.len(),
            state.log.len()
        );

        Ok(PendingSubmission {
            message,
            user_id: self.user_id.clone(),
            state: Arc::clone(&self.state),
            settled: false,
        })
    }

    /// Second half of [`submit`](Self::submit): record the gateway result.
    ///
    /// Appends exactly one assistant turn and leaves the session idle. A
    /// submission from another session is refused; dropping it settles it
    /// as a failure in the session it came from.
    pub async fn complete_submit(
        &self,
        pending: PendingSubmission,
        result: Result<ChatReply, GatewayError>,
    ) -> Result<SubmitOutcome, SubmitRejected> {
        if !Arc::ptr_eq(&pending.state, &self.state) {
            warn!(
                "[{}] refused a submission from session {}",
                self.user_id, pending.user_id
            );
            return Err(SubmitRejected::ForeignSubmission);
        }
        Ok(self.finish(pending, result).await)
    }

    async fn finish(
        &self,
        mut pending: PendingSubmission,
        result: Result<ChatReply, GatewayError>,
    ) -> SubmitOutcome {
        let mut state = self.state.write().await;
        pending.settled = true;
        state.settle(&self.user_id, &pending.message, result.map_err(|e| e.to_string()))
    }
}
