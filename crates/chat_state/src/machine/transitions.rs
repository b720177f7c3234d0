//! Phase transitions - FSM transition logic

use thiserror::Error;

use super::events::SessionEvent;
use super::states::SessionPhase;

/// Error type for invalid phase transitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} with event {event}")]
    InvalidTransition { from: SessionPhase, event: String },
}

/// Represents a phase transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The phase before the transition.
    pub from: SessionPhase,
    /// The phase after the transition.
    pub to: SessionPhase,
    /// The event that triggered the transition.
    pub event: SessionEvent,
    /// Whether the phase actually changed.
    pub changed: bool,
}

/// State machine for a session's submission lifecycle.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current phase.
    current_state: SessionPhase,
    /// Recent transitions, for debugging.
    history: Vec<StateTransition>,
    /// Maximum number of transitions kept in `history`.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::with_state(SessionPhase::Idle)
    }

    pub fn with_state(state: SessionPhase) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    pub fn state(&self) -> SessionPhase {
        self.current_state
    }

    /// Recent transitions, oldest first. Bounded.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Apply `event`. Pairs with no defined transition leave the phase as is.
    pub fn handle_event(&mut self, event: SessionEvent) -> StateTransition {
        let old_state = self.current_state;
        let new_state = Self::compute_next_state(old_state, &event);
        let changed = old_state != new_state;

        self.current_state = new_state;

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Like [`handle_event`](Self::handle_event) but an event with no
    /// transition from the current phase is an error and nothing is recorded.
    pub fn try_handle_event(
        &mut self,
        event: SessionEvent,
    ) -> Result<StateTransition, TransitionError> {
        if !self.can_transition(&event) {
            return Err(TransitionError::InvalidTransition {
                from: self.current_state,
                event: event.name().to_string(),
            });
        }
        Ok(self.handle_event(event))
    }

    fn compute_next_state(state: SessionPhase, event: &SessionEvent) -> SessionPhase {
        use SessionEvent::*;
        use SessionPhase::*;

        match (state, event) {
            (Idle, UserMessageSent) => AwaitingResponse,
            (AwaitingResponse, ResponseReceived { .. }) => Idle,
            (AwaitingResponse, GatewayFailed { .. }) => Idle,
            _ => state,
        }
    }

    pub fn can_transition(&self, event: &SessionEvent) -> bool {
        Self::compute_next_state(self.current_state, event) != self.current_state
    }
}
