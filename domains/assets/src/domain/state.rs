//! State machine for upload session transitions
//!
//! Session states: Idle ↔ Staged (staging mutations); Staged → Submitting;
//! Submitting → Done (all files processed) or back to Staged (failure or
//! cancellation, with the error surfaced and the pending list intact).
//! Done is a terminal state.

use serde::{Deserialize, Serialize};

use designbase_common::StateError;

/// Upload session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No pending files (initial)
    Idle,
    /// One or more pending files staged
    Staged,
    /// Batch upload in progress; staging mutations rejected
    Submitting,
    /// All files processed successfully; session closed
    Done,
}

impl SessionState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [SessionState] {
        match self {
            Self::Idle => &[Self::Staged],
            Self::Staged => &[Self::Staged, Self::Idle, Self::Submitting],
            Self::Submitting => &[Self::Done, Self::Staged],
            Self::Done => &[],
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Staged => write!(f, "staged"),
            Self::Submitting => write!(f, "submitting"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Events that trigger session state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// Files were added to the pending list
    AddFiles,
    /// The pending list became empty again
    ClearPending,
    /// Batch submit started
    Submit,
    /// Every file uploaded and recorded
    Complete,
    /// A file's upload or metadata insert failed
    Fail,
    /// The submit was canceled between files
    Cancel,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddFiles => write!(f, "add_files"),
            Self::ClearPending => write!(f, "clear_pending"),
            Self::Submit => write!(f, "submit"),
            Self::Complete => write!(f, "complete"),
            Self::Fail => write!(f, "fail"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Upload session state machine
pub struct SessionStateMachine;

impl SessionStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: SessionState,
        event: SessionEvent,
    ) -> Result<SessionState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            (SessionState::Idle, SessionEvent::AddFiles) => SessionState::Staged,
            (SessionState::Staged, SessionEvent::AddFiles) => SessionState::Staged,
            (SessionState::Staged, SessionEvent::ClearPending) => SessionState::Idle,
            (SessionState::Staged, SessionEvent::Submit) => SessionState::Submitting,
            (SessionState::Submitting, SessionEvent::Complete) => SessionState::Done,
            (SessionState::Submitting, SessionEvent::Fail) => SessionState::Staged,
            (SessionState::Submitting, SessionEvent::Cancel) => SessionState::Staged,
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: SessionState, event: &SessionEvent) -> bool {
        Self::transition(current, *event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod session_state_machine {
        use super::*;

        #[test]
        fn test_idle_to_staged_on_add() {
            let result = SessionStateMachine::transition(SessionState::Idle, SessionEvent::AddFiles);
            assert_eq!(result, Ok(SessionState::Staged));
        }

        #[test]
        fn test_staged_add_stays_staged() {
            let result =
                SessionStateMachine::transition(SessionState::Staged, SessionEvent::AddFiles);
            assert_eq!(result, Ok(SessionState::Staged));
        }

        #[test]
        fn test_staged_clear_returns_to_idle() {
            let result =
                SessionStateMachine::transition(SessionState::Staged, SessionEvent::ClearPending);
            assert_eq!(result, Ok(SessionState::Idle));
        }

        #[test]
        fn test_staged_to_submitting() {
            let result =
                SessionStateMachine::transition(SessionState::Staged, SessionEvent::Submit);
            assert_eq!(result, Ok(SessionState::Submitting));
        }

        #[test]
        fn test_submitting_to_done() {
            let result =
                SessionStateMachine::transition(SessionState::Submitting, SessionEvent::Complete);
            assert_eq!(result, Ok(SessionState::Done));
        }

        #[test]
        fn test_submitting_failure_returns_to_staged() {
            let result =
                SessionStateMachine::transition(SessionState::Submitting, SessionEvent::Fail);
            assert_eq!(result, Ok(SessionState::Staged));
        }

        #[test]
        fn test_submitting_cancel_returns_to_staged() {
            let result =
                SessionStateMachine::transition(SessionState::Submitting, SessionEvent::Cancel);
            assert_eq!(result, Ok(SessionState::Staged));
        }

        #[test]
        fn test_idle_cannot_submit() {
            let result = SessionStateMachine::transition(SessionState::Idle, SessionEvent::Submit);
            assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
        }

        #[test]
        fn test_submitting_rejects_staging_events() {
            let result =
                SessionStateMachine::transition(SessionState::Submitting, SessionEvent::AddFiles);
            assert!(matches!(result, Err(StateError::InvalidTransition { .. })));

            let result = SessionStateMachine::transition(
                SessionState::Submitting,
                SessionEvent::ClearPending,
            );
            assert!(matches!(result, Err(StateError::InvalidTransition { .. })));
        }

        #[test]
        fn test_done_is_terminal() {
            for event in [
                SessionEvent::AddFiles,
                SessionEvent::ClearPending,
                SessionEvent::Submit,
                SessionEvent::Complete,
                SessionEvent::Fail,
                SessionEvent::Cancel,
            ] {
                let result = SessionStateMachine::transition(SessionState::Done, event);
                assert!(matches!(result, Err(StateError::TerminalState(_))));
            }
        }

        #[test]
        fn test_is_terminal() {
            assert!(!SessionState::Idle.is_terminal());
            assert!(!SessionState::Staged.is_terminal());
            assert!(!SessionState::Submitting.is_terminal());
            assert!(SessionState::Done.is_terminal());
        }

        #[test]
        fn test_valid_transitions() {
            assert_eq!(SessionState::Idle.valid_transitions(), &[SessionState::Staged]);

            let staged = SessionState::Staged.valid_transitions();
            assert_eq!(staged.len(), 3);
            assert!(staged.contains(&SessionState::Submitting));
            assert!(staged.contains(&SessionState::Idle));

            let submitting = SessionState::Submitting.valid_transitions();
            assert_eq!(submitting.len(), 2);
            assert!(submitting.contains(&SessionState::Done));
            assert!(submitting.contains(&SessionState::Staged));

            assert!(SessionState::Done.valid_transitions().is_empty());
        }

        #[test]
        fn test_can_transition() {
            assert!(SessionStateMachine::can_transition(
                SessionState::Idle,
                &SessionEvent::AddFiles
            ));
            assert!(SessionStateMachine::can_transition(
                SessionState::Staged,
                &SessionEvent::Submit
            ));
            assert!(!SessionStateMachine::can_transition(
                SessionState::Idle,
                &SessionEvent::Submit
            ));
            assert!(!SessionStateMachine::can_transition(
                SessionState::Done,
                &SessionEvent::AddFiles
            ));
        }

        #[test]
        fn test_state_display() {
            assert_eq!(SessionState::Idle.to_string(), "idle");
            assert_eq!(SessionState::Staged.to_string(), "staged");
            assert_eq!(SessionState::Submitting.to_string(), "submitting");
            assert_eq!(SessionState::Done.to_string(), "done");
        }

        #[test]
        fn test_event_display() {
            assert_eq!(SessionEvent::AddFiles.to_string(), "add_files");
            assert_eq!(SessionEvent::ClearPending.to_string(), "clear_pending");
            assert_eq!(SessionEvent::Submit.to_string(), "submit");
            assert_eq!(SessionEvent::Complete.to_string(), "complete");
            assert_eq!(SessionEvent::Fail.to_string(), "fail");
            assert_eq!(SessionEvent::Cancel.to_string(), "cancel");
        }
    }
}
