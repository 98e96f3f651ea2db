use crate::CoreError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Running,
    Suspended,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::Running => write!(f, "running"),
            SessionState::Suspended => write!(f, "suspended"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Suspend,
    Resume,
    Stop,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Start => write!(f, "start"),
            Transition::Suspend => write!(f, "suspend"),
            Transition::Resume => write!(f, "resume"),
            Transition::Stop => write!(f, "stop"),
        }
    }
}

/// Returns the state a session ends up in after `transition`, or
/// `InvalidTransition` when the transition is not legal from `from`.
///
/// `Resume` from `Uninitialized` is not listed: the session performs an
/// implicit `Start` first.
pub fn validate_transition(
    from: SessionState,
    transition: Transition,
) -> Result<SessionState, CoreError> {
    let next = match (from, transition) {
        (SessionState::Uninitialized | SessionState::Terminated, Transition::Start)
        | (SessionState::Suspended, Transition::Resume) => Some(SessionState::Running),
        (SessionState::Running, Transition::Suspend) => Some(SessionState::Suspended),
        (
            SessionState::Uninitialized | SessionState::Running | SessionState::Suspended,
            Transition::Stop,
        ) => Some(SessionState::Terminated),
        _ => None,
    };

    next.ok_or_else(|| CoreError::InvalidTransition {
        state: from.to_string(),
        transition: transition.to_string(),
    })
}
