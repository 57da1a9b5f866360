// Request status transitions
// The only legal move is draft -> submitted; submitted is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Draft,
    Submitted,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::Submitted => "submitted",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(RequestStatus::Draft),
            "submitted" => Ok(RequestStatus::Submitted),
            other => Err(format!("unknown request status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    Changed {
        previous_state: RequestStatus,
        new_state: RequestStatus,
    },
    /// Already in the target state; nothing to write
    Unchanged { state: RequestStatus },
}

impl TransitionResult {
    pub fn new_state(&self) -> RequestStatus {
        match self {
            TransitionResult::Changed { new_state, .. } => *new_state,
            TransitionResult::Unchanged { state } => *state,
        }
    }
}

/// Apply a transition to a status.
///
/// Submitting an already submitted request is accepted and reported as
/// `Unchanged` so that a resubmitted lab selection still succeeds.
pub fn apply(current: RequestStatus, transition: StateTransition) -> TransitionResult {
    match (current, transition) {
        (RequestStatus::Draft, StateTransition::Submit) => TransitionResult::Changed {
            previous_state: RequestStatus::Draft,
            new_state: RequestStatus::Submitted,
        },
        (RequestStatus::Submitted, StateTransition::Submit) => TransitionResult::Unchanged {
            state: RequestStatus::Submitted,
        },
    }
}
