//! Lifecycle status of a chat connection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a connection is in its pairing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Transport open, not yet registered.
    #[default]
    Connecting,
    /// Registered without a partner.
    Waiting,
    /// Has a live partner.
    Paired,
    /// Torn down. Terminal.
    Disconnected,
}

impl StateMachine for ConnectionStatus {
    /// Valid transitions:
    /// - Connecting -> Waiting | Paired
    /// - Waiting -> Waiting (repeated `next` while alone) | Paired
    /// - Paired -> Waiting
    /// - any non-terminal -> Disconnected
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionStatus::*;
        matches!(
            (self, target),
            (Connecting, Waiting)
                | (Connecting, Paired)
                | (Waiting, Waiting)
                | (Waiting, Paired)
                | (Paired, Waiting)
                | (Connecting, Disconnected)
                | (Waiting, Disconnected)
                | (Paired, Disconnected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionStatus::*;
        match self {
            Connecting => vec![Waiting, Paired, Disconnected],
            Waiting => vec![Waiting, Paired, Disconnected],
            Paired => vec![Waiting, Disconnected],
            Disconnected => vec![],
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Waiting => "waiting",
            ConnectionStatus::Paired => "paired",
            ConnectionStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}
