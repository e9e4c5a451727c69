//! Session event types

use serde::{Deserialize, Serialize};
use voya_api::{Phase, ResponseKind};

use crate::conversation::MessageId;

/// Events emitted while a turn runs. Renderers subscribe; the controller
/// never blocks on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A turn started
    TurnStart,

    /// The backend advanced to a new phase
    PhaseChange {
        phase: Phase,
        message: Option<String>,
    },

    /// A history entry was appended or rewritten in place
    MessageUpdated { id: MessageId },

    /// The turn finalized
    TurnEnd { kind: ResponseKind },

    /// The turn failed; `message` is the user-visible text
    TurnFailed { message: String },
}

impl SessionEvent {
    /// Check if this event closes the turn
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionEvent::TurnEnd { .. } | SessionEvent::TurnFailed { .. }
        )
    }
}
