//! Conversation state: the ordered message history plus derived session fields.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voya_api::{ClarifyInfo, DebugInfo, FlightInfo, Phase, ResponseKind, TripInfo};

/// Stable identity for one history entry, assigned at creation and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub(crate) fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What the single assistant entry for a turn currently shows.
///
/// The entry starts in `Progress`, is rewritten in place as phase events
/// arrive, and ends the turn as either `Final` or `Error`, never stuck
/// mid-progress.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantState {
    /// Being rewritten in place while the backend advances through phases
    Progress { phase: Phase, content: String },
    /// Terminal answer for the turn
    Final {
        kind: ResponseKind,
        content: String,
        trip_info: Option<TripInfo>,
        clarify: Option<ClarifyInfo>,
        flights: Vec<FlightInfo>,
        is_mocked: bool,
    },
    /// The turn failed; `content` is the user-visible reason
    Error { content: String },
}

impl AssistantState {
    /// Current phase of the entry
    pub fn phase(&self) -> Phase {
        match self {
            AssistantState::Progress { phase, .. } => *phase,
            AssistantState::Final { .. } => Phase::Done,
            AssistantState::Error { .. } => Phase::Error,
        }
    }

    /// Visible text of the entry
    pub fn content(&self) -> &str {
        match self {
            AssistantState::Progress { content, .. } => content,
            AssistantState::Final { content, .. } => content,
            AssistantState::Error { content } => content,
        }
    }
}

/// One entry in the ordered history. Insertion order is the authoritative
/// render order.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Immutable user message
    User {
        id: MessageId,
        content: String,
        timestamp: i64,
    },
    /// The assistant entry for one turn
    Assistant {
        id: MessageId,
        state: AssistantState,
        timestamp: i64,
    },
}

impl Message {
    /// Create a user message
    pub(crate) fn user(content: impl Into<String>) -> Self {
        Self::User {
            id: MessageId::fresh(),
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create the progress slot for a new turn
    pub(crate) fn assistant_progress() -> Self {
        Self::Assistant {
            id: MessageId::fresh(),
            state: AssistantState::Progress {
                phase: Phase::Understanding,
                content: String::new(),
            },
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Get the stable id
    pub fn id(&self) -> MessageId {
        match self {
            Self::User { id, .. } => *id,
            Self::Assistant { id, .. } => *id,
        }
    }

    /// Get the role as a string
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    /// Get the visible text
    pub fn content(&self) -> &str {
        match self {
            Self::User { content, .. } => content,
            Self::Assistant { state, .. } => state.content(),
        }
    }
}

/// Conversation state: history, trip interpretation, flight results,
/// clarification prompt, and diagnostics. Mutated only by the session
/// controller; everything else reads.
#[derive(Default)]
pub struct Conversation {
    /// Ordered message history
    pub messages: Vec<Message>,
    /// Current trip interpretation, replaced wholesale
    pub trip_info: Option<TripInfo>,
    /// Current flight results, replaced wholesale
    pub flights: Vec<FlightInfo>,
    /// Pending clarification, cleared at the start of every turn
    pub clarify: Option<ClarifyInfo>,
    /// Whether `flights` is synthetic data
    pub is_mocked: bool,
    /// Diagnostics from the last search
    pub debug_info: Option<DebugInfo>,
    /// Phase of the in-flight turn
    pub current_phase: Option<Phase>,
}

impl Conversation {
    /// Whether a trip interpretation is available
    pub fn has_trip(&self) -> bool {
        self.trip_info.is_some()
    }

    /// Whether flight results are available
    pub fn has_flights(&self) -> bool {
        !self.flights.is_empty()
    }

    /// Whether the backend is waiting on a clarification
    pub fn needs_clarify(&self) -> bool {
        self.clarify.is_some()
    }

    /// Append a message, returning its index
    pub(crate) fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Mutable access to the assistant state at `index`
    pub(crate) fn assistant_state_mut(
        &mut self,
        index: usize,
    ) -> Option<(MessageId, &mut AssistantState)> {
        match self.messages.get_mut(index) {
            Some(Message::Assistant { id, state, .. }) => Some((*id, state)),
            _ => None,
        }
    }

    /// Return to the initial empty state
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
        self.trip_info = None;
        self.flights.clear();
        self.clarify = None;
        self.is_mocked = false;
        self.debug_info = None;
        self.current_phase = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::user("one");
        let b = Message::user("one");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_assistant_state_phase() {
        let progress = AssistantState::Progress {
            phase: Phase::Searching,
            content: String::new(),
        };
        assert_eq!(progress.phase(), Phase::Searching);

        let error = AssistantState::Error {
            content: "failed".to_string(),
        };
        assert_eq!(error.phase(), Phase::Error);
        assert_eq!(error.content(), "failed");
    }

    #[test]
    fn test_derived_flags() {
        let mut conversation = Conversation::default();
        assert!(!conversation.has_trip());
        assert!(!conversation.has_flights());
        assert!(!conversation.needs_clarify());

        conversation.trip_info = Some(TripInfo::default());
        conversation.clarify = Some(ClarifyInfo {
            field: "cabin".to_string(),
            question: "Which cabin?".to_string(),
            options: vec![],
        });
        assert!(conversation.has_trip());
        assert!(conversation.needs_clarify());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut conversation = Conversation::default();
        conversation.push(Message::user("hi"));
        conversation.trip_info = Some(TripInfo::default());
        conversation.is_mocked = true;
        conversation.current_phase = Some(Phase::Done);

        conversation.clear();
        assert!(conversation.messages.is_empty());
        assert!(conversation.trip_info.is_none());
        assert!(!conversation.is_mocked);
        assert!(conversation.current_phase.is_none());
    }
}
