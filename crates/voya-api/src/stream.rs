//! Streamed chat events and parsing

use crate::error::{Error, Result};
use crate::types::{ChatResponse, ClarifyInfo, DebugInfo, FlightInfo, ResponseKind, TripInfo};
use serde::{Deserialize, Serialize};

/// Backend phase codes reported by progress events.
///
/// `Done` and `Error` are client-assigned terminal markers; the backend only
/// ever sends the first four inside progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Understanding,
    UnderstandingDone,
    Searching,
    Mocking,
    Done,
    Error,
}

impl Phase {
    /// Check if this phase closes the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Error)
    }

    /// Get a human-readable label for this phase
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Understanding => "understanding your request",
            Phase::UnderstandingDone => "understanding complete",
            Phase::Searching => "searching live flights",
            Phase::Mocking => "generating mock flights",
            Phase::Done => "done",
            Phase::Error => "error",
        }
    }
}

/// Terminal payload for a turn, shared between the streamed `final` event and
/// the buffered response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPayload {
    pub session_id: String,
    pub response_type: ResponseKind,
    pub message: String,
    #[serde(default)]
    pub trip_info: Option<TripInfo>,
    #[serde(default)]
    pub clarify: Option<ClarifyInfo>,
    #[serde(default)]
    pub flights: Vec<FlightInfo>,
    #[serde(default)]
    pub is_mocked: bool,
    #[serde(default)]
    pub debug_info: Option<DebugInfo>,
}

impl From<ChatResponse> for FinalPayload {
    fn from(response: ChatResponse) -> Self {
        Self {
            session_id: response.session_id,
            response_type: response.kind,
            message: response.message,
            trip_info: response.trip_info,
            clarify: response.clarify,
            flights: response.flights,
            is_mocked: response.is_mocked,
            debug_info: response.debug_info,
        }
    }
}

/// One event pushed by the backend during a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// The backend advanced to a new phase
    Progress {
        status: Phase,
        #[serde(default)]
        message: Option<String>,
    },
    /// Terminal event for the turn
    Final(FinalPayload),
    /// The turn failed server-side
    Error { message: String },
}

impl StreamEvent {
    /// Check if this event closes the turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Final(_) | StreamEvent::Error { .. })
    }
}

/// Parse one decoded event-line payload (the text after the `data: ` prefix).
///
/// Any failure (bad JSON, an unrecognized `type`, a missing required field)
/// is a `MalformedEvent` and is fatal to the turn; skipping it would leave
/// the history stuck in a stale progress phase.
pub fn parse_event(payload: &str) -> Result<StreamEvent> {
    serde_json::from_str(payload).map_err(|e| Error::MalformedEvent(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress() {
        let event = parse_event(r#"{"type": "progress", "status": "UNDERSTANDING"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Progress {
                status: Phase::Understanding,
                message: None,
            }
        );
        assert!(!event.is_terminal());
    }

    #[test]
    fn test_parse_progress_with_message() {
        let event = parse_event(
            r#"{"type": "progress", "status": "UNDERSTANDING_DONE", "message": "PEK to SHA, one adult"}"#,
        )
        .unwrap();
        let StreamEvent::Progress { status, message } = event else {
            panic!("expected progress");
        };
        assert_eq!(status, Phase::UnderstandingDone);
        assert_eq!(message.as_deref(), Some("PEK to SHA, one adult"));
    }

    #[test]
    fn test_parse_final_minimal() {
        let event = parse_event(
            r#"{"type": "final", "session_id": "s1", "response_type": "result", "message": "Here are your flights"}"#,
        )
        .unwrap();
        assert!(event.is_terminal());
        let StreamEvent::Final(payload) = event else {
            panic!("expected final");
        };
        assert_eq!(payload.session_id, "s1");
        assert_eq!(payload.response_type, ResponseKind::Result);
        assert!(payload.flights.is_empty());
        assert!(!payload.is_mocked);
    }

    #[test]
    fn test_parse_final_with_clarify() {
        let event = parse_event(
            r#"{
                "type": "final",
                "session_id": "s1",
                "response_type": "clarify",
                "message": "Which cabin?",
                "clarify": {
                    "field": "cabin",
                    "question": "Which cabin?",
                    "options": [{"label": "Economy", "value": "Y"}]
                }
            }"#,
        )
        .unwrap();
        let StreamEvent::Final(payload) = event else {
            panic!("expected final");
        };
        let clarify = payload.clarify.unwrap();
        assert_eq!(clarify.field, "cabin");
        assert_eq!(clarify.options[0].value, "Y");
    }

    #[test]
    fn test_parse_error_event() {
        let event = parse_event(r#"{"type": "error", "message": "intent parsing failed"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Error {
                message: "intent parsing failed".to_string(),
            }
        );
        assert!(event.is_terminal());
    }

    #[test]
    fn test_unrecognized_type_is_malformed() {
        let err = parse_event(r#"{"type": "heartbeat"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEvent(_)));
    }

    #[test]
    fn test_missing_discriminator_is_malformed() {
        assert!(parse_event(r#"{"status": "SEARCHING"}"#).is_err());
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        // final without session_id
        assert!(parse_event(r#"{"type": "final", "response_type": "result", "message": "x"}"#).is_err());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(parse_event(r#"{"type": "progress""#).is_err());
    }

    #[test]
    fn test_unknown_phase_is_malformed() {
        assert!(parse_event(r#"{"type": "progress", "status": "REBOOTING"}"#).is_err());
    }

    #[test]
    fn test_final_payload_from_chat_response() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"session_id": "s9", "type": "result", "message": "done", "is_mocked": true}"#,
        )
        .unwrap();
        let payload = FinalPayload::from(response);
        assert_eq!(payload.session_id, "s9");
        assert_eq!(payload.response_type, ResponseKind::Result);
        assert!(payload.is_mocked);
    }

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(serde_json::to_string(&Phase::UnderstandingDone).unwrap(), "\"UNDERSTANDING_DONE\"");
        let phase: Phase = serde_json::from_str("\"SEARCHING\"").unwrap();
        assert_eq!(phase, Phase::Searching);
    }
}
