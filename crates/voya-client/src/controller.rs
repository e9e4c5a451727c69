//! Session controller: owns the conversation and drives one turn at a time.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use voya_api::{
    ChatRequest, ClarifyOption, FinalPayload, FrameDecoder, Phase, ResponseKind, StreamEvent,
    Transport, data_payload, parse_event,
};

use crate::{
    conversation::{AssistantState, Conversation, Message},
    error::{Error, Result},
    events::SessionEvent,
    handle::SessionHandle,
};

/// How a turn talks to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnMode {
    /// Incremental event stream
    Streaming,
    /// One buffered response payload
    Buffered,
}

/// Drives a conversation against the chat backend: one request per turn, a
/// strict single-flight gate, and a single assistant entry per turn that is
/// rewritten in place as the backend advances through phases.
///
/// The controller is the only writer of its [`Conversation`]; renderers read
/// `state()` and subscribe to [`SessionEvent`]s.
pub struct SessionController {
    session_id: String,
    conversation: Conversation,
    transport: Arc<dyn Transport>,
    event_tx: broadcast::Sender<SessionEvent>,
    handle: SessionHandle,
}

impl SessionController {
    /// Create a controller over the given transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            session_id: String::new(),
            conversation: Conversation::default(),
            transport,
            event_tx,
            handle: SessionHandle::new(),
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current conversation state
    pub fn state(&self) -> &Conversation {
        &self.conversation
    }

    /// Backend-assigned session id; empty until the first final event
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Whether a turn is currently in flight
    pub fn is_loading(&self) -> bool {
        self.handle.is_in_flight()
    }

    /// Get a cloneable handle for observing and aborting from outside
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Abort the in-flight turn
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Send a free-text message and run one streamed turn
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.run_turn(text, None, true, TurnMode::Streaming).await
    }

    /// Send a free-text message over the buffered (non-streaming) endpoint.
    /// Event-application rules are identical to the streamed path.
    pub async fn send_buffered(&mut self, text: &str) -> Result<()> {
        self.run_turn(text, None, true, TurnMode::Buffered).await
    }

    /// Resolve the pending clarification by selecting one of its options: the
    /// label becomes a visible user message, the machine value travels as
    /// both the message body and the selected-option echo.
    pub async fn select_option(&mut self, option: &ClarifyOption) -> Result<()> {
        if !self.conversation.needs_clarify() {
            tracing::debug!("no pending clarification, dropping option selection");
            return Ok(());
        }
        if self.handle.is_in_flight() {
            tracing::debug!("turn already in flight, dropping option selection");
            return Ok(());
        }
        self.append_user(option.label.clone());
        self.run_turn(
            &option.value,
            Some(option.value.as_str()),
            false,
            TurnMode::Streaming,
        )
        .await
    }

    /// Return session and conversation to their initial empty values.
    ///
    /// Callers must not reset mid-turn; the `&mut self` receivers on turn
    /// methods keep a same-task mid-turn reset unrepresentable.
    pub fn reset(&mut self) {
        self.session_id.clear();
        self.conversation.clear();
        self.handle.end_turn();
    }

    // ---- turn protocol ----

    async fn run_turn(
        &mut self,
        message: &str,
        selected_option: Option<&str>,
        append_user: bool,
        mode: TurnMode,
    ) -> Result<()> {
        // Single-flight gate: a call while a turn is in flight is dropped,
        // not queued.
        if self.handle.is_in_flight() {
            tracing::debug!("turn already in flight, dropping send");
            return Ok(());
        }
        let cancel = self.handle.begin_turn();
        let _ = self.event_tx.send(SessionEvent::TurnStart);

        if append_user {
            self.append_user(message.to_string());
        }
        self.conversation.clarify = None;
        self.conversation.current_phase = Some(Phase::Understanding);

        // The one history entry this turn may rewrite. Holding the index for
        // the whole turn makes "exactly one mutable slot" structural.
        let slot = self.conversation.push(Message::assistant_progress());
        self.notify_updated(slot);

        let request = ChatRequest::new(
            self.session_id.clone(),
            message,
            selected_option.map(String::from),
        );

        let outcome = match mode {
            TurnMode::Streaming => self.drive_stream(&request, slot, &cancel).await,
            TurnMode::Buffered => self.drive_buffered(&request, slot).await,
        };

        // Loading state clears on every exit path.
        self.handle.end_turn();

        match outcome {
            Ok(kind) => {
                let _ = self.event_tx.send(SessionEvent::TurnEnd { kind });
                Ok(())
            }
            Err(error) => {
                self.fail_slot(slot, &error);
                let _ = self.event_tx.send(SessionEvent::TurnFailed {
                    message: error.user_message(),
                });
                Err(error)
            }
        }
    }

    /// Open the stream and fold every decoded event into the conversation,
    /// in arrival order.
    async fn drive_stream(
        &mut self,
        request: &ChatRequest,
        slot: usize,
        cancel: &CancellationToken,
    ) -> Result<ResponseKind> {
        let mut chunks = self.transport.stream_chat(request).await?;
        let mut decoder = FrameDecoder::new();
        let mut outcome = None;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                next = chunks.next() => next,
            };
            let Some(chunk) = next else { break };

            for line in decoder.push(&chunk?)? {
                let Some(payload) = data_payload(&line) else {
                    continue;
                };
                // The turn is closed once a terminal event lands; anything
                // still in the pipe is ignored.
                if outcome.is_some() {
                    continue;
                }
                if let Some(kind) = self.apply_event(slot, parse_event(payload)?)? {
                    outcome = Some(kind);
                }
            }
            if outcome.is_some() {
                break;
            }
        }

        if let Some(kind) = outcome {
            return Ok(kind);
        }

        // The stream ended without a terminal event. A complete trailing line
        // that merely lost its newline still counts; anything else is a
        // truncated stream.
        if let Some(tail) = decoder.finish() {
            if let Some(payload) = data_payload(&tail) {
                if let Ok(event) = parse_event(payload) {
                    if let Some(kind) = self.apply_event(slot, event)? {
                        return Ok(kind);
                    }
                }
            }
        }
        Err(Error::TruncatedStream)
    }

    /// Buffered mode: one payload, applied through the same rules as a
    /// streamed `final` event.
    async fn drive_buffered(&mut self, request: &ChatRequest, slot: usize) -> Result<ResponseKind> {
        let response = self.transport.send_chat(request).await?;
        self.apply_event(slot, StreamEvent::Final(FinalPayload::from(response)))?
            .ok_or(Error::TruncatedStream)
    }

    /// Apply one parsed event. Returns the response kind once the turn
    /// finalizes, `None` while it is still progressing.
    fn apply_event(&mut self, slot: usize, event: StreamEvent) -> Result<Option<ResponseKind>> {
        match event {
            StreamEvent::Progress { status, message } => {
                self.apply_progress(slot, status, message);
                Ok(None)
            }
            StreamEvent::Final(payload) => {
                // A terminal payload of kind `error` (buffered mode) fails
                // the turn exactly like a streamed error event.
                if payload.response_type == ResponseKind::Error {
                    return Err(Error::Server(payload.message));
                }
                Ok(Some(self.apply_final(slot, payload)))
            }
            StreamEvent::Error { message } => Err(Error::Server(message)),
        }
    }

    fn apply_progress(&mut self, slot: usize, status: Phase, message: Option<String>) {
        self.conversation.current_phase = Some(status);

        if let Some((id, state)) = self.conversation.assistant_state_mut(slot) {
            if let AssistantState::Progress { phase, content } = state {
                *phase = status;
                // Only the extracted understanding summary is shown as
                // progress text; later phases must not overwrite it.
                if status == Phase::UnderstandingDone {
                    if let Some(text) = &message {
                        if !text.is_empty() {
                            *content = text.clone();
                        }
                    }
                }
            }
            let _ = self.event_tx.send(SessionEvent::MessageUpdated { id });
        }

        let _ = self.event_tx.send(SessionEvent::PhaseChange {
            phase: status,
            message,
        });
    }

    /// Fold a terminal payload into the session and rewrite the progress slot
    /// into the final answer bubble.
    fn apply_final(&mut self, slot: usize, payload: FinalPayload) -> ResponseKind {
        let FinalPayload {
            session_id,
            response_type,
            message,
            trip_info,
            clarify,
            flights,
            is_mocked,
            debug_info,
        } = payload;

        self.session_id = session_id;

        if let Some(trip) = trip_info.clone() {
            self.conversation.trip_info = Some(trip);
        }
        if !flights.is_empty() {
            self.conversation.flights = flights.clone();
            self.conversation.is_mocked = is_mocked;
        }
        if let Some(debug) = debug_info {
            self.conversation.debug_info = Some(debug);
        }
        if response_type == ResponseKind::Clarify {
            if let Some(clarify) = clarify.clone() {
                self.conversation.clarify = Some(clarify);
            }
        }
        self.conversation.current_phase = Some(Phase::Done);

        if let Some((id, state)) = self.conversation.assistant_state_mut(slot) {
            *state = AssistantState::Final {
                kind: response_type,
                content: message,
                trip_info,
                clarify,
                flights,
                is_mocked,
            };
            let _ = self.event_tx.send(SessionEvent::MessageUpdated { id });
        }

        response_type
    }

    fn fail_slot(&mut self, slot: usize, error: &Error) {
        self.conversation.current_phase = Some(Phase::Error);
        if let Some((id, state)) = self.conversation.assistant_state_mut(slot) {
            *state = AssistantState::Error {
                content: error.user_message(),
            };
            let _ = self.event_tx.send(SessionEvent::MessageUpdated { id });
        }
    }

    fn append_user(&mut self, content: String) {
        let message = Message::user(content);
        let id = message.id();
        self.conversation.push(message);
        let _ = self.event_tx.send(SessionEvent::MessageUpdated { id });
    }

    fn notify_updated(&self, slot: usize) {
        if let Some(message) = self.conversation.messages.get(slot) {
            let _ = self.event_tx.send(SessionEvent::MessageUpdated {
                id: message.id(),
            });
        }
    }
}
