//! voya-client: Streaming session controller for the voya flight-search chat
//!
//! This crate owns the single source of truth for an ongoing conversation:
//! one request per turn, incremental parsing of the server-pushed event
//! stream, and folding each event into a consistent, renderable message
//! history.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod events;
pub mod handle;

pub use controller::SessionController;
pub use conversation::{AssistantState, Conversation, Message, MessageId};
pub use error::{Error, Result};
pub use events::SessionEvent;
pub use handle::SessionHandle;
