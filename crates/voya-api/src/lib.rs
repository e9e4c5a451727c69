//! voya-api: Wire types and streaming transport for the voya chat backend
//!
//! This crate defines the chat protocol shared with the flight-search
//! backend: domain/wire types, the newline-delimited event framing, the typed
//! stream events, and the HTTP transport that issues one request per turn.

pub mod codec;
pub mod error;
pub mod stream;
pub mod transport;
pub mod types;

pub use codec::{DATA_PREFIX, FrameDecoder, data_payload};
pub use error::{Error, Result};
pub use stream::{FinalPayload, Phase, StreamEvent, parse_event};
pub use transport::{ByteChunkStream, HttpTransport, RetryConfig, Transport};
pub use types::*;
