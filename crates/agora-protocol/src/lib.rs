//! # agora-protocol — Agent-to-Agent Request Protocol
//!
//! One request and one response per stream:
//!
//! ```text
//! client                                  handler
//!   | -- {"type", "sessionToken", ...}\n --> |  decode, authenticate,
//!   |                                        |  dispatch, gate, attest
//!   | <-- {"requestID", "status", ...}\n --- |
//!   |                                   close|
//! ```
//!
//! The handler is stateless across invocations. All shared state lives in
//! the injected collaborators: the [`SessionStore`](agora_session::SessionStore),
//! the [`PolicyGate`](agora_firewall::PolicyGate), a [`ToolExecutor`], and an
//! optional [`CardProvider`]. Transports plug in through [`Stream`], so the
//! same handler serves P2P substreams, TCP connections, and in-memory pipes.

pub mod card;
pub mod client;
pub mod codec;
pub mod error;
pub mod executor;
pub mod handler;
pub mod message;
pub mod stream;

pub use card::{AgentCard, CardAttestation, ToolDescriptor};
pub use client::{send_request, send_request_with_limit};
pub use codec::{read_message, write_message, DEFAULT_MAX_MESSAGE_BYTES};
pub use error::{CodecError, ProtocolError};
pub use executor::{CardProvider, ToolError, ToolExecutor};
pub use handler::ProtocolHandler;
pub use message::{Request, RequestType, Response, ResponseStatus};
pub use stream::Stream;

/// Protocol identifier for transports that route streams by name.
pub const PROTOCOL_ID: &str = "/agora/a2a/1.0.0";
