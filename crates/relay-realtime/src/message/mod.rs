//! Wire frames, event envelopes, and reply payloads.

pub mod builder;
pub mod envelope;
pub mod serializer;
pub mod types;
pub mod validator;

pub use envelope::{ChannelSpec, EventEnvelope};
pub use types::{Frame, OutboundMessage, Reply, ReplyStatus};
