//! # relay-auth
//!
//! Peer access control and handshake authorization for the relay.
//!
//! ## Modules
//!
//! - `acl`: `name[:r|w|x]` channel grants and wildcard access evaluation
//! - `context`: handshake parameters and the resolved peer descriptor
//! - `provider`: pluggable credential schemes (static table, delegated REST)
//!   and the selective provider that dispatches to them by name
//! - `chain`: tenant resolution and fail-closed evaluation of a tenant's schemes

pub mod acl;
pub mod chain;
pub mod context;
pub mod provider;

pub use acl::{AccessLevel, ChannelAccessRule, ChannelAcl};
pub use chain::AuthorizationChain;
pub use context::{HandshakeContext, PeerDescriptor};
pub use provider::{AuthDecision, AuthorizationProvider, SelectiveProvider};
