//! Channel access rules and per-peer ACL evaluation.

pub mod checker;
pub mod rule;

pub use checker::ChannelAcl;
pub use rule::{AccessLevel, ChannelAccessRule};
