//! Builder helpers for reply payloads.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::types::{Reply, ReplyStatus};

/// Current UTC time as an RFC 3339 string with millisecond precision.
pub fn utc_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build an error reply
pub fn build_error(
    event: Option<&str>,
    transaction: Option<Value>,
    reason: impl Into<String>,
) -> Reply {
    Reply {
        status: ReplyStatus::Error,
        reason: Some(reason.into()),
        timestamp: None,
        event: event.map(str::to_string),
        transaction,
    }
}

/// Build a success reply stamped with the current time
pub fn build_success(event: Option<&str>, transaction: Option<Value>) -> Reply {
    Reply {
        status: ReplyStatus::Success,
        reason: None,
        timestamp: Some(utc_now()),
        event: event.map(str::to_string),
        transaction,
    }
}
