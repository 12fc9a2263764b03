//! A single `channel[:access]` grant.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Rule name granting every channel.
pub const ANY_CHANNEL: &str = "*";

/// Access level carried by a channel grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    /// `r`
    Read,
    /// `w`
    Write,
    /// `x`, and the default when no code is given.
    #[default]
    All,
}

impl AccessLevel {
    /// Parses a one-letter access code (`r`, `w`, `x`), case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "r" => Some(Self::Read),
            "w" => Some(Self::Write),
            "x" => Some(Self::All),
            _ => None,
        }
    }

    /// One-letter code for this level.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::All => "x",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "Read"),
            Self::Write => write!(f, "Write"),
            Self::All => write!(f, "All"),
        }
    }
}

/// A (channel-name-pattern, access-level) grant attached to a peer.
///
/// The name may contain shell-glob wildcards; it is compiled once at parse
/// time. A name that is not a valid glob still matches itself exactly.
#[derive(Debug, Clone)]
pub struct ChannelAccessRule {
    name: String,
    access: AccessLevel,
    matcher: Option<GlobMatcher>,
}

impl ChannelAccessRule {
    /// Creates a rule from a name and access level.
    pub fn new(name: impl Into<String>, access: AccessLevel) -> Self {
        let name = name.into();
        let matcher = compile(&name);
        Self {
            name,
            access,
            matcher,
        }
    }

    /// Parses a `"name:code"` grant.
    ///
    /// The code is taken from the last `:` only when it is one of `r`, `w`,
    /// `x`; otherwise the whole string is the name and access is `All`.
    /// Returns `None` for an empty name.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        let (name, access) = match spec.rsplit_once(':') {
            Some((name, code)) => match AccessLevel::from_code(code.trim()) {
                Some(access) => (name.trim(), access),
                None => (spec, AccessLevel::All),
            },
            None => (spec, AccessLevel::All),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, access))
    }

    /// Channel name or pattern.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Granted access level.
    pub fn access(&self) -> AccessLevel {
        self.access
    }

    /// Whether this rule is the literal `*` grant.
    pub fn is_any(&self) -> bool {
        self.name == ANY_CHANNEL
    }

    /// Whether the rule's glob matches `channel`.
    pub fn matches(&self, channel: &str) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(channel),
            None => self.name == channel,
        }
    }
}

impl PartialEq for ChannelAccessRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.access == other.access
    }
}

impl Eq for ChannelAccessRule {}

impl fmt::Display for ChannelAccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.access.code())
    }
}

fn compile(pattern: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(pattern).literal_separator(false).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Invalid channel pattern, exact match only");
            None
        }
    }
}
