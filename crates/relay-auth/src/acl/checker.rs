//! Per-peer channel ACL evaluation.

use std::collections::HashMap;

use super::rule::{ANY_CHANNEL, ChannelAccessRule};

/// The set of channel grants held by one peer.
///
/// An empty set grants nothing. Rules are keyed by name, so a later grant
/// for the same name replaces an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAcl {
    rules: HashMap<String, ChannelAccessRule>,
}

impl ChannelAcl {
    /// Builds an ACL from parsed rules.
    pub fn new(rules: impl IntoIterator<Item = ChannelAccessRule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.name().to_string(), rule))
                .collect(),
        }
    }

    /// Builds an ACL from `name[:code]` strings, skipping blank entries.
    pub fn parse<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            specs
                .into_iter()
                .filter_map(|spec| ChannelAccessRule::parse(spec.as_ref())),
        )
    }

    /// Whether the peer may use `channel`.
    ///
    /// Denies when there are no rules or the channel is empty; otherwise
    /// allows on a `*` grant, an exact name, or the first glob match.
    pub fn has_access(&self, channel: &str) -> bool {
        if self.rules.is_empty() || channel.is_empty() {
            return false;
        }

        if self.rules.contains_key(ANY_CHANNEL) || self.rules.contains_key(channel) {
            return true;
        }

        self.rules.values().any(|rule| rule.matches(channel))
    }

    /// Iterates the rules.
    pub fn rules(&self) -> impl Iterator<Item = &ChannelAccessRule> {
        self.rules.values()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the ACL grants nothing.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
