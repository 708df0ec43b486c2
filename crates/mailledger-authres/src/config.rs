//! Parser configuration types.

use crate::types::PropertyType;

/// Default limit on comment nesting.
pub const DEFAULT_MAX_COMMENT_DEPTH: usize = 32;

/// Which property types a propspec may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PropertyTypePolicy {
    /// Only `smtp`, `header`, `body`, `policy`, and `mailfrom`.
    #[default]
    Legacy,
    /// The legacy set plus later IANA registrations (`dnsbl`).
    Registered,
    /// Any atom is accepted as a property type.
    Any,
}

impl PropertyTypePolicy {
    /// Returns true if `ptype` is acceptable under this policy.
    #[must_use]
    pub fn accepts(self, ptype: &str) -> bool {
        match self {
            Self::Legacy => PropertyType::from_name(ptype).is_some_and(PropertyType::is_legacy),
            Self::Registered => PropertyType::from_name(ptype).is_some(),
            Self::Any => true,
        }
    }
}

/// Authentication-Results parser options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting of parenthesized comments.
    pub max_comment_depth: usize,
    /// Accepted property types.
    pub ptype_policy: PropertyTypePolicy,
}

impl ParseOptions {
    /// Creates options with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_comment_depth: DEFAULT_MAX_COMMENT_DEPTH,
            ptype_policy: PropertyTypePolicy::Legacy,
        }
    }

    /// Creates an options builder.
    #[must_use]
    pub const fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for parser options.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptionsBuilder {
    max_comment_depth: usize,
    ptype_policy: PropertyTypePolicy,
}

impl ParseOptionsBuilder {
    /// Creates a new builder with the defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_comment_depth: DEFAULT_MAX_COMMENT_DEPTH,
            ptype_policy: PropertyTypePolicy::Legacy,
        }
    }

    /// Sets the maximum comment nesting.
    #[must_use]
    pub const fn max_comment_depth(mut self, depth: usize) -> Self {
        self.max_comment_depth = depth;
        self
    }

    /// Sets the property type policy.
    #[must_use]
    pub const fn ptype_policy(mut self, policy: PropertyTypePolicy) -> Self {
        self.ptype_policy = policy;
        self
    }

    /// Builds the options.
    #[must_use]
    pub const fn build(self) -> ParseOptions {
        ParseOptions {
            max_comment_depth: self.max_comment_depth,
            ptype_policy: self.ptype_policy,
        }
    }
}

impl Default for ParseOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.max_comment_depth, DEFAULT_MAX_COMMENT_DEPTH);
        assert_eq!(options.ptype_policy, PropertyTypePolicy::Legacy);
        assert_eq!(ParseOptions::builder().build(), options);
    }

    #[test]
    fn test_builder() {
        let options = ParseOptions::builder()
            .max_comment_depth(4)
            .ptype_policy(PropertyTypePolicy::Any)
            .build();
        assert_eq!(options.max_comment_depth, 4);
        assert_eq!(options.ptype_policy, PropertyTypePolicy::Any);
    }

    #[test]
    fn test_legacy_policy() {
        let policy = PropertyTypePolicy::Legacy;
        for ptype in ["smtp", "header", "body", "policy", "mailfrom", "SMTP"] {
            assert!(policy.accepts(ptype), "{ptype}");
        }
        assert!(!policy.accepts("dnsbl"));
        assert!(!policy.accepts("x-vendor"));
    }

    #[test]
    fn test_registered_policy() {
        let policy = PropertyTypePolicy::Registered;
        assert!(policy.accepts("dnsbl"));
        assert!(policy.accepts("header"));
        assert!(!policy.accepts("x-vendor"));
    }

    #[test]
    fn test_any_policy() {
        assert!(PropertyTypePolicy::Any.accepts("x-vendor"));
    }
}
