//! Parsed Authentication-Results structures.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed `Authentication-Results` header value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthenticationResults {
    /// Identity of the server that performed the checks.
    pub authserv_id: String,
    /// Header version; only `"1"` is ever accepted.
    pub version: Option<String>,
    /// Verification outcomes in header order.
    pub results: Vec<AuthenticationResult>,
}

impl AuthenticationResults {
    /// Parses a header value with the default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not follow the RFC 7601 grammar.
    pub fn parse(header_value: &str) -> Result<Self> {
        crate::parse(header_value)
    }

    /// Returns true if the header reported no results (`; none`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the results for a method, compared case-insensitively.
    pub fn results_for<'a>(
        &'a self,
        method: &'a str,
    ) -> impl Iterator<Item = &'a AuthenticationResult> + 'a {
        self.results
            .iter()
            .filter(move |r| r.method.eq_ignore_ascii_case(method))
    }
}

impl FromStr for AuthenticationResults {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Outcome of one authentication method (a resinfo).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthenticationResult {
    /// Method name (e.g., "spf", "dkim", "dmarc").
    pub method: String,
    /// Method version, if given as `method/version`.
    pub version: Option<String>,
    /// Result code (e.g., "pass", "fail", "temperror").
    pub result: String,
    /// Human-readable reason from `reason=`.
    pub reason: Option<String>,
    /// Evidence for the result, in header order.
    pub properties: Vec<Property>,
}

impl AuthenticationResult {
    /// Returns the first property with the given type and name.
    ///
    /// Both are compared case-insensitively.
    #[must_use]
    pub fn property(&self, ptype: &str, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.ptype.eq_ignore_ascii_case(ptype) && p.name.eq_ignore_ascii_case(name))
    }

    /// Returns all properties of one type.
    pub fn properties_of(&self, ptype: PropertyType) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(move |p| p.kind() == Some(ptype))
    }
}

/// One `ptype.property=value` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    /// Property type as written in the header (e.g., "smtp", "header").
    pub ptype: String,
    /// Property name (e.g., "mailfrom", "d").
    pub name: String,
    /// Property value with quoting and comments removed.
    pub value: String,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(
        ptype: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            ptype: ptype.into(),
            name: name.into(),
            value: value.into(),
        }
    }

    /// Classifies the property type, if it is a known one.
    #[must_use]
    pub fn kind(&self) -> Option<PropertyType> {
        PropertyType::from_name(&self.ptype)
    }
}

/// Known property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Data from the SMTP session (`smtp.mailfrom`, `smtp.auth`).
    Smtp,
    /// Data from a message header field (`header.d`, `header.from`).
    Header,
    /// Data from the message body.
    Body,
    /// Local policy information (`policy.iprev`).
    Policy,
    /// Envelope sender, as emitted by some older verifiers.
    MailFrom,
    /// DNS blocklist data (RFC 8904).
    Dnsbl,
}

impl PropertyType {
    /// Looks up a property type by name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Smtp,
            Self::Header,
            Self::Body,
            Self::Policy,
            Self::MailFrom,
            Self::Dnsbl,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::Header => "header",
            Self::Body => "body",
            Self::Policy => "policy",
            Self::MailFrom => "mailfrom",
            Self::Dnsbl => "dnsbl",
        }
    }

    /// Returns true for the types accepted before later IANA registrations.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        !matches!(self, Self::Dnsbl)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    fn dkim_result() -> AuthenticationResult {
        AuthenticationResult {
            method: "dkim".into(),
            version: None,
            result: "pass".into(),
            reason: None,
            properties: vec![
                Property::new("header", "d", "example.com"),
                Property::new("header", "s", "sel1"),
                Property::new("policy", "dkim-rules", "strict"),
                Property::new("header", "d", "relay.example.net"),
            ],
        }
    }

    #[test]
    fn test_property_type_from_name() {
        assert_eq!(PropertyType::from_name("smtp"), Some(PropertyType::Smtp));
        assert_eq!(PropertyType::from_name("HEADER"), Some(PropertyType::Header));
        assert_eq!(PropertyType::from_name("MailFrom"), Some(PropertyType::MailFrom));
        assert_eq!(PropertyType::from_name("dnsbl"), Some(PropertyType::Dnsbl));
        assert_eq!(PropertyType::from_name("x-custom"), None);
        assert_eq!(PropertyType::from_name(""), None);
    }

    #[test]
    fn test_property_type_legacy() {
        assert!(PropertyType::Smtp.is_legacy());
        assert!(PropertyType::MailFrom.is_legacy());
        assert!(!PropertyType::Dnsbl.is_legacy());
        assert_eq!(PropertyType::Policy.to_string(), "policy");
    }

    #[test]
    fn test_property_kind() {
        assert_eq!(Property::new("Header", "d", "x").kind(), Some(PropertyType::Header));
        assert_eq!(Property::new("other", "d", "x").kind(), None);
    }

    #[test]
    fn test_property_lookup_returns_first() {
        let result = dkim_result();
        let d = result.property("HEADER", "D").unwrap();
        assert_eq!(d.value, "example.com");
        assert!(result.property("smtp", "mailfrom").is_none());
    }

    #[test]
    fn test_properties_of() {
        let result = dkim_result();
        let headers: Vec<_> = result
            .properties_of(PropertyType::Header)
            .map(|p| p.value.as_str())
            .collect();
        assert_eq!(headers, vec!["example.com", "sel1", "relay.example.net"]);
    }

    #[test]
    fn test_results_for() {
        let results = AuthenticationResults {
            authserv_id: "mx.example.org".into(),
            version: None,
            results: vec![
                dkim_result(),
                AuthenticationResult {
                    method: "spf".into(),
                    result: "fail".into(),
                    ..Default::default()
                },
                AuthenticationResult {
                    method: "DKIM".into(),
                    result: "fail".into(),
                    ..Default::default()
                },
            ],
        };
        assert!(!results.is_empty());
        let dkim: Vec<_> = results.results_for("dkim").map(|r| r.result.as_str()).collect();
        assert_eq!(dkim, vec!["pass", "fail"]);
        assert_eq!(results.results_for("dmarc").count(), 0);
    }
}
