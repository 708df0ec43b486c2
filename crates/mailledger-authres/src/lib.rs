//! # mailledger-authres
//!
//! Parser for the email `Authentication-Results` header field (RFC 7601).
//!
//! ## Features
//!
//! - **Full RFC 7601 grammar**: authserv-id, version, `none`, method versions,
//!   reasons, and property specs
//! - **Comments and folding**: nested comments and folded lines are skipped
//!   wherever CFWS is allowed
//! - **Internationalized values**: UTF-8 atoms per RFC 6532, with malformed
//!   encodings rejected rather than replaced
//! - **Precise errors**: each grammar production has its own [`ErrorKind`],
//!   reported with a byte position
//!
//! ## Quick Start
//!
//! ```
//! use mailledger_authres::AuthenticationResults;
//!
//! let ar: AuthenticationResults = "mx.example.com; \
//!     spf=pass smtp.mailfrom=example.net; \
//!     dkim=pass (good signature) header.d=example.net"
//!     .parse()?;
//!
//! assert_eq!(ar.authserv_id, "mx.example.com");
//! for result in &ar.results {
//!     println!("{} = {}", result.method, result.result);
//! }
//!
//! let dkim = ar.results_for("dkim").next().unwrap();
//! assert_eq!(dkim.property("header", "d").unwrap().value, "example.net");
//! # Ok::<(), mailledger_authres::Error>(())
//! ```
//!
//! ### Options
//!
//! ```
//! use mailledger_authres::{ParseOptions, Parser, PropertyTypePolicy};
//!
//! let parser = Parser::new(
//!     ParseOptions::builder()
//!         .ptype_policy(PropertyTypePolicy::Registered)
//!         .max_comment_depth(8)
//!         .build(),
//! );
//! let ar = parser.parse("mx.example.com; dnswl=pass dnsbl.zone=list.example")?;
//! assert_eq!(ar.results[0].properties[0].ptype, "dnsbl");
//! # Ok::<(), mailledger_authres::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod parser;
mod scanner;
mod types;

pub mod charset;

pub use config::{
    DEFAULT_MAX_COMMENT_DEPTH, ParseOptions, ParseOptionsBuilder, PropertyTypePolicy,
};
pub use error::{AtomDefect, Error, ErrorKind, Result};
pub use parser::Parser;
pub use types::{AuthenticationResult, AuthenticationResults, Property, PropertyType};

/// Parses an `Authentication-Results` header value with the default options.
///
/// The input is the field body, after `Authentication-Results:`.
///
/// # Errors
///
/// Returns the first grammar violation found.
pub fn parse(header_value: &str) -> Result<AuthenticationResults> {
    Parser::default().parse(header_value)
}

/// Parses raw header bytes with the default options.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidEncoding`] if the bytes are not valid UTF-8
/// where the grammar reads text, or the first grammar violation found.
pub fn parse_bytes(header_value: &[u8]) -> Result<AuthenticationResults> {
    Parser::default().parse_bytes(header_value)
}
