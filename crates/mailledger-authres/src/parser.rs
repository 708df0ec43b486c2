//! Recursive-descent parser for the RFC 7601 `Authentication-Results` grammar.
//!
//! ```text
//! authres-header = authserv-id [ CFWS authres-version ]
//!                  ( no-result / 1*resinfo ) [CFWS]
//! resinfo        = [CFWS] ";" methodspec [ CFWS reasonspec ] [ CFWS 1*propspec ]
//! methodspec     = [CFWS] method [CFWS] "=" [CFWS] result
//! method         = Keyword [ [CFWS] "/" [CFWS] method-version ]
//! reasonspec     = "reason" [CFWS] "=" [CFWS] value
//! propspec       = ptype [CFWS] "." [CFWS] property [CFWS] "=" pvalue
//! pvalue         = [CFWS] ( value / [ [ local-part ] "@" ] domain-name ) [CFWS]
//! ```
//!
//! Productions that may legitimately find nothing return [`Next`] so that
//! the end of a list is a value, never an error.

use crate::charset::is_atext;
use crate::config::{ParseOptions, PropertyTypePolicy};
use crate::error::{AtomDefect, Error, ErrorKind, Result};
use crate::scanner::Cursor;
use crate::types::{AuthenticationResult, AuthenticationResults, Property};

const NO_RESULT: &str = "none";
const REASON: &str = "reason";
const SUPPORTED_VERSION: &str = "1";

/// Outcome of a list production.
#[derive(Debug, PartialEq, Eq)]
enum Next<T> {
    /// One more element.
    Item(T),
    /// The list is exhausted.
    End,
}

/// Authentication-Results parser.
///
/// The parser holds only its options; each call gets its own cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    /// Creates a parser with the given options.
    #[must_use]
    pub const fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Returns the parser options.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses a header value.
    ///
    /// # Errors
    ///
    /// Returns the first grammar violation found; no partial result is
    /// produced.
    pub fn parse(&self, header_value: &str) -> Result<AuthenticationResults> {
        self.parse_bytes(header_value.as_bytes())
    }

    /// Parses a header value that has not been checked for UTF-8 yet.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidEncoding`] for malformed UTF-8 and the
    /// first grammar violation otherwise.
    pub fn parse_bytes(&self, header_value: &[u8]) -> Result<AuthenticationResults> {
        tracing::trace!(len = header_value.len(), "parsing Authentication-Results");
        let mut cursor = Cursor::new(header_value, self.options.max_comment_depth);
        header(&mut cursor, self.options.ptype_policy).inspect_err(|e| {
            tracing::debug!(kind = %e.kind(), position = e.position(), "Authentication-Results rejected");
        })
    }
}

struct MethodSpec<'a> {
    method: &'a str,
    version: Option<&'a str>,
    result: &'a str,
}

fn header(cursor: &mut Cursor<'_>, policy: PropertyTypePolicy) -> Result<AuthenticationResults> {
    cursor.skip_cfws()?;
    let authserv_id = cursor
        .consume_atom(true, false)
        .map_err(|e| empty_as(e, ErrorKind::AuthServIdMissing))?;
    cursor.skip_cfws()?;

    let version_at = cursor.position();
    let version = cursor.scan_digits()?;
    cursor.skip_cfws()?;
    if !version.is_empty() && version != SUPPORTED_VERSION {
        return Err(Error::new(
            ErrorKind::UnsupportedVersion(version.to_owned()),
            version_at,
        ));
    }

    // Every item consumed a ';', so this loop is bounded by the input length.
    let mut results = Vec::new();
    while let Next::Item(result) = resinfo(cursor, policy)? {
        results.push(result);
    }

    cursor.skip_cfws()?;
    if !cursor.is_eof() {
        return Err(cursor.error(ErrorKind::TrailingGarbage));
    }

    Ok(AuthenticationResults {
        authserv_id: authserv_id.to_owned(),
        version: (!version.is_empty()).then(|| version.to_owned()),
        results,
    })
}

fn resinfo(
    cursor: &mut Cursor<'_>,
    policy: PropertyTypePolicy,
) -> Result<Next<AuthenticationResult>> {
    cursor.skip_cfws()?;
    if !cursor.consume_byte(b';') {
        return Ok(Next::End);
    }
    cursor.skip_cfws()?;
    if cursor.consume_literal(NO_RESULT) {
        return Ok(Next::End);
    }

    let spec = method_spec(cursor)?;
    cursor.skip_cfws()?;
    let reason = reason_spec(cursor)?;

    // Every item consumed a non-empty ptype.
    let mut properties = Vec::new();
    while let Next::Item(property) = prop_spec(cursor, policy)? {
        properties.push(property);
    }

    tracing::trace!(
        method = spec.method,
        result = spec.result,
        properties = properties.len(),
        "parsed resinfo"
    );

    Ok(Next::Item(AuthenticationResult {
        method: spec.method.to_owned(),
        version: spec.version.map(str::to_owned),
        result: spec.result.to_owned(),
        reason,
        properties,
    }))
}

fn method_spec<'a>(cursor: &mut Cursor<'a>) -> Result<MethodSpec<'a>> {
    cursor.skip_cfws()?;
    let (method, version) = method(cursor)?;
    cursor.skip_cfws()?;
    if !cursor.consume_byte(b'=') {
        return Err(cursor.error(ErrorKind::MethodSpecSyntax));
    }
    cursor.skip_cfws()?;
    let result = cursor
        .consume_atom(true, false)
        .map_err(|e| empty_as(e, ErrorKind::ResultMissing))?;

    Ok(MethodSpec {
        method,
        version,
        result,
    })
}

fn method<'a>(cursor: &mut Cursor<'a>) -> Result<(&'a str, Option<&'a str>)> {
    let method = cursor
        .consume_any_text(is_method_char)
        .map_err(|e| empty_as(e, ErrorKind::MethodMissing))?;
    cursor.skip_cfws()?;
    if !cursor.consume_byte(b'/') {
        return Ok((method, None));
    }

    cursor.skip_cfws()?;
    let version = cursor.scan_digits()?;
    if version.is_empty() {
        return Err(cursor.error(ErrorKind::MethodSpecSyntax));
    }
    Ok((method, Some(version)))
}

fn reason_spec(cursor: &mut Cursor<'_>) -> Result<Option<String>> {
    if !cursor.consume_literal(REASON) {
        return Ok(None);
    }
    cursor.skip_cfws()?;
    if !cursor.consume_byte(b'=') {
        return Err(cursor.error(ErrorKind::ReasonSpecSyntax));
    }
    cursor.skip_cfws()?;

    let reason = match cursor.consume_quoted_string()? {
        Some(quoted) => quoted,
        None => cursor
            .consume_atom(true, false)
            .map_err(|e| empty_as(e, ErrorKind::ReasonSpecSyntax))?
            .to_owned(),
    };
    cursor.skip_cfws()?;
    Ok(Some(reason))
}

fn prop_spec(cursor: &mut Cursor<'_>, policy: PropertyTypePolicy) -> Result<Next<Property>> {
    cursor.skip_cfws()?;
    let ptype_at = cursor.position();
    let ptype = match cursor.consume_atom(false, false) {
        Ok(ptype) => ptype,
        Err(e) if matches!(e.kind(), ErrorKind::InvalidAtom(_)) => return Ok(Next::End),
        Err(e) => return Err(e),
    };
    if !policy.accepts(ptype) {
        return Err(Error::new(
            ErrorKind::InvalidPType(ptype.to_owned()),
            ptype_at,
        ));
    }

    cursor.skip_cfws()?;
    if !cursor.consume_byte(b'.') {
        return Err(cursor.error(ErrorKind::PropSpecSyntax));
    }
    cursor.skip_cfws()?;
    let name = cursor
        .consume_any_text(is_property_char)
        .map_err(|e| empty_as(e, ErrorKind::PropSpecSyntax))?;
    cursor.skip_cfws()?;
    if !cursor.consume_byte(b'=') {
        return Err(cursor.error(ErrorKind::PropSpecSyntax));
    }

    let value_at = cursor.position();
    let value = pvalue(cursor)?;
    if value.is_empty() {
        return Err(Error::new(ErrorKind::PValueMissing, value_at));
    }

    Ok(Next::Item(Property {
        ptype: ptype.to_owned(),
        name: name.to_owned(),
        value,
    }))
}

fn pvalue(cursor: &mut Cursor<'_>) -> Result<String> {
    cursor.skip_cfws()?;
    let value = if let Some(quoted) = cursor.consume_quoted_string()? {
        with_domain(cursor, quoted)?
    } else if cursor.peek() == Some(b'@') {
        with_domain(cursor, String::new())?
    } else {
        match cursor.consume_any_text(is_value_char) {
            Ok(token) => with_domain(cursor, token.to_owned())?,
            Err(e) if e.kind() == &ErrorKind::InvalidText => String::new(),
            Err(e) => return Err(e),
        }
    };
    cursor.skip_cfws()?;
    Ok(value)
}

/// Appends `@domain` to `local` if the cursor is at an `@`.
fn with_domain(cursor: &mut Cursor<'_>, mut local: String) -> Result<String> {
    if !cursor.consume_byte(b'@') {
        return Ok(local);
    }
    let domain = cursor
        .consume_atom(true, false)
        .map_err(|e| empty_as(e, ErrorKind::PValueMissing))?;
    local.push('@');
    local.push_str(domain);
    Ok(local)
}

/// Replaces an empty-token failure with the production's own error.
fn empty_as(err: Error, kind: ErrorKind) -> Error {
    match err.kind() {
        ErrorKind::InvalidAtom(AtomDefect::Empty) | ErrorKind::InvalidText => {
            Error::new(kind, err.position())
        }
        _ => err,
    }
}

fn is_method_char(c: char) -> bool {
    is_atext(c, false) && c != '=' && c != '/'
}

fn is_property_char(c: char) -> bool {
    is_atext(c, false) && c != '='
}

fn is_value_char(c: char) -> bool {
    is_atext(c, true) && c != '='
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

    fn parse(input: &str) -> Result<AuthenticationResults> {
        Parser::default().parse(input)
    }

    fn kind(input: &str) -> ErrorKind {
        parse(input).unwrap_err().into_kind()
    }

    fn cursor(input: &str) -> Cursor<'_> {
        Cursor::new(input.as_bytes(), 8)
    }

    #[test]
    fn test_resinfo_end_without_semicolon() {
        let mut c = cursor("  ");
        assert_eq!(resinfo(&mut c, PropertyTypePolicy::Legacy).unwrap(), Next::End);
    }

    #[test]
    fn test_resinfo_none_is_end() {
        let mut c = cursor("; none");
        assert_eq!(resinfo(&mut c, PropertyTypePolicy::Legacy).unwrap(), Next::End);
        assert!(c.is_eof());
    }

    #[test]
    fn test_resinfo_item() {
        let mut c = cursor("; spf=pass smtp.mailfrom=example.net; dkim=none");
        let Next::Item(result) = resinfo(&mut c, PropertyTypePolicy::Legacy).unwrap() else {
            panic!("expected a resinfo");
        };
        assert_eq!(result.method, "spf");
        assert_eq!(result.result, "pass");
        assert_eq!(result.properties, vec![Property::new("smtp", "mailfrom", "example.net")]);
        assert_eq!(c.peek(), Some(b';'));
    }

    #[test]
    fn test_prop_spec_end() {
        let mut c = cursor("; next");
        assert_eq!(prop_spec(&mut c, PropertyTypePolicy::Legacy).unwrap(), Next::End);
        assert_eq!(c.peek(), Some(b';'));
    }

    #[test]
    fn test_prop_spec_invalid_encoding_is_fatal() {
        let mut c = Cursor::new(b"\xfe.d=x", 8);
        let err = prop_spec(&mut c, PropertyTypePolicy::Any).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_method_with_version() {
        let mut c = cursor("dkim / 1 =");
        assert_eq!(method(&mut c).unwrap(), ("dkim", Some("1")));
        assert_eq!(c.peek(), Some(b' '));
    }

    #[test]
    fn test_pvalue_forms() {
        let cases = [
            ("example.net", "example.net"),
            ("\"127.0.0.1\"", "127.0.0.1"),
            ("@mail-router.example.net", "@mail-router.example.net"),
            ("sender@example.net", "sender@example.net"),
            ("\"first last\"@example.net", "first last@example.net"),
            ("1362471462 (trailing comment)", "1362471462"),
        ];
        for (input, expected) in cases {
            let mut c = cursor(input);
            assert_eq!(pvalue(&mut c).unwrap(), expected, "{input}");
            assert!(c.is_eof(), "{input}");
        }
    }

    #[test]
    fn test_pvalue_stops_at_equals() {
        let mut c = cursor("abc=def");
        assert_eq!(pvalue(&mut c).unwrap(), "abc");
        assert_eq!(c.peek(), Some(b'='));
    }

    #[test]
    fn test_minimal() {
        let ar = parse("example.org; none").unwrap();
        assert_eq!(ar.authserv_id, "example.org");
        assert_eq!(ar.version, None);
        assert!(ar.results.is_empty());
    }

    #[test]
    fn test_version_at_end_of_input() {
        let ar = parse("example.com 1").unwrap();
        assert_eq!(ar.version.as_deref(), Some("1"));
        assert!(ar.results.is_empty());
    }

    #[test]
    fn test_authserv_id_only() {
        let ar = parse("example.com").unwrap();
        assert_eq!(ar.authserv_id, "example.com");
        assert!(ar.results.is_empty());
    }

    #[test]
    fn test_leading_cfws() {
        let ar = parse(" (relay) example.com; none").unwrap();
        assert_eq!(ar.authserv_id, "example.com");
    }

    #[test]
    fn test_method_version() {
        let ar = parse("example.com; dkim/1=pass").unwrap();
        assert_eq!(ar.results[0].method, "dkim");
        assert_eq!(ar.results[0].version.as_deref(), Some("1"));
    }

    #[test]
    fn test_reason_atom() {
        let ar = parse("example.com; dkim=fail reason=expired header.d=example.com").unwrap();
        assert_eq!(ar.results[0].reason.as_deref(), Some("expired"));
        assert_eq!(ar.results[0].properties.len(), 1);
    }

    #[test]
    fn test_duplicate_properties_kept_in_order() {
        let ar = parse("example.com; dkim=pass header.d=a.example header.i=@b.example header.d=c.example")
            .unwrap();
        let props: Vec<_> = ar.results[0]
            .properties
            .iter()
            .map(|p| format!("{}.{}={}", p.ptype, p.name, p.value))
            .collect();
        assert_eq!(
            props,
            vec!["header.d=a.example", "header.i=@b.example", "header.d=c.example"]
        );
    }

    #[test]
    fn test_error_authserv_id_missing() {
        assert_eq!(kind(""), ErrorKind::AuthServIdMissing);
        assert_eq!(kind("; none"), ErrorKind::AuthServIdMissing);
    }

    #[test]
    fn test_error_authserv_id_dots() {
        assert_eq!(kind(".example.com; none"), ErrorKind::InvalidAtom(AtomDefect::LeadingDot));
        assert_eq!(kind("example..com; none"), ErrorKind::InvalidAtom(AtomDefect::DoubleDot));
        assert_eq!(kind("example.com.; none"), ErrorKind::InvalidAtom(AtomDefect::TrailingDot));
    }

    #[test]
    fn test_error_unsupported_version() {
        let err = parse("example.com 2; none").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedVersion("2".into()));
        assert_eq!(err.position(), 12);
        assert_eq!(kind("example.com 10; none"), ErrorKind::UnsupportedVersion("10".into()));
    }

    #[test]
    fn test_error_method_missing() {
        assert_eq!(kind("example.com; =pass"), ErrorKind::MethodMissing);
    }

    #[test]
    fn test_error_method_spec_syntax() {
        assert_eq!(kind("example.com; spf pass"), ErrorKind::MethodSpecSyntax);
        assert_eq!(kind("example.com; dkim/=pass"), ErrorKind::MethodSpecSyntax);
    }

    #[test]
    fn test_error_result_missing() {
        assert_eq!(kind("example.com; spf="), ErrorKind::ResultMissing);
        assert_eq!(kind("example.com; spf= ; dkim=pass"), ErrorKind::ResultMissing);
    }

    #[test]
    fn test_error_reason_spec_syntax() {
        assert_eq!(kind("example.com; spf=pass reason \"x\""), ErrorKind::ReasonSpecSyntax);
        assert_eq!(kind("example.com; spf=pass reason="), ErrorKind::ReasonSpecSyntax);
    }

    #[test]
    fn test_error_invalid_ptype() {
        let err = parse("example.com; spf=pass dnsbl.zone=example.org").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidPType("dnsbl".into()));
        assert_eq!(err.position(), 22);
    }

    #[test]
    fn test_ptype_policy_registered() {
        let parser = Parser::new(
            ParseOptions::builder()
                .ptype_policy(PropertyTypePolicy::Registered)
                .build(),
        );
        let ar = parser.parse("example.com; spf=pass dnsbl.zone=example.org").unwrap();
        assert_eq!(ar.results[0].properties[0].ptype, "dnsbl");
        assert!(parser.parse("example.com; spf=pass x.y=z").is_err());
    }

    #[test]
    fn test_ptype_policy_any() {
        let parser = Parser::new(ParseOptions::builder().ptype_policy(PropertyTypePolicy::Any).build());
        let ar = parser.parse("example.com; x-vendor=pass vendor.score=7").unwrap();
        assert_eq!(ar.results[0].properties[0], Property::new("vendor", "score", "7"));
    }

    #[test]
    fn test_ptype_case_insensitive() {
        let ar = parse("example.com; spf=pass SMTP.MailFrom=example.net").unwrap();
        assert_eq!(ar.results[0].properties[0].ptype, "SMTP");
    }

    #[test]
    fn test_error_prop_spec_syntax() {
        assert_eq!(kind("example.com; spf=pass smtp =example.net"), ErrorKind::PropSpecSyntax);
        assert_eq!(kind("example.com; spf=pass smtp.=example.net"), ErrorKind::PropSpecSyntax);
        assert_eq!(kind("example.com; spf=pass smtp.mailfrom example.net"), ErrorKind::PropSpecSyntax);
    }

    #[test]
    fn test_error_pvalue_missing() {
        assert_eq!(kind("example.com; spf=pass smtp.mailfrom="), ErrorKind::PValueMissing);
        assert_eq!(kind("example.com; spf=pass smtp.mailfrom=;"), ErrorKind::PValueMissing);
        assert_eq!(kind("example.com; spf=pass smtp.mailfrom=\"\""), ErrorKind::PValueMissing);
        assert_eq!(kind("example.com; spf=pass smtp.mailfrom=user@"), ErrorKind::PValueMissing);
    }

    #[test]
    fn test_error_trailing_garbage() {
        assert_eq!(kind("example.com; none; spf=pass"), ErrorKind::TrailingGarbage);
        assert_eq!(kind("example.com; spf=pass <junk>"), ErrorKind::TrailingGarbage);
        assert_eq!(kind("example.com x"), ErrorKind::TrailingGarbage);
    }

    #[test]
    fn test_error_invalid_encoding() {
        let err = Parser::default().parse_bytes(b"example.com; spf=pass smtp.mailfrom=\xff").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEncoding);
        assert_eq!(err.position(), 36);
    }

    #[test]
    fn test_error_unterminated_comment() {
        assert_eq!(kind("example.com; spf=pass (no end"), ErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_error_unterminated_quoted_string() {
        assert_eq!(
            kind("example.com; dkim=fail reason=\"no end"),
            ErrorKind::UnterminatedQuotedString
        );
    }

    #[test]
    fn test_error_comment_too_deep() {
        let parser = Parser::new(ParseOptions::builder().max_comment_depth(2).build());
        assert!(parser.parse("example.com (a (b)); none").is_ok());
        let err = parser.parse("example.com (a (b (c))); none").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CommentTooDeep);
    }
}
