//! Error types for Authentication-Results parsing.

/// Result type alias for Authentication-Results parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// A parse failure and the byte offset where it was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at position {position}")]
pub struct Error {
    kind: ErrorKind,
    position: usize,
}

impl Error {
    /// Creates an error of the given kind at a byte offset.
    #[must_use]
    pub const fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Returns the kind of failure.
    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the byte offset into the header value.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Consumes the error, returning its kind.
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

/// Why an atom was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomDefect {
    /// No atom characters at the cursor.
    Empty,
    /// Atom starts with a dot.
    LeadingDot,
    /// Atom contains two consecutive dots.
    DoubleDot,
    /// Atom ends with a dot.
    TrailingDot,
}

impl std::fmt::Display for AtomDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty atom",
            Self::LeadingDot => "leading dot in atom",
            Self::DoubleDot => "double dot in atom",
            Self::TrailingDot => "trailing dot in atom",
        };
        f.write_str(s)
    }
}

/// Kinds of parse failure, one per grammar production.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// The header does not start with an authserv-id.
    #[error("missing authserv-id")]
    AuthServIdMissing,

    /// The header version is present but is not `1`.
    #[error("unsupported version: {0:?}")]
    UnsupportedVersion(String),

    /// A resinfo has no method name.
    #[error("missing method")]
    MethodMissing,

    /// A methodspec is malformed (missing `=` or empty method version).
    #[error("malformed methodspec")]
    MethodSpecSyntax,

    /// A methodspec has no result after `=`.
    #[error("missing result")]
    ResultMissing,

    /// A `reason` is not followed by `=` and a value.
    #[error("malformed reasonspec")]
    ReasonSpecSyntax,

    /// A property type is not accepted by the configured policy.
    #[error("invalid property type: {0:?}")]
    InvalidPType(String),

    /// A propspec is missing its `.`, property name, or `=`.
    #[error("malformed propspec")]
    PropSpecSyntax,

    /// A propspec has no value after `=`.
    #[error("missing property value")]
    PValueMissing,

    /// The input is not valid UTF-8.
    #[error("invalid UTF-8")]
    InvalidEncoding,

    /// An atom is empty or has misplaced dots.
    #[error("invalid atom: {0}")]
    InvalidAtom(AtomDefect),

    /// A text token is empty.
    #[error("invalid text")]
    InvalidText,

    /// A comment has no closing parenthesis.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// A comment contains a character outside ctext.
    #[error("invalid character in comment")]
    InvalidComment,

    /// Comments are nested deeper than the configured limit.
    #[error("comment nesting too deep")]
    CommentTooDeep,

    /// A quoted string has no closing quote.
    #[error("unterminated quoted string")]
    UnterminatedQuotedString,

    /// A quoted string contains a character outside qtext.
    #[error("invalid character in quoted string")]
    InvalidQuotedString,

    /// Input remains after the last resinfo.
    #[error("trailing garbage")]
    TrailingGarbage,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::new(ErrorKind::UnsupportedVersion("2".into()), 12);
        assert_eq!(err.to_string(), "unsupported version: \"2\" at position 12");
    }

    #[test]
    fn test_atom_defect_display() {
        let err = Error::new(ErrorKind::InvalidAtom(AtomDefect::DoubleDot), 3);
        assert_eq!(err.to_string(), "invalid atom: double dot in atom at position 3");
    }

    #[test]
    fn test_error_accessors() {
        let err = Error::new(ErrorKind::TrailingGarbage, 7);
        assert_eq!(err.kind(), &ErrorKind::TrailingGarbage);
        assert_eq!(err.position(), 7);
        assert_eq!(err.clone().into_kind(), ErrorKind::TrailingGarbage);
    }
}
