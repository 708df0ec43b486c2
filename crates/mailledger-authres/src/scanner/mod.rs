//! Cursor over a header value.
//!
//! The cursor owns one position into an immutable byte slice. Every token
//! operation either advances past what it matched or leaves the position
//! untouched and reports failure. Text is decoded one scalar at a time so
//! malformed UTF-8 is reported where it occurs instead of being replaced.

mod cfws;

use crate::charset::{is_atext, is_digit, is_qtext, is_vchar, is_wsp};
use crate::error::{AtomDefect, Error, ErrorKind, Result};

/// Scanner state for one parse call.
#[derive(Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    max_comment_depth: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8], max_comment_depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            max_comment_depth,
        }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns true if the whole input has been consumed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Peeks at the current byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Creates an error at the current position.
    #[must_use]
    pub const fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.pos)
    }

    /// Consumes `expected` if it is the next byte.
    pub fn consume_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes `token` if the input continues with it (case-sensitive).
    pub fn consume_literal(&mut self, token: &str) -> bool {
        if self.input[self.pos..].starts_with(token.as_bytes()) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Consumes the maximal run of atext.
    ///
    /// Dots are part of the run only if `allow_dot` is set. Unless
    /// `permissive`, a run with a leading, doubled, or trailing dot is
    /// rejected. The position is unchanged on failure.
    pub fn consume_atom(&mut self, allow_dot: bool, permissive: bool) -> Result<&'a str> {
        let start = self.pos;
        let end = self.scan_while(start, |c| is_atext(c, allow_dot))?;
        if end == start {
            return Err(self.error(ErrorKind::InvalidAtom(AtomDefect::Empty)));
        }

        let atom = self.slice(start, end)?;
        if !permissive {
            let defect = if atom.starts_with('.') {
                Some(AtomDefect::LeadingDot)
            } else if atom.contains("..") {
                Some(AtomDefect::DoubleDot)
            } else if atom.ends_with('.') {
                Some(AtomDefect::TrailingDot)
            } else {
                None
            };
            if let Some(defect) = defect {
                return Err(self.error(ErrorKind::InvalidAtom(defect)));
            }
        }

        self.pos = end;
        Ok(atom)
    }

    /// Consumes the maximal run of characters accepted by `pred`.
    ///
    /// Used where a terminator such as `=` has to end a token even though
    /// it is atext.
    pub fn consume_any_text(&mut self, pred: impl Fn(char) -> bool) -> Result<&'a str> {
        let start = self.pos;
        let end = self.scan_while(start, pred)?;
        if end == start {
            return Err(self.error(ErrorKind::InvalidText));
        }
        let text = self.slice(start, end)?;
        self.pos = end;
        Ok(text)
    }

    /// Consumes a run of ASCII digits, which may be empty.
    pub fn scan_digits(&mut self) -> Result<&'a str> {
        let start = self.pos;
        let end = self.scan_while(start, is_digit)?;
        let digits = self.slice(start, end)?;
        self.pos = end;
        Ok(digits)
    }

    /// Consumes a quoted string and returns its unescaped content.
    ///
    /// Returns `None` without consuming anything if the next byte is not a
    /// double quote. Whitespace between pieces of content collapses to a
    /// single space; leading and trailing whitespace is dropped.
    pub fn consume_quoted_string(&mut self) -> Result<Option<String>> {
        if self.peek() != Some(b'"') {
            return Ok(None);
        }
        let start = self.pos;
        self.pos += 1;

        let mut value = String::new();
        let mut pending_space = false;
        loop {
            pending_space |= self.skip_space();
            let Some((c, width)) = self.char_at(self.pos)? else {
                return Err(Error::new(ErrorKind::UnterminatedQuotedString, start));
            };

            let piece_start = value.len();
            match c {
                '"' => {
                    self.pos += width;
                    return Ok(Some(value));
                }
                '\\' => match self.consume_quoted_pair()? {
                    Some(escaped) => value.push(escaped),
                    None if self.is_eof() => {
                        return Err(Error::new(ErrorKind::UnterminatedQuotedString, start));
                    }
                    None => return Err(self.error(ErrorKind::InvalidQuotedString)),
                },
                c if is_qtext(c) => {
                    let end = self.scan_while(self.pos, is_qtext)?;
                    value.push_str(self.slice(self.pos, end)?);
                    self.pos = end;
                }
                _ => return Err(self.error(ErrorKind::InvalidQuotedString)),
            }

            if pending_space && piece_start > 0 {
                value.insert(piece_start, ' ');
            }
            pending_space = false;
        }
    }

    /// Consumes a backslash and the VCHAR or WSP it escapes.
    ///
    /// Returns `None` with the backslash still consumed if input ends or the
    /// escaped character is not allowed; the caller picks the error.
    fn consume_quoted_pair(&mut self) -> Result<Option<char>> {
        debug_assert_eq!(self.peek(), Some(b'\\'));
        self.pos += 1;
        match self.char_at(self.pos)? {
            Some((c, width)) if is_vchar(c) || is_wsp(c) => {
                self.pos += width;
                Ok(Some(c))
            }
            _ => Ok(None),
        }
    }

    /// Skips space, tab, and line folds. Returns true if anything was skipped.
    ///
    /// A fold is CRLF (or a bare LF) immediately followed by WSP.
    fn skip_space(&mut self) -> bool {
        let start = self.pos;
        loop {
            match (self.peek(), self.peek_at(1), self.peek_at(2)) {
                (Some(b' ' | b'\t'), _, _) => self.pos += 1,
                (Some(b'\r'), Some(b'\n'), Some(b' ' | b'\t')) => self.pos += 3,
                (Some(b'\n'), Some(b' ' | b'\t'), _) => self.pos += 2,
                _ => break,
            }
        }
        self.pos > start
    }

    /// Returns the end of the run starting at `from` whose characters satisfy `pred`.
    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> Result<usize> {
        let mut end = from;
        while let Some((c, width)) = self.char_at(end)? {
            if !pred(c) {
                break;
            }
            end += width;
        }
        Ok(end)
    }

    /// Decodes the character at byte offset `at`.
    fn char_at(&self, at: usize) -> Result<Option<(char, usize)>> {
        let Some(&lead) = self.input.get(at) else {
            return Ok(None);
        };
        if lead.is_ascii() {
            return Ok(Some((char::from(lead), 1)));
        }

        let invalid = || Error::new(ErrorKind::InvalidEncoding, at);
        let width = utf8_width(lead).ok_or_else(invalid)?;
        let bytes = self.input.get(at..at + width).ok_or_else(invalid)?;
        let c = std::str::from_utf8(bytes)
            .map_err(|_| invalid())?
            .chars()
            .next()
            .ok_or_else(invalid)?;
        Ok(Some((c, width)))
    }

    fn slice(&self, start: usize, end: usize) -> Result<&'a str> {
        std::str::from_utf8(&self.input[start..end])
            .map_err(|_| Error::new(ErrorKind::InvalidEncoding, start))
    }
}

/// Returns the encoded length of a UTF-8 sequence from its lead byte.
const fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
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

    fn cursor(input: &str) -> Cursor<'_> {
        Cursor::new(input.as_bytes(), 8)
    }

    #[test]
    fn test_consume_byte() {
        let mut c = cursor(";x");
        assert!(!c.consume_byte(b'x'));
        assert_eq!(c.position(), 0);
        assert!(c.consume_byte(b';'));
        assert_eq!(c.position(), 1);
        assert!(c.consume_byte(b'x'));
        assert!(c.is_eof());
        assert!(!c.consume_byte(b'x'));
    }

    #[test]
    fn test_consume_literal() {
        let mut c = cursor("none");
        assert!(!c.consume_literal("None"));
        assert!(!c.consume_literal("nones"));
        assert_eq!(c.position(), 0);
        assert!(c.consume_literal("none"));
        assert!(c.is_eof());
    }

    #[test]
    fn test_consume_atom() {
        let mut c = cursor("mail.example.com; rest");
        assert_eq!(c.consume_atom(true, false).unwrap(), "mail.example.com");
        assert_eq!(c.peek(), Some(b';'));
    }

    #[test]
    fn test_consume_atom_without_dot() {
        let mut c = cursor("header.d");
        assert_eq!(c.consume_atom(false, false).unwrap(), "header");
        assert_eq!(c.peek(), Some(b'.'));
    }

    #[test]
    fn test_consume_atom_empty() {
        let mut c = cursor(";");
        let err = c.consume_atom(true, false).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidAtom(AtomDefect::Empty));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_consume_atom_dot_defects() {
        let cases = [
            (".example.com", AtomDefect::LeadingDot),
            ("example..com", AtomDefect::DoubleDot),
            ("example.com.", AtomDefect::TrailingDot),
            (".", AtomDefect::LeadingDot),
        ];
        for (input, defect) in cases {
            let mut c = cursor(input);
            let err = c.consume_atom(true, false).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidAtom(defect), "{input}");
            assert_eq!(c.position(), 0);
        }
    }

    #[test]
    fn test_consume_atom_permissive() {
        let mut c = cursor("..odd..");
        assert_eq!(c.consume_atom(true, true).unwrap(), "..odd..");
    }

    #[test]
    fn test_consume_atom_multibyte() {
        let mut c = cursor("bücher.例え;");
        assert_eq!(c.consume_atom(true, false).unwrap(), "bücher.例え");
        assert_eq!(c.peek(), Some(b';'));
    }

    #[test]
    fn test_consume_atom_invalid_utf8() {
        let mut c = Cursor::new(b"abc\xff", 8);
        let err = c.consume_atom(true, false).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEncoding);
        assert_eq!(err.position(), 3);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_truncated_utf8_sequence() {
        let mut c = Cursor::new(b"ab\xc3", 8);
        let err = c.consume_atom(true, false).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_surrogate_encoding_rejected() {
        let mut c = Cursor::new(b"\xed\xa0\x80", 8);
        let err = c.consume_atom(true, false).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidEncoding);
    }

    #[test]
    fn test_consume_any_text() {
        let mut c = cursor("spf=pass");
        assert_eq!(c.consume_any_text(|ch| is_atext(ch, false) && ch != '=').unwrap(), "spf");
        assert_eq!(c.peek(), Some(b'='));

        let err = c.consume_any_text(|ch| ch != '=').unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidText);
        assert_eq!(c.position(), 3);
    }

    #[test]
    fn test_scan_digits() {
        let mut c = cursor("12 x");
        assert_eq!(c.scan_digits().unwrap(), "12");
        assert_eq!(c.scan_digits().unwrap(), "");
        assert_eq!(c.position(), 2);
    }

    #[test]
    fn test_scan_digits_at_end_of_input() {
        let mut c = cursor("1");
        assert_eq!(c.scan_digits().unwrap(), "1");
        assert!(c.is_eof());
        assert_eq!(c.scan_digits().unwrap(), "");
    }

    #[test]
    fn test_quoted_string_absent() {
        let mut c = cursor("value");
        assert_eq!(c.consume_quoted_string().unwrap(), None);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_quoted_string() {
        let mut c = cursor("\"signature verification failed\" rest");
        assert_eq!(
            c.consume_quoted_string().unwrap().as_deref(),
            Some("signature verification failed")
        );
        assert_eq!(c.peek(), Some(b' '));
    }

    #[test]
    fn test_quoted_string_collapses_whitespace() {
        let mut c = cursor("\"  bad \t key  \"");
        assert_eq!(c.consume_quoted_string().unwrap().as_deref(), Some("bad key"));
        assert!(c.is_eof());
    }

    #[test]
    fn test_quoted_string_keeps_specials() {
        let mut c = cursor("\"a; (b) @c\"");
        assert_eq!(c.consume_quoted_string().unwrap().as_deref(), Some("a; (b) @c"));
    }

    #[test]
    fn test_quoted_string_escapes() {
        let mut c = cursor(r#""say \"hi\" \\ now""#);
        assert_eq!(
            c.consume_quoted_string().unwrap().as_deref(),
            Some(r#"say "hi" \ now"#)
        );
    }

    #[test]
    fn test_quoted_string_empty() {
        let mut c = cursor("\"\"");
        assert_eq!(c.consume_quoted_string().unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_quoted_string_unterminated() {
        let mut c = cursor("\"never closed");
        let err = c.consume_quoted_string().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnterminatedQuotedString);
        assert_eq!(err.position(), 0);

        let mut c = cursor("\"dangling \\");
        let err = c.consume_quoted_string().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnterminatedQuotedString);
    }

    #[test]
    fn test_quoted_string_control_character() {
        let mut c = cursor("\"bad\x01\"");
        let err = c.consume_quoted_string().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidQuotedString);
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn test_skip_space_folds() {
        let mut c = cursor(" \t\r\n\tx");
        assert!(c.skip_space());
        assert_eq!(c.peek(), Some(b'x'));

        let mut c = cursor("\n x");
        assert!(c.skip_space());
        assert_eq!(c.peek(), Some(b'x'));

        let mut c = cursor("\r\nx");
        assert!(!c.skip_space());
        assert_eq!(c.position(), 0);
    }
}
