//! RFC 5322 character classes, extended for UTF-8 by RFC 6532.
//!
//! Every scanning decision in the parser reduces to one of these predicates.

/// Returns true if `c` is an RFC 5322 atext character.
///
/// Period is included only when `allow_dot` is set.
#[must_use]
pub const fn is_atext(c: char, allow_dot: bool) -> bool {
    match c {
        '.' => allow_dot,
        // RFC 5322 3.2.3 specials
        '(' | ')' | '<' | '>' | '[' | ']' | ':' | ';' | '@' | '\\' | ',' | '"' => false,
        _ => is_vchar(c),
    }
}

/// Returns true if `c` is an RFC 5322 qtext character.
#[must_use]
pub const fn is_qtext(c: char) -> bool {
    !matches!(c, '\\' | '"') && is_vchar(c)
}

/// Returns true if `c` is an RFC 5322 ctext character.
#[must_use]
pub const fn is_cchar(c: char) -> bool {
    !matches!(c, '(' | ')' | '\\') && is_vchar(c)
}

/// Returns true if `c` is a visible (printing) character.
#[must_use]
pub const fn is_vchar(c: char) -> bool {
    matches!(c, '!'..='~') || is_multibyte(c)
}

/// Returns true if `c` encodes to more than one UTF-8 byte (RFC 6532).
#[must_use]
pub const fn is_multibyte(c: char) -> bool {
    c as u32 >= 0x80
}

/// Returns true if `c` is WSP (space or horizontal tab, RFC 5234 Appendix B).
#[must_use]
pub const fn is_wsp(c: char) -> bool {
    matches!(c, ' ' | '\t')
}

/// Returns true if `c` is an ASCII digit.
#[must_use]
pub const fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}
