//! Comment and folding white space (RFC 5322 section 3.2.2).

use super::Cursor;
use crate::charset::is_cchar;
use crate::error::{Error, ErrorKind, Result};

impl Cursor<'_> {
    /// Skips any mix of whitespace, line folds, and nested comments.
    ///
    /// # Errors
    ///
    /// Fails if a comment is unterminated, nested deeper than the cursor's
    /// limit, or contains a character outside ctext.
    pub fn skip_cfws(&mut self) -> Result<()> {
        self.skip_space();
        while self.skip_comment(0)? {
            self.skip_space();
        }
        Ok(())
    }

    /// Skips one comment if the cursor is at `(`.
    fn skip_comment(&mut self, depth: usize) -> Result<bool> {
        if self.peek() != Some(b'(') {
            return Ok(false);
        }
        if depth >= self.max_comment_depth {
            return Err(self.error(ErrorKind::CommentTooDeep));
        }
        let start = self.pos;
        self.pos += 1;

        // Each arm consumes at least one byte or leaves the loop.
        loop {
            self.skip_space();
            match self.peek() {
                None => return Err(Error::new(ErrorKind::UnterminatedComment, start)),
                Some(b')') => {
                    self.pos += 1;
                    return Ok(true);
                }
                Some(b'(') => {
                    self.skip_comment(depth + 1)?;
                }
                Some(b'\\') => {
                    if self.consume_quoted_pair()?.is_none() {
                        return Err(if self.is_eof() {
                            Error::new(ErrorKind::UnterminatedComment, start)
                        } else {
                            self.error(ErrorKind::InvalidComment)
                        });
                    }
                }
                Some(_) => {
                    let end = self.scan_while(self.pos, is_cchar)?;
                    if end == self.pos {
                        return Err(self.error(ErrorKind::InvalidComment));
                    }
                    self.pos = end;
                }
            }
        }
    }
}
