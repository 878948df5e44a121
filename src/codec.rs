//! Line-oriented persistence format
//!
//! History is stored as plain UTF-8 text, one entry per line, each line
//! terminated by `\n`. There is no header, version tag or escaping: entries
//! must not contain a line terminator. On input a `\r` right before the `\n`
//! is stripped as well, and a final line without terminator is accepted.

use crate::error::{Error, Result};
use std::io::{self, BufRead, Read, Write};

/// Default ceiling on the length of a single history line, in bytes
///
/// A 4096-byte read buffer must also hold the terminator, so the longest
/// accepted line content is 4095 bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4095;

/// Bounded, line-numbered decoder for the history format
///
/// Each call to [`LineReader::next_line`] yields one entry. Lines longer than
/// the configured maximum fail with [`Error::LineTooLong`] and lines that are
/// not valid UTF-8 fail with [`Error::InvalidEncoding`]; both report the
/// 1-based line number. Used as an iterator it stops after the first error.
pub struct LineReader<R> {
    inner: R,
    max_line_length: usize,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Create a reader with the default maximum line length
    pub fn new(inner: R) -> Self {
        Self::with_max_line_length(inner, DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a reader that rejects lines longer than `max_line_length` bytes
    pub fn with_max_line_length(inner: R, max_line_length: usize) -> Self {
        Self {
            inner,
            max_line_length,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Number of lines decoded so far
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Decode the next line, or `None` at end of stream
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();

        // Room for the longest accepted line plus "\r\n".
        let limit = u64::try_from(self.max_line_length)
            .unwrap_or(u64::MAX)
            .saturating_add(2);
        let read = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        let number = self.line + 1;
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }

        if self.buf.len() > self.max_line_length {
            return Err(Error::LineTooLong { line: number });
        }

        let text = std::str::from_utf8(&self.buf)
            .map_err(|_| Error::InvalidEncoding { line: number })?
            .to_owned();
        self.line = number;
        Ok(Some(text))
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.next_line().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

/// Decode every line of `reader`, handing each one to `admit`
///
/// Returns the number of admitted lines. On failure the lines admitted so far
/// stay admitted and the error comes back as [`Error::Interrupted`].
pub fn read_lines<R, F>(reader: R, max_line_length: usize, mut admit: F) -> Result<usize>
where
    R: BufRead,
    F: FnMut(String) -> Result<()>,
{
    let mut lines = LineReader::with_max_line_length(reader, max_line_length);
    let mut count = 0;
    loop {
        let line = match lines.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(count),
            Err(e) => return Err(Error::interrupted(count, e)),
        };
        admit(line).map_err(|e| Error::interrupted(count, e))?;
        count += 1;
    }
}

/// Encode a single entry
pub fn write_line<W: Write + ?Sized>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")
}

/// Encode entries in order, stopping at the first write failure
///
/// Returns the number of lines written. The writer is not flushed.
pub fn write_lines<'a, W, I>(writer: &mut W, lines: I) -> Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut count = 0;
    for line in lines {
        write_line(writer, line).map_err(|e| Error::interrupted(count, e.into()))?;
        count += 1;
    }
    Ok(count)
}
