//! Line tokenizer.
//!
//! Splits a raw byte buffer into lines under RFC 9112's robustness rules:
//! CRLF is the line terminator, a lone LF is accepted as a lenient
//! equivalent (§2.2 "MAY recognize"), and a bare CR is rejected outright:
//! RFC 9112 §11.1 calls it out as a request-smuggling vector.
//!
//! The tokenizer is byte-exact: line content is returned as slices into the
//! caller's buffer with no decoding, since field values may carry obs-text
//! bytes that are not valid UTF-8.

use crate::error::FrameError;

/// How a line was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// `\r\n`.
    Crlf,
    /// A lone `\n`, accepted leniently.
    Lf,
    /// No terminator; legal only for the final line of a buffer.
    None,
}

/// One tokenized line.
///
/// The content slice never contains `0x0D` or `0x0A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    content: &'a [u8],
    terminator: LineTerminator,
    number: usize,
}

impl<'a> Line<'a> {
    /// Returns the line content without its terminator.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &'a [u8] {
        self.content
    }

    /// Returns how the line was terminated.
    #[inline]
    #[must_use]
    pub fn terminator(&self) -> LineTerminator {
        self.terminator
    }

    /// Returns the 1-based line number.
    #[inline]
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    /// Returns true if the content is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns the number of octets this line occupied on the wire,
    /// terminator included.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        self.content.len()
            + match self.terminator {
                LineTerminator::Crlf => 2,
                LineTerminator::Lf => 1,
                LineTerminator::None => 0,
            }
    }
}

/// Tokenize a buffer into lines.
///
/// A trailing run of bytes without a terminator is returned as a final line
/// with [`LineTerminator::None`]; callers that need a complete protocol
/// element check the terminator of the last line.
///
/// # Errors
///
/// Returns [`FrameError::BareCR`] with the offending 1-based line number if
/// a `0x0D` byte is not immediately followed by `0x0A`.
pub fn tokenize_lines(buffer: &[u8]) -> Result<Vec<Line<'_>>, FrameError> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut number = 1;

    while i < buffer.len() {
        match buffer[i] {
            b'\r' => {
                if buffer.get(i + 1) != Some(&b'\n') {
                    return Err(FrameError::BareCR(number));
                }
                lines.push(Line {
                    content: &buffer[start..i],
                    terminator: LineTerminator::Crlf,
                    number,
                });
                i += 2;
                start = i;
                number += 1;
            }
            b'\n' => {
                lines.push(Line {
                    content: &buffer[start..i],
                    terminator: LineTerminator::Lf,
                    number,
                });
                i += 1;
                start = i;
                number += 1;
            }
            _ => i += 1,
        }
    }

    if start < buffer.len() {
        lines.push(Line {
            content: &buffer[start..],
            terminator: LineTerminator::None,
            number,
        });
    }

    Ok(lines)
}

/// The tokenized head of a message: every line up to and including the
/// blank header/body separator.
#[derive(Debug)]
pub struct HeadLines<'a> {
    /// The lines, blank separator included when present.
    pub lines: Vec<Line<'a>>,
    /// Index of the blank separator line, if one was reached.
    pub separator: Option<usize>,
    /// Octets consumed from the buffer, separator terminator included.
    pub consumed: usize,
}

/// Tokenize only the head of a message, stopping at the first empty
/// terminated line.
///
/// Body bytes are arbitrary octets, so they must never be line-scanned;
/// this variant leaves everything after the separator untouched. When no
/// separator exists yet, every available line is returned and
/// [`HeadLines::separator`] is `None`.
///
/// # Errors
///
/// Returns [`FrameError::BareCR`] exactly like [`tokenize_lines`].
pub fn tokenize_head(buffer: &[u8]) -> Result<HeadLines<'_>, FrameError> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut number = 1;

    while i < buffer.len() {
        match buffer[i] {
            b'\r' => {
                if buffer.get(i + 1) != Some(&b'\n') {
                    return Err(FrameError::BareCR(number));
                }
                let line = Line {
                    content: &buffer[start..i],
                    terminator: LineTerminator::Crlf,
                    number,
                };
                i += 2;
                start = i;
                number += 1;
                let blank = line.is_empty();
                lines.push(line);
                if blank {
                    return Ok(HeadLines {
                        separator: Some(lines.len() - 1),
                        lines,
                        consumed: i,
                    });
                }
            }
            b'\n' => {
                let line = Line {
                    content: &buffer[start..i],
                    terminator: LineTerminator::Lf,
                    number,
                };
                i += 1;
                start = i;
                number += 1;
                let blank = line.is_empty();
                lines.push(line);
                if blank {
                    return Ok(HeadLines {
                        separator: Some(lines.len() - 1),
                        lines,
                        consumed: i,
                    });
                }
            }
            _ => i += 1,
        }
    }

    if start < buffer.len() {
        lines.push(Line {
            content: &buffer[start..],
            terminator: LineTerminator::None,
            number,
        });
    }

    Ok(HeadLines {
        lines,
        separator: None,
        consumed: buffer.len(),
    })
}

/// Find the first empty line: the header/body separator.
#[must_use]
pub fn find_blank_line(lines: &[Line<'_>]) -> Option<usize> {
    lines
        .iter()
        .position(|line| line.is_empty() && line.terminator != LineTerminator::None)
}
