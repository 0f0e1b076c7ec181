//! Framing error type.

use std::fmt;

use crate::limits::LimitKind;

/// HTTP framing error.
///
/// Every failure mode of the codec is a variant of this enum so callers can
/// pattern-match without downcasting. The variants fall into five groups:
///
/// - **Syntax** - the input bytes violate the RFC 9112 grammar.
/// - **Framing** - the syntax is well-formed but the message delimitation is
///   ambiguous or dangerous (request smuggling / response splitting vectors).
///   On any of these the caller must close the connection (RFC 9112 §11.2).
/// - **Host** - RFC 9112 §3.2.2 Host-header violations.
/// - **Completeness** - more input is required; feed more bytes and retry
///   (see [`FrameError::is_incomplete`]).
/// - **Limits** - a caller-configured resource cap was breached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    // ---- syntax -------------------------------------------------------
    /// A `0x0D` byte not followed by `0x0A`; carries the 1-based line number.
    BareCR(usize),
    /// A line exceeded the permitted length: `(length, max)`.
    LineTooLong(usize, usize),
    /// A header line has no `:` separator.
    MissingColon,
    /// A header line starts with `:` (empty field name).
    EmptyFieldName,
    /// SP or HTAB between the field name and the colon.
    WhitespaceBeforeColon,
    /// A field name contains a non-token character.
    InvalidFieldName,
    /// A field value contains a forbidden control byte.
    InvalidFieldValueChar,
    /// Malformed protocol element; carries a short reason.
    InvalidFormat(&'static str),
    /// The status code is not exactly three digits.
    InvalidStatusCode,
    /// The status code parsed but lies outside the permitted range.
    StatusCodeOutOfRange(u16),
    /// The literal `HTTP` in an HTTP-version is misspelled or wrong-case.
    InvalidHttpName,
    /// The numeric part of an HTTP-version is malformed.
    InvalidVersionNumber,
    /// A chunk-size line does not parse as hexadecimal.
    InvalidChunkSize,
    /// A chunk announced more data bytes than the buffer holds.
    IncompleteChunk,
    /// The CRLF required after chunk data is missing or wrong.
    MissingCRLF,
    /// The request-target is malformed for its form.
    InvalidTarget,
    /// A continuation line (obs-fold) appeared with no field to continue,
    /// or the policy in force rejects obs-fold entirely.
    ObsFoldWithoutPrecedingField,

    // ---- framing / security -------------------------------------------
    /// `Transfer-Encoding` and `Content-Length` both present on a request.
    AmbiguousMessageFraming,
    /// Multiple `Content-Length` fields with distinct values.
    MultipleContentLengthValues,
    /// `chunked` present but not the final transfer coding.
    ChunkedNotFinalEncoding,
    /// `chunked` applied more than once.
    ChunkedAppliedMultipleTimes,
    /// A response carries both `Transfer-Encoding` and `Content-Length`.
    TransferEncodingWithContentLength,
    /// `Transfer-Encoding` on a response whose status forbids a body.
    TransferEncodingWithIncompatibleStatus(u16),

    // ---- host ---------------------------------------------------------
    /// No `Host` header on a message that requires one.
    MissingHost,
    /// More than one `Host` header.
    MultipleHostHeaders,
    /// The `Host` value is empty, contains whitespace, or is malformed.
    InvalidHostFormat,
    /// The `Host` port is not an integer in `[0, 65535]`.
    InvalidPort,
    /// The `Host` value disagrees with the absolute-form target authority.
    HostMismatchesAuthority,

    // ---- completeness -------------------------------------------------
    /// The body needs more bytes: `{ expected, available }`.
    IncompleteBody {
        /// Bytes the framing headers promised.
        expected: u64,
        /// Bytes actually available.
        available: u64,
    },
    /// No blank line separating headers from body yet.
    MissingHeaderBodySeparator,
    /// The buffer holds no message at all.
    EmptyMessage,

    // ---- limits -------------------------------------------------------
    /// A configured resource limit was breached before buffers grew.
    LimitExceeded {
        /// Which limit.
        kind: LimitKind,
        /// The observed size.
        observed: u64,
        /// The configured cap.
        cap: u64,
    },
}

impl FrameError {
    /// Returns true for completeness errors: the input was valid so far but
    /// more bytes are required. Callers buffer more input and retry.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            Self::IncompleteBody { .. }
                | Self::MissingHeaderBodySeparator
                | Self::EmptyMessage
                | Self::IncompleteChunk
        )
    }

    /// Returns true for framing/security errors, after which the connection
    /// must be closed (RFC 9112 §11).
    #[must_use]
    pub fn requires_close(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousMessageFraming
                | Self::MultipleContentLengthValues
                | Self::ChunkedNotFinalEncoding
                | Self::ChunkedAppliedMultipleTimes
                | Self::TransferEncodingWithContentLength
                | Self::TransferEncodingWithIncompatibleStatus(_)
        )
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BareCR(line) => write!(f, "bare CR on line {line}"),
            Self::LineTooLong(length, max) => {
                write!(f, "line of {length} octets exceeds maximum of {max}")
            }
            Self::MissingColon => write!(f, "header line has no colon"),
            Self::EmptyFieldName => write!(f, "empty field name"),
            Self::WhitespaceBeforeColon => write!(f, "whitespace before colon in field line"),
            Self::InvalidFieldName => write!(f, "invalid character in field name"),
            Self::InvalidFieldValueChar => write!(f, "invalid character in field value"),
            Self::InvalidFormat(reason) => write!(f, "invalid format: {reason}"),
            Self::InvalidStatusCode => write!(f, "status code is not three digits"),
            Self::StatusCodeOutOfRange(code) => write!(f, "status code {code} out of range"),
            Self::InvalidHttpName => write!(f, "HTTP-version does not start with \"HTTP\""),
            Self::InvalidVersionNumber => write!(f, "invalid HTTP-version number"),
            Self::InvalidChunkSize => write!(f, "invalid chunk size"),
            Self::IncompleteChunk => write!(f, "chunk data truncated"),
            Self::MissingCRLF => write!(f, "missing CRLF after chunk data"),
            Self::InvalidTarget => write!(f, "invalid request-target"),
            Self::ObsFoldWithoutPrecedingField => write!(f, "obsolete line folding rejected"),
            Self::AmbiguousMessageFraming => {
                write!(f, "both Transfer-Encoding and Content-Length present")
            }
            Self::MultipleContentLengthValues => {
                write!(f, "multiple Content-Length fields with distinct values")
            }
            Self::ChunkedNotFinalEncoding => write!(f, "chunked is not the final transfer coding"),
            Self::ChunkedAppliedMultipleTimes => write!(f, "chunked applied more than once"),
            Self::TransferEncodingWithContentLength => {
                write!(f, "response carries both Transfer-Encoding and Content-Length")
            }
            Self::TransferEncodingWithIncompatibleStatus(code) => {
                write!(f, "Transfer-Encoding not allowed with status {code}")
            }
            Self::MissingHost => write!(f, "missing Host header"),
            Self::MultipleHostHeaders => write!(f, "multiple Host headers"),
            Self::InvalidHostFormat => write!(f, "malformed Host header value"),
            Self::InvalidPort => write!(f, "invalid port in Host header"),
            Self::HostMismatchesAuthority => {
                write!(f, "Host header disagrees with request-target authority")
            }
            Self::IncompleteBody {
                expected,
                available,
            } => write!(f, "body needs {expected} bytes, {available} available"),
            Self::MissingHeaderBodySeparator => write!(f, "missing blank line after headers"),
            Self::EmptyMessage => write!(f, "empty message"),
            Self::LimitExceeded {
                kind,
                observed,
                cap,
            } => write!(f, "{kind} limit exceeded: {observed} > {cap}"),
        }
    }
}

impl std::error::Error for FrameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_classification() {
        assert!(FrameError::MissingHeaderBodySeparator.is_incomplete());
        assert!(FrameError::IncompleteBody {
            expected: 10,
            available: 3
        }
        .is_incomplete());
        assert!(!FrameError::AmbiguousMessageFraming.is_incomplete());
        assert!(!FrameError::BareCR(1).is_incomplete());
    }

    #[test]
    fn close_classification() {
        assert!(FrameError::AmbiguousMessageFraming.requires_close());
        assert!(FrameError::MultipleContentLengthValues.requires_close());
        assert!(!FrameError::MissingColon.requires_close());
    }

    #[test]
    fn display_mentions_detail() {
        let msg = FrameError::BareCR(3).to_string();
        assert!(msg.contains("line 3"));

        let msg = FrameError::LimitExceeded {
            kind: LimitKind::HeaderCount,
            observed: 101,
            cap: 100,
        }
        .to_string();
        assert!(msg.contains("101"));
    }
}
