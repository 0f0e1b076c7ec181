//! Request-line and status-line parsing and formatting.

use wireline_types::Method;

use crate::error::FrameError;
use crate::version::HttpVersion;

/// A parsed request-line: `method SP request-target SP HTTP-version`.
///
/// The target is kept as the raw octets between the two spaces; resolving it
/// into origin/absolute/authority/asterisk form happens separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The request method, preserved verbatim.
    pub method: Method,
    /// The raw request-target.
    pub target: String,
    /// The protocol version.
    pub version: HttpVersion,
}

impl RequestLine {
    /// Parse a request-line from the bytes of one line (no terminator).
    ///
    /// The method is the token before the first SP; the version is located
    /// by the last occurrence of `" HTTP/"` so that a target containing the
    /// bytes `HTTP/` cannot confuse the split. The target between them must
    /// contain no whitespace.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidFormat`] for a missing method or version,
    /// [`FrameError::InvalidTarget`] for an empty or whitespace-containing
    /// target, and the [`HttpVersion::parse`] errors for the version token.
    pub fn parse(line: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(line)
            .map_err(|_| FrameError::InvalidFormat("request-line is not valid UTF-8"))?;

        let (method_text, rest) = text
            .split_once(' ')
            .ok_or(FrameError::InvalidFormat("request-line missing spaces"))?;
        let method = Method::from_bytes(method_text.as_bytes())
            .ok_or(FrameError::InvalidFormat("invalid method token"))?;

        let version_at = rest
            .rfind(" HTTP/")
            .ok_or(FrameError::InvalidFormat("request-line missing HTTP-version"))?;
        let target = &rest[..version_at];
        let version = HttpVersion::parse(&rest[version_at + 1..])?;

        if target.is_empty() || target.bytes().any(|b| b == b' ' || b == b'\t') {
            return Err(FrameError::InvalidTarget);
        }

        Ok(Self {
            method,
            target: target.to_string(),
            version,
        })
    }

    /// Format as the exact wire line, without terminator.
    #[must_use]
    pub fn format(&self) -> String {
        format!("{} {} {}", self.method, self.target, self.version)
    }
}

/// A parsed status-line: `HTTP-version SP status-code SP [reason-phrase]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// The protocol version.
    pub version: HttpVersion,
    /// The three-digit status code, in `[100, 999]`.
    pub status_code: u16,
    /// The reason phrase, if one was sent. Recipients should not rely on it.
    pub reason_phrase: Option<String>,
}

impl StatusLine {
    /// Parse a status-line from the bytes of one line (no terminator).
    ///
    /// The SP after the status code is required even when the reason phrase
    /// is absent (RFC 9112 §4).
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidStatusCode`] if the code is not exactly three
    /// digits, [`FrameError::StatusCodeOutOfRange`] outside `[100, 999]`,
    /// and [`FrameError::InvalidFormat`] for structural problems.
    pub fn parse(line: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(line)
            .map_err(|_| FrameError::InvalidFormat("status-line is not UTF-8"))?;

        let (version_text, rest) = text
            .split_once(' ')
            .ok_or(FrameError::InvalidFormat("status-line missing spaces"))?;
        let version = HttpVersion::parse(version_text)?;

        // The separator after the code is mandatory; "HTTP/1.1 200" is short.
        let (code_text, reason_text) = rest
            .split_once(' ')
            .ok_or(FrameError::InvalidFormat("missing space after status code"))?;

        if code_text.len() != 3 || !code_text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FrameError::InvalidStatusCode);
        }
        let status_code: u16 = code_text
            .parse()
            .map_err(|_| FrameError::InvalidStatusCode)?;
        if !(100..=999).contains(&status_code) {
            return Err(FrameError::StatusCodeOutOfRange(status_code));
        }

        if reason_text
            .bytes()
            .any(|b| b < 0x20 && b != b'\t' || b == 0x7F)
        {
            return Err(FrameError::InvalidFormat("control byte in reason phrase"));
        }

        let reason_phrase = if reason_text.is_empty() {
            None
        } else {
            Some(reason_text.to_string())
        };

        Ok(Self {
            version,
            status_code,
            reason_phrase,
        })
    }

    /// Format as the exact wire line, without terminator.
    ///
    /// The SP after the status code is always emitted, reason or not.
    #[must_use]
    pub fn format(&self) -> String {
        match &self.reason_phrase {
            Some(reason) => format!("{} {} {}", self.version, self.status_code, reason),
            None => format!("{} {} ", self.version, self.status_code),
        }
    }
}
