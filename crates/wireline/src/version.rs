//! HTTP-version parsing and formatting.

use std::fmt;

use crate::error::FrameError;

/// HTTP version: `HTTP/<major>.<minor>`.
///
/// The literal `HTTP` is case-sensitive on parse (RFC 9112 §2.3). The
/// grammar allows a single digit per component; multi-digit components are
/// accepted for forward compatibility but never produced by this library.
///
/// Versions order numerically: `HTTP/1.0 < HTTP/1.1 < HTTP/2.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpVersion {
    /// Major version number.
    pub major: u16,
    /// Minor version number.
    pub minor: u16,
}

impl HttpVersion {
    /// HTTP/1.0
    pub const HTTP10: Self = Self { major: 1, minor: 0 };
    /// HTTP/1.1
    pub const HTTP11: Self = Self { major: 1, minor: 1 };

    /// Parse an HTTP-version token such as `HTTP/1.1`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidHttpName`] if the token does not begin
    /// with the exact bytes `HTTP/`, and [`FrameError::InvalidVersionNumber`]
    /// if the numeric part is not `<digits>.<digits>`.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let numbers = text.strip_prefix("HTTP/").ok_or(FrameError::InvalidHttpName)?;
        let (major, minor) = numbers
            .split_once('.')
            .ok_or(FrameError::InvalidVersionNumber)?;
        if major.is_empty()
            || minor.is_empty()
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(FrameError::InvalidVersionNumber);
        }
        let major = major
            .parse::<u16>()
            .map_err(|_| FrameError::InvalidVersionNumber)?;
        let minor = minor
            .parse::<u16>()
            .map_err(|_| FrameError::InvalidVersionNumber)?;
        Ok(Self { major, minor })
    }

    /// Format as the exact wire token.
    #[must_use]
    pub fn format(self) -> String {
        format!("HTTP/{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_versions() {
        assert_eq!(HttpVersion::parse("HTTP/1.0").unwrap(), HttpVersion::HTTP10);
        assert_eq!(HttpVersion::parse("HTTP/1.1").unwrap(), HttpVersion::HTTP11);
    }

    #[test]
    fn accepts_multi_digit_components() {
        let v = HttpVersion::parse("HTTP/12.34").unwrap();
        assert_eq!(v, HttpVersion { major: 12, minor: 34 });
    }

    #[test]
    fn http_name_is_case_sensitive() {
        assert_eq!(
            HttpVersion::parse("http/1.1"),
            Err(FrameError::InvalidHttpName)
        );
        assert_eq!(
            HttpVersion::parse("Http/1.1"),
            Err(FrameError::InvalidHttpName)
        );
    }

    #[test]
    fn malformed_numbers_rejected() {
        assert_eq!(
            HttpVersion::parse("HTTP/1"),
            Err(FrameError::InvalidVersionNumber)
        );
        assert_eq!(
            HttpVersion::parse("HTTP/1."),
            Err(FrameError::InvalidVersionNumber)
        );
        assert_eq!(
            HttpVersion::parse("HTTP/.1"),
            Err(FrameError::InvalidVersionNumber)
        );
        assert_eq!(
            HttpVersion::parse("HTTP/1.x"),
            Err(FrameError::InvalidVersionNumber)
        );
        assert_eq!(
            HttpVersion::parse("HTTP/+1.1"),
            Err(FrameError::InvalidVersionNumber)
        );
    }

    #[test]
    fn format_round_trips() {
        for v in [HttpVersion::HTTP10, HttpVersion::HTTP11, HttpVersion { major: 2, minor: 0 }] {
            assert_eq!(HttpVersion::parse(&v.format()).unwrap(), v);
        }
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(HttpVersion::HTTP10 < HttpVersion::HTTP11);
        assert!(HttpVersion::HTTP11 >= HttpVersion::HTTP11);
        assert!(HttpVersion { major: 2, minor: 0 } > HttpVersion::HTTP11);
    }
}
