//! Caller-configurable resource limits.

use std::fmt;

/// Identifies which resource limit was breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    /// Start-line length.
    StartLine,
    /// Single header line length.
    HeaderLine,
    /// Total header block size.
    TotalHeaderBytes,
    /// Decoded body size.
    BodyBytes,
    /// Single chunk size.
    ChunkBytes,
    /// Trailer section size.
    TrailerBytes,
    /// Number of header fields.
    HeaderCount,
    /// Number of extensions on one chunk.
    ChunkExtensions,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartLine => "start-line",
            Self::HeaderLine => "header-line",
            Self::TotalHeaderBytes => "total-header-bytes",
            Self::BodyBytes => "body-bytes",
            Self::ChunkBytes => "chunk-bytes",
            Self::TrailerBytes => "trailer-bytes",
            Self::HeaderCount => "header-count",
            Self::ChunkExtensions => "chunk-extensions",
        };
        f.write_str(name)
    }
}

/// Resource limits applied while parsing.
///
/// Every breach is reported as a typed error before any buffer is enlarged.
/// Defaults follow RFC 9112 §3 (at least 8000 octets for a request-line) and
/// common server practice for the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum start-line length in octets.
    pub max_start_line: usize,
    /// Maximum single header line length in octets.
    pub max_header_line: usize,
    /// Maximum total header block size in octets.
    pub max_total_header_bytes: usize,
    /// Maximum decoded body size in bytes.
    pub max_body_bytes: u64,
    /// Maximum size of a single chunk in bytes.
    pub max_chunk_bytes: u64,
    /// Maximum trailer section size in octets.
    pub max_trailer_bytes: usize,
    /// Maximum number of header fields.
    pub max_headers: usize,
    /// Maximum number of extensions on a single chunk.
    pub max_chunk_extensions: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_start_line: 8000,
            max_header_line: 8000,
            max_total_header_bytes: 64 * 1024,
            max_body_bytes: 1 << 34,
            max_chunk_bytes: 1 << 31,
            max_trailer_bytes: 8192,
            max_headers: 100,
            max_chunk_extensions: 16,
        }
    }
}

impl Limits {
    /// Set the maximum start-line length.
    #[must_use]
    pub fn with_max_start_line(mut self, max: usize) -> Self {
        self.max_start_line = max;
        self
    }

    /// Set the maximum header line length.
    #[must_use]
    pub fn with_max_header_line(mut self, max: usize) -> Self {
        self.max_header_line = max;
        self
    }

    /// Set the maximum total header block size.
    #[must_use]
    pub fn with_max_total_header_bytes(mut self, max: usize) -> Self {
        self.max_total_header_bytes = max;
        self
    }

    /// Set the maximum decoded body size.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max: u64) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Set the maximum single chunk size.
    #[must_use]
    pub fn with_max_chunk_bytes(mut self, max: u64) -> Self {
        self.max_chunk_bytes = max;
        self
    }

    /// Set the maximum trailer section size.
    #[must_use]
    pub fn with_max_trailer_bytes(mut self, max: usize) -> Self {
        self.max_trailer_bytes = max;
        self
    }

    /// Set the maximum header field count.
    #[must_use]
    pub fn with_max_headers(mut self, max: usize) -> Self {
        self.max_headers = max;
        self
    }

    /// Set the maximum number of extensions per chunk.
    #[must_use]
    pub fn with_max_chunk_extensions(mut self, max: usize) -> Self {
        self.max_chunk_extensions = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let limits = Limits::default();
        assert_eq!(limits.max_start_line, 8000);
        assert_eq!(limits.max_header_line, 8000);
        assert_eq!(limits.max_total_header_bytes, 64 * 1024);
        assert_eq!(limits.max_body_bytes, 1 << 34);
        assert_eq!(limits.max_chunk_bytes, 1 << 31);
        assert_eq!(limits.max_trailer_bytes, 8192);
        assert_eq!(limits.max_headers, 100);
        assert_eq!(limits.max_chunk_extensions, 16);
    }

    #[test]
    fn builders_override_single_fields() {
        let limits = Limits::default()
            .with_max_headers(8)
            .with_max_body_bytes(1024);
        assert_eq!(limits.max_headers, 8);
        assert_eq!(limits.max_body_bytes, 1024);
        assert_eq!(limits.max_start_line, 8000);
    }
}
