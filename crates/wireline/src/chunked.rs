//! Chunked transfer-coding codec.
//!
//! Implements the RFC 9112 §7.1 grammar:
//!
//! ```text
//! chunked-body   = *chunk
//!                  last-chunk
//!                  trailer-section
//!                  CRLF
//!
//! chunk          = chunk-size [ chunk-ext ] CRLF
//!                  chunk-data CRLF
//! chunk-size     = 1*HEXDIG
//! last-chunk     = 1*("0") [ chunk-ext ] CRLF
//!
//! chunk-ext      = *( BWS ";" BWS chunk-ext-name [ BWS "=" BWS chunk-ext-val ] )
//! ```
//!
//! The decoder is pure and one-shot: it walks a caller-owned buffer, tracks
//! its cursor exactly, and never reads past the final CRLF of the body.
//! Unrecognized chunk extensions are retained but never cause rejection, and
//! malformed individual trailer lines are skipped rather than failing the
//! body - both per §7.1.1.

use wireline_types::HeaderField;

use crate::error::FrameError;
use crate::fields::parse_field_line;
use crate::limits::{LimitKind, Limits};

const CRLF: &[u8] = b"\r\n";

/// Default chunk size for the encoder.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// One `;name[=value]` chunk extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkExtension {
    /// Extension name.
    pub name: String,
    /// Extension value, if the `=value` part was present.
    pub value: Option<String>,
}

impl ChunkExtension {
    /// Create an extension from parts.
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Chunked body encoder.
///
/// Splits the payload into fixed-size chunks, applies the configured
/// extensions to every chunk (the last-chunk included), and appends the
/// configured trailer fields after the last-chunk.
///
/// # Example
///
/// ```
/// use wireline::chunked::ChunkedEncoder;
///
/// let body = ChunkedEncoder::new().with_chunk_size(5).encode(b"Hello, World!");
/// assert_eq!(body, b"5\r\nHello\r\n5\r\n, Wor\r\n3\r\nld!\r\n0\r\n\r\n");
/// ```
#[derive(Debug, Clone)]
pub struct ChunkedEncoder {
    chunk_size: usize,
    extensions: Vec<ChunkExtension>,
    trailers: Vec<HeaderField>,
}

impl ChunkedEncoder {
    /// Create an encoder with the default chunk size and no extensions or
    /// trailers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            extensions: Vec::new(),
            trailers: Vec::new(),
        }
    }

    /// Set the chunk size. Values below 1 are treated as 1.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Add an extension emitted on every chunk.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.extensions.push(ChunkExtension::new(name, value));
        self
    }

    /// Add a trailer field emitted after the last-chunk.
    #[must_use]
    pub fn with_trailer(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.trailers.push(HeaderField::new(name, value));
        self
    }

    /// Encode a payload as a complete chunked body.
    #[must_use]
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len() + 64);

        for chunk in data.chunks(self.chunk_size) {
            out.extend_from_slice(format!("{:x}", chunk.len()).as_bytes());
            self.write_extensions(&mut out);
            out.extend_from_slice(CRLF);
            out.extend_from_slice(chunk);
            out.extend_from_slice(CRLF);
        }

        out.push(b'0');
        self.write_extensions(&mut out);
        out.extend_from_slice(CRLF);

        for trailer in &self.trailers {
            out.extend_from_slice(trailer.name().as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(trailer.value());
            out.extend_from_slice(CRLF);
        }

        out.extend_from_slice(CRLF);
        out
    }

    fn write_extensions(&self, out: &mut Vec<u8>) {
        for ext in &self.extensions {
            out.push(b';');
            out.extend_from_slice(ext.name.as_bytes());
            if let Some(value) = &ext.value {
                out.push(b'=');
                if needs_quoting(value) {
                    out.push(b'"');
                    for &b in value.as_bytes() {
                        if b == b'"' || b == b'\\' {
                            out.push(b'\\');
                        }
                        out.push(b);
                    }
                    out.push(b'"');
                } else {
                    out.extend_from_slice(value.as_bytes());
                }
            }
        }
    }
}

impl Default for ChunkedEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn needs_quoting(value: &str) -> bool {
    value
        .bytes()
        .any(|b| matches!(b, b';' | b' ' | b'\t' | b'"' | b'\\'))
        || value.is_empty()
}

/// Encode a payload with the default chunk size, no extensions, no trailers.
#[must_use]
pub fn encode_chunked(data: &[u8]) -> Vec<u8> {
    ChunkedEncoder::new().encode(data)
}

// ============================================================================
// Decoder
// ============================================================================

/// A fully decoded chunked body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    /// The reassembled payload.
    pub data: Vec<u8>,
    /// The extensions of each chunk, last-chunk included, in wire order.
    pub chunk_extensions: Vec<Vec<ChunkExtension>>,
    /// Parsed trailer fields, in the order received.
    pub trailers: Vec<HeaderField>,
    /// Exact number of input bytes the body occupied, final CRLF included.
    pub bytes_consumed: usize,
}

/// Chunked body decoder.
#[derive(Debug, Clone, Default)]
pub struct ChunkedDecoder {
    limits: Limits,
}

impl ChunkedDecoder {
    /// Create a decoder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with explicit limits.
    #[must_use]
    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    /// Decode a complete chunked body from the front of `buf`.
    ///
    /// The cursor is tracked exactly: [`DecodedBody::bytes_consumed`] is the
    /// offset just past the body's final CRLF, and bytes beyond it are never
    /// examined.
    ///
    /// # Errors
    ///
    /// - [`FrameError::InvalidChunkSize`] - the hex size does not parse.
    /// - [`FrameError::InvalidFormat`] - a size line or the trailer section
    ///   is missing its CRLF terminator.
    /// - [`FrameError::IncompleteChunk`] - chunk data announced more bytes
    ///   than the buffer holds.
    /// - [`FrameError::MissingCRLF`] - the CRLF after chunk data is absent.
    /// - [`FrameError::LimitExceeded`] - a chunk, the body, the trailer
    ///   section, or a chunk's extension count breached its cap.
    pub fn decode(&self, buf: &[u8]) -> Result<DecodedBody, FrameError> {
        let mut cursor = 0usize;
        let mut data = Vec::new();
        let mut chunk_extensions = Vec::new();

        loop {
            let line_end = find_crlf(&buf[cursor..])
                .ok_or(FrameError::InvalidFormat("chunk size line missing CRLF"))?;
            let size_line = &buf[cursor..cursor + line_end];
            let (size, extensions) = parse_size_line(size_line, &self.limits)?;
            cursor += line_end + CRLF.len();

            if size == 0 {
                chunk_extensions.push(extensions);
                let (trailers, trailer_len) = self.decode_trailers(&buf[cursor..])?;
                cursor += trailer_len;
                return Ok(DecodedBody {
                    data,
                    chunk_extensions,
                    trailers,
                    bytes_consumed: cursor,
                });
            }

            if size > self.limits.max_chunk_bytes {
                return Err(FrameError::LimitExceeded {
                    kind: LimitKind::ChunkBytes,
                    observed: size,
                    cap: self.limits.max_chunk_bytes,
                });
            }
            let total = data.len() as u64 + size;
            if total > self.limits.max_body_bytes {
                return Err(FrameError::LimitExceeded {
                    kind: LimitKind::BodyBytes,
                    observed: total,
                    cap: self.limits.max_body_bytes,
                });
            }

            let size = size as usize;
            let available = buf.len() - cursor;
            if available < size {
                return Err(FrameError::IncompleteChunk);
            }
            data.extend_from_slice(&buf[cursor..cursor + size]);
            cursor += size;

            // A short buffer here is truncation, not corruption.
            if buf.len() < cursor + CRLF.len() {
                return Err(FrameError::IncompleteChunk);
            }
            if &buf[cursor..cursor + CRLF.len()] != CRLF {
                return Err(FrameError::MissingCRLF);
            }
            cursor += CRLF.len();
            chunk_extensions.push(extensions);
        }
    }

    /// Decode the trailer section, returning the parsed fields and the exact
    /// number of bytes consumed including the terminating blank CRLF.
    fn decode_trailers(&self, buf: &[u8]) -> Result<(Vec<HeaderField>, usize), FrameError> {
        let mut cursor = 0usize;
        let mut trailers = Vec::new();

        loop {
            let line_end = find_crlf(&buf[cursor..])
                .ok_or(FrameError::InvalidFormat("trailer section not terminated"))?;
            let line = &buf[cursor..cursor + line_end];
            cursor += line_end + CRLF.len();

            if cursor > self.limits.max_trailer_bytes {
                return Err(FrameError::LimitExceeded {
                    kind: LimitKind::TrailerBytes,
                    observed: cursor as u64,
                    cap: self.limits.max_trailer_bytes as u64,
                });
            }

            if line.is_empty() {
                return Ok((trailers, cursor));
            }

            // A recipient SHOULD skip an invalid trailer line, not abort the
            // body (RFC 9112 §7.1.2).
            if let Ok(field) = parse_field_line(line) {
                trailers.push(field);
            }
        }
    }
}

/// Decode a chunked body with default limits.
///
/// # Errors
///
/// See [`ChunkedDecoder::decode`].
pub fn decode_chunked(buf: &[u8]) -> Result<DecodedBody, FrameError> {
    ChunkedDecoder::new().decode(buf)
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF)
}

/// Split a chunk-size line into the hex size and its parsed extensions.
fn parse_size_line(line: &[u8], limits: &Limits) -> Result<(u64, Vec<ChunkExtension>), FrameError> {
    let (size_text, ext_text) = match line.iter().position(|&b| b == b';') {
        Some(semi) => (&line[..semi], Some(&line[semi + 1..])),
        None => (line, None),
    };

    let size_text =
        std::str::from_utf8(size_text).map_err(|_| FrameError::InvalidChunkSize)?;
    // chunk-size is 1*HEXDIG and nothing else: no surrounding whitespace
    // (unlike list-syntax header values) and no sign, which from_str_radix
    // would otherwise tolerate. An implementation that pads here and one
    // that rejects the padding disagree on where the message ends.
    if size_text.is_empty() || !size_text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(FrameError::InvalidChunkSize);
    }
    let size = u64::from_str_radix(size_text, 16).map_err(|_| FrameError::InvalidChunkSize)?;

    let extensions = match ext_text {
        Some(text) => parse_extensions(text, limits)?,
        None => Vec::new(),
    };

    Ok((size, extensions))
}

/// Split extension text on `;`, but not inside a quoted value.
fn split_ext_segments(text: &[u8]) -> Vec<&[u8]> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, &b) in text.iter().enumerate() {
        if escaped {
            escaped = false;
        } else if in_quotes && b == b'\\' {
            escaped = true;
        } else if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == b';' && !in_quotes {
            segments.push(&text[start..i]);
            start = i + 1;
        }
    }
    segments.push(&text[start..]);
    segments
}

/// Parse the `;`-separated extension segments after the chunk size.
///
/// Unrecognized extensions are retained; malformed segments (an empty name)
/// are dropped rather than rejected.
fn parse_extensions(text: &[u8], limits: &Limits) -> Result<Vec<ChunkExtension>, FrameError> {
    let mut extensions = Vec::new();

    for segment in split_ext_segments(text) {
        let segment = String::from_utf8_lossy(segment);
        let segment = segment.trim_matches([' ', '\t']);
        if segment.is_empty() {
            continue;
        }

        let (name, value) = match segment.split_once('=') {
            Some((name, value)) => {
                let name = name.trim_matches([' ', '\t']);
                let value = value.trim_matches([' ', '\t']);
                (name, Some(unquote(value)))
            }
            None => (segment, None),
        };
        if name.is_empty() {
            continue;
        }

        extensions.push(ChunkExtension::new(name.to_string(), value));
        if extensions.len() > limits.max_chunk_extensions {
            return Err(FrameError::LimitExceeded {
                kind: LimitKind::ChunkExtensions,
                observed: extensions.len() as u64,
                cap: limits.max_chunk_extensions as u64,
            });
        }
    }

    Ok(extensions)
}

/// Strip surrounding double quotes and resolve `\"`-style quoted pairs.
fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    out
}
