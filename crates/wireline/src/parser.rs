//! Message deserialization.
//!
//! Drives the tokenizer, start-line and field parsers, validators,
//! body-length resolver and chunked decoder to turn a byte buffer into a
//! structured message plus an exact consumed-byte count.
//!
//! The one-shot functions are pure and non-blocking: given insufficient
//! bytes they return a completeness error (see [`FrameError::is_incomplete`])
//! and never block. The [`RequestReader`]/[`ResponseReader`] wrappers layer
//! buffer stitching on top for callers feeding data from a socket.

use wireline_types::{Body, Headers, Method, Request, Response, StatusCode};

use crate::body::{request_body_length, response_body_length, BodyLength};
use crate::chunked::ChunkedDecoder;
use crate::error::FrameError;
use crate::fields::{parse_field_block, ObsFoldPolicy};
use crate::host::validate_host;
use crate::limits::{LimitKind, Limits};
use crate::lines::{tokenize_head, HeadLines};
use crate::start_line::{RequestLine, StatusLine};
use crate::target::Target;
use crate::validate::{validate_request_headers, validate_response_headers};
use crate::version::HttpVersion;

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Resource limits.
    pub limits: Limits,
    /// How to treat obsolete line folding in the header section.
    pub obs_fold: ObsFoldPolicy,
}

impl ParseOptions {
    /// Options with default limits and the default (rejecting) fold policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resource limits.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the obs-fold policy.
    #[must_use]
    pub fn with_obs_fold(mut self, policy: ObsFoldPolicy) -> Self {
        self.obs_fold = policy;
        self
    }
}

/// A successfully parsed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage<T> {
    /// The structured message. Trailer fields, if any, are appended to its
    /// header list after every header-section field, in the order received.
    pub message: T,
    /// The protocol version from the start-line.
    pub version: HttpVersion,
    /// Exact number of input bytes the message occupied.
    pub bytes_consumed: usize,
}

/// Parse one complete request from the front of `buf`.
///
/// `bytes_consumed` covers the start-line, the header block including its
/// terminators, and every body byte the framing consumed, so the caller can
/// resume parsing a pipelined successor at `buf[bytes_consumed..]`.
///
/// # Errors
///
/// Syntax, framing, Host and limit errors as described per component;
/// completeness errors ([`FrameError::is_incomplete`]) when more bytes are
/// needed.
pub fn parse_request(buf: &[u8], options: &ParseOptions) -> Result<ParsedMessage<Request>, FrameError> {
    let skipped = skip_leading_empty_lines(buf);
    let buf = &buf[skipped..];

    let head = parse_head(buf, options)?;
    let request_line = RequestLine::parse(head.lines[0].content())?;

    // Resolving the target validates its form against the method; the
    // request itself keeps the raw octets.
    Target::resolve(&request_line.target, &request_line.method)?;

    let headers = parse_head_fields(&head, options)?;

    let mut request = Request::new(request_line.method.clone(), request_line.target.clone());
    *request.headers_mut() = headers;

    validate_request_headers(request.headers())?;
    validate_host(&request, request_line.version)?;

    let body_length = request_body_length(request.headers());
    let (body, body_consumed, trailers) =
        read_body(&buf[head.consumed..], body_length, &options.limits)?;
    for trailer in trailers {
        request
            .headers_mut()
            .append(trailer.name().to_string(), trailer.value().to_vec());
    }
    if let Some(bytes) = body {
        request.set_body(Body::Bytes(bytes));
    }

    Ok(ParsedMessage {
        message: request,
        version: request_line.version,
        bytes_consumed: skipped + head.consumed + body_consumed,
    })
}

/// Parse one complete response from the front of `buf`.
///
/// `request_method` is the method of the request this response answers; it
/// decides body framing for HEAD and CONNECT exchanges.
///
/// # Errors
///
/// See [`parse_request`].
pub fn parse_response(
    buf: &[u8],
    request_method: &Method,
    options: &ParseOptions,
) -> Result<ParsedMessage<Response>, FrameError> {
    let skipped = skip_leading_empty_lines(buf);
    let buf = &buf[skipped..];

    let head = parse_head(buf, options)?;
    let status_line = StatusLine::parse(head.lines[0].content())?;

    let headers = parse_head_fields(&head, options)?;

    validate_response_headers(status_line.status_code, &headers)?;

    let mut response = Response::new(StatusCode::from_u16(status_line.status_code));
    response.set_reason_phrase(status_line.reason_phrase.clone());
    *response.headers_mut() = headers;

    let body_length =
        response_body_length(request_method, status_line.status_code, response.headers());
    let (body, body_consumed, trailers) =
        read_body(&buf[head.consumed..], body_length, &options.limits)?;
    for trailer in trailers {
        response
            .headers_mut()
            .append(trailer.name().to_string(), trailer.value().to_vec());
    }
    if let Some(bytes) = body {
        response.set_body(Body::Bytes(bytes));
    }

    Ok(ParsedMessage {
        message: response,
        version: status_line.version,
        bytes_consumed: skipped + head.consumed + body_consumed,
    })
}

/// RFC 9112 §2.2: ignore empty line(s) received where a start-line is
/// expected.
fn skip_leading_empty_lines(buf: &[u8]) -> usize {
    let mut offset = 0;
    loop {
        if buf[offset..].starts_with(b"\r\n") {
            offset += 2;
        } else if buf[offset..].starts_with(b"\n") {
            offset += 1;
        } else {
            return offset;
        }
    }
}

/// Tokenize the head and run the structural checks shared by both message
/// kinds: a start-line must exist and fit, the head must fit, and the blank
/// separator must have arrived.
fn parse_head<'a>(buf: &'a [u8], options: &ParseOptions) -> Result<HeadLines<'a>, FrameError> {
    if buf.is_empty() {
        return Err(FrameError::EmptyMessage);
    }

    let head = tokenize_head(buf)?;
    let Some(first) = head.lines.first() else {
        return Err(FrameError::EmptyMessage);
    };

    if first.content().len() > options.limits.max_start_line {
        return Err(FrameError::LineTooLong(
            first.content().len(),
            options.limits.max_start_line,
        ));
    }
    if head.consumed > options.limits.max_total_header_bytes {
        return Err(FrameError::LimitExceeded {
            kind: LimitKind::TotalHeaderBytes,
            observed: head.consumed as u64,
            cap: options.limits.max_total_header_bytes as u64,
        });
    }
    if head.separator.is_none() {
        return Err(FrameError::MissingHeaderBodySeparator);
    }

    Ok(head)
}

fn parse_head_fields(head: &HeadLines<'_>, options: &ParseOptions) -> Result<Headers, FrameError> {
    let separator = head.separator.unwrap_or(head.lines.len());
    let fields = parse_field_block(&head.lines[1..separator], options.obs_fold, &options.limits)?;
    Ok(fields.into_iter().collect())
}

type BodyOutcome = (Option<Vec<u8>>, usize, Vec<wireline_types::HeaderField>);

/// Read the body bytes that `body_length` dictates from `buf`.
///
/// Returns the body (if any), the exact bytes consumed, and any chunked
/// trailers.
fn read_body(buf: &[u8], body_length: BodyLength, limits: &Limits) -> Result<BodyOutcome, FrameError> {
    match body_length {
        BodyLength::None => Ok((None, 0, Vec::new())),
        BodyLength::Fixed(expected) => {
            if expected > limits.max_body_bytes {
                return Err(FrameError::LimitExceeded {
                    kind: LimitKind::BodyBytes,
                    observed: expected,
                    cap: limits.max_body_bytes,
                });
            }
            let available = buf.len() as u64;
            if available < expected {
                return Err(FrameError::IncompleteBody {
                    expected,
                    available,
                });
            }
            let n = expected as usize;
            Ok((Some(buf[..n].to_vec()), n, Vec::new()))
        }
        BodyLength::Chunked => {
            let decoded = ChunkedDecoder::with_limits(*limits).decode(buf)?;
            Ok((
                Some(decoded.data),
                decoded.bytes_consumed,
                decoded.trailers,
            ))
        }
        BodyLength::UntilClose => {
            if buf.len() as u64 > limits.max_body_bytes {
                return Err(FrameError::LimitExceeded {
                    kind: LimitKind::BodyBytes,
                    observed: buf.len() as u64,
                    cap: limits.max_body_bytes,
                });
            }
            Ok((Some(buf.to_vec()), buf.len(), Vec::new()))
        }
    }
}

// ============================================================================
// Incremental readers
// ============================================================================

/// Result of feeding bytes to an incremental reader.
#[derive(Debug)]
pub enum ReadStatus<T> {
    /// A full message was parsed and drained from the internal buffer.
    Complete(ParsedMessage<T>),
    /// More bytes are required.
    Incomplete,
}

/// Returns true when an error merely means the buffer ends too early.
///
/// Beyond the completeness group this covers the chunked decoder's two
/// "unterminated" shapes, which a streaming caller hits whenever a feed
/// boundary lands inside a size line or the trailer section.
fn needs_more_bytes(err: &FrameError) -> bool {
    err.is_incomplete()
        || matches!(
            err,
            FrameError::InvalidFormat("chunk size line missing CRLF")
                | FrameError::InvalidFormat("trailer section not terminated")
        )
}

/// Incremental request reader.
///
/// Feed socket reads via [`feed`][Self::feed]; the reader buffers input
/// until a complete request is available, then drains exactly the consumed
/// bytes so pipelined successors stay queued.
#[derive(Debug, Default)]
pub struct RequestReader {
    buffer: Vec<u8>,
    options: ParseOptions,
}

impl RequestReader {
    /// Create a reader with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader with explicit options.
    #[must_use]
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            buffer: Vec::new(),
            options,
        }
    }

    /// Append bytes and attempt to parse one request.
    ///
    /// Call again with an empty slice to try parsing a buffered successor.
    ///
    /// # Errors
    ///
    /// Any non-completeness [`FrameError`]; completeness conditions surface
    /// as [`ReadStatus::Incomplete`] instead.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<ReadStatus<Request>, FrameError> {
        self.buffer.extend_from_slice(bytes);
        match parse_request(&self.buffer, &self.options) {
            Ok(parsed) => {
                self.buffer.drain(..parsed.bytes_consumed);
                Ok(ReadStatus::Complete(parsed))
            }
            Err(err) if needs_more_bytes(&err) => Ok(ReadStatus::Incomplete),
            Err(err) => Err(err),
        }
    }

    /// Bytes currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Incremental response reader.
///
/// Carries the method of the request each response answers. For a response
/// framed by connection close, completion can only be decided by the caller:
/// feed the final bytes when the peer closes, then treat the result as the
/// whole body.
#[derive(Debug)]
pub struct ResponseReader {
    buffer: Vec<u8>,
    options: ParseOptions,
    request_method: Method,
}

impl ResponseReader {
    /// Create a reader for responses to `request_method`.
    #[must_use]
    pub fn new(request_method: Method) -> Self {
        Self {
            buffer: Vec::new(),
            options: ParseOptions::default(),
            request_method,
        }
    }

    /// Create a reader with explicit options.
    #[must_use]
    pub fn with_options(request_method: Method, options: ParseOptions) -> Self {
        Self {
            buffer: Vec::new(),
            options,
            request_method,
        }
    }

    /// Set the method of the request the next response answers.
    pub fn set_request_method(&mut self, method: Method) {
        self.request_method = method;
    }

    /// Append bytes and attempt to parse one response.
    ///
    /// # Errors
    ///
    /// See [`RequestReader::feed`].
    pub fn feed(&mut self, bytes: &[u8]) -> Result<ReadStatus<Response>, FrameError> {
        self.buffer.extend_from_slice(bytes);
        match parse_response(&self.buffer, &self.request_method, &self.options) {
            Ok(parsed) => {
                self.buffer.drain(..parsed.bytes_consumed);
                Ok(ReadStatus::Complete(parsed))
            }
            Err(err) if needs_more_bytes(&err) => Ok(ReadStatus::Incomplete),
            Err(err) => Err(err),
        }
    }

    /// Bytes currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drop buffered bytes.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
