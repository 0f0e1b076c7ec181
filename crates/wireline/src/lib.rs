//! HTTP/1.1 message framing.
//!
//! This crate is the wire-format half of HTTP/1.1 (RFC 9112): it converts
//! between byte streams and the structured request/response types of
//! [`wireline_types`], and enforces the validation that keeps a parser from
//! becoming a request-smuggling or response-splitting vector.
//!
//! # What lives here
//!
//! - Line tokenizing under the robustness rules (CRLF/LF, bare-CR rejection)
//! - Field-line parsing with the whitespace-before-colon rejection
//! - Request-line / status-line / HTTP-version parse and format
//! - The `Transfer-Encoding` model and the chunked transfer codec,
//!   extensions and trailers included
//! - The eight-rule message-body-length determination (RFC 9112 §6.3)
//! - Framing validators (ambiguous `Content-Length`/`Transfer-Encoding`
//!   combinations) and the `Host` validator
//! - Whole-message parse/serialize with exact consumed-byte accounting
//! - Per-connection persistence state and a pipelining helper
//!
//! Everything operates on caller-owned buffers; there is no I/O, no
//! logging, and no internal locking. The parsers are pure: with
//! insufficient input they return a typed completeness error
//! ([`FrameError::is_incomplete`]) and never block.
//!
//! # Example
//!
//! ```
//! use wireline::{parse_request, ParseOptions};
//!
//! let buf = b"GET /p HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let parsed = parse_request(buf, &ParseOptions::default()).unwrap();
//!
//! assert_eq!(parsed.message.target(), "/p");
//! assert_eq!(parsed.bytes_consumed, buf.len());
//! ```

#![deny(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_same_arms)]

pub mod body;
pub mod chunked;
pub mod coding;
pub mod connection;
mod error;
pub mod fields;
pub mod host;
mod limits;
pub mod lines;
mod parser;
pub mod start_line;
pub mod target;
pub mod validate;
mod version;
mod writer;

pub use body::{request_body_length, response_body_length, BodyLength};
pub use chunked::{
    decode_chunked, encode_chunked, ChunkExtension, ChunkedDecoder, ChunkedEncoder, DecodedBody,
    DEFAULT_CHUNK_SIZE,
};
pub use coding::{TransferCoding, TransferCodings};
pub use connection::{
    is_standard_hop_by_hop_header, should_keep_alive, strip_hop_by_hop_headers, ConnectionOptions,
    ConnectionState, PipelineError, PipelineQueue, STANDARD_HOP_BY_HOP_HEADERS,
};
pub use error::FrameError;
pub use fields::{parse_field_block, parse_field_line, ObsFoldPolicy};
pub use host::validate_host;
pub use limits::{LimitKind, Limits};
pub use lines::{find_blank_line, tokenize_head, tokenize_lines, Line, LineTerminator};
pub use parser::{
    parse_request, parse_response, ParseOptions, ParsedMessage, ReadStatus, RequestReader,
    ResponseReader,
};
pub use start_line::{RequestLine, StatusLine};
pub use target::Target;
pub use validate::{
    validate_request, validate_request_headers, validate_response, validate_response_headers,
};
pub use version::HttpVersion;
pub use writer::{serialize_request, serialize_response, MessageWriter};
