//! Connection header handling and per-connection persistence state.
//!
//! The `Connection` header is a comma-separated list of tokens. Each token
//! is either a connection option (`close`, `keep-alive`, `upgrade`) or the
//! name of a hop-by-hop header field to strip when forwarding.
//!
//! [`ConnectionState`] is a plain state record: the single task driving a
//! connection owns it, or callers wrap it in their own mutual exclusion when
//! sharing. There is no internal locking and no suspension.

use std::fmt;
use std::time::Instant;

use wireline_types::{Headers, Method, Request, Response};

use crate::version::HttpVersion;

/// Standard hop-by-hop headers that are always stripped when forwarding,
/// whether or not they appear in the Connection header.
pub const STANDARD_HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Check if a header name is a standard hop-by-hop header.
#[must_use]
pub fn is_standard_hop_by_hop_header(name: &str) -> bool {
    STANDARD_HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// A parsed `Connection` header: a deduplicated set of lowercase tokens in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    tokens: Vec<String>,
}

impl ConnectionOptions {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single header value.
    ///
    /// Tokens are case-insensitive; whitespace around commas is ignored and
    /// repeated tokens collapse to one.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut options = Self::new();
        options.extend_from(text);
        options
    }

    /// Parse and merge every `Connection` instance of a header set.
    #[must_use]
    pub fn from_headers(headers: &Headers) -> Self {
        let mut options = Self::new();
        for value in headers.get_all("connection") {
            if let Ok(text) = std::str::from_utf8(value) {
                options.extend_from(text);
            }
        }
        options
    }

    fn extend_from(&mut self, text: &str) {
        for token in text.split(',') {
            let token = token.trim_matches([' ', '\t']).to_ascii_lowercase();
            if token.is_empty() || self.tokens.contains(&token) {
                continue;
            }
            self.tokens.push(token);
        }
    }

    /// Returns true if the given option is present (case-insensitive).
    #[must_use]
    pub fn has(&self, option: &str) -> bool {
        self.tokens.iter().any(|t| t.eq_ignore_ascii_case(option))
    }

    /// Returns true if `close` was requested.
    #[must_use]
    pub fn has_close(&self) -> bool {
        self.has("close")
    }

    /// Returns true if `keep-alive` was requested.
    #[must_use]
    pub fn has_keep_alive(&self) -> bool {
        self.has("keep-alive")
    }

    /// Returns true if `upgrade` was requested.
    #[must_use]
    pub fn has_upgrade(&self) -> bool {
        self.has("upgrade")
    }

    /// The tokens, lowercased, in insertion order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Header names listed for hop-by-hop stripping: every token that is not
    /// a connection option and not already in the standard list.
    pub fn hop_by_hop_headers(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !matches!(*t, "close" | "keep-alive" | "upgrade"))
            .filter(|t| !is_standard_hop_by_hop_header(t))
    }

    /// Format for the wire: tokens joined by `", "` in insertion order.
    #[must_use]
    pub fn format(&self) -> String {
        self.tokens.join(", ")
    }
}

impl fmt::Display for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Strip hop-by-hop headers from a header set: the standard list plus any
/// names the `Connection` header nominated. Used when forwarding a message
/// through a proxy or gateway.
pub fn strip_hop_by_hop_headers(headers: &mut Headers) {
    let nominated: Vec<String> = ConnectionOptions::from_headers(headers)
        .hop_by_hop_headers()
        .map(str::to_string)
        .collect();

    for name in STANDARD_HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    for name in &nominated {
        headers.remove(name);
    }
}

/// Decide keep-alive for one message's headers at the given version.
///
/// - `close` always wins
/// - explicit `keep-alive` always keeps the connection open
/// - otherwise HTTP/1.1 defaults to persistent, HTTP/1.0 to close
#[must_use]
pub fn should_keep_alive(headers: &Headers, version: HttpVersion) -> bool {
    let options = ConnectionOptions::from_headers(headers);
    if options.has_close() {
        return false;
    }
    if options.has_keep_alive() {
        return true;
    }
    version >= HttpVersion::HTTP11
}

/// Per-connection persistence state.
///
/// Initial persistence follows the protocol version: HTTP/1.1 connections
/// persist unless told otherwise, HTTP/1.0 connections close unless a
/// `keep-alive` arrives on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    version: HttpVersion,
    should_persist: bool,
    close_requested: bool,
    upgrade_accepted: bool,
}

impl ConnectionState {
    /// Create state for a connection speaking `version`.
    #[must_use]
    pub fn new(version: HttpVersion) -> Self {
        Self {
            version,
            should_persist: version >= HttpVersion::HTTP11,
            close_requested: false,
            upgrade_accepted: false,
        }
    }

    /// Returns the connection's protocol version.
    #[must_use]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// Observe a request sent or received on this connection.
    pub fn process_request(&mut self, request: &Request) {
        let options = ConnectionOptions::from_headers(request.headers());
        if options.has_close() {
            self.close_requested = true;
            self.should_persist = false;
        }
    }

    /// Observe a response sent or received on this connection.
    pub fn process_response(&mut self, response: &Response) {
        if response.status().as_u16() == 101 {
            self.upgrade_accepted = true;
        }

        let options = ConnectionOptions::from_headers(response.headers());
        if options.has_close() {
            self.close_requested = true;
            self.should_persist = false;
        } else if options.has_keep_alive()
            && self.version == HttpVersion::HTTP10
            && !self.close_requested
        {
            self.should_persist = true;
        }
    }

    /// Returns true if the connection may carry another message exchange.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.should_persist && !self.close_requested
    }

    /// Returns true once a `101 Switching Protocols` response was observed.
    #[must_use]
    pub fn is_upgrade_accepted(&self) -> bool {
        self.upgrade_accepted
    }

    /// Request an explicit close.
    pub fn close(&mut self) {
        self.close_requested = true;
        self.should_persist = false;
    }

    /// Reset to the initial state for a fresh connection.
    pub fn reset(&mut self) {
        *self = Self::new(self.version);
    }
}

/// Error from the pipeline helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    /// A non-idempotent request is still awaiting its response; enqueueing
    /// behind it would make a retry after connection loss unsafe.
    NonIdempotentInFlight,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonIdempotentInFlight => {
                write!(f, "a non-idempotent request is awaiting its response")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// Tracks pipelined in-flight requests on one connection.
///
/// Responses on a connection arrive in the exact order of their requests, so
/// completion pops from the front. Enqueueing is refused while a
/// non-idempotent request is in flight.
#[derive(Debug, Default)]
pub struct PipelineQueue {
    in_flight: Vec<(Method, Instant)>,
}

impl PipelineQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request going out.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NonIdempotentInFlight`] if any queued
    /// request is non-idempotent.
    pub fn enqueue(&mut self, method: Method) -> Result<(), PipelineError> {
        if self.in_flight.iter().any(|(m, _)| !m.is_idempotent()) {
            return Err(PipelineError::NonIdempotentInFlight);
        }
        self.in_flight.push((method, Instant::now()));
        Ok(())
    }

    /// Record the completion of the oldest in-flight request's response.
    ///
    /// Returns the request method and the instant it was enqueued, or `None`
    /// if nothing was in flight.
    pub fn complete_response(&mut self) -> Option<(Method, Instant)> {
        if self.in_flight.is_empty() {
            return None;
        }
        Some(self.in_flight.remove(0))
    }

    /// The method the next response must belong to.
    #[must_use]
    pub fn expected_response_method(&self) -> Option<&Method> {
        self.in_flight.first().map(|(m, _)| m)
    }

    /// Number of requests awaiting responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Returns true if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wireline_types::StatusCode;

    #[test]
    fn options_parse_close() {
        let options = ConnectionOptions::parse("close");
        assert!(options.has_close());
        assert!(!options.has_keep_alive());
        assert!(!options.has_upgrade());
    }

    #[test]
    fn options_parse_multiple_tokens() {
        let options = ConnectionOptions::parse("keep-alive, upgrade");
        assert!(options.has_keep_alive());
        assert!(options.has_upgrade());
        assert!(!options.has_close());
    }

    #[test]
    fn options_are_case_insensitive_and_trimmed() {
        let options = ConnectionOptions::parse("  Keep-Alive ,\tCLOSE ");
        assert!(options.has_keep_alive());
        assert!(options.has_close());
    }

    #[test]
    fn options_deduplicate() {
        let options = ConnectionOptions::parse("close, Close, CLOSE");
        assert_eq!(options.tokens(), &["close".to_string()]);
    }

    #[test]
    fn options_collect_hop_by_hop_names() {
        let options = ConnectionOptions::parse("keep-alive, X-Custom-Header, te");
        let names: Vec<&str> = options.hop_by_hop_headers().collect();
        // "te" is already standard, "keep-alive" is an option.
        assert_eq!(names, vec!["x-custom-header"]);
    }

    #[test]
    fn options_merge_instances() {
        let mut headers = Headers::new();
        headers.append("Connection", b"keep-alive".to_vec());
        headers.append("Connection", b"upgrade".to_vec());
        let options = ConnectionOptions::from_headers(&headers);
        assert!(options.has_keep_alive());
        assert!(options.has_upgrade());
    }

    #[test]
    fn options_format_in_insertion_order() {
        let options = ConnectionOptions::parse("upgrade, close");
        assert_eq!(options.format(), "upgrade, close");
    }

    #[test]
    fn strip_removes_standard_and_nominated() {
        let mut headers = Headers::new();
        headers.append("Connection", b"X-Trace".to_vec());
        headers.append("Keep-Alive", b"timeout=5".to_vec());
        headers.append("Transfer-Encoding", b"chunked".to_vec());
        headers.append("X-Trace", b"abc".to_vec());
        headers.append("Host", b"example.com".to_vec());

        strip_hop_by_hop_headers(&mut headers);

        assert!(!headers.contains("connection"));
        assert!(!headers.contains("keep-alive"));
        assert!(!headers.contains("transfer-encoding"));
        assert!(!headers.contains("x-trace"));
        assert!(headers.contains("host"));
    }

    #[test]
    fn keep_alive_defaults_follow_version() {
        let headers = Headers::new();
        assert!(should_keep_alive(&headers, HttpVersion::HTTP11));
        assert!(!should_keep_alive(&headers, HttpVersion::HTTP10));
    }

    #[test]
    fn keep_alive_close_always_wins() {
        let mut headers = Headers::new();
        headers.append("Connection", b"keep-alive, close".to_vec());
        assert!(!should_keep_alive(&headers, HttpVersion::HTTP11));
        assert!(!should_keep_alive(&headers, HttpVersion::HTTP10));
    }

    #[test]
    fn keep_alive_explicit_opt_in_on_http10() {
        let mut headers = Headers::new();
        headers.append("Connection", b"keep-alive".to_vec());
        assert!(should_keep_alive(&headers, HttpVersion::HTTP10));
    }

    #[test]
    fn http11_persists_by_default() {
        let state = ConnectionState::new(HttpVersion::HTTP11);
        assert!(state.is_persistent());
    }

    #[test]
    fn http10_closes_by_default() {
        let state = ConnectionState::new(HttpVersion::HTTP10);
        assert!(!state.is_persistent());
    }

    #[test]
    fn request_close_ends_persistence() {
        let mut state = ConnectionState::new(HttpVersion::HTTP11);
        let mut req = Request::new(Method::GET, "/");
        req.headers_mut().append("Connection", b"close".to_vec());
        state.process_request(&req);
        assert!(!state.is_persistent());
    }

    #[test]
    fn response_close_ends_persistence() {
        let mut state = ConnectionState::new(HttpVersion::HTTP11);
        let mut resp = Response::new(StatusCode::OK);
        resp.headers_mut().append("Connection", b"close".to_vec());
        state.process_response(&resp);
        assert!(!state.is_persistent());
    }

    #[test]
    fn http10_keep_alive_opts_in() {
        let mut state = ConnectionState::new(HttpVersion::HTTP10);
        let mut resp = Response::new(StatusCode::OK);
        resp.headers_mut()
            .append("Connection", b"keep-alive".to_vec());
        state.process_response(&resp);
        assert!(state.is_persistent());
    }

    #[test]
    fn keep_alive_cannot_undo_close() {
        let mut state = ConnectionState::new(HttpVersion::HTTP10);
        state.close();
        let mut resp = Response::new(StatusCode::OK);
        resp.headers_mut()
            .append("Connection", b"keep-alive".to_vec());
        state.process_response(&resp);
        assert!(!state.is_persistent());
    }

    #[test]
    fn upgrade_accepted_on_101() {
        let mut state = ConnectionState::new(HttpVersion::HTTP11);
        assert!(!state.is_upgrade_accepted());
        state.process_response(&Response::new(StatusCode::SWITCHING_PROTOCOLS));
        assert!(state.is_upgrade_accepted());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut state = ConnectionState::new(HttpVersion::HTTP11);
        state.close();
        state.reset();
        assert!(state.is_persistent());
        assert!(!state.is_upgrade_accepted());
    }

    #[test]
    fn pipeline_is_fifo() {
        let mut queue = PipelineQueue::new();
        queue.enqueue(Method::GET).unwrap();
        queue.enqueue(Method::HEAD).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.expected_response_method(), Some(&Method::GET));

        let (method, _) = queue.complete_response().unwrap();
        assert_eq!(method, Method::GET);
        assert_eq!(queue.expected_response_method(), Some(&Method::HEAD));
    }

    #[test]
    fn pipeline_blocks_behind_non_idempotent() {
        let mut queue = PipelineQueue::new();
        queue.enqueue(Method::POST).unwrap();
        assert_eq!(
            queue.enqueue(Method::GET),
            Err(PipelineError::NonIdempotentInFlight)
        );

        // Once the POST's response lands, the queue opens again.
        queue.complete_response();
        assert!(queue.enqueue(Method::GET).is_ok());
    }

    #[test]
    fn pipeline_allows_idempotent_runs() {
        let mut queue = PipelineQueue::new();
        queue.enqueue(Method::GET).unwrap();
        queue.enqueue(Method::PUT).unwrap();
        queue.enqueue(Method::DELETE).unwrap();
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn pipeline_complete_on_empty_returns_none() {
        let mut queue = PipelineQueue::new();
        assert!(queue.complete_response().is_none());
    }
}
