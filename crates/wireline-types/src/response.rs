//! HTTP response type.

use crate::headers::Headers;
use crate::request::Body;
use crate::status::StatusCode;

/// HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    reason_phrase: Option<String>,
    headers: Headers,
    body: Body,
}

impl Response {
    /// Create a new response with an empty header set and no body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason_phrase: None,
            headers: Headers::new(),
            body: Body::Empty,
        }
    }

    /// Get the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the reason phrase as received, if any.
    ///
    /// Recipients should not rely on its content (RFC 9112 §4).
    #[must_use]
    pub fn reason_phrase(&self) -> Option<&str> {
        self.reason_phrase.as_deref()
    }

    /// Set the reason phrase.
    pub fn set_reason_phrase(&mut self, reason: Option<String>) {
        self.reason_phrase = reason;
    }

    /// Get the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get mutable headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get the body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Take the body, replacing it with `Empty`.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Set the body.
    pub fn set_body(&mut self, body: Body) {
        self.body = body;
    }
}
