//! HTTP request type.

use crate::headers::Headers;
use crate::method::Method;

/// Message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Body {
    /// Empty body.
    #[default]
    Empty,
    /// Bytes body.
    Bytes(Vec<u8>),
}

impl Body {
    /// Get body as bytes, consuming it.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Bytes(b) => b,
        }
    }

    /// Borrow the body bytes, if any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Empty => None,
            Self::Bytes(b) => Some(b),
        }
    }

    /// Check if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Bytes(b) => b.is_empty(),
        }
    }
}

/// HTTP request.
///
/// The target is held as the raw request-target string exactly as it appears
/// between the two spaces of the request line; the framing layer resolves it
/// into its origin/absolute/authority/asterisk form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    target: String,
    headers: Headers,
    body: Body,
}

impl Request {
    /// Create a new request with an empty header set and no body.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: Headers::new(),
            body: Body::Empty,
        }
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the raw request-target.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
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
