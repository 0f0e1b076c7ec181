//! HTTP request methods.

use std::fmt;

/// HTTP method.
///
/// The nine registered methods are available as associated constants and
/// carry no allocation. Any other RFC 9110 token is preserved verbatim as an
/// extension method. Method comparison is case-sensitive.
///
/// # Example
///
/// ```
/// use wireline_types::Method;
///
/// let m = Method::from_bytes(b"GET").unwrap();
/// assert_eq!(m, Method::GET);
/// assert!(m.is_idempotent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Extension(String),
}

impl Method {
    /// GET method.
    pub const GET: Self = Self(Repr::Get);
    /// HEAD method.
    pub const HEAD: Self = Self(Repr::Head);
    /// POST method.
    pub const POST: Self = Self(Repr::Post);
    /// PUT method.
    pub const PUT: Self = Self(Repr::Put);
    /// DELETE method.
    pub const DELETE: Self = Self(Repr::Delete);
    /// CONNECT method.
    pub const CONNECT: Self = Self(Repr::Connect);
    /// OPTIONS method.
    pub const OPTIONS: Self = Self(Repr::Options);
    /// TRACE method.
    pub const TRACE: Self = Self(Repr::Trace);
    /// PATCH method.
    pub const PATCH: Self = Self(Repr::Patch);

    /// Parse a method from bytes.
    ///
    /// Registered methods are matched exactly (case-sensitive, per RFC 9110
    /// §9.1); any other non-empty token is kept as an extension method.
    /// Returns `None` if the bytes are empty or contain non-token characters.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"GET" => Some(Self::GET),
            b"HEAD" => Some(Self::HEAD),
            b"POST" => Some(Self::POST),
            b"PUT" => Some(Self::PUT),
            b"DELETE" => Some(Self::DELETE),
            b"CONNECT" => Some(Self::CONNECT),
            b"OPTIONS" => Some(Self::OPTIONS),
            b"TRACE" => Some(Self::TRACE),
            b"PATCH" => Some(Self::PATCH),
            _ => {
                if bytes.is_empty() || !bytes.iter().all(|&b| is_token_char(b)) {
                    return None;
                }
                // Token bytes are a subset of ASCII, so this cannot fail.
                let raw = std::str::from_utf8(bytes).ok()?;
                Some(Self(Repr::Extension(raw.to_string())))
            }
        }
    }

    /// Return the method token exactly as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Get => "GET",
            Repr::Head => "HEAD",
            Repr::Post => "POST",
            Repr::Put => "PUT",
            Repr::Delete => "DELETE",
            Repr::Connect => "CONNECT",
            Repr::Options => "OPTIONS",
            Repr::Trace => "TRACE",
            Repr::Patch => "PATCH",
            Repr::Extension(raw) => raw,
        }
    }

    /// Returns true if the method is idempotent (RFC 9110 §9.2.2).
    ///
    /// GET, HEAD, OPTIONS, TRACE, PUT and DELETE are idempotent; extension
    /// methods are conservatively treated as non-idempotent.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self.0,
            Repr::Get | Repr::Head | Repr::Options | Repr::Trace | Repr::Put | Repr::Delete
        )
    }

    /// Returns true if the method is safe (RFC 9110 §9.2.1).
    #[must_use]
    pub fn is_safe(&self) -> bool {
        matches!(self.0, Repr::Get | Repr::Head | Repr::Options | Repr::Trace)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_methods_round_trip() {
        for name in [
            "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
        ] {
            let method = Method::from_bytes(name.as_bytes()).unwrap();
            assert_eq!(method.as_str(), name);
        }
    }

    #[test]
    fn extension_method_preserved_verbatim() {
        let method = Method::from_bytes(b"PURGE").unwrap();
        assert_eq!(method.as_str(), "PURGE");
        assert!(!method.is_idempotent());
    }

    #[test]
    fn method_is_case_sensitive() {
        // "get" is a valid token, so it parses, but it is not Method::GET.
        let method = Method::from_bytes(b"get").unwrap();
        assert_ne!(method, Method::GET);
        assert_eq!(method.as_str(), "get");
    }

    #[test]
    fn invalid_tokens_rejected() {
        assert!(Method::from_bytes(b"").is_none());
        assert!(Method::from_bytes(b"GE T").is_none());
        assert!(Method::from_bytes(b"G\xffT").is_none());
        assert!(Method::from_bytes(b"GET/").is_none());
    }

    #[test]
    fn idempotency_classification() {
        assert!(Method::GET.is_idempotent());
        assert!(Method::PUT.is_idempotent());
        assert!(Method::DELETE.is_idempotent());
        assert!(!Method::POST.is_idempotent());
        assert!(!Method::PATCH.is_idempotent());
        assert!(!Method::CONNECT.is_idempotent());
    }

    #[test]
    fn safety_classification() {
        assert!(Method::GET.is_safe());
        assert!(Method::HEAD.is_safe());
        assert!(!Method::PUT.is_safe());
        assert!(!Method::POST.is_safe());
    }
}
