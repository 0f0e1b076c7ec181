//! URI components for absolute-form targets and authority matching.

use std::fmt;

/// Error returned when URI or authority parsing fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    /// The scheme component is missing or malformed.
    InvalidScheme,
    /// The authority component is missing or malformed.
    InvalidAuthority,
    /// The port component is not an integer in `[0, 65535]`.
    InvalidPort,
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScheme => write!(f, "invalid URI scheme"),
            Self::InvalidAuthority => write!(f, "invalid URI authority"),
            Self::InvalidPort => write!(f, "invalid URI port"),
        }
    }
}

impl std::error::Error for UriError {}

/// The authority component of a URI: host plus optional port.
///
/// The host is stored as received (brackets stripped from IPv6 literals);
/// host comparison is ASCII-case-insensitive, port comparison numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    host: String,
    port: Option<u16>,
}

impl Authority {
    /// Create an authority from parts.
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse an authority string (`host[:port]`, userinfo excluded).
    ///
    /// IPv6 hosts must be bracketed: `[::1]:8080`. Userinfo (`user@`) is
    /// stripped and discarded per RFC 9112 §3.2.4.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::InvalidAuthority`] for an empty or malformed host
    /// and [`UriError::InvalidPort`] for a non-numeric or out-of-range port.
    pub fn parse(text: &str) -> Result<Self, UriError> {
        let text = match text.rfind('@') {
            Some(at) => &text[at + 1..],
            None => text,
        };
        if text.is_empty() {
            return Err(UriError::InvalidAuthority);
        }

        let (host, port_text) = if let Some(rest) = text.strip_prefix('[') {
            // Bracketed IPv6 literal; the closing bracket must precede any port.
            let close = rest.find(']').ok_or(UriError::InvalidAuthority)?;
            let host = &rest[..close];
            if host.is_empty() {
                return Err(UriError::InvalidAuthority);
            }
            match &rest[close + 1..] {
                "" => (host, None),
                p => (host, Some(p.strip_prefix(':').ok_or(UriError::InvalidAuthority)?)),
            }
        } else {
            match text.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (text, None),
            }
        };

        if host.is_empty() || host.contains([' ', '\t', '/', '@']) {
            return Err(UriError::InvalidAuthority);
        }

        let port = match port_text {
            None => None,
            Some("") => None,
            Some(p) => Some(p.parse::<u16>().map_err(|_| UriError::InvalidPort)?),
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Returns the host (without IPv6 brackets).
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port, if one was given.
    #[inline]
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Compare against another authority: case-insensitive on host,
    /// numeric on port.
    #[must_use]
    pub fn matches(&self, other: &Authority) -> bool {
        self.host.eq_ignore_ascii_case(&other.host) && self.port == other.port
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracketed = self.host.contains(':');
        if bracketed {
            write!(f, "[{}]", self.host)?;
        } else {
            f.write_str(&self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

/// An absolute URI decomposed into scheme, authority, path and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    scheme: String,
    authority: Authority,
    path: String,
    query: Option<String>,
}

impl Uri {
    /// Parse an absolute-form URI (`scheme://authority[/path][?query]`).
    ///
    /// Fragments are not meaningful in request targets and are rejected as
    /// part of the path/query text. The path defaults to `/` when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`UriError`] naming the malformed component.
    pub fn parse(text: &str) -> Result<Self, UriError> {
        let (scheme, rest) = text.split_once("://").ok_or(UriError::InvalidScheme)?;
        if scheme.is_empty()
            || !scheme
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
            || !scheme.as_bytes()[0].is_ascii_alphabetic()
        {
            return Err(UriError::InvalidScheme);
        }

        let (authority_text, path_and_query) = match rest.find(['/', '?']) {
            Some(split) => (&rest[..split], &rest[split..]),
            None => (rest, ""),
        };
        let authority = Authority::parse(authority_text)?;

        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (path_and_query, None),
        };
        let path = if path.is_empty() { "/" } else { path };

        Ok(Self {
            scheme: scheme.to_string(),
            authority,
            path: path.to_string(),
            query,
        })
    }

    /// Returns the scheme.
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the authority.
    #[inline]
    #[must_use]
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Returns the path (never empty; defaults to `/`).
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query string without the leading `?`, if present.
    #[inline]
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}
