//! Request-target resolution.

use std::fmt;

use wireline_types::{Authority, Method, Uri};

use crate::error::FrameError;

/// The four request-target forms of RFC 9112 §3.2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `origin-form`: an absolute path plus optional query.
    Origin {
        /// The absolute path, starting with `/`.
        path: String,
        /// The query string without its leading `?`.
        query: Option<String>,
    },
    /// `absolute-form`: a full URI, used on requests to proxies.
    Absolute {
        /// The parsed URI.
        uri: Uri,
    },
    /// `authority-form`: host and optional port, used only by CONNECT.
    Authority {
        /// The parsed authority.
        authority: Authority,
    },
    /// `asterisk-form`: the single byte `*`, used by server-wide OPTIONS.
    Asterisk,
}

impl Target {
    /// Resolve a raw request-target according to the request method.
    ///
    /// CONNECT requires authority-form; asterisk-form is only meaningful for
    /// OPTIONS; everything else must be origin-form or absolute-form.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidTarget`] when the raw target does not
    /// match any form permitted for the method.
    pub fn resolve(raw: &str, method: &Method) -> Result<Self, FrameError> {
        if raw.is_empty() {
            return Err(FrameError::InvalidTarget);
        }

        if *method == Method::CONNECT {
            let authority = Authority::parse(raw).map_err(|_| FrameError::InvalidTarget)?;
            return Ok(Self::Authority { authority });
        }

        if raw == "*" {
            if *method != Method::OPTIONS {
                return Err(FrameError::InvalidTarget);
            }
            return Ok(Self::Asterisk);
        }

        if raw.starts_with('/') {
            let (path, query) = match raw.split_once('?') {
                Some((path, query)) => (path.to_string(), Some(query.to_string())),
                None => (raw.to_string(), None),
            };
            return Ok(Self::Origin { path, query });
        }

        if raw.contains("://") {
            let uri = Uri::parse(raw).map_err(|_| FrameError::InvalidTarget)?;
            return Ok(Self::Absolute { uri });
        }

        Err(FrameError::InvalidTarget)
    }

    /// Returns the target authority, if this form carries one.
    #[must_use]
    pub fn authority(&self) -> Option<&Authority> {
        match self {
            Self::Absolute { uri } => Some(uri.authority()),
            Self::Authority { authority } => Some(authority),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Origin { path, query } => {
                f.write_str(path)?;
                if let Some(query) = query {
                    write!(f, "?{query}")?;
                }
                Ok(())
            }
            Self::Absolute { uri } => write!(f, "{uri}"),
            Self::Authority { authority } => write!(f, "{authority}"),
            Self::Asterisk => f.write_str("*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_form_splits_query() {
        let target = Target::resolve("/items?q=1", &Method::GET).unwrap();
        assert_eq!(
            target,
            Target::Origin {
                path: "/items".to_string(),
                query: Some("q=1".to_string()),
            }
        );

        let target = Target::resolve("/items", &Method::GET).unwrap();
        assert!(matches!(target, Target::Origin { query: None, .. }));
    }

    #[test]
    fn absolute_form_parses_uri() {
        let target = Target::resolve("http://example.com/a", &Method::GET).unwrap();
        match &target {
            Target::Absolute { uri } => {
                assert_eq!(uri.authority().host(), "example.com");
                assert_eq!(uri.path(), "/a");
            }
            other => panic!("unexpected target {other:?}"),
        }
    }

    #[test]
    fn connect_requires_authority_form() {
        let target = Target::resolve("example.com:443", &Method::CONNECT).unwrap();
        match &target {
            Target::Authority { authority } => {
                assert_eq!(authority.host(), "example.com");
                assert_eq!(authority.port(), Some(443));
            }
            other => panic!("unexpected target {other:?}"),
        }

        assert_eq!(
            Target::resolve("/path", &Method::CONNECT),
            Err(FrameError::InvalidTarget)
        );
    }

    #[test]
    fn asterisk_only_for_options() {
        assert_eq!(
            Target::resolve("*", &Method::OPTIONS).unwrap(),
            Target::Asterisk
        );
        assert_eq!(
            Target::resolve("*", &Method::GET),
            Err(FrameError::InvalidTarget)
        );
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(
            Target::resolve("not-a-target", &Method::GET),
            Err(FrameError::InvalidTarget)
        );
        assert_eq!(Target::resolve("", &Method::GET), Err(FrameError::InvalidTarget));
    }

    #[test]
    fn display_round_trips() {
        for raw in ["/a?b=c", "/plain", "*"] {
            let method = if raw == "*" { Method::OPTIONS } else { Method::GET };
            let target = Target::resolve(raw, &method).unwrap();
            assert_eq!(target.to_string(), raw);
        }

        let target = Target::resolve("example.com:8080", &Method::CONNECT).unwrap();
        assert_eq!(target.to_string(), "example.com:8080");
    }
}
