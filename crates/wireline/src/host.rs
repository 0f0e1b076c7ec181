//! Host header validation (RFC 9112 §3.2.2).

use wireline_types::{Authority, Request, UriError};

use crate::error::FrameError;
use crate::target::Target;
use crate::version::HttpVersion;

/// Validate the `Host` header of a request observed at `version`.
///
/// HTTP/1.1 and later require exactly one `Host` field. HTTP/1.0 requests
/// are exempt from the presence requirement but a supplied value is still
/// format-checked. When the request-target is in absolute form, the `Host`
/// value must agree with the target's authority - a disagreement is how a
/// proxy and an origin server can be driven to route one request two ways.
///
/// # Errors
///
/// - [`FrameError::MissingHost`] - no `Host` on a ≥ 1.1 request.
/// - [`FrameError::MultipleHostHeaders`] - more than one `Host` field.
/// - [`FrameError::InvalidHostFormat`] - empty value, embedded whitespace,
///   userinfo, or unbalanced IPv6 brackets.
/// - [`FrameError::InvalidPort`] - a port outside `[0, 65535]`.
/// - [`FrameError::HostMismatchesAuthority`] - absolute-form disagreement.
pub fn validate_host(request: &Request, version: HttpVersion) -> Result<(), FrameError> {
    let count = request.headers().count("host");
    if count > 1 {
        return Err(FrameError::MultipleHostHeaders);
    }
    if count == 0 {
        if version >= HttpVersion::HTTP11 {
            return Err(FrameError::MissingHost);
        }
        return Ok(());
    }

    let Some(value) = request.headers().get("host") else {
        return Err(FrameError::MissingHost);
    };
    let text = std::str::from_utf8(value).map_err(|_| FrameError::InvalidHostFormat)?;
    let text = text.trim_matches([' ', '\t']);

    if text.is_empty() || text.bytes().any(|b| b == b' ' || b == b'\t') {
        return Err(FrameError::InvalidHostFormat);
    }
    // Host carries uri-host[:port] only; userinfo never appears in it.
    if text.contains('@') {
        return Err(FrameError::InvalidHostFormat);
    }

    let host_authority = Authority::parse(text).map_err(|err| match err {
        UriError::InvalidPort => FrameError::InvalidPort,
        _ => FrameError::InvalidHostFormat,
    })?;

    if let Ok(Target::Absolute { uri }) = Target::resolve(request.target(), request.method()) {
        if !host_authority.matches(uri.authority()) {
            return Err(FrameError::HostMismatchesAuthority);
        }
    }

    Ok(())
}
