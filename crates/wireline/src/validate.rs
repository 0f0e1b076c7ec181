//! Anti-smuggling and anti-splitting framing validators.
//!
//! These run on already-parsed header lists, after syntax checks and before
//! the body-length resolver. A failure here means the message delimitation
//! is ambiguous between implementations - the classic request-smuggling
//! setup - and the connection must be closed (RFC 9112 §11).

use wireline_types::{Headers, Request, Response};

use crate::coding::TransferCodings;
use crate::error::FrameError;

/// Scan Content-Length instances: `Ok(())` if absent or all instances (and
/// all comma-joined list elements) agree on one valid integer.
fn check_content_length(headers: &Headers) -> Result<(), FrameError> {
    let mut agreed: Option<u64> = None;

    for value in headers.get_all("content-length") {
        let text = std::str::from_utf8(value)
            .map_err(|_| FrameError::InvalidFormat("malformed Content-Length"))?;
        for element in text.split(',') {
            let element = element.trim_matches([' ', '\t']);
            if element.is_empty() || !element.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FrameError::InvalidFormat("malformed Content-Length"));
            }
            let n: u64 = element
                .parse()
                .map_err(|_| FrameError::InvalidFormat("malformed Content-Length"))?;
            match agreed {
                None => agreed = Some(n),
                Some(prev) if prev != n => return Err(FrameError::MultipleContentLengthValues),
                Some(_) => {}
            }
        }
    }

    Ok(())
}

/// Check Transfer-Encoding: it must parse, and `chunked` may appear at most
/// once, only in final position, across all instances concatenated.
fn check_transfer_encoding(headers: &Headers) -> Result<(), FrameError> {
    let codings = TransferCodings::from_header_values(headers.get_all("transfer-encoding"))?;
    if codings.chunked_count() > 1 {
        return Err(FrameError::ChunkedAppliedMultipleTimes);
    }
    if codings.has_chunked() && !codings.is_chunked_final() {
        return Err(FrameError::ChunkedNotFinalEncoding);
    }
    Ok(())
}

/// Validate request framing headers (RFC 9112 §11.2).
///
/// # Errors
///
/// - [`FrameError::AmbiguousMessageFraming`] - both `Transfer-Encoding` and
///   `Content-Length` present. A recipient downstream that honors the other
///   header would disagree about where this message ends.
/// - [`FrameError::ChunkedAppliedMultipleTimes`] /
///   [`FrameError::ChunkedNotFinalEncoding`] - malformed coding list.
/// - [`FrameError::MultipleContentLengthValues`] - disagreeing duplicates.
pub fn validate_request_headers(headers: &Headers) -> Result<(), FrameError> {
    let has_te = headers.contains("transfer-encoding");
    if has_te && headers.contains("content-length") {
        return Err(FrameError::AmbiguousMessageFraming);
    }
    if has_te {
        check_transfer_encoding(headers)?;
    }
    check_content_length(headers)?;
    Ok(())
}

/// Validate response framing headers (RFC 9112 §11.1).
///
/// # Errors
///
/// Everything [`validate_request_headers`] reports (with
/// [`FrameError::TransferEncodingWithContentLength`] in place of the
/// request-side ambiguity error), plus
/// [`FrameError::TransferEncodingWithIncompatibleStatus`] for
/// `Transfer-Encoding` on a 1xx/204/304 response and
/// [`FrameError::StatusCodeOutOfRange`] outside `[100, 599]`.
pub fn validate_response_headers(status_code: u16, headers: &Headers) -> Result<(), FrameError> {
    if !(100..=599).contains(&status_code) {
        return Err(FrameError::StatusCodeOutOfRange(status_code));
    }

    let has_te = headers.contains("transfer-encoding");
    if has_te {
        if (100..=199).contains(&status_code) || status_code == 204 || status_code == 304 {
            return Err(FrameError::TransferEncodingWithIncompatibleStatus(status_code));
        }
        if headers.contains("content-length") {
            return Err(FrameError::TransferEncodingWithContentLength);
        }
        check_transfer_encoding(headers)?;
    }
    check_content_length(headers)?;
    Ok(())
}

/// Validate a parsed request.
///
/// # Errors
///
/// See [`validate_request_headers`].
pub fn validate_request(request: &Request) -> Result<(), FrameError> {
    validate_request_headers(request.headers())
}

/// Validate a parsed response.
///
/// # Errors
///
/// See [`validate_response_headers`].
pub fn validate_response(response: &Response) -> Result<(), FrameError> {
    validate_response_headers(response.status().as_u16(), response.headers())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &[u8])]) -> Headers {
        let mut h = Headers::new();
        for (name, value) in pairs {
            h.append(name.to_string(), value.to_vec());
        }
        h
    }

    #[test]
    fn plain_request_passes() {
        let h = headers(&[("Host", b"a"), ("Content-Length", b"10")]);
        assert!(validate_request_headers(&h).is_ok());
    }

    #[test]
    fn te_with_cl_is_ambiguous_on_request() {
        let h = headers(&[
            ("Content-Length", b"10"),
            ("Transfer-Encoding", b"chunked"),
        ]);
        assert_eq!(
            validate_request_headers(&h),
            Err(FrameError::AmbiguousMessageFraming)
        );
    }

    #[test]
    fn header_name_matching_is_case_insensitive() {
        let h = headers(&[
            ("content-LENGTH", b"10"),
            ("TRANSFER-encoding", b"chunked"),
        ]);
        assert_eq!(
            validate_request_headers(&h),
            Err(FrameError::AmbiguousMessageFraming)
        );
    }

    #[test]
    fn chunked_must_be_final() {
        let h = headers(&[("Transfer-Encoding", b"chunked, gzip")]);
        assert_eq!(
            validate_request_headers(&h),
            Err(FrameError::ChunkedNotFinalEncoding)
        );
    }

    #[test]
    fn chunked_across_instances_must_be_final() {
        let h = headers(&[
            ("Transfer-Encoding", b"chunked"),
            ("Transfer-Encoding", b"gzip"),
        ]);
        assert_eq!(
            validate_request_headers(&h),
            Err(FrameError::ChunkedNotFinalEncoding)
        );
    }

    #[test]
    fn chunked_at_most_once() {
        let h = headers(&[("Transfer-Encoding", b"chunked, chunked")]);
        assert_eq!(
            validate_request_headers(&h),
            Err(FrameError::ChunkedAppliedMultipleTimes)
        );
    }

    #[test]
    fn agreeing_content_length_duplicates_pass() {
        let h = headers(&[("Content-Length", b"42"), ("Content-Length", b"42")]);
        assert!(validate_request_headers(&h).is_ok());
    }

    #[test]
    fn distinct_content_length_duplicates_fail() {
        let h = headers(&[("Content-Length", b"42"), ("Content-Length", b"17")]);
        assert_eq!(
            validate_request_headers(&h),
            Err(FrameError::MultipleContentLengthValues)
        );
    }

    #[test]
    fn malformed_content_length_fails() {
        let h = headers(&[("Content-Length", b"-1")]);
        assert!(validate_request_headers(&h).is_err());
    }

    #[test]
    fn response_te_with_cl() {
        let h = headers(&[
            ("Transfer-Encoding", b"chunked"),
            ("Content-Length", b"10"),
        ]);
        assert_eq!(
            validate_response_headers(200, &h),
            Err(FrameError::TransferEncodingWithContentLength)
        );
    }

    #[test]
    fn response_te_with_bodiless_status() {
        let h = headers(&[("Transfer-Encoding", b"chunked")]);
        for status in [100, 101, 204, 304] {
            assert_eq!(
                validate_response_headers(status, &h),
                Err(FrameError::TransferEncodingWithIncompatibleStatus(status))
            );
        }
        assert!(validate_response_headers(200, &h).is_ok());
    }

    #[test]
    fn response_status_range() {
        let h = headers(&[]);
        assert_eq!(
            validate_response_headers(600, &h),
            Err(FrameError::StatusCodeOutOfRange(600))
        );
        assert_eq!(
            validate_response_headers(99, &h),
            Err(FrameError::StatusCodeOutOfRange(99))
        );
        assert!(validate_response_headers(599, &h).is_ok());
    }
}
