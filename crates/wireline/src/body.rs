//! Message body length determination.
//!
//! Implements the precedence rules of RFC 9112 §6.3. The resolver never
//! rejects on its own: header sets that make the framing invalid resolve to
//! [`BodyLength::None`] so callers can close the connection, and the framing
//! validators report the precise defect separately.

use wireline_types::{Headers, Method};

use crate::coding::TransferCodings;

/// How the message body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyLength {
    /// No body bytes follow the header section.
    None,
    /// Exactly this many bytes follow.
    Fixed(u64),
    /// The body is chunked-coded.
    Chunked,
    /// The body runs until the peer closes the connection.
    UntilClose,
}

/// Outcome of scanning the `Content-Length` field instances.
enum ContentLength {
    Absent,
    Valid(u64),
    Invalid,
}

/// Scan every `Content-Length` instance (and every element of comma-joined
/// list values). All elements must be the same valid integer; a non-integer,
/// negative, or signed value poisons the whole set.
fn content_length(headers: &Headers) -> ContentLength {
    let mut agreed: Option<u64> = None;
    let mut seen = false;

    for value in headers.get_all("content-length") {
        let Ok(text) = std::str::from_utf8(value) else {
            return ContentLength::Invalid;
        };
        for element in text.split(',') {
            seen = true;
            let element = element.trim_matches([' ', '\t']);
            // 1*DIGIT only: no sign, no empty element.
            if element.is_empty() || !element.bytes().all(|b| b.is_ascii_digit()) {
                return ContentLength::Invalid;
            }
            let Ok(n) = element.parse::<u64>() else {
                return ContentLength::Invalid;
            };
            match agreed {
                None => agreed = Some(n),
                Some(prev) if prev != n => return ContentLength::Invalid,
                Some(_) => {}
            }
        }
    }

    match (seen, agreed) {
        (false, _) => ContentLength::Absent,
        (true, Some(n)) => ContentLength::Valid(n),
        (true, None) => ContentLength::Invalid,
    }
}

/// Determine the body length of a response, given the method of the request
/// it answers.
///
/// The first two rules are status-driven: HEAD responses and 1xx/204/304
/// statuses never carry a body regardless of framing headers, and a 2xx to
/// CONNECT switches the connection to a tunnel.
#[must_use]
pub fn response_body_length(
    request_method: &Method,
    status_code: u16,
    headers: &Headers,
) -> BodyLength {
    if *request_method == Method::HEAD
        || (100..=199).contains(&status_code)
        || status_code == 204
        || status_code == 304
    {
        return BodyLength::None;
    }

    if *request_method == Method::CONNECT && (200..=299).contains(&status_code) {
        return BodyLength::None;
    }

    // A Transfer-Encoding value with zero codings counts as absent.
    match TransferCodings::from_header_values(headers.get_all("transfer-encoding")) {
        Ok(codings) if codings.is_empty() => {}
        Ok(codings) if codings.is_chunked_final() => return BodyLength::Chunked,
        // Non-chunked-final Transfer-Encoding leaves the length unknown;
        // the response body runs to connection close. validate_response
        // flags this separately for callers that prefer to reject.
        _ => return BodyLength::UntilClose,
    }

    match content_length(headers) {
        ContentLength::Absent => BodyLength::UntilClose,
        ContentLength::Valid(n) => BodyLength::Fixed(n),
        ContentLength::Invalid => BodyLength::None,
    }
}

/// Determine the body length of a request.
///
/// Requests differ from responses in the fallback rule: a request without
/// framing headers has no body, never "until close".
#[must_use]
pub fn request_body_length(headers: &Headers) -> BodyLength {
    match TransferCodings::from_header_values(headers.get_all("transfer-encoding")) {
        Ok(codings) if codings.is_empty() => {}
        Ok(codings) if codings.is_chunked_final() => return BodyLength::Chunked,
        // A request body cannot be delimited by connection close, so a
        // non-chunked-final coding leaves no usable framing.
        _ => return BodyLength::None,
    }

    match content_length(headers) {
        ContentLength::Absent | ContentLength::Invalid => BodyLength::None,
        ContentLength::Valid(n) => BodyLength::Fixed(n),
    }
}
