//! Message serialization.
//!
//! Emits `start-line CRLF *(field-line CRLF) CRLF [body]`, byte-exact:
//! CRLF separators only, no obsolete line folding ever, no space before the
//! field colon, and the mandatory SP after a status code even when no reason
//! phrase follows. A header value carrying CR, LF or any other control byte
//! fails the call - letting a CRLF through is how response splitting
//! happens, and anything else the parser would refuse must not be emitted.

use wireline_types::{Headers, Request, Response};

use crate::error::FrameError;
use crate::fields::is_field_value_byte;
use crate::target::Target;
use crate::version::HttpVersion;

const CRLF: &[u8] = b"\r\n";

fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'
    )
}

/// Serializes messages into a reusable buffer.
pub struct MessageWriter {
    buffer: Vec<u8>,
}

impl MessageWriter {
    /// Create a writer with a pre-allocated buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Serialize a request at the given protocol version.
    ///
    /// The request-target is rendered according to its resolved form.
    ///
    /// # Errors
    ///
    /// [`FrameError::InvalidTarget`] if the target does not resolve for the
    /// method, plus any field-emission error (see [`write_fields`]).
    ///
    /// [`write_fields`]: Self::write_request
    pub fn write_request(
        &mut self,
        request: &Request,
        version: HttpVersion,
    ) -> Result<&[u8], FrameError> {
        self.buffer.clear();

        let target = Target::resolve(request.target(), request.method())?;
        self.buffer
            .extend_from_slice(request.method().as_str().as_bytes());
        self.buffer.push(b' ');
        self.buffer.extend_from_slice(target.to_string().as_bytes());
        self.buffer.push(b' ');
        self.buffer.extend_from_slice(version.format().as_bytes());
        self.buffer.extend_from_slice(CRLF);

        write_fields(&mut self.buffer, request.headers())?;
        self.buffer.extend_from_slice(CRLF);

        if let Some(body) = request.body().as_bytes() {
            self.buffer.extend_from_slice(body);
        }
        Ok(&self.buffer)
    }

    /// Serialize a response at the given protocol version.
    ///
    /// With `include_reason` the response's own phrase is used, falling back
    /// to the canonical one for the code; without it (or when neither
    /// exists) the status line still ends `code SP CRLF`.
    ///
    /// # Errors
    ///
    /// [`FrameError::StatusCodeOutOfRange`] for a code that is not three
    /// digits, [`FrameError::InvalidFormat`] for a reason phrase carrying
    /// control bytes, plus any field-emission error.
    pub fn write_response(
        &mut self,
        response: &Response,
        version: HttpVersion,
        include_reason: bool,
    ) -> Result<&[u8], FrameError> {
        self.buffer.clear();

        let code = response.status().as_u16();
        if !(100..=999).contains(&code) {
            return Err(FrameError::StatusCodeOutOfRange(code));
        }

        let reason = if include_reason {
            response
                .reason_phrase()
                .or_else(|| response.status().canonical_reason())
        } else {
            None
        };
        if let Some(reason) = reason {
            if reason.bytes().any(|b| b < 0x20 && b != b'\t' || b == 0x7F) {
                return Err(FrameError::InvalidFormat("control byte in reason phrase"));
            }
        }

        self.buffer.extend_from_slice(version.format().as_bytes());
        self.buffer.push(b' ');
        self.buffer.extend_from_slice(code.to_string().as_bytes());
        // The SP is mandatory whether or not a reason follows.
        self.buffer.push(b' ');
        if let Some(reason) = reason {
            self.buffer.extend_from_slice(reason.as_bytes());
        }
        self.buffer.extend_from_slice(CRLF);

        write_fields(&mut self.buffer, response.headers())?;
        self.buffer.extend_from_slice(CRLF);

        if let Some(body) = response.body().as_bytes() {
            self.buffer.extend_from_slice(body);
        }
        Ok(&self.buffer)
    }

    /// The serialized bytes of the last write.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for MessageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit every header field as `name ": " value CRLF`.
///
/// Names must be non-empty tokens; values are held to the same byte rules
/// the parser enforces (VCHAR, SP, HTAB, obs-text), so anything emitted
/// here parses back.
fn write_fields(buffer: &mut Vec<u8>, headers: &Headers) -> Result<(), FrameError> {
    for field in headers.iter() {
        let name = field.name().as_bytes();
        if name.is_empty() {
            return Err(FrameError::EmptyFieldName);
        }
        if !name.iter().all(|&b| is_token_char(b)) {
            return Err(FrameError::InvalidFieldName);
        }
        if !field.value().iter().all(|&b| is_field_value_byte(b)) {
            return Err(FrameError::InvalidFieldValueChar);
        }

        buffer.extend_from_slice(name);
        buffer.extend_from_slice(b": ");
        buffer.extend_from_slice(field.value());
        buffer.extend_from_slice(CRLF);
    }
    Ok(())
}

/// Serialize a request with a fresh writer.
///
/// # Errors
///
/// See [`MessageWriter::write_request`].
pub fn serialize_request(request: &Request, version: HttpVersion) -> Result<Vec<u8>, FrameError> {
    let mut writer = MessageWriter::new();
    writer.write_request(request, version)?;
    Ok(writer.into_bytes())
}

/// Serialize a response with a fresh writer.
///
/// # Errors
///
/// See [`MessageWriter::write_response`].
pub fn serialize_response(
    response: &Response,
    version: HttpVersion,
    include_reason: bool,
) -> Result<Vec<u8>, FrameError> {
    let mut writer = MessageWriter::new();
    writer.write_response(response, version, include_reason)?;
    Ok(writer.into_bytes())
}
