//! Field-line (header) parsing.
//!
//! Parses `name: value` lines under RFC 9112 §5. The single most important
//! rule here is the whitespace-before-colon rejection (§5.1): a space between
//! the field name and the colon lets two implementations disagree about the
//! field name, which is a request-smuggling vector.

use wireline_types::HeaderField;

use crate::error::FrameError;
use crate::limits::{LimitKind, Limits};
use crate::lines::Line;

/// Policy for obsolete line folding (RFC 9112 §5.2).
///
/// A header line whose first byte is SP or HTAB is a continuation of the
/// previous field line. Senders must never produce it; recipients choose how
/// to treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObsFoldPolicy {
    /// Reject the message. The default for recipients.
    #[default]
    Reject,
    /// Splice the continuation onto the previous value with one SP.
    /// This is the "lenient" behavior.
    ReplaceWithSpace,
    /// Drop the continuation bytes entirely.
    Discard,
}

fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`'
            | b'|' | b'~' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z'
    )
}

fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Valid field-value byte: VCHAR, SP, HTAB, or obs-text (`0x80..=0xFF`).
/// Shared with the serializer so emit and parse agree on legality.
pub(crate) fn is_field_value_byte(b: u8) -> bool {
    b == b'\t' || (0x20..=0x7E).contains(&b) || b >= 0x80
}

fn trim_ows(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_ows(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_ows(b)).map_or(start, |p| p + 1);
    &bytes[start..end]
}

/// Parse a single field line into a name/value pair.
///
/// The name keeps its original casing; the value has leading and trailing
/// OWS removed and internal OWS preserved. Values are raw bytes because
/// obs-text is legal in them.
///
/// # Errors
///
/// - [`FrameError::MissingColon`] - no `:` in the line.
/// - [`FrameError::EmptyFieldName`] - the line starts with `:`.
/// - [`FrameError::WhitespaceBeforeColon`] - SP/HTAB anywhere in the name.
/// - [`FrameError::InvalidFieldName`] - a non-token byte in the name.
/// - [`FrameError::InvalidFieldValueChar`] - a control byte in the value.
pub fn parse_field_line(line: &[u8]) -> Result<HeaderField, FrameError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(FrameError::MissingColon)?;

    let name = &line[..colon];
    if name.is_empty() {
        return Err(FrameError::EmptyFieldName);
    }
    if name.iter().any(|&b| is_ows(b)) {
        return Err(FrameError::WhitespaceBeforeColon);
    }
    if !name.iter().all(|&b| is_token_char(b)) {
        return Err(FrameError::InvalidFieldName);
    }

    let value = trim_ows(&line[colon + 1..]);
    if !value.iter().all(|&b| is_field_value_byte(b)) {
        return Err(FrameError::InvalidFieldValueChar);
    }

    // Token bytes are ASCII, so the name is always valid UTF-8.
    let name = std::str::from_utf8(name)
        .map_err(|_| FrameError::InvalidFieldName)?
        .to_string();
    Ok(HeaderField::new(name, value.to_vec()))
}

/// Parse a block of header lines, applying the obs-fold policy.
///
/// `lines` must not include the blank separator line. Line-length and
/// field-count limits are enforced here.
///
/// # Errors
///
/// Any [`parse_field_line`] error, plus
/// [`FrameError::ObsFoldWithoutPrecedingField`] under
/// [`ObsFoldPolicy::Reject`] (or for a continuation with nothing to
/// continue), [`FrameError::LineTooLong`], and a header-count
/// [`FrameError::LimitExceeded`].
pub fn parse_field_block(
    lines: &[Line<'_>],
    policy: ObsFoldPolicy,
    limits: &Limits,
) -> Result<Vec<HeaderField>, FrameError> {
    let mut fields: Vec<HeaderField> = Vec::new();

    for line in lines {
        let content = line.content();
        if content.len() > limits.max_header_line {
            return Err(FrameError::LineTooLong(content.len(), limits.max_header_line));
        }

        if content.first().is_some_and(|&b| is_ows(b)) {
            match policy {
                ObsFoldPolicy::Reject => return Err(FrameError::ObsFoldWithoutPrecedingField),
                ObsFoldPolicy::ReplaceWithSpace => {
                    let Some(previous) = fields.pop() else {
                        return Err(FrameError::ObsFoldWithoutPrecedingField);
                    };
                    let continuation = trim_ows(content);
                    if !continuation.iter().all(|&b| is_field_value_byte(b)) {
                        return Err(FrameError::InvalidFieldValueChar);
                    }
                    let mut value = previous.value().to_vec();
                    value.push(b' ');
                    value.extend_from_slice(continuation);
                    fields.push(HeaderField::new(previous.name().to_string(), value));
                }
                ObsFoldPolicy::Discard => {}
            }
            continue;
        }

        let field = parse_field_line(content)?;
        fields.push(field);
        if fields.len() > limits.max_headers {
            return Err(FrameError::LimitExceeded {
                kind: LimitKind::HeaderCount,
                observed: fields.len() as u64,
                cap: limits.max_headers as u64,
            });
        }
    }

    Ok(fields)
}
