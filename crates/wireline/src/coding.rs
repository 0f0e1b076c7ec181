//! Transfer-coding model.
//!
//! Represents parsed `Transfer-Encoding` lists. This library parses and
//! reports the compression codings but never applies them; only `chunked`
//! changes how a message is framed.

use std::fmt;

use crate::error::FrameError;

/// A single transfer coding token.
///
/// Tokens are normalized to lowercase on parse; `x-compress` is folded into
/// [`TransferCoding::Compress`] per RFC 9112 §7.2. Unrecognized tokens are
/// retained verbatim (lowercased) as extension codings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferCoding {
    /// `chunked` (RFC 9112 §7.1).
    Chunked,
    /// `gzip` - reported, never applied here.
    Gzip,
    /// `deflate` - reported, never applied here.
    Deflate,
    /// `compress` (or its `x-compress` alias) - reported, never applied here.
    Compress,
    /// Any other coding token.
    Extension(String),
}

impl TransferCoding {
    fn from_token(token: &str) -> Self {
        match token {
            "chunked" => Self::Chunked,
            "gzip" => Self::Gzip,
            "deflate" => Self::Deflate,
            "compress" | "x-compress" => Self::Compress,
            other => Self::Extension(other.to_string()),
        }
    }

    /// Returns the lowercase token for this coding.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Chunked => "chunked",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Compress => "compress",
            Self::Extension(token) => token,
        }
    }
}

impl fmt::Display for TransferCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `Transfer-Encoding` list.
///
/// A value that parses to zero codings is treated exactly like an absent
/// header. Multiple header instances are concatenated in order, per the
/// RFC 9110 list-field rules, before any of the position queries run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferCodings {
    codings: Vec<TransferCoding>,
}

impl TransferCodings {
    /// Parse a single header value.
    ///
    /// Splits on commas, trims OWS, lowercases each token. Empty list
    /// elements are skipped (RFC 9110 allows them for legacy senders).
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut list = Self::default();
        list.extend_from(text);
        list
    }

    /// Parse and concatenate several header instances in order.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::InvalidFormat`] if a value is not ASCII.
    pub fn from_header_values<'a, I>(values: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut list = Self::default();
        for value in values {
            let text = std::str::from_utf8(value)
                .map_err(|_| FrameError::InvalidFormat("Transfer-Encoding is not ASCII"))?;
            list.extend_from(text);
        }
        Ok(list)
    }

    fn extend_from(&mut self, text: &str) {
        for segment in text.split(',') {
            let token = segment.trim_matches([' ', '\t']);
            if token.is_empty() {
                continue;
            }
            let token = token.to_ascii_lowercase();
            self.codings.push(TransferCoding::from_token(&token));
        }
    }

    /// The parsed codings, in wire order.
    #[must_use]
    pub fn codings(&self) -> &[TransferCoding] {
        &self.codings
    }

    /// Returns true if no codings were present - equivalent to the header
    /// being absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codings.is_empty()
    }

    /// Returns true if `chunked` appears anywhere in the list.
    #[must_use]
    pub fn has_chunked(&self) -> bool {
        self.codings.contains(&TransferCoding::Chunked)
    }

    /// Returns true if `chunked` is present and is the final coding.
    #[must_use]
    pub fn is_chunked_final(&self) -> bool {
        self.codings.last() == Some(&TransferCoding::Chunked)
    }

    /// Counts how many times `chunked` appears.
    #[must_use]
    pub fn chunked_count(&self) -> usize {
        self.codings
            .iter()
            .filter(|c| **c == TransferCoding::Chunked)
            .count()
    }

    /// Format for the wire: tokens joined by `", "`.
    #[must_use]
    pub fn format(&self) -> String {
        self.codings
            .iter()
            .map(TransferCoding::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TransferCodings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tokens() {
        let list = TransferCodings::parse("gzip, chunked");
        assert_eq!(
            list.codings(),
            &[TransferCoding::Gzip, TransferCoding::Chunked]
        );
    }

    #[test]
    fn lowercases_and_trims() {
        let list = TransferCodings::parse("  GZip ,\tCHUNKED ");
        assert_eq!(
            list.codings(),
            &[TransferCoding::Gzip, TransferCoding::Chunked]
        );
    }

    #[test]
    fn x_compress_is_an_alias() {
        let list = TransferCodings::parse("x-compress, compress");
        assert_eq!(
            list.codings(),
            &[TransferCoding::Compress, TransferCoding::Compress]
        );
    }

    #[test]
    fn extensions_retained() {
        let list = TransferCodings::parse("br, chunked");
        assert_eq!(
            list.codings()[0],
            TransferCoding::Extension("br".to_string())
        );
    }

    #[test]
    fn empty_elements_skipped() {
        let list = TransferCodings::parse(", chunked, ,");
        assert_eq!(list.codings(), &[TransferCoding::Chunked]);

        assert!(TransferCodings::parse("").is_empty());
        assert!(TransferCodings::parse(" , ,").is_empty());
    }

    #[test]
    fn position_queries() {
        let list = TransferCodings::parse("gzip, chunked");
        assert!(list.has_chunked());
        assert!(list.is_chunked_final());
        assert_eq!(list.chunked_count(), 1);

        let list = TransferCodings::parse("chunked, gzip");
        assert!(list.has_chunked());
        assert!(!list.is_chunked_final());

        let list = TransferCodings::parse("chunked, chunked");
        assert_eq!(list.chunked_count(), 2);
    }

    #[test]
    fn multiple_instances_concatenate_in_order() {
        let values: Vec<&[u8]> = vec![b"gzip", b"chunked"];
        let list = TransferCodings::from_header_values(values).unwrap();
        assert_eq!(
            list.codings(),
            &[TransferCoding::Gzip, TransferCoding::Chunked]
        );
        assert!(list.is_chunked_final());

        let values: Vec<&[u8]> = vec![b"chunked", b"gzip"];
        let list = TransferCodings::from_header_values(values).unwrap();
        assert!(!list.is_chunked_final());
    }

    #[test]
    fn non_ascii_value_rejected() {
        let values: Vec<&[u8]> = vec![&[0xFF, 0xFE]];
        assert!(TransferCodings::from_header_values(values).is_err());
    }

    #[test]
    fn format_round_trips() {
        let list = TransferCodings::parse("gzip,chunked");
        assert_eq!(list.format(), "gzip, chunked");
        assert_eq!(TransferCodings::parse(&list.format()), list);
    }
}
