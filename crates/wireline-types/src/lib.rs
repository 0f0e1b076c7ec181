//! Shared HTTP semantic types for the wireline crates.
//!
//! This crate provides the RFC 9110 data model consumed by the `wireline`
//! framing codec, enabling clean dependency ordering without cycles:
//!
//! - [`Method`] and [`StatusCode`]
//! - [`Headers`] / [`HeaderField`] (ordered, duplicate-preserving)
//! - [`Request`], [`Response`] and [`Body`]
//! - [`Uri`] and [`Authority`] for absolute-form targets
//!
//! None of these types know anything about the HTTP/1.1 wire format; parsing
//! and serialization live in the `wireline` crate.

#![forbid(unsafe_code)]

mod headers;
mod method;
mod request;
mod response;
mod status;
mod uri;

pub use headers::{HeaderField, Headers};
pub use method::Method;
pub use request::{Body, Request};
pub use response::Response;
pub use status::StatusCode;
pub use uri::{Authority, Uri, UriError};
