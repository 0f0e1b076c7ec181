//! Round-trip and end-to-end scenario tests.
//!
//! The property tests pin the codec's invertibility: anything this library
//! serializes, it parses back unchanged, and the chunked codec reproduces
//! payload, per-chunk extensions and trailers exactly.

use proptest::prelude::*;

use wireline::{
    decode_chunked, parse_request, parse_response, request_body_length, response_body_length,
    serialize_request, serialize_response, BodyLength, ChunkedEncoder, ConnectionOptions,
    HttpVersion, ParseOptions, TransferCodings,
};
use wireline_types::{Body, Headers, Method, Request, Response, StatusCode};

fn opts() -> ParseOptions {
    ParseOptions::default()
}

// ============================================================================
// Concrete end-to-end scenarios
// ============================================================================

#[test]
fn scenario_simple_request() {
    let input = b"GET /p HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(input, &opts()).unwrap();

    assert_eq!(parsed.message.method(), &Method::GET);
    assert_eq!(parsed.message.target(), "/p");
    assert_eq!(
        parsed.message.headers().get("Host"),
        Some(b"example.com".as_slice())
    );
    assert!(parsed.message.body().is_empty());
    assert_eq!(parsed.bytes_consumed, input.len());
}

#[test]
fn scenario_chunked_response() {
    let input =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n8\r\n, World!\r\n0\r\n\r\n";

    let mut headers = Headers::new();
    headers.append("Transfer-Encoding", b"chunked".to_vec());
    assert_eq!(
        response_body_length(&Method::GET, 200, &headers),
        BodyLength::Chunked
    );

    let parsed = parse_response(input, &Method::GET, &opts()).unwrap();
    assert_eq!(
        parsed.message.body().as_bytes(),
        Some(b"Hello, World!".as_slice())
    );
    assert_eq!(parsed.message.headers().len(), 1);
    assert_eq!(parsed.bytes_consumed, input.len());
}

#[test]
fn scenario_smuggling_rejected() {
    let input = b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 10\r\nTransfer-Encoding: chunked\r\n\r\n";
    assert_eq!(
        parse_request(input, &opts()),
        Err(wireline::FrameError::AmbiguousMessageFraming)
    );
}

#[test]
fn scenario_whitespace_before_colon_rejected() {
    let input = b"GET / HTTP/1.1\r\nHost : a\r\n\r\n";
    assert_eq!(
        parse_request(input, &opts()),
        Err(wireline::FrameError::WhitespaceBeforeColon)
    );
}

#[test]
fn scenario_bare_cr_rejected() {
    let input = b"GET / HTTP/1.1\r\nX: a\rb\r\n\r\n";
    assert_eq!(
        parse_request(input, &opts()),
        Err(wireline::FrameError::BareCR(2))
    );
}

#[test]
fn scenario_204_overrides_content_length() {
    let input = b"HTTP/1.1 204 No Content\r\nContent-Length: 100\r\n\r\n";
    let parsed = parse_response(input, &Method::GET, &opts()).unwrap();
    assert!(parsed.message.body().is_empty());

    let mut headers = Headers::new();
    headers.append("Content-Length", b"100".to_vec());
    assert_eq!(
        response_body_length(&Method::GET, 204, &headers),
        BodyLength::None
    );
}

// ============================================================================
// Property strategies
// ============================================================================

fn arbitrary_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::GET),
        Just(Method::POST),
        Just(Method::PUT),
        Just(Method::DELETE),
        Just(Method::PATCH),
        Just(Method::OPTIONS),
        Just(Method::HEAD),
    ]
}

fn valid_path() -> impl Strategy<Value = String> {
    "[a-z0-9._-]{1,24}".prop_map(|s| format!("/{s}"))
}

fn header_token() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9-]{0,14}"
}

fn header_value() -> impl Strategy<Value = Vec<u8>> {
    // VCHAR and SP, already OWS-trimmed at the edges.
    "[!-~]([ -~]{0,18}[!-~])?".prop_map(String::into_bytes)
}

fn coding_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("gzip".to_string()),
        Just("deflate".to_string()),
        Just("compress".to_string()),
        "[a-z][a-z0-9-]{0,8}",
    ]
}

// ============================================================================
// Round-trip properties
// ============================================================================

proptest! {
    /// parse(serialize(x)) == x for framing-consistent requests.
    #[test]
    fn request_round_trips(
        method in arbitrary_method(),
        path in valid_path(),
        body in proptest::collection::vec(any::<u8>(), 0..64),
        extra_name in header_token(),
        extra_value in header_value(),
    ) {
        let mut request = Request::new(method, path);
        request.headers_mut().append("Host", b"example.com".to_vec());
        // Avoid colliding with the framing headers this test controls.
        prop_assume!(!extra_name.eq_ignore_ascii_case("host"));
        prop_assume!(!extra_name.eq_ignore_ascii_case("content-length"));
        prop_assume!(!extra_name.eq_ignore_ascii_case("transfer-encoding"));
        request.headers_mut().append(extra_name, extra_value);
        if !body.is_empty() {
            request
                .headers_mut()
                .append("Content-Length", body.len().to_string().into_bytes());
            request.set_body(Body::Bytes(body));
        }

        let bytes = serialize_request(&request, HttpVersion::HTTP11).unwrap();
        let parsed = parse_request(&bytes, &opts()).unwrap();

        prop_assert_eq!(parsed.message, request);
        prop_assert_eq!(parsed.bytes_consumed, bytes.len());
        prop_assert_eq!(parsed.version, HttpVersion::HTTP11);
    }

    /// parse(serialize(x)) == x for fixed-length responses.
    #[test]
    fn response_round_trips(
        code in 200u16..=599,
        body in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        prop_assume!(code != 204 && code != 304);

        let mut response = Response::new(StatusCode::from_u16(code));
        response
            .headers_mut()
            .append("Content-Length", body.len().to_string().into_bytes());
        response.set_body(Body::Bytes(body));

        let bytes = serialize_response(&response, HttpVersion::HTTP11, false).unwrap();
        let parsed = parse_response(&bytes, &Method::GET, &opts()).unwrap();

        prop_assert_eq!(parsed.message, response);
        prop_assert_eq!(parsed.bytes_consumed, bytes.len());
    }

    /// decode(encode(d, cs, ext, tr)) reproduces data, extensions, trailers.
    #[test]
    fn chunked_round_trips(
        data in proptest::collection::vec(any::<u8>(), 1..256),
        chunk_size in 1usize..48,
        ext_value in prop_oneof![
            Just(None),
            "[a-z0-9]{1,8}".prop_map(Some),
            "[a-z0-9; ]{1,12}".prop_map(Some),
        ],
        trailer_value in "[!-~]{1,12}",
    ) {
        let mut encoder = ChunkedEncoder::new()
            .with_chunk_size(chunk_size)
            .with_trailer("X-Check", trailer_value.clone().into_bytes());
        if let Some(value) = &ext_value {
            encoder = encoder.with_extension("tag", Some(value.clone()));
        }

        let encoded = encoder.encode(&data);
        let decoded = decode_chunked(&encoded).unwrap();

        prop_assert_eq!(&decoded.data, &data);
        prop_assert_eq!(decoded.bytes_consumed, encoded.len());

        let chunk_count = data.len().div_ceil(chunk_size) + 1;
        prop_assert_eq!(decoded.chunk_extensions.len(), chunk_count);
        if let Some(value) = &ext_value {
            for extensions in &decoded.chunk_extensions {
                prop_assert_eq!(extensions.len(), 1);
                prop_assert_eq!(&extensions[0].name, "tag");
                prop_assert_eq!(extensions[0].value.as_ref(), Some(value));
            }
        }

        prop_assert_eq!(decoded.trailers.len(), 1);
        prop_assert_eq!(decoded.trailers[0].name(), "X-Check");
        prop_assert_eq!(decoded.trailers[0].value(), trailer_value.as_bytes());
    }

    /// HttpVersion::parse(v.format()) == v.
    #[test]
    fn version_round_trips(major in 0u16..100, minor in 0u16..100) {
        let version = HttpVersion { major, minor };
        prop_assert_eq!(HttpVersion::parse(&version.format()).unwrap(), version);
    }

    /// TransferCodings::parse(list.format()) == list.
    #[test]
    fn transfer_codings_round_trip(
        tokens in proptest::collection::vec(coding_token(), 1..5),
    ) {
        let list = TransferCodings::parse(&tokens.join(","));
        prop_assert_eq!(TransferCodings::parse(&list.format()), list);
    }

    /// ConnectionOptions::parse(options.format()) == options.
    #[test]
    fn connection_options_round_trip(
        tokens in proptest::collection::vec("[a-z][a-z-]{0,10}", 1..5),
    ) {
        let options = ConnectionOptions::parse(&tokens.join(", "));
        prop_assert_eq!(ConnectionOptions::parse(&options.format()), options);
    }

    /// body_length is stable under permutation of agreeing duplicates and
    /// None for any pair of distinct values.
    #[test]
    fn content_length_duplicate_stability(
        value in 0u64..1_000_000,
        other in 0u64..1_000_000,
        copies in 1usize..4,
    ) {
        let mut forward = Headers::new();
        let mut reverse = Headers::new();
        for _ in 0..copies {
            forward.append("Content-Length", value.to_string().into_bytes());
            reverse.append("content-length", value.to_string().into_bytes());
        }

        prop_assert_eq!(request_body_length(&forward), BodyLength::Fixed(value));
        prop_assert_eq!(request_body_length(&forward), request_body_length(&reverse));

        if other != value {
            let mut conflicting = forward.clone();
            conflicting.append("Content-Length", other.to_string().into_bytes());
            prop_assert_eq!(request_body_length(&conflicting), BodyLength::None);
        }
    }
}
