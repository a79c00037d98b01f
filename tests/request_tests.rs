use scuttle::{url_decode, url_encode, Headers, Request};
use std::collections::HashMap;

#[test]
fn test_url_only_constructor() {
    let request = Request::new("https://example.org");
    assert_eq!(request.url(), "https://example.org");
    assert!(request.parameters().is_empty());
    assert!(request.headers().is_empty());
    assert!(!request.render());
}

#[test]
fn test_parameters_are_url_encoded() {
    let params = HashMap::from([("some key".to_string(), "some value".to_string())]);
    let request = Request::with_parameters("https://example.org", params);

    assert_eq!(
        request.full_url(),
        "https://example.org?some%20key=some%20value"
    );
}

#[test]
fn test_full_url_without_parameters_is_base_url() {
    let request = Request::new("https://example.org/path");
    assert_eq!(request.full_url(), "https://example.org/path");
}

#[test]
fn test_multiple_parameters_joined_with_ampersand() {
    let mut request = Request::new("https://example.org");
    request.add_parameter("a", "1");
    request.add_parameter("b", "2");

    let full = request.full_url();
    let query = full.strip_prefix("https://example.org?").unwrap();
    let mut pairs: Vec<_> = query.split('&').collect();
    pairs.sort();
    assert_eq!(pairs, vec!["a=1", "b=2"]);
}

#[test]
fn test_encoded_pair_decodes_back() {
    let key = "some key";
    let value = "some value";
    assert_eq!(url_decode(&url_encode(key)), key);
    assert_eq!(url_decode(&url_encode(value)), value);
}

#[test]
fn test_equality_ignores_map_insertion_order() {
    let mut a = Request::new("https://example.org");
    a.add_parameter("x", "1");
    a.add_parameter("y", "2");
    a.add_header("Accept", "text/html");
    a.add_header("User-Agent", "scuttle");

    let mut b = Request::new("https://example.org");
    b.add_parameter("y", "2");
    b.add_parameter("x", "1");
    b.add_header("user-agent", "scuttle");
    b.add_header("accept", "text/html");

    assert_eq!(a, b);
}

#[test]
fn test_render_flag_affects_equality() {
    let a = Request::new("https://example.org");
    let mut b = Request::new("https://example.org");
    b.set_render(true);

    assert!(b.render());
    assert_ne!(a, b);
}

#[test]
fn test_different_parameters_are_not_equal() {
    let mut a = Request::new("https://example.org");
    a.add_parameter("q", "rust");
    let mut b = Request::new("https://example.org");
    b.add_parameter("q", "crab");

    assert_ne!(a, b);
}

#[test]
fn test_headers_constructor_and_case_insensitive_lookup() {
    let headers: Headers = [("Content-Type", "application/json")].into_iter().collect();
    let request = Request::with_headers("https://example.org", headers);

    assert_eq!(
        request.headers().get("content-type"),
        Some("application/json")
    );
    assert_eq!(
        request.headers().get("CONTENT-TYPE"),
        Some("application/json")
    );
}

#[cfg(test)]
mod proptest_encoding {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_encode_decode_round_trip(input in "\\PC*") {
            prop_assert_eq!(url_decode(&url_encode(&input)), input);
        }

        #[test]
        fn prop_encoded_output_is_query_safe(input in "\\PC*") {
            let encoded = url_encode(&input);
            prop_assert!(!encoded.contains(' '));
            prop_assert!(!encoded.contains('&'));
            prop_assert!(!encoded.contains('='));
        }
    }
}
