//! Request size estimation tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use httpmeter_core::{estimate_request_size, HeaderField, RequestShape, SizeOptions};

struct Head {
    url: Option<&'static str>,
    headers: Vec<(&'static str, Vec<&'static str>)>,
    content_length: Option<u64>,
}

impl RequestShape for Head {
    fn method(&self) -> &str {
        "POST" // 4
    }
    fn protocol(&self) -> &str {
        "HTTP/1.1" // 8
    }
    fn path(&self) -> &str {
        "/upload"
    }
    fn url(&self) -> Option<&str> {
        self.url
    }
    fn host(&self) -> &str {
        "example.com" // 11
    }
    fn header_fields(&self) -> Vec<HeaderField<'_>> {
        self.headers
            .iter()
            .map(|(name, values)| HeaderField {
                name: *name,
                values: values.iter().map(|v| v.as_bytes()).collect(),
            })
            .collect()
    }
    fn content_length(&self) -> Option<u64> {
        self.content_length
    }
}

const BASE: u64 = 4 + 8 + 11;

#[test]
fn bare_request_sums_method_protocol_host() {
    let head = Head { url: Some("/upload?x=1"), headers: vec![], content_length: None };
    assert_eq!(estimate_request_size(&head, SizeOptions::default()), BASE);
}

#[test]
fn header_name_counts_once_per_field() {
    let head = Head {
        url: None,
        headers: vec![("accept", vec!["a/b", "c/d"]), ("x-id", vec!["7"])],
        content_length: None,
    };
    // "accept" + "a/b" + "c/d" + "x-id" + "7"
    assert_eq!(estimate_request_size(&head, SizeOptions::default()), BASE + 6 + 3 + 3 + 4 + 1);
}

#[test]
fn declared_content_length_is_added() {
    let head = Head { url: None, headers: vec![], content_length: Some(512) };
    assert_eq!(estimate_request_size(&head, SizeOptions::default()), BASE + 512);

    let empty = Head { url: None, headers: vec![], content_length: Some(0) };
    assert_eq!(estimate_request_size(&empty, SizeOptions::default()), BASE);
}

#[test]
fn url_only_counts_when_opted_in() {
    let head = Head { url: Some("/upload?x=1"), headers: vec![], content_length: None };
    assert_eq!(estimate_request_size(&head, SizeOptions { count_url: true }), BASE + 11);

    let missing = Head { url: None, headers: vec![], content_length: None };
    assert_eq!(estimate_request_size(&missing, SizeOptions { count_url: true }), BASE);
    assert_eq!(estimate_request_size(&missing, SizeOptions::default()), BASE);
}

#[test]
fn huge_declared_length_saturates() {
    let head = Head {
        url: Some("/upload"),
        headers: vec![("x-id", vec!["7"])],
        content_length: Some(u64::MAX),
    };
    assert_eq!(estimate_request_size(&head, SizeOptions::default()), u64::MAX);
    assert_eq!(estimate_request_size(&head, SizeOptions { count_url: true }), u64::MAX);
}
