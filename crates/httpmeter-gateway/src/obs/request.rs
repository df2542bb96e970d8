//! `RequestShape` adapter over an axum request.
//!
//! The `Host` header is reported through `host()` and left out of
//! `header_fields()`, so it is sized once.

use axum::extract::{MatchedPath, Request};
use axum::http::{header, Version};
use httpmeter_core::{HeaderField, RequestShape};

/// Borrowed view of a request head. Never touches the body.
pub struct RequestHead<'a> {
    req: &'a Request,
}

impl<'a> RequestHead<'a> {
    pub fn new(req: &'a Request) -> Self {
        Self { req }
    }
}

fn protocol_str(v: Version) -> &'static str {
    if v == Version::HTTP_09 {
        "HTTP/0.9"
    } else if v == Version::HTTP_10 {
        "HTTP/1.0"
    } else if v == Version::HTTP_11 {
        "HTTP/1.1"
    } else if v == Version::HTTP_2 {
        "HTTP/2.0"
    } else if v == Version::HTTP_3 {
        "HTTP/3.0"
    } else {
        ""
    }
}

impl RequestShape for RequestHead<'_> {
    fn method(&self) -> &str {
        self.req.method().as_str()
    }

    fn protocol(&self) -> &str {
        protocol_str(self.req.version())
    }

    fn path(&self) -> &str {
        self.req.uri().path()
    }

    fn url(&self) -> Option<&str> {
        self.req.uri().path_and_query().map(|pq| pq.as_str())
    }

    fn host(&self) -> &str {
        self.req
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| self.req.uri().authority().map(|a| a.as_str()))
            .unwrap_or("")
    }

    fn header_fields(&self) -> Vec<HeaderField<'_>> {
        let headers = self.req.headers();
        headers
            .keys()
            .filter(|name| **name != header::HOST)
            .map(|name| HeaderField {
                name: name.as_str(),
                values: headers.get_all(name).iter().map(|v| v.as_bytes()).collect(),
            })
            .collect()
    }

    fn content_length(&self) -> Option<u64> {
        self.req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }

    fn route(&self) -> Option<&str> {
        self.req.extensions().get::<MatchedPath>().map(|m| m.as_str())
    }
}
