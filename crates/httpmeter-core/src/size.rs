//! Approximate request size from the structural parts of a request.
//!
//! The estimate never touches the body: it sums the lengths of the method,
//! protocol, header names and values, host, and the declared content length.

/// One header name with every value sent for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField<'a> {
    pub name: &'a str,
    pub values: Vec<&'a [u8]>,
}

/// Read-only view of an inbound request's head.
///
/// Implemented by the host adapter (the gateway implements it over axum's
/// request). Nothing here may consume the body.
pub trait RequestShape {
    /// HTTP method, verbatim (`GET`).
    fn method(&self) -> &str;
    /// Protocol string (`HTTP/1.1`).
    fn protocol(&self) -> &str;
    /// Raw request path, without query.
    fn path(&self) -> &str;
    /// Request URL (path and query) if the request carries one.
    fn url(&self) -> Option<&str>;
    /// Host the request was addressed to. Not repeated in `header_fields`.
    fn host(&self) -> &str;
    /// Header fields, one entry per distinct name.
    fn header_fields(&self) -> Vec<HeaderField<'_>>;
    /// Declared body length; `None` when unknown.
    fn content_length(&self) -> Option<u64>;
    /// Matched route template (`/users/:id`), if the router resolved one.
    fn route(&self) -> Option<&str> {
        None
    }
}

/// Knobs for `estimate_request_size`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeOptions {
    /// Add the URL length when the URL is present.
    ///
    /// Off by default: the historical estimate only sizes the URL when it is
    /// missing, so the URL never contributes.
    pub count_url: bool,
}

/// Estimate the byte size of a request head plus its declared body length.
///
/// Saturates at `u64::MAX`; a hostile `Content-Length` cannot overflow it.
pub fn estimate_request_size<R: RequestShape + ?Sized>(req: &R, opts: SizeOptions) -> u64 {
    let mut size: u64 = 0;
    let mut add = |n: u64| size = size.saturating_add(n);

    if opts.count_url {
        add(req.url().map_or(0, str::len) as u64);
    }

    add(req.method().len() as u64);
    add(req.protocol().len() as u64);

    for field in req.header_fields() {
        add(field.name.len() as u64);
        for value in &field.values {
            add(value.len() as u64);
        }
    }

    add(req.host().len() as u64);

    // Form data is assumed to be carried by the URL or the declared body.
    if let Some(len) = req.content_length() {
        add(len);
    }

    size
}
