//! Per-request view handed to every stage

use hyper::header::{HeaderMap, HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE};
use hyper::{Method, Request};

/// Request information needed by the pipeline stages
///
/// Owned so a request can be replayed against several stages without
/// borrowing from the host's request type.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// URI path, still percent-encoded
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl RequestContext {
    /// Bare `GET`-style context, mostly useful for tests and tooling
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            headers: req.headers().clone(),
        }
    }

    /// Add a header, replacing any previous value
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn is_head(&self) -> bool {
        self.method == Method::HEAD
    }

    /// Static content is only ever served for `GET` and `HEAD`
    pub fn is_read(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn if_none_match(&self) -> Option<&str> {
        self.header(&IF_NONE_MATCH)
    }

    pub fn if_modified_since(&self) -> Option<&str> {
        self.header(&IF_MODIFIED_SINCE)
    }

    pub fn range(&self) -> Option<&str> {
        self.header(&RANGE)
    }
}
