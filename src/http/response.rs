//! HTTP response building module
//!
//! Builders for the handful of responses the pipeline and host produce.
//! None of them set `Cache-Control`; that is left to the cache policy.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};

use super::range::ByteRange;

/// Response type produced by every pipeline stage
pub type HttpResponse = Response<Full<Bytes>>;

/// Validators and type shared by every response for one file
#[derive(Debug, Clone, Copy)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
}

/// Build 200 response carrying a whole file
pub fn build_file_response(data: Bytes, headers: &FileHeaders<'_>, is_head: bool) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, headers.etag);
    if let Some(modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        empty(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Build 206 Partial Content response for one range of a file
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    headers: &FileHeaders<'_>,
    is_head: bool,
) -> HttpResponse {
    let body = if is_head {
        Bytes::new()
    } else {
        data.slice(range.start..=range.end)
    };

    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(data.len()))
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, headers.etag);
    if let Some(modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, modified);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("206", &e);
        empty(StatusCode::INTERNAL_SERVER_ERROR)
    })
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, modified);
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("304", &e);
        empty(StatusCode::NOT_MODIFIED)
    })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from("416 Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            empty(StatusCode::RANGE_NOT_SATISFIABLE)
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> HttpResponse {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn text_response(status: StatusCode, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            empty(status)
        })
}

fn empty(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
