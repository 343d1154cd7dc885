// Request handler module
// Runs each request through the pipeline and maps the outcome to a response

use hyper::body::Body;
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::HostState;
use crate::http::{build_404_response, build_500_response, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::pipeline::{Outcome, Pipeline, RequestContext};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<HostState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);
    let version = req.version();
    drop(req);
    let (response, stage) = respond(&state.pipeline, &ctx).await;

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            ctx.method.to_string(),
            ctx.path.clone(),
        );
        entry.query = ctx.query.clone();
        entry.http_version = version_label(version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = ctx.header(&REFERER).map(ToString::to_string);
        entry.user_agent = ctx.header(&USER_AGENT).map(ToString::to_string);
        entry.stage = stage;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Turn a pipeline run into the response sent to the client
///
/// A request no stage answered is a 404; a stage failure is a 500.
pub async fn respond(pipeline: &Pipeline, ctx: &RequestContext) -> (HttpResponse, Option<String>) {
    match pipeline.handle_traced(ctx).await {
        Ok((Outcome::Handled(response), stage)) => (response, stage.map(ToString::to_string)),
        Ok((Outcome::NotFound, _)) => (build_404_response(), None),
        Err(e) => {
            match std::error::Error::source(&e) {
                Some(source) => logger::log_error(&format!(
                    "{} {}: {e}: {source}",
                    ctx.method, ctx.path
                )),
                None => logger::log_error(&format!("{} {}: {e}", ctx.method, ctx.path)),
            }
            (build_500_response(), None)
        }
    }
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
