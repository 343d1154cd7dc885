//! Single page application fallback
//!
//! Answers any request that reached it with the application's default page so
//! the client-side router can take over. Requests under the client runtime's
//! own `/_framework` namespace are never given the page: a missing runtime
//! asset has to surface as a 404, not as HTML the runtime cannot parse.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use std::sync::Arc;

use super::{Middleware, Outcome, RequestContext, StageError, StaticFileServingUnit};

/// URL segment reserved for the client runtime's assets
pub const FRAMEWORK_SEGMENT: &str = "/_framework";

/// Page served for unmatched routes
pub const DEFAULT_PAGE: &str = "/index.html";

/// True when `path` is `/_framework` or below it
///
/// Judged on the path the static stages would see: percent-decoded, with
/// empty and `.` segments dropped and `..` applied. Segment-wise and
/// case-insensitive, so `/_FRAMEWORK/x` and `/%5Fframework/x` are reserved
/// while `/_frameworks` is not. A path that does not decode is reserved.
pub fn is_framework_path(path: &str) -> bool {
    let Ok(decoded) = percent_decode_str(path).decode_utf8() else {
        return true;
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    segments
        .first()
        .is_some_and(|first| first.eq_ignore_ascii_case(&FRAMEWORK_SEGMENT[1..]))
}

/// Terminal stage serving the distribution directory's default page
pub struct SpaFallback {
    dist: Arc<StaticFileServingUnit>,
}

impl SpaFallback {
    /// The page is served through `dist`, reusing its content types and
    /// cache policy
    pub const fn new(dist: Arc<StaticFileServingUnit>) -> Self {
        Self { dist }
    }
}

#[async_trait]
impl Middleware for SpaFallback {
    fn name(&self) -> &str {
        "spa fallback"
    }

    async fn handle(&self, ctx: &RequestContext) -> Result<Outcome, StageError> {
        if is_framework_path(&ctx.path) || !ctx.is_read() {
            return Ok(Outcome::NotFound);
        }

        match self.dist.serve_path(ctx, DEFAULT_PAGE).await? {
            Outcome::Handled(response) => Ok(Outcome::Handled(response)),
            Outcome::NotFound => Err(StageError::DefaultPageMissing {
                root: self.dist.root().to_path_buf(),
                page: DEFAULT_PAGE,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cache::{self, NO_CACHE};
    use crate::http::ContentTypeTable;
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_TYPE};
    use hyper::{Method, StatusCode};
    use tempfile::tempdir;

    fn fallback(root: &std::path::Path) -> SpaFallback {
        SpaFallback::new(Arc::new(StaticFileServingUnit::new(
            root,
            Arc::new(ContentTypeTable::build(false)),
            cache::decorate,
        )))
    }

    #[test]
    fn test_framework_paths() {
        assert!(is_framework_path("/_framework"));
        assert!(is_framework_path("/_framework/"));
        assert!(is_framework_path("/_framework/blazor.boot.json"));
        assert!(is_framework_path("/_Framework/_bin/App.dll"));
        assert!(!is_framework_path("/_frameworks/x"));
        assert!(!is_framework_path("/app/_framework/x"));
        assert!(!is_framework_path("/"));
        assert!(!is_framework_path("/_fr"));
    }

    #[test]
    fn test_framework_paths_are_judged_decoded() {
        assert!(is_framework_path("/%5Fframework/missing.js"));
        assert!(is_framework_path("/%5fFRAMEWORK"));
        assert!(is_framework_path("//_framework/x.js"));
        assert!(is_framework_path("/./_framework/x.js"));
        assert!(is_framework_path("/app/../_framework/x.js"));
        assert!(is_framework_path("/%FF/x"));
        assert!(!is_framework_path("/%5Fframeworks/x"));
        assert!(!is_framework_path("/_framework/../counter"));
    }

    #[tokio::test]
    async fn test_encoded_framework_requests_fall_through() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<app></app>").unwrap();

        let outcome = fallback(dir.path())
            .handle(&RequestContext::new(Method::GET, "/%5Fframework/missing.js"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::NotFound));
    }

    #[tokio::test]
    async fn test_serves_default_page_for_client_routes() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<app></app>").unwrap();

        let outcome = fallback(dir.path())
            .handle(&RequestContext::new(Method::GET, "/counter/42"))
            .await
            .unwrap();
        let Outcome::Handled(response) = outcome else {
            panic!("expected the default page");
        };
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(response.headers()[CACHE_CONTROL], NO_CACHE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<app></app>");
    }

    #[tokio::test]
    async fn test_framework_requests_fall_through() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<app></app>").unwrap();

        let outcome = fallback(dir.path())
            .handle(&RequestContext::new(Method::GET, "/_framework/blazor.boot.json"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::NotFound));
    }

    #[tokio::test]
    async fn test_non_read_methods_fall_through() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<app></app>").unwrap();

        let outcome = fallback(dir.path())
            .handle(&RequestContext::new(Method::DELETE, "/items/1"))
            .await
            .unwrap();
        assert!(matches!(outcome, Outcome::NotFound));
    }

    #[tokio::test]
    async fn test_missing_default_page_is_an_error() {
        let dir = tempdir().unwrap();
        let err = fallback(dir.path())
            .handle(&RequestContext::new(Method::GET, "/"))
            .await
            .unwrap_err();
        assert!(matches!(err, StageError::DefaultPageMissing { .. }));
    }
}
