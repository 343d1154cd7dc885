//! Static file serving stage
//!
//! Maps a request path onto a root directory. Anything that does not resolve
//! to a readable regular file with a known content type is a `NotFound`, so
//! the request moves on to the next stage.

use async_trait::async_trait;
use hyper::body::Bytes;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::OnceCell;

use super::{Middleware, Outcome, RequestContext, StageError};
use crate::http::cache::{self, ResponseDecorator};
use crate::http::response::{self as builders, FileHeaders};
use crate::http::{ContentTypeTable, RangeRequest};
use crate::logger;

/// One served directory with its content types and response hook
pub struct StaticFileServingUnit {
    name: String,
    root: PathBuf,
    /// Resolved on first use; the root may not exist yet at setup
    canonical_root: OnceCell<PathBuf>,
    content_types: Arc<ContentTypeTable>,
    decorator: ResponseDecorator,
}

impl StaticFileServingUnit {
    pub fn new(
        root: impl Into<PathBuf>,
        content_types: Arc<ContentTypeTable>,
        decorator: ResponseDecorator,
    ) -> Self {
        let root = root.into();
        Self {
            name: format!("static files ({})", root.display()),
            root,
            canonical_root: OnceCell::new(),
            content_types,
            decorator,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn content_types(&self) -> &ContentTypeTable {
        &self.content_types
    }

    /// Serve `request_path` instead of the path the request came in with
    ///
    /// Used by the SPA fallback to answer with the default page while keeping
    /// the request's method and conditional headers.
    pub async fn serve_path(
        &self,
        ctx: &RequestContext,
        request_path: &str,
    ) -> Result<Outcome, StageError> {
        if !ctx.is_read() {
            return Ok(Outcome::NotFound);
        }

        let Some(relative) = relative_path(request_path) else {
            logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
            return Ok(Outcome::NotFound);
        };
        let file_path = self.root.join(&relative);

        let Some(content_type) = self.content_types.for_path(&file_path) else {
            return Ok(Outcome::NotFound);
        };

        let Ok(metadata) = fs::metadata(&file_path).await else {
            return Ok(Outcome::NotFound);
        };
        if !metadata.is_file() || !self.is_inside_root(&file_path, request_path).await {
            return Ok(Outcome::NotFound);
        }

        let data = match fs::read(&file_path).await {
            Ok(data) => Bytes::from(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Outcome::NotFound),
            Err(source) => {
                logger::log_error(&format!(
                    "Failed to read file '{}': {source}",
                    file_path.display()
                ));
                return Err(StageError::Read {
                    path: file_path,
                    source,
                });
            }
        };

        let etag = cache::generate_etag(&data);
        let last_modified = metadata.modified().ok().map(cache::format_http_date);
        let headers = FileHeaders {
            content_type,
            etag: &etag,
            last_modified: last_modified.as_deref(),
        };

        let mut response = build_response(ctx, data, &headers, metadata.modified().ok());
        (self.decorator)(&mut response);
        Ok(Outcome::Handled(response))
    }

    /// Symlinks may point outside the root even when the path itself does not
    ///
    /// A root that cannot be resolved is retried on the next request.
    async fn is_inside_root(&self, file_path: &Path, request_path: &str) -> bool {
        let root = match self
            .canonical_root
            .get_or_try_init(|| fs::canonicalize(&self.root))
            .await
        {
            Ok(root) => root,
            Err(e) => {
                logger::log_warning(&format!(
                    "Static directory not found or inaccessible '{}': {e}",
                    self.root.display()
                ));
                return false;
            }
        };
        let Ok(file) = fs::canonicalize(file_path).await else {
            return false;
        };
        if file.starts_with(root) {
            return true;
        }
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            file.display()
        ));
        false
    }
}

#[async_trait]
impl Middleware for StaticFileServingUnit {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, ctx: &RequestContext) -> Result<Outcome, StageError> {
        self.serve_path(ctx, &ctx.path).await
    }
}

/// Pick 304, 416, 206 or 200 for a file the request resolved to
fn build_response(
    ctx: &RequestContext,
    data: Bytes,
    headers: &FileHeaders<'_>,
    modified: Option<std::time::SystemTime>,
) -> crate::http::HttpResponse {
    // If-None-Match takes precedence; If-Modified-Since only counts without it
    let not_modified = match ctx.if_none_match() {
        Some(_) => cache::check_etag_match(ctx.if_none_match(), headers.etag),
        None => modified.is_some_and(|m| cache::not_modified_since(ctx.if_modified_since(), m)),
    };
    if not_modified {
        return builders::build_304_response(headers.etag, headers.last_modified);
    }

    match RangeRequest::parse(ctx.range(), data.len()) {
        RangeRequest::Partial(range) => {
            builders::build_partial_response(&data, range, headers, ctx.is_head())
        }
        RangeRequest::NotSatisfiable => builders::build_416_response(data.len()),
        RangeRequest::Full => builders::build_file_response(data, headers, ctx.is_head()),
    }
}

/// Decode a request path into a path relative to a root
///
/// Returns `None` when the path tries to climb out of the root or is not
/// valid UTF-8 once decoded.
fn relative_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let mut relative = PathBuf::new();
    for segment in decoded.split(['/', '\\']) {
        match Path::new(segment).components().next() {
            None | Some(Component::CurDir) => {}
            Some(Component::Normal(part)) if !segment.contains('\0') => relative.push(part),
            _ => return None,
        }
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cache::NO_CACHE;
    use crate::http::mime::WASM;
    use http_body_util::BodyExt;
    use hyper::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, IF_NONE_MATCH, RANGE};
    use hyper::{Method, StatusCode};
    use tempfile::{tempdir, TempDir};

    fn unit(dir: &TempDir, debugging: bool) -> StaticFileServingUnit {
        StaticFileServingUnit::new(
            dir.path(),
            Arc::new(ContentTypeTable::build(debugging)),
            cache::decorate,
        )
    }

    async fn get(unit: &StaticFileServingUnit, ctx: RequestContext) -> Outcome {
        unit.handle(&ctx).await.unwrap()
    }

    #[tokio::test]
    async fn test_serves_file_with_type_and_cache_policy() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("app.wasm"), b"\0asm").unwrap();

        let Outcome::Handled(response) =
            get(&unit(&dir, false), RequestContext::new(Method::GET, "/app.wasm")).await
        else {
            panic!("expected the file to be served");
        };

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], WASM);
        assert_eq!(response.headers()[CACHE_CONTROL], NO_CACHE);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"\0asm");
    }

    #[tokio::test]
    async fn test_missing_file_falls_through() {
        let dir = tempdir().unwrap();
        let outcome = get(&unit(&dir, false), RequestContext::new(Method::GET, "/nope.js")).await;
        assert!(matches!(outcome, Outcome::NotFound));
    }

    #[tokio::test]
    async fn test_unknown_type_is_not_served() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("App.pdb"), b"symbols").unwrap();
        std::fs::write(dir.path().join("LICENSE"), b"MIT").unwrap();

        let plain = unit(&dir, false);
        for path in ["/App.pdb", "/LICENSE"] {
            let outcome = get(&plain, RequestContext::new(Method::GET, path)).await;
            assert!(matches!(outcome, Outcome::NotFound), "{path} was served");
        }

        let debugging = unit(&dir, true);
        let outcome = get(&debugging, RequestContext::new(Method::GET, "/App.pdb")).await;
        assert!(outcome.is_handled());
    }

    #[tokio::test]
    async fn test_directories_and_root_fall_through() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("css")).unwrap();
        std::fs::write(dir.path().join("index.html"), b"<html>").unwrap();

        let unit = unit(&dir, false);
        for path in ["/", "/css", "/css/"] {
            let outcome = get(&unit, RequestContext::new(Method::GET, path)).await;
            assert!(matches!(outcome, Outcome::NotFound), "{path} was served");
        }
    }

    #[tokio::test]
    async fn test_only_get_and_head_are_served() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("site.css"), b"body{}").unwrap();
        let unit = unit(&dir, false);

        let outcome = get(&unit, RequestContext::new(Method::POST, "/site.css")).await;
        assert!(matches!(outcome, Outcome::NotFound));

        let Outcome::Handled(response) =
            get(&unit, RequestContext::new(Method::HEAD, "/site.css")).await
        else {
            panic!("HEAD should be served");
        };
        assert_eq!(response.headers()["content-length"], "6");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_percent_encoded_paths() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("my file.txt"), b"spaced").unwrap();

        let outcome = get(
            &unit(&dir, false),
            RequestContext::new(Method::GET, "/my%20file.txt"),
        )
        .await;
        assert!(outcome.is_handled());
    }

    #[tokio::test]
    async fn test_blocks_path_traversal() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("dist");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"nope").unwrap();

        let unit = StaticFileServingUnit::new(
            &root,
            Arc::new(ContentTypeTable::baseline()),
            cache::decorate,
        );
        for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/..%5csecret.txt"] {
            let outcome = get(&unit, RequestContext::new(Method::GET, path)).await;
            assert!(matches!(outcome, Outcome::NotFound), "{path} escaped the root");
        }
    }

    #[tokio::test]
    async fn test_root_resolved_once_it_exists() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("dist");
        let unit = StaticFileServingUnit::new(
            &root,
            Arc::new(ContentTypeTable::baseline()),
            cache::decorate,
        );

        // Root not built yet: nothing served, nothing remembered
        let outcome = get(&unit, RequestContext::new(Method::GET, "/app.js")).await;
        assert!(matches!(outcome, Outcome::NotFound));
        assert!(unit.canonical_root.get().is_none());

        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("app.js"), b"run()").unwrap();
        let outcome = get(&unit, RequestContext::new(Method::GET, "/app.js")).await;
        assert!(outcome.is_handled());
        assert_eq!(
            unit.canonical_root.get(),
            Some(&std::fs::canonicalize(&root).unwrap())
        );
    }

    #[tokio::test]
    async fn test_conditional_and_range_requests() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.json"), b"0123456789").unwrap();
        let unit = unit(&dir, false);

        let Outcome::Handled(first) =
            get(&unit, RequestContext::new(Method::GET, "/data.json")).await
        else {
            panic!("expected a response");
        };
        let etag = first.headers()[ETAG].to_str().unwrap().to_string();

        let mut ctx = RequestContext::new(Method::GET, "/data.json");
        ctx.headers.insert(IF_NONE_MATCH, etag.parse().unwrap());
        let Outcome::Handled(revalidated) = get(&unit, ctx).await else {
            panic!("expected a response");
        };
        assert_eq!(revalidated.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(revalidated.headers()[CACHE_CONTROL], NO_CACHE);

        let ctx = RequestContext::new(Method::GET, "/data.json").with_header(RANGE, "bytes=2-4");
        let Outcome::Handled(partial) = get(&unit, ctx).await else {
            panic!("expected a response");
        };
        assert_eq!(partial.status(), StatusCode::PARTIAL_CONTENT);
        let body = partial.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"234");

        let ctx = RequestContext::new(Method::GET, "/data.json").with_header(RANGE, "bytes=50-");
        let Outcome::Handled(unsatisfiable) = get(&unit, ctx).await else {
            panic!("expected a response");
        };
        assert_eq!(unsatisfiable.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/a/b.js"), Some(PathBuf::from("a/b.js")));
        assert_eq!(relative_path("/./a//b.js"), Some(PathBuf::from("a/b.js")));
        assert_eq!(relative_path("/"), Some(PathBuf::new()));
        assert_eq!(relative_path("/a/../b"), None);
        assert_eq!(relative_path("/%ff"), None);
    }
}
