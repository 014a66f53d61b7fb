//! Static asset module
//!
//! Catch-all handler serving the documentation site from `assets.dir`.

use super::context::{HandlerFuture, RequestContext};
use crate::error::HandlerError;
use crate::http::{self, cache, mime};
use crate::routing::normalize_path;
use hyper::body::Bytes;
use hyper::header::IF_NONE_MATCH;
use hyper::Method;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Pattern used to register the asset catch-all
pub const CATCH_ALL_PATTERN: &str = "(.*)";

/// A file loaded from the asset directory
#[derive(Debug)]
pub struct Asset {
    pub content: Bytes,
    pub content_type: &'static str,
    pub etag: String,
}

/// Serve the requested path from the asset directory, or 404
pub fn serve_asset(ctx: &mut RequestContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let assets = &ctx.config().assets;
        let Some(dir) = assets.dir.as_deref() else {
            return Ok(http::build_404_response());
        };

        let path = normalize_path(ctx.uri().path());
        let Some(asset) = load_from_directory(dir, path, &assets.index_files).await? else {
            return Ok(http::build_404_response());
        };

        if cache::check_etag_match(ctx.header_str(IF_NONE_MATCH), &asset.etag) {
            return Ok(http::build_304_response(Some(&asset.etag)));
        }

        Ok(http::build_asset_response(
            asset.content,
            asset.content_type,
            &asset.etag,
            &cache::cache_control(assets.max_age),
            *ctx.method() == Method::HEAD,
        ))
    })
}

/// Load a file from `static_dir` for a request path
///
/// Directory requests resolve through `index_files`. Paths escaping the
/// directory and missing files yield `None`; other I/O errors are failures.
pub async fn load_from_directory(
    static_dir: &str,
    path: &str,
    index_files: &[String],
) -> Result<Option<Asset>, HandlerError> {
    let root = match fs::canonicalize(static_dir).await {
        Ok(root) => root,
        Err(e) => {
            tracing::warn!(dir = static_dir, error = %e, "asset directory not accessible");
            return Ok(None);
        }
    };

    let relative = path.trim_start_matches('/');
    let mut candidate = root.join(relative);
    if relative.is_empty() || relative.ends_with('/') || is_dir(&candidate).await {
        match find_index(&candidate, index_files).await {
            Some(index) => candidate = index,
            None => return Ok(None),
        }
    }

    // File not found is common (404), no need to log
    let Ok(resolved) = fs::canonicalize(&candidate).await else {
        return Ok(None);
    };
    if !resolved.starts_with(&root) {
        tracing::warn!(path, resolved = %resolved.display(), "path traversal attempt blocked");
        return Ok(None);
    }

    let content = match fs::read(&resolved).await {
        Ok(content) => Bytes::from(content),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(Asset {
        etag: cache::generate_etag(&content),
        content_type: mime::content_type_for(&resolved),
        content,
    }))
}

async fn find_index(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let index = dir.join(name);
        if fs::metadata(&index).await.is_ok_and(|m| m.is_file()) {
            return Some(index);
        }
    }
    None
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}
