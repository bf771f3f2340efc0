//! Request handling module
//!
//! Entry point for HTTP request processing: method validation, the
//! rebuild-on-root trigger, and static file serving from the serving root.
//! A GET request for `/` or for the output document itself runs the Builder
//! synchronously before the response is produced; every other request is
//! served as-is from disk.

use crate::config::AppState;
use crate::http::{self, mime};
use crate::logger;
use crate::prebuild;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method();
    let uri = req.uri();
    let is_head = *method == Method::HEAD;

    if state.config.logging.access_log {
        logger::log_request(&peer_addr, method, uri, req.version());
    }

    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return Ok(resp);
    }

    Ok(process(&state, uri.path(), is_head).await)
}

/// Check HTTP method and return an early response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Does this request path trigger a rebuild?
///
/// Exactly the site root and the output document itself; nothing else.
pub fn is_build_trigger(path: &str, output_file: &str) -> bool {
    path == "/" || path.strip_prefix('/') == Some(output_file)
}

/// Run the build trigger if a GET asks for it, then serve from disk.
///
/// Only GET rebuilds; a HEAD for the same path answers from whatever is
/// already on disk. The build blocks the request being handled; with the
/// single-threaded accept loop that means it blocks every queued request
/// too, which is the intended serialization. The static-file fallthrough
/// serves whatever now exists on disk whether or not a build ran.
async fn process(state: &AppState, path: &str, is_head: bool) -> Response<Full<Bytes>> {
    if !is_head && is_build_trigger(path, &state.config.site.output_file) {
        prebuild::copy_latest_export(&state.config.prebuild, &state.config.site.include_base());
        if let Err(e) = state.builder.build() {
            logger::log_build_failed(&e);
            return http::build_500_response();
        }
    }

    match load_static_file(
        &state.config.site.serving_root,
        path,
        &state.config.site.output_file,
    )
    .await
    {
        Some((content, content_type)) => http::build_file_response(
            content,
            content_type,
            &state.config.http.server_name,
            is_head,
        ),
        None => http::build_404_response(),
    }
}

/// Load a file from the serving root, resolving directory requests to the
/// output document. Returns `None` for missing files and for paths that
/// escape the serving root.
async fn load_static_file(
    serving_root: &str,
    path: &str,
    index_file: &str,
) -> Option<(Vec<u8>, &'static str)> {
    let clean_path = path.trim_start_matches('/');
    let mut file_path = Path::new(serving_root).join(clean_path);

    let root_canonical = match Path::new(serving_root).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Serving root not found or inaccessible '{serving_root}': {e}"
            ));
            return None;
        }
    };

    // Directory requests fall back to the output document as index file.
    if clean_path.is_empty() || clean_path.ends_with('/') || file_path.is_dir() {
        file_path = file_path.join(index_file);
    }

    // Missing file is an ordinary 404, no logging needed.
    let Ok(file_canonical) = file_path.canonicalize() else {
        return None;
    };
    if !file_canonical.starts_with(&root_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path,
            file_canonical.display()
        ));
        return None;
    }

    let content = match fs::read(&file_canonical).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_canonical.display(),
                e
            ));
            return None;
        }
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    Some((content, content_type))
}
