//! HTTP server setup and request dispatch
//!
//! Every request goes through one fallback handler that consults the site's
//! route table. Handlers read the site from disk, so they run on the blocking
//! thread pool.

use std::path::Path;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::blog::render_stream;
use crate::error::{Error, Result};
use crate::feed::render_feed;
use crate::pages::{render_page, render_post};
use crate::router::{Route, normalize_path};
use crate::site::{SharedSite, Site};

/// Listen address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

/// The parts of a request handlers look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRequest {
    /// Normalised path, see [`normalize_path`].
    pub path: String,
    pub query: Option<String>,
    /// `Host` header, `localhost` when absent.
    pub host: String,
    /// `http` unless a proxy says otherwise.
    pub scheme: String,
}

impl SiteRequest {
    pub fn from_parts(uri: &Uri, headers: &HeaderMap) -> Self {
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .unwrap_or("localhost")
            .to_string();
        Self {
            path: normalize_path(uri.path()),
            query: uri.query().map(str::to_string),
            host,
            scheme: scheme(headers),
        }
    }

    /// `scheme://host`
    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// First value of query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
    }
}

/// Scheme reported by a reverse proxy, else `http`.
fn scheme(headers: &HeaderMap) -> String {
    ["x-forwarded-proto", "x-forwarded-protocol"]
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok())
        .find(|value| !value.is_empty())
        .unwrap_or("http")
        .to_string()
}

/// Build the axum router serving `site`.
pub fn build_router(site: SharedSite) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(site)
}

/// Run the site server.
///
/// This function blocks until the server is shut down.
pub async fn run_server(site: SharedSite, config: ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(site);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "Site server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    info!("Site server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn dispatch(
    State(site): State<SharedSite>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
        )
            .into_response();
    }

    let request = SiteRequest::from_parts(&uri, &headers);
    let response = match tokio::task::spawn_blocking(move || respond(&site, &request)).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Request handler failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    };

    if method == Method::HEAD {
        let (parts, _) = response.into_parts();
        Response::from_parts(parts, Body::empty())
    } else {
        response
    }
}

/// Answer a request. Responses carry their full body; HEAD is handled by the
/// caller.
pub fn respond(site: &SharedSite, request: &SiteRequest) -> Response {
    match site.router().resolve(&request.path) {
        Some(Route::Redirect(target)) => redirect(StatusCode::MOVED_PERMANENTLY, target),
        Some(Route::Feed) => feed(site, request),
        Some(Route::Post) => post(site, request),
        Some(Route::Stream) => stream(site, request),
        Some(Route::Certificate) => certificate(site, request),
        Some(Route::Page) => page(site, request),
        Some(Route::Root) | None => root(),
    }
}

fn root() -> Response {
    redirect(StatusCode::MOVED_PERMANENTLY, "/")
}

fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(location) => (status, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            error!(location, "Invalid redirect location");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn content(content_type: &str, body: impl Into<Bytes>) -> Response {
    let body: Bytes = body.into();
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_LENGTH, body.len().to_string()),
        ],
        body,
    )
        .into_response()
}

fn html(body: String) -> Response {
    content("text/html", body)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

fn failed(what: &str, error: &Error) -> Response {
    error!(what, %error, "Failed to render");
    not_found()
}

fn feed(site: &Site, request: &SiteRequest) -> Response {
    let host = request.origin();
    let key = format!("atom:{host}/blog/atom.xml");
    match site.pages().get_or_insert_with(&key, || render_feed(site, &host)) {
        Ok(xml) => content("application/atom+xml", xml),
        Err(e) => failed("feed", &e),
    }
}

fn post(site: &SharedSite, request: &SiteRequest) -> Response {
    let path = request.path.trim_start_matches('/');
    let rendered = site.pages().get_or_insert_with(&format!("post:{path}"), || {
        render_post(site, path).map(Option::unwrap_or_default)
    });
    match rendered {
        Ok(data) if !data.is_empty() => html(data),
        Ok(_) => {
            // Not a post; assets next to posts are served as files
            if mime_guess::from_path(path).first().is_some() {
                page(site, request)
            } else {
                root()
            }
        }
        Err(e) => failed(path, &e),
    }
}

fn stream(site: &Site, request: &SiteRequest) -> Response {
    let Some(start) = request.query_param("id").and_then(|id| id.parse::<usize>().ok()) else {
        return root();
    };
    if start >= site.source().posts().len() {
        return html(String::new());
    }
    let key = format!("blog:/blog?id={start}");
    match site.pages().get_or_insert_with(&key, || render_stream(site, start)) {
        Ok(data) => html(data),
        Err(e) => failed("stream", &e),
    }
}

fn certificate(site: &Site, request: &SiteRequest) -> Response {
    let source = site.source();
    let file = request.path.trim_start_matches('/');
    if !source.is_dir(".well-known/") || !source.exists(file) || source.is_dir(file) {
        return StatusCode::NOT_FOUND.into_response();
    }
    match source.read_to_string(file) {
        Ok(data) => content("text/plain; charset=utf-8", data),
        Err(e) => failed(file, &e),
    }
}

fn page(site: &SharedSite, request: &SiteRequest) -> Response {
    let pathname = request.path.to_lowercase();
    if let Some(dir) = pathname.strip_suffix("/index.html") {
        let location = format!("/{}", dir.trim_start_matches('/'));
        return redirect(StatusCode::MOVED_PERMANENTLY, &location);
    }

    let file = if pathname.ends_with('/') {
        format!("{pathname}index.html")
    } else {
        pathname.clone()
    };
    let file = file.trim_start_matches('/');
    let source = site.source();

    if !source.exists(file) {
        if file == "index.html" {
            return not_found();
        }
        return redirect(StatusCode::FOUND, parent(&pathname));
    }
    if source.is_dir(file) {
        return redirect(StatusCode::FOUND, &format!("{pathname}/"));
    }

    let mime = mime_guess::from_path(file).first_or_octet_stream();
    if mime != mime_guess::mime::TEXT_HTML {
        let key = format!("default:{file}");
        let data = site
            .files()
            .get_or_insert_with(&key, || source.read_bytes(file).map(Bytes::from));
        return match data {
            Ok(data) => {
                let mut response = content(mime.as_ref(), data);
                let headers = response.headers_mut();
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, max-age=0"));
                headers.insert(header::EXPIRES, HeaderValue::from_static("-1"));
                response
            }
            Err(e) => failed(file, &e),
        };
    }

    let feed_url = format!("{}/blog/atom.xml", request.origin());
    let key = format!("default:{file}");
    match site.pages().get_or_insert_with(&key, || render_page(site, file, feed_url)) {
        Ok(data) => html(data),
        Err(e) => failed(file, &e),
    }
}

/// Directory above `pathname`: `/a/b.html` -> `/a`, `/a/b/` -> `/a`, `/a` -> `/`.
fn parent(pathname: &str) -> &str {
    let trimmed = pathname.trim_end_matches('/');
    match Path::new(trimmed).parent().and_then(|p| p.to_str()) {
        Some("") | None => "/",
        Some(parent) => parent,
    }
}
