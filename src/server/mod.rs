//! HTTP server: static files, preview mode and on-demand rendering

use anyhow::Result;
use axum::{
    body::Body,
    extract::{FromRef, Path, Query, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cms::{post_path, ContentSource};
use crate::config::SiteConfig;
use crate::error::BlogError;
use crate::generator::{is_safe_slug, page_file, store_file, Pages};
use crate::helpers::url_for;
use crate::preview::{PreviewGate, PreviewState};
use crate::Blog;

/// Cookie carrying the signed preview reference
pub const PREVIEW_COOKIE: &str = "spacetraveling.preview";

/// Server state
#[derive(Clone)]
struct ServerState {
    inner: Arc<Inner>,
    key: Key,
}

struct Inner {
    config: SiteConfig,
    public_dir: PathBuf,
    pages: Pages,
    gate: PreviewGate,
    revalidate: Duration,
}

impl FromRef<ServerState> for Key {
    fn from_ref(state: &ServerState) -> Self {
        state.key.clone()
    }
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    #[serde(default)]
    token: String,
    #[serde(rename = "documentId", default)]
    document_id: String,
}

/// Build the router for a blog.
///
/// With a content source, the preview endpoints and on-demand rendering are
/// enabled; without one, only the generated files are served.
pub fn router(blog: &Blog, source: Option<Arc<dyn ContentSource>>) -> crate::error::Result<Router> {
    let static_files = Router::new()
        .fallback(fallback_handler)
        .with_state(blog.public_dir.clone());

    let Some(source) = source else {
        return Ok(static_files.layer(TraceLayer::new_for_http()));
    };

    let state = ServerState {
        inner: Arc::new(Inner {
            config: blog.config.clone(),
            public_dir: blog.public_dir.clone(),
            pages: Pages::new(blog, source.clone())?,
            gate: PreviewGate::new(source),
            revalidate: Duration::from_secs(blog.config.revalidate_secs),
        }),
        key: cookie_key(&blog.config),
    };

    let live = Router::new()
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .route("/", get(index_handler))
        .route("/page/:page", get(listing_handler))
        .route("/page/:page/", get(listing_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .with_state(state);

    Ok(live.merge(static_files).layer(TraceLayer::new_for_http()))
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, live: bool, open: bool) -> Result<()> {
    let source = if live {
        Some(blog.content_source()?)
    } else {
        None
    };
    let app = router(blog, source)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if live {
        println!("Preview mode and on-demand rendering enabled.");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cookie_key(config: &SiteConfig) -> Key {
    match config.preview.secret.as_deref() {
        Some(secret) if secret.len() >= 32 => Key::derive_from(secret.as_bytes()),
        Some(_) => {
            tracing::warn!("preview.secret is shorter than 32 bytes, using a random key");
            Key::generate()
        }
        None => {
            tracing::debug!("No preview secret configured, using a random key");
            Key::generate()
        }
    }
}

fn preview_state(jar: &SignedCookieJar) -> PreviewState {
    PreviewState::from_reference(jar.get(PREVIEW_COOKIE).map(|c| c.value().to_string()))
}

/// `GET /api/preview?token=..&documentId=..`
async fn preview_handler(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Query(params): Query<PreviewParams>,
) -> Response {
    let mut preview = PreviewState::default();
    let result = state
        .inner
        .gate
        .enter_preview(&mut preview, &params.token, &params.document_id)
        .await;

    match result {
        Ok(redirect) => {
            let Some(flag) = preview.flag() else {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            };
            let cookie = Cookie::build((PREVIEW_COOKIE, flag.reference.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(time::Duration::minutes(
                    state.inner.config.preview.session_minutes,
                ));
            let location = url_for(&state.inner.config, &redirect);
            (
                StatusCode::FOUND,
                jar.add(cookie),
                [(header::LOCATION, location)],
            )
                .into_response()
        }
        Err(BlogError::InvalidPreviewToken) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid token" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Preview resolution failed: {}", e);
            (StatusCode::BAD_GATEWAY, "Preview unavailable").into_response()
        }
    }
}

/// `GET /api/exit-preview`
async fn exit_preview_handler(State(state): State<ServerState>, jar: SignedCookieJar) -> Response {
    let mut preview = preview_state(&jar);
    let target = state.inner.gate.exit_preview(&mut preview);
    let jar = jar.remove(Cookie::build(PREVIEW_COOKIE).path("/"));
    (jar, Redirect::temporary(&url_for(&state.inner.config, target))).into_response()
}

/// `GET /`
async fn index_handler(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    request: Request<Body>,
) -> Response {
    listing_response(state, jar, 1, request).await
}

/// `GET /page/{n}/`
async fn listing_handler(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Path(page): Path<usize>,
    request: Request<Body>,
) -> Response {
    listing_response(state, jar, page, request).await
}

async fn listing_response(
    state: ServerState,
    jar: SignedCookieJar,
    page: usize,
    request: Request<Body>,
) -> Response {
    let preview = preview_state(&jar);
    if !preview.is_active() {
        return serve_static(state.inner.public_dir.clone(), request).await;
    }

    match state.inner.pages.listing_page(page, &preview).await {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => not_found(&state, true),
        Err(e) => upstream_error(e),
    }
}

/// `GET /post/{slug}/`
async fn post_handler(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Path(slug): Path<String>,
) -> Response {
    if !is_safe_slug(&slug) {
        return not_found(&state, false);
    }

    let preview = preview_state(&jar);
    if preview.is_active() {
        return match state.inner.pages.post_page(&slug, &preview).await {
            Ok(html) => Html(html).into_response(),
            Err(BlogError::NotFound { .. }) => not_found(&state, true),
            Err(e) => upstream_error(e),
        };
    }

    let file = page_file(&state.inner.public_dir, &post_path(&slug));
    let cached = tokio::fs::read_to_string(&file).await.ok();
    if let Some(html) = &cached {
        if is_fresh(&file, state.inner.revalidate).await {
            return Html(html.clone()).into_response();
        }
    }

    // Missing or stale: render now and keep the result for later requests
    match state.inner.pages.post_page(&slug, &preview).await {
        Ok(html) => {
            if let Err(e) = store_file(&file, &html).await {
                tracing::warn!("Failed to store {:?}: {}", file, e);
            } else {
                tracing::info!("Regenerated post '{}'", slug);
            }
            Html(html).into_response()
        }
        Err(BlogError::NotFound { .. }) => not_found(&state, false),
        Err(e) => match cached {
            Some(html) => {
                tracing::warn!("Serving stale post '{}': {}", slug, e);
                Html(html).into_response()
            }
            None => upstream_error(e),
        },
    }
}

async fn is_fresh(file: &std::path::Path, max_age: Duration) -> bool {
    match tokio::fs::metadata(file).await.and_then(|m| m.modified()) {
        Ok(modified) => modified
            .elapsed()
            .map(|age| age < max_age)
            .unwrap_or(true),
        Err(_) => false,
    }
}

fn not_found(state: &ServerState, preview: bool) -> Response {
    match state.inner.pages.not_found_page(preview) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render not-found page: {}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn upstream_error(e: BlogError) -> Response {
    tracing::error!("Rendering failed: {}", e);
    if e.is_network_failure() {
        (StatusCode::BAD_GATEWAY, "Content backend unavailable").into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
    }
}

/// Fallback handler that serves generated files
async fn fallback_handler(State(public_dir): State<PathBuf>, request: Request<Body>) -> Response {
    serve_static(public_dir, request).await
}

async fn serve_static(public_dir: PathBuf, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(public_dir.join("404.html")));
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
