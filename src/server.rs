//!
//! chirpy HTTP server
//! -------------------
//! Axum routes for the chirpy API.
//!
//! Responsibilities:
//! - Signup and login (argon2 credentials, HMAC bearer tokens).
//! - The bearer-gated chirp write path and public chirp reads.
//! - Static files under `/app` with a hit counter, plus admin metrics/reset.
//!
//! Handlers stay thin: decoding, policy and persistence live in `users` and `chirps`;
//! every failure leaves as an `AppError` rendered to `{"error": ...}`.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;
use tracing::info;

use crate::chirps;
use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::storage::SharedStore;
use crate::users;

/// Shared server state injected into all handlers.
///
/// Configuration is read-only; the store and the hit counter are the only mutable
/// pieces and both synchronize internally.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub config: Arc<ServerConfig>,
    /// Requests served under `/app` since start or the last reset.
    pub file_server_hits: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(store: SharedStore, config: ServerConfig) -> Self {
        Self { store, config: Arc::new(config), file_server_hits: Arc::new(AtomicU64::new(0)) }
    }
}

pub fn router(state: AppState) -> Router {
    let files = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.file_root))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits));

    Router::new()
        .route("/api/healthz", get(healthz))
        .route("/admin/metrics", get(metrics))
        .route("/admin/reset", post(reset))
        .route("/api/users", post(create_user))
        .route("/api/login", post(login))
        .route("/api/chirps", post(create_chirp).get(list_chirps))
        .route("/api/chirps/{chirp_id}", get(get_chirp))
        .merge(files)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    info!(target: "startup", "chirpy starting: http_port={}, file_root={}", config.http_port, config.file_root.display());
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = router(AppState::new(SharedStore::in_memory(), config));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Starting server on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn count_hits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.file_server_hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}

async fn healthz() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}

async fn metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.file_server_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited {hits} times!</p></body></html>"
    ))
}

async fn reset(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.file_server_hits.store(0, Ordering::Relaxed);
    state.store.reset()?;
    info!(target: "chirpy::http", "state reset");
    Ok(StatusCode::OK)
}

async fn create_user(State(state): State<AppState>, body: Bytes) -> AppResult<impl IntoResponse> {
    let user = users::signup(&state.store, &body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(State(state): State<AppState>, body: Bytes) -> AppResult<impl IntoResponse> {
    let user = users::login(&state.store, state.config.secret(), &body).await?;
    Ok((StatusCode::OK, Json(user)))
}

// Raw bytes, not Json<_>: the body must not be decoded before the caller is authorized.
async fn create_chirp(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> AppResult<impl IntoResponse> {
    let chirp = chirps::create_chirp(&*state.store, &headers, state.config.secret(), &body)?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

async fn list_chirps(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(chirps::list_chirps(&*state.store)?))
}

async fn get_chirp(State(state): State<AppState>, Path(chirp_id): Path<String>) -> AppResult<impl IntoResponse> {
    Ok(Json(chirps::get_chirp(&*state.store, &chirp_id)?))
}
