use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use log::{error, info};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::cache::TableCache;
use crate::config::AppConfig;
use crate::error::{GlossaryError, Result};
use crate::filter::{FilterCriteria, FilterParams, apply, available_letters};
use crate::loader::DataSource;
use crate::render::PageRenderer;

pub struct AppState {
    cache: TableCache,
    renderer: PageRenderer,
}

impl AppState {
    pub fn new(source: DataSource, ttl: chrono::Duration) -> Result<Self> {
        Ok(AppState {
            cache: TableCache::new(source, ttl),
            renderer: PageRenderer::new()?,
        })
    }
}

impl IntoResponse for GlossaryError {
    fn into_response(self) -> Response {
        error!("Glossary request failed: {}", self);
        let status = match self {
            GlossaryError::Fetch(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

pub fn router(state: Arc<AppState>, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(serve_glossary))
        .route("/reset", get(reset_filters))
        .route("/api/entries", get(get_entries))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .with_state(state)
}

pub async fn run(config: AppConfig) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let source = config.source.to_source()?;
    info!("Glossary source: {}", source);

    let state = Arc::new(AppState::new(source, config.cache_ttl())?);

    // Warm the cache; a failure here is reported again on the first request
    if let Err(e) = state.cache.get().await {
        error!("Initial glossary load failed: {}", e);
    }

    let app = router(state, &config.static_dir);

    let listener = TcpListener::bind(&config.bind).await?;
    info!("Listening on http://{}", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_glossary(
    Query(params): Query<FilterParams>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>> {
    let snapshot = state.cache.get().await?;
    let criteria = FilterCriteria::from(params);

    let letters = available_letters(&snapshot.entries);
    let view = apply(&snapshot.entries, &criteria);

    let page = state
        .renderer
        .render_page(&criteria, &letters, &view, snapshot.fetched_at)?;
    Ok(Html(page))
}

async fn reset_filters() -> Redirect {
    Redirect::to("/")
}

async fn get_entries(
    Query(params): Query<FilterParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse> {
    let snapshot = state.cache.get().await?;
    let criteria = FilterCriteria::from(params);
    let view = apply(&snapshot.entries, &criteria);

    Ok(Json(json!({
        "count": view.count,
        "letters": available_letters(&snapshot.entries),
        "entries": view.entries,
        "fetched_at": snapshot.fetched_at.to_rfc3339(),
    })))
}

async fn health() -> &'static str {
    "ok"
}
