use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use cranfield_core::persist::DataPaths;
use cranfield_core::search::{search, DEFAULT_K};
use cranfield_core::{IndexContext, LookupEntry, SearchHit};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod errors;

use errors::{ApiError, INVALID_K, MISSING_QUERY};

/// Raw query string; `k` is parsed by hand so a bad value gets a JSON error.
#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub k: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<IndexContext>,
}

/// Load the index artifacts from `data_dir` and build the router.
pub fn build_app<P: AsRef<std::path::Path>>(data_dir: P) -> Result<Router> {
    let ctx = IndexContext::load(&DataPaths::new(data_dir))?;
    Ok(build_router(Arc::new(ctx)))
}

pub fn build_router(ctx: Arc<IndexContext>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { ctx })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn parse_k(raw: Option<&str>) -> Result<usize, ApiError> {
    match raw {
        None => Ok(DEFAULT_K),
        Some(s) => match s.trim().parse::<usize>() {
            Ok(k) if k >= 1 => Ok(k),
            _ => Err(ApiError::BadRequest(INVALID_K.into())),
        },
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    let q = params.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(ApiError::BadRequest(MISSING_QUERY.into()));
    }
    let k = parse_k(params.k.as_deref())?;
    let hits = search(&state.ctx, q, k)?;
    tracing::debug!(q, k, results = hits.len(), "search served");
    Ok(Json(hits))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<LookupEntry>, ApiError> {
    let entry = state.ctx.lookup(&doc_id)?;
    Ok(Json(entry.clone()))
}
