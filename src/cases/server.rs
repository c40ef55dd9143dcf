//! HTTP service for case pages and the sitemap.
//!
//! ```text
//! GET /api/cases/:slug   → CaseContent JSON (generated once, then cached)
//! GET /api/sitemap       → sitemap XML
//! GET /sitemap.xml       → same
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::{OnceCell, RwLock};

use super::content::{CaseContent, CaseGenerator};
use super::sitemap::{CACHE_CONTROL, render_sitemap};
use super::slug::slug_to_case_name;

pub struct CaseService {
    generator: Arc<dyn CaseGenerator>,
    /// One cell per slug; concurrent first requests wait on the same generation.
    cache: RwLock<HashMap<String, Arc<OnceCell<CaseContent>>>>,
    site_url: String,
}

impl CaseService {
    pub fn new(generator: Arc<dyn CaseGenerator>, site_url: String) -> Self {
        Self {
            generator,
            cache: RwLock::new(HashMap::new()),
            site_url,
        }
    }

    /// Cached content for `slug`, generating it on first request. Failures are
    /// not cached.
    pub async fn case(&self, slug: &str) -> Result<CaseContent, super::CaseError> {
        let cell = self.cell(slug).await;
        if let Some(content) = cell.get() {
            debug!("Case cache hit: {}", slug);
            return Ok(content.clone());
        }

        let content = cell
            .get_or_try_init(|| async {
                let case_name = slug_to_case_name(slug);
                let content = self.generator.generate(&case_name).await?;
                info!("Cached case content for {}", slug);
                Ok::<_, super::CaseError>(content)
            })
            .await?;
        Ok(content.clone())
    }

    async fn cell(&self, slug: &str) -> Arc<OnceCell<CaseContent>> {
        if let Some(cell) = self.cache.read().await.get(slug) {
            return cell.clone();
        }
        self.cache
            .write()
            .await
            .entry(slug.to_string())
            .or_default()
            .clone()
    }

    pub async fn cached_count(&self) -> usize {
        self.cache
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}

pub type AppState = Arc<CaseService>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/cases/:slug", get(get_case))
        .route("/api/sitemap", get(get_sitemap))
        .route("/sitemap.xml", get(get_sitemap))
        .with_state(state)
}

/// Binds `addr` and serves until the process exits.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Case server listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await
}

async fn get_case(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CaseContent>, AppError> {
    match state.case(&slug).await {
        Ok(content) => Ok(Json(content)),
        Err(e) => {
            warn!("Error generating case content for {}: {}", slug, e);
            Err(AppError::Internal(
                "Failed to load case information".to_string(),
            ))
        }
    }
}

async fn get_sitemap(State(state): State<AppState>) -> impl IntoResponse {
    let xml = render_sitemap(&state.site_url, Utc::now());
    (
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, CACHE_CONTROL),
        ],
        xml,
    )
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
