//! Movie collection API routes.
//!
//! All responses use the envelope the original API consumers expect:
//! `{"success": true, "data": ..., "total": ...}` on success and
//! `{"success": false, "data": null, "error": "..."}` on failure.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppContext;
use crate::catalog::{ExternalOverrides, ManualEntry, RecordPatch};
use crate::error::Error;

pub fn catalog_routes() -> Router<AppContext> {
    Router::new()
        .route("/movies", get(list_movies).post(add_manual))
        .route("/movies/search", get(search_movies))
        .route("/movies/lookup", get(provider_lookup))
        .route("/movies/add", post(add_external))
        .route(
            "/movies/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
}

// ============================================================================
// Response envelope
// ============================================================================

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    data: T,
    total: Option<usize>,
}

pub fn success_with_total<T: Serialize>(data: T, total: Option<usize>) -> Json<impl Serialize> {
    Json(Envelope {
        success: true,
        data,
        total,
    })
}

fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "data": null,
            "error": message,
        })),
    )
        .into_response()
}

/// Wrapper turning catalog errors into enveloped HTTP responses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Provider(_) => StatusCode::BAD_GATEWAY,
            Error::Io(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        failure(status, self.0.to_string())
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_movies(State(ctx): State<AppContext>) -> impl IntoResponse {
    let movies = ctx.service.list();
    let total = movies.len();
    success_with_total(movies, Some(total))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_movies(
    State(ctx): State<AppContext>,
    Query(params): Query<SearchQuery>,
) -> impl IntoResponse {
    let movies = ctx.service.search(&params.q);
    let total = movies.len();
    success_with_total(movies, Some(total))
}

#[derive(Debug, Deserialize)]
struct LookupQuery {
    #[serde(default)]
    q: String,
    #[serde(default = "default_page")]
    p: u32,
}

fn default_page() -> u32 {
    1
}

async fn provider_lookup(
    State(ctx): State<AppContext>,
    Query(params): Query<LookupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let hits = ctx.service.provider().search(&params.q, params.p).await?;
    let total = hits.len();
    Ok(success_with_total(hits, Some(total)))
}

async fn get_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = ctx.service.get(id)?;
    Ok(success_with_total(movie, None))
}

async fn add_manual(
    State(ctx): State<AppContext>,
    Json(entry): Json<ManualEntry>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = ctx.service.create_manual(entry).await?;
    Ok((StatusCode::CREATED, success_with_total(movie, None)))
}

#[derive(Debug, Deserialize)]
struct AddExternalRequest {
    #[serde(rename = "imdbId")]
    imdb_id: String,
    #[serde(flatten)]
    overrides: ExternalOverrides,
}

async fn add_external(
    State(ctx): State<AppContext>,
    Json(req): Json<AddExternalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = ctx
        .service
        .create_or_fetch_external(&req.imdb_id, req.overrides)
        .await?;
    Ok((StatusCode::CREATED, success_with_total(movie, None)))
}

async fn update_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(patch): Json<RecordPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = ctx.service.update(id, patch).await?;
    Ok(success_with_total(movie, None))
}

async fn delete_movie(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ctx.service.delete(id).await?;
    Ok(success_with_total(serde_json::json!({"deleted": true}), None))
}
