//! HTTP API over [`GameService`].

use crate::service::{CreateGameRequest, GameService, MakeMoveRequest, ServiceError};
use crate::view::{self, GameView};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ETAG, IF_MATCH, LOCATION},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use flipside_tictactoe::{ErrorCategory, Game};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Arc<GameService>,
}

impl AppState {
    /// Wraps a service for the router.
    pub fn new(service: Arc<GameService>) -> Self {
        Self { service }
    }
}

/// Builds the application router.
#[instrument(skip(service))]
pub fn router(service: Arc<GameService>) -> Router {
    info!("Building HTTP router");
    Router::new()
        .route("/health", get(health))
        .route("/games", post(create_game))
        .route("/games/{id}", get(get_game))
        .route("/moves", post(make_move))
        .layer(ServiceBuilder::new().map_request(log_request))
        .with_state(AppState::new(service))
}

fn log_request(request: Request) -> Request {
    info!(method = %request.method(), uri = %request.uri(), "HTTP request");
    request
}

// =============================================================================
// Errors
// =============================================================================

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub error: String,
}

/// Error response: status plus [`ErrorBody`].
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// Creates an error response.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code: code.into(),
                error: message.into(),
            },
        }
    }

    /// 400 with the given code.
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    /// 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCategory::Internal.to_string(),
            message,
        )
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if let ServiceError::PreconditionFailed { .. } = err {
            return Self::new(
                StatusCode::PRECONDITION_FAILED,
                "PRECONDITION_FAILED",
                err.to_string(),
            );
        }

        let category = err.category();
        let status = match category {
            ErrorCategory::Configuration | ErrorCategory::RuleViolation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %err, "Request failed");
        } else {
            warn!(error = %err, %status, "Request rejected");
        }
        Self::new(status, category.to_string(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_game(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        parse_body::<CreateGameRequest>(&body)?
    };

    let service = Arc::clone(&state.service);
    let game = run_blocking(move || service.create_game(request)).await?;

    let mut headers = game_headers(&game)?;
    let location = HeaderValue::from_str(&format!("/games/{}", game.id()))
        .map_err(|e| ApiError::internal(format!("Invalid Location header: {}", e)))?;
    headers.insert(LOCATION, location);

    Ok((StatusCode::CREATED, headers, Json(GameView::from(&game))).into_response())
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| ApiError::bad_request("INVALID_ID", format!("Invalid game id: {}", e)))?;

    let service = Arc::clone(&state.service);
    let game = run_blocking(move || service.find_game(id)).await?;

    Ok((game_headers(&game)?, Json(GameView::from(&game))).into_response())
}

async fn make_move(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = parse_body::<MakeMoveRequest>(&body)?;
    let if_match = headers
        .get(IF_MATCH)
        .map(|v| v.to_str().map(str::to_owned))
        .transpose()
        .map_err(|e| ApiError::bad_request("INVALID_HEADER", format!("Invalid If-Match: {}", e)))?;

    let service = Arc::clone(&state.service);
    let applied =
        run_blocking(move || service.make_move(request, if_match.as_deref())).await?;
    let game = applied.game();

    Ok((game_headers(game)?, Json(GameView::from(game))).into_response())
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request("INVALID_BODY", format!("Invalid request body: {}", e)))
}

fn game_headers(game: &Game) -> Result<HeaderMap, ApiError> {
    let etag = HeaderValue::from_str(&view::etag(game))
        .map_err(|e| ApiError::internal(format!("Invalid ETag header: {}", e)))?;
    let mut headers = HeaderMap::new();
    headers.insert(ETAG, etag);
    Ok(headers)
}

/// Runs a service call on the blocking pool; stores may do file I/O.
async fn run_blocking<T, F>(call: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ApiError::internal(format!("Worker task failed: {}", e)))?
        .map_err(ApiError::from)
}
