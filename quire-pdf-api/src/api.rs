use axum::{
    extract::{rejection::JsonRejection, Json, Query},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use quire_pdf::script::{run, RunOptions, Script};
use quire_pdf::{Destination, ErrorCategory, HttpResponse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Query parameters of the render endpoint
#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    /// Send as an attachment instead of inline
    #[serde(default)]
    pub download: bool,
    /// File name reported in `Content-Disposition` (defaults to `doc.pdf`)
    pub name: Option<String>,
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub error: String,
}

/// Application-specific error types for the API
#[derive(Debug, Error)]
pub enum AppError {
    /// The request body is not a valid layout script
    #[error("{0}")]
    BadRequest(String),
    /// Errors raised while building or serializing the document
    #[error(transparent)]
    Pdf(#[from] quire_pdf::PdfError),
    /// Failures outside the document engine (worker panics, bad headers)
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Pdf(e) => match e.category() {
                ErrorCategory::Configuration | ErrorCategory::Font | ErrorCategory::Image => {
                    StatusCode::BAD_REQUEST
                }
                ErrorCategory::Io | ErrorCategory::State => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "render failed");
        } else {
            tracing::debug!(error = %self, "rejected request");
        }

        let error_response = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Build the application router with all routes configured
pub fn app() -> Router {
    Router::new()
        .route("/api/render", post(render_pdf))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Render a posted layout script and send the PDF back
///
/// Scripts may not read image files from the server's filesystem.
pub async fn render_pdf(
    Query(query): Query<RenderQuery>,
    payload: Result<Json<Script>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(script) = payload?;

    let rendered = tokio::task::spawn_blocking(move || render(&script, &query))
        .await
        .map_err(|e| AppError::Internal(format!("Render task failed: {e}")))??;

    into_response(rendered)
}

fn render(script: &Script, query: &RenderQuery) -> Result<HttpResponse, AppError> {
    let options = RunOptions {
        allow_files: false,
        base_dir: None,
    };
    let mut doc = run(script, &options)?;

    let mut response = HttpResponse::new();
    let name = query.name.as_deref();
    let destination = if query.download {
        Destination::Download {
            sink: &mut response,
            name,
        }
    } else {
        Destination::Inline {
            sink: &mut response,
            name,
        }
    };
    doc.output(destination)?;
    tracing::info!(
        pages = doc.page_no(),
        bytes = response.body().len(),
        "rendered layout script"
    );
    Ok(response)
}

fn into_response(rendered: HttpResponse) -> Result<Response, AppError> {
    let (headers, body) = rendered.into_parts();
    let mut response = (StatusCode::OK, body).into_response();
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid header name {name}: {e}")))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid header value: {e}")))?;
        response.headers_mut().insert(name, value);
    }
    Ok(response)
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "quire-pdf API",
        "version": env!("CARGO_PKG_VERSION"),
        "engine": quire_pdf::VERSION,
    }))
}
