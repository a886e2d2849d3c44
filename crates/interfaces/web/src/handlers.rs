//! HTTP handlers for the chat page and its JSON API.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::{error, warn};

use persona_runtime::EngineError;

use crate::AppState;
use crate::dto::{ChatReply, ChatRequest, ErrorResponse, PageInfo};
use crate::page::render_page;

const UNAVAILABLE: &str = "The assistant could not answer right now. Please try again.";

pub(crate) async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.page))
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn profile(State(state): State<AppState>) -> Json<PageInfo> {
    Json(state.page.as_ref().clone())
}

/// `POST /api/chat`: run one turn.
///
/// # Errors
/// - 400 Bad Request: body is not a valid chat request, or the message is empty
/// - 502 Bad Gateway: the model call or the tool loop failed
pub(crate) async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload?;
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let history = request.history_messages();
    let reply = state.engine.chat(&request.message, &history).await?;
    Ok(Json(ChatReply { reply }))
}

#[derive(Debug)]
pub(crate) enum ApiError {
    BadRequest(String),
    Upstream(EngineError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                warn!(%msg, "rejected chat request");
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg))
            }
            ApiError::Upstream(err) => {
                error!(error = %err, "chat turn failed");
                (StatusCode::BAD_GATEWAY, ErrorResponse::new(UNAVAILABLE))
            }
        };
        (status, Json(body)).into_response()
    }
}
