use crate::models::response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

pub async fn fallback_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Unknown endpoint. Valid endpoints: /health, /session, /user/list, /user/edit"
                .to_string(),
        }),
    )
        .into_response()
}
