use crate::core::error::PanelError;
use crate::core::state::AppState;
use crate::models::response::SuccessResponse;
use crate::session::store::session_cookie;
use crate::utils::auth::verify_api_key;
use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SessionCreateForm {
    pub api_key: String,
    pub user: String,
    #[serde(default)]
    pub admin: bool,
    /// Display language; defaults to the account's own setting
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreateResponse {
    pub success: bool,
    pub session: String,
    pub user: String,
    pub admin: bool,
    pub language: String,
}

/// Create a panel session for an authenticated front-end user
///
/// POST /session (api_key, user, admin, language)
pub async fn create_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SessionCreateForm>,
) -> Result<Response, PanelError> {
    if !verify_api_key(&form.api_key, &state.config.session.api_key) {
        warn!("Unauthorized session create attempt");
        return Err(PanelError::InvalidApiKey);
    }

    // The account must exist in the store before a session makes sense
    let snapshot = state.store.query(&form.user).await.map_err(|e| {
        if e.is_not_found() {
            PanelError::InvalidParameter(format!("unknown user: {}", form.user))
        } else {
            PanelError::Store(e)
        }
    })?;

    let language = if form.language.is_empty() {
        if snapshot.language.is_empty() {
            "en".to_string()
        } else {
            snapshot.language.clone()
        }
    } else {
        form.language.clone()
    };

    let id = state.sessions.create(&form.user, form.admin, &language);

    info!(
        user = %form.user,
        admin = form.admin,
        language = %language,
        "Session created"
    );

    let cookie = session_cookie(&state.config.session.cookie_name, &id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SessionCreateResponse {
            success: true,
            session: id,
            user: form.user,
            admin: form.admin,
            language,
        }),
    )
        .into_response())
}

/// Drop the current session
///
/// POST /session/destroy
pub async fn destroy_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, PanelError> {
    let (id, session) = state
        .sessions
        .from_headers(&headers, &state.config.session.cookie_name)
        .ok_or(PanelError::SessionRequired)?;

    state.sessions.destroy(&id);

    info!(user = %session.username, "Session destroyed");

    Ok((
        StatusCode::OK,
        Json(SuccessResponse {
            success: true,
            message: "Session destroyed".to_string(),
        }),
    )
        .into_response())
}
