pub mod edit_user;
pub mod fallback;
pub mod health;
pub mod list_user;
pub mod session;

use crate::core::error::PanelError;
use crate::core::state::AppState;
use crate::session::store::Session;
use axum::http::HeaderMap;

/// Resolve the request's session cookie or reject with 401
pub(crate) fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, Session), PanelError> {
    state
        .sessions
        .from_headers(headers, &state.config.session.cookie_name)
        .ok_or(PanelError::SessionRequired)
}
