use crate::core::error::PanelError;
use crate::core::state::AppState;
use crate::handlers::require_session;
use crate::models::account::AccountSnapshot;
use crate::session::flash::Flash;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Listing render model; also the redirect target for missing accounts
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListPage {
    pub users: Vec<UserRow>,
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRow {
    pub username: String,
    pub fname: String,
    pub lname: String,
    pub package: Option<String>,
    pub status: String,
    pub date: String,
}

impl From<&AccountSnapshot> for UserRow {
    fn from(snapshot: &AccountSnapshot) -> Self {
        Self {
            username: snapshot.username.clone(),
            fname: snapshot.fname.clone(),
            lname: snapshot.lname.clone(),
            package: snapshot.package.clone(),
            status: snapshot.status().to_string(),
            date: snapshot.date.clone(),
        }
    }
}

/// Account listing
///
/// GET /user/list — admin sees every account, non-admin only their own
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, PanelError> {
    let (session_id, session) = require_session(&state, &headers)?;

    let accounts = if session.is_admin {
        state.store.list_users().await?
    } else {
        vec![state.store.query(&session.username).await?]
    };

    let users = accounts.iter().map(UserRow::from).collect();
    let flash = state.sessions.take_flash(&session_id);

    Ok(Json(UserListPage { users, flash }).into_response())
}
