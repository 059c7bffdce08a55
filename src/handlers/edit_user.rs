use crate::core::error::PanelError;
use crate::core::state::AppState;
use crate::handlers::require_session;
use crate::models::catalog::Catalogs;
use crate::models::form::{AccountView, EditUserForm};
use crate::reconcile::changes::Field;
use crate::reconcile::reconciler::{reconcile, Outcome, SAVED_MESSAGE};
use crate::session::flash::Flash;
use crate::session::store::Session;
use crate::store::AccountStore;
use axum::{
    extract::{Form, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct EditUserQuery {
    pub user: Option<String>,
}

/// Render model for the edit form
#[derive(Debug, Serialize, Deserialize)]
pub struct EditUserPage {
    pub account: AccountView,
    pub catalogs: Catalogs,
    pub flash: Option<Flash>,
}

/// Which account this session may edit; admin sessions pick any target,
/// non-admin sessions are pinned to their own account
fn resolve_target(
    session: &Session,
    requested: Option<String>,
) -> Result<Option<String>, PanelError> {
    if session.is_admin {
        return Ok(requested);
    }

    match requested {
        None => Ok(Some(session.username.clone())),
        Some(user) if user == session.username => Ok(Some(user)),
        Some(_) => Err(PanelError::Forbidden),
    }
}

/// Catalog queries feed form dropdowns; a failure degrades to an empty
/// list instead of failing the render
async fn load_catalogs(store: &dyn AccountStore, is_admin: bool) -> Catalogs {
    let mut catalogs = Catalogs::default();

    catalogs.languages = store.list_languages().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to list languages");
        Vec::new()
    });

    if is_admin {
        catalogs.packages = store.list_packages().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list packages");
            Vec::new()
        });
        catalogs.templates = store.list_templates().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list templates");
            Vec::new()
        });
        catalogs.shells = store.list_shells().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list shells");
            Vec::new()
        });
    }

    catalogs
}

/// Edit-form render model
///
/// GET /user/edit?user=<name>
pub async fn show_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<EditUserQuery>,
) -> Result<Response, PanelError> {
    let (session_id, session) = require_session(&state, &headers)?;

    let Some(target) = resolve_target(&session, params.user)? else {
        return Ok(Redirect::to("/user/list").into_response());
    };

    match state.store.query(&target).await {
        Ok(snapshot) => {
            let catalogs = load_catalogs(state.store.as_ref(), session.is_admin).await;
            let flash = state.sessions.take_flash(&session_id);

            Ok(Json(EditUserPage {
                account: AccountView::from(&snapshot),
                catalogs,
                flash,
            })
            .into_response())
        }
        Err(e) => {
            warn!(user = %target, error = %e, "Account query failed");
            state.sessions.set_flash(&session_id, Flash::error(e.to_string()));
            Ok(Redirect::to("/user/list").into_response())
        }
    }
}

/// Reconcile a submitted edit form against the live snapshot
///
/// POST /user/edit
pub async fn save_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<EditUserForm>,
) -> Result<Response, PanelError> {
    let (session_id, session) = require_session(&state, &headers)?;

    if !session.is_admin && form.username != session.username {
        return Err(PanelError::Forbidden);
    }
    let target = form.username.clone();

    let current = match state.store.query(&target).await {
        Ok(snapshot) => snapshot,
        Err(e) if e.is_not_found() => {
            state.sessions.set_flash(&session_id, Flash::error(e.to_string()));
            return Ok(Redirect::to("/user/list").into_response());
        }
        Err(e) => {
            state.sessions.set_flash(&session_id, Flash::error(e.to_string()));
            return Ok(redirect_to_edit(&target).into_response());
        }
    };

    let report = reconcile(state.store.as_ref(), &current, &form, session.is_admin).await;

    // A committed language change on the session's own account also moves
    // the session's display language, even when a later field failed
    if report.applied.contains(&Field::Language) && target == session.username {
        state.sessions.set_language(&session_id, &form.language);
    }

    match &report.outcome {
        Outcome::Applied => {
            info!(
                user = %target,
                fields = report.applied.len(),
                "Account changes saved"
            );
            state.sessions.set_flash(&session_id, Flash::ok(SAVED_MESSAGE));
        }
        Outcome::Failed(message) => {
            state.sessions.set_flash(&session_id, Flash::error(message.clone()));
        }
    }

    Ok(redirect_to_edit(&target).into_response())
}

fn redirect_to_edit(target: &str) -> Redirect {
    Redirect::to(&format!("/user/edit?user={}", target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::models::form::MASKED_PASSWORD;
    use crate::session::flash::FlashKind;
    use crate::store::memory::{test_snapshot, InMemoryAccountStore};
    use axum::body::Body;
    use axum::http::{header, HeaderValue, StatusCode};
    use http_body_util::BodyExt;

    fn test_state() -> (Arc<AppState>, Arc<InMemoryAccountStore>) {
        let config = Config::parse(
            r#"
            [server]
            port = 8083

            [store]
            bin_dir = "/usr/local/vesta/bin"

            [session]
            api_key = "test-api-key"

            [logging]
            "#,
        )
        .unwrap();

        let store = Arc::new(InMemoryAccountStore::new());
        store.insert(test_snapshot("alice"));
        store.insert(test_snapshot("admin"));

        (Arc::new(AppState::new(config, store.clone())), store)
    }

    fn cookie_headers(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("vpanel_session={}", id)).unwrap(),
        );
        headers
    }

    fn matching_form(username: &str) -> EditUserForm {
        EditUserForm {
            username: username.to_string(),
            password: MASKED_PASSWORD.to_string(),
            package: "default".to_string(),
            language: "en".to_string(),
            template: "hosting".to_string(),
            shell: "bash".to_string(),
            email: format!("{}@example.com", username),
            fname: "First".to_string(),
            lname: "Last".to_string(),
            ns1: "ns1.example.com".to_string(),
            ns2: "ns2.example.com".to_string(),
            ns3: String::new(),
            ns4: String::new(),
        }
    }

    async fn page_from(response: Response) -> EditUserPage {
        let (_, body) = response.into_parts();
        let bytes = Body::new(body).collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_show_requires_session() {
        let (state, _) = test_state();

        let result = show_handler(
            State(state),
            HeaderMap::new(),
            Query(EditUserQuery { user: None }),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_show_admin_without_target_redirects_to_listing() {
        let (state, _) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let response = show_handler(
            State(state),
            cookie_headers(&id),
            Query(EditUserQuery { user: None }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/user/list");
    }

    #[tokio::test]
    async fn test_show_renders_masked_account_and_catalogs() {
        let (state, _) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let response = show_handler(
            State(state),
            cookie_headers(&id),
            Query(EditUserQuery {
                user: Some("alice".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = page_from(response).await;

        assert_eq!(page.account.username, "alice");
        assert_eq!(page.account.password, MASKED_PASSWORD);
        assert_eq!(page.account.status, "active");
        assert_eq!(page.catalogs.languages, vec!["en", "de"]);
        assert_eq!(page.catalogs.packages, vec!["default", "premium"]);
        assert!(page.flash.is_none());
    }

    #[tokio::test]
    async fn test_show_non_admin_gets_languages_only() {
        let (state, _) = test_state();
        let id = state.sessions.create("alice", false, "en");

        let response = show_handler(
            State(state),
            cookie_headers(&id),
            Query(EditUserQuery { user: None }),
        )
        .await
        .unwrap();

        let page = page_from(response).await;
        assert_eq!(page.account.username, "alice");
        assert_eq!(page.catalogs.languages, vec!["en", "de"]);
        assert!(page.catalogs.packages.is_empty());
        assert!(page.catalogs.templates.is_empty());
        assert!(page.catalogs.shells.is_empty());
    }

    #[tokio::test]
    async fn test_show_foreign_account_forbidden_for_non_admin() {
        let (state, _) = test_state();
        let id = state.sessions.create("alice", false, "en");

        let result = show_handler(
            State(state),
            cookie_headers(&id),
            Query(EditUserQuery {
                user: Some("admin".to_string()),
            }),
        )
        .await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_show_unknown_user_redirects_with_flash() {
        let (state, _) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let response = show_handler(
            State(state.clone()),
            cookie_headers(&id),
            Query(EditUserQuery {
                user: Some("ghost".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/user/list");

        let flash = state.sessions.take_flash(&id).unwrap();
        assert_eq!(flash.kind, FlashKind::Error);
        assert!(flash.message.contains("ghost"));
    }

    #[tokio::test]
    async fn test_save_redirects_back_with_ok_flash() {
        let (state, store) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let mut form = matching_form("alice");
        form.email = "changed@example.com".to_string();

        let response = save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/user/edit?user=alice");

        let flash = state.sessions.take_flash(&id).unwrap();
        assert_eq!(flash.kind, FlashKind::Ok);
        assert_eq!(flash.message, SAVED_MESSAGE);

        assert_eq!(
            store.snapshot("alice").unwrap().contact,
            "changed@example.com"
        );
    }

    #[tokio::test]
    async fn test_save_failure_sets_error_flash_and_keeps_earlier_fields() {
        let (state, store) = test_state();
        store.fail_verb("set_name", 1, "Error: invalid name");
        let id = state.sessions.create("admin", true, "en");

        let mut form = matching_form("alice");
        form.email = "changed@example.com".to_string();
        form.fname = "Broken".to_string();

        let response = save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let flash = state.sessions.take_flash(&id).unwrap();
        assert_eq!(flash.kind, FlashKind::Error);
        assert_eq!(flash.message, "Error: invalid name");

        // The contact change before the failing field stays committed
        assert_eq!(
            store.snapshot("alice").unwrap().contact,
            "changed@example.com"
        );
        assert_eq!(store.snapshot("alice").unwrap().fname, "First");
    }

    #[tokio::test]
    async fn test_save_own_language_updates_session() {
        let (state, _) = test_state();
        let id = state.sessions.create("alice", false, "en");

        let mut form = matching_form("alice");
        form.language = "de".to_string();

        save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        assert_eq!(state.sessions.get(&id).unwrap().language, "de");
    }

    #[tokio::test]
    async fn test_save_foreign_language_leaves_session_alone() {
        let (state, _) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let mut form = matching_form("alice");
        form.language = "de".to_string();

        save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        assert_eq!(state.sessions.get(&id).unwrap().language, "en");
    }

    #[tokio::test]
    async fn test_save_foreign_account_forbidden_for_non_admin() {
        let (state, store) = test_state();
        let id = state.sessions.create("alice", false, "en");

        let mut form = matching_form("admin");
        form.email = "evil@example.com".to_string();

        let result = save_handler(State(state), cookie_headers(&id), Form(form)).await;

        let response = result.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_unknown_user_redirects_to_listing() {
        let (state, _) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let form = matching_form("ghost");

        let response = save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/user/list");
        assert!(state.sessions.take_flash(&id).is_some());
    }

    #[tokio::test]
    async fn test_flash_is_consumed_by_next_show() {
        let (state, _) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let form = matching_form("alice");
        save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        let response = show_handler(
            State(state.clone()),
            cookie_headers(&id),
            Query(EditUserQuery {
                user: Some("alice".to_string()),
            }),
        )
        .await
        .unwrap();

        let page = page_from(response).await;
        let flash = page.flash.unwrap();
        assert_eq!(flash.kind, FlashKind::Ok);

        // Second render sees no flash
        let response = show_handler(
            State(state),
            cookie_headers(&id),
            Query(EditUserQuery {
                user: Some("alice".to_string()),
            }),
        )
        .await
        .unwrap();

        let page = page_from(response).await;
        assert!(page.flash.is_none());
    }

    #[tokio::test]
    async fn test_noop_save_still_reports_saved() {
        let (state, store) = test_state();
        let id = state.sessions.create("admin", true, "en");

        let form = matching_form("alice");
        save_handler(State(state.clone()), cookie_headers(&id), Form(form))
            .await
            .unwrap();

        let flash = state.sessions.take_flash(&id).unwrap();
        assert_eq!(flash.kind, FlashKind::Ok);
        assert!(store.calls().is_empty());
    }
}
