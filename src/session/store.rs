use crate::session::flash::Flash;
use axum::http::HeaderMap;
use dashmap::DashMap;
use rand::RngCore;

/// Per-session state: identity, display language, pending flash message
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub is_admin: bool,
    pub language: String,
    flash: Option<Flash>,
}

/// In-memory session store keyed by random hex ids
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Create a session and return its id
    pub fn create(&self, username: &str, is_admin: bool, language: &str) -> String {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        let id = hex::encode(bytes);

        self.sessions.insert(
            id.clone(),
            Session {
                username: username.to_string(),
                is_admin,
                language: language.to_string(),
                flash: None,
            },
        );

        id
    }

    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    /// Drop a session; returns whether it existed
    pub fn destroy(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Update the session's active display language
    pub fn set_language(&self, id: &str, language: &str) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.language = language.to_string();
        }
    }

    /// Replace the pending flash message
    pub fn set_flash(&self, id: &str, flash: Flash) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.flash = Some(flash);
        }
    }

    /// Consume the pending flash message; the next read sees nothing
    pub fn take_flash(&self, id: &str) -> Option<Flash> {
        self.sessions.get_mut(id).and_then(|mut entry| entry.flash.take())
    }

    /// Resolve the session carried by the request's cookie header
    pub fn from_headers(
        &self,
        headers: &HeaderMap,
        cookie_name: &str,
    ) -> Option<(String, Session)> {
        let id = session_id_from_headers(headers, cookie_name)?;
        let session = self.get(&id)?;
        Some((id, session))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the session id out of the Cookie header, if present
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Set-Cookie value for a freshly created session
pub fn session_cookie(cookie_name: &str, id: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, id)
}
