//! In-process login sessions keyed by an opaque cookie token.

use std::collections::HashMap;
use std::sync::RwLock;

use axum::http::{header, HeaderMap};
use rand::rngs::OsRng;
use rand::RngCore;

pub const SESSION_COOKIE: &str = "healix_session";

/// Token → username. Each user holds at most one session; it lives until
/// logout, the next login, or restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session and return its token, ending any earlier session
    /// for the same user.
    pub fn create(&self, username: &str) -> String {
        let token = new_token();
        let mut sessions = self.sessions.write().expect("Lock failed");
        sessions.retain(|_, user| user.as_str() != username);
        sessions.insert(token.clone(), username.to_string());
        token
    }


    #[must_use]
    pub fn username(&self, token: &str) -> Option<String> {
        self.sessions.read().expect("Lock failed").get(token).cloned()
    }

    pub fn remove(&self, token: &str) {
        self.sessions.write().expect("Lock failed").remove(token);
    }

    /// Username for the session cookie in `headers`, if any.
    #[must_use]
    pub fn user_for(&self, headers: &HeaderMap) -> Option<String> {
        token_from_headers(headers).and_then(|token| self.username(&token))
    }
}

/// Pull the session token out of the `Cookie` header(s).
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

#[must_use]
pub fn cleared_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
