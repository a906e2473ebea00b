//! Sign-in against the hosted auth endpoint (`/auth/v1`).
//!
//! A successful sign-in yields a [`Session`]; nothing here keeps global state.
//! Callers persist the session (see [`crate::config::save_session`]) and hand
//! it to whatever needs the user's identity.

use serde::{Deserialize, Serialize};
use serde_json::json;
use ureq::Agent;

use crate::config::{BackendSettings, Config};
use crate::error::{AppError, Result};
use crate::store::rest::build_agent;

/// User id used for settings when running against the local store.
pub const LOCAL_USER_ID: &str = "local";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

impl Session {
    /// Session for offline use; carries no credentials.
    pub fn local() -> Self {
        Self {
            user_id: LOCAL_USER_ID.to_string(),
            email: String::new(),
            access_token: String::new(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct AuthClient {
    agent: Agent,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(backend: &BackendSettings) -> Result<Self> {
        let base_url = backend.url.as_deref().ok_or(AppError::MissingBackendUrl)?;
        let api_key = backend.api_key().ok_or(AppError::MissingApiKey)?;
        Ok(Self {
            agent: build_agent(backend.timeout_secs),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn post(&self, path: &str, bearer: &str, body: serde_json::Value) -> Result<String> {
        let url = format!("{}/auth/v1/{}", self.base_url, path);
        let mut response = self
            .agent
            .post(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", &format!("Bearer {bearer}"))
            .header("Content-Type", "application/json")
            .send(body.to_string())
            .map_err(|e| AppError::Auth(format!("could not reach the server: {e}")))?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AppError::Auth(e.to_string()))?;

        if status.is_success() {
            return Ok(text);
        }

        let message = serde_json::from_str::<AuthErrorBody>(&text)
            .ok()
            .and_then(|b| b.error_description.or(b.msg).or(b.message))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        Err(AppError::Auth(message))
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let body = self.post(
            "token?grant_type=password",
            &self.api_key,
            json!({ "email": email, "password": password }),
        )?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AppError::Auth(e.to_string()))?;

        tracing::info!(user_id = %token.user.id, "signed in");
        Ok(session_from_token(token, email, chrono::Utc::now().timestamp()))
    }

    /// Register a new account. Returns `None` when the backend requires email
    /// confirmation before a session is issued.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let body = self.post(
            "signup",
            &self.api_key,
            json!({ "email": email, "password": password }),
        )?;

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => Ok(Some(session_from_token(
                token,
                email,
                chrono::Utc::now().timestamp(),
            ))),
            Err(_) => {
                tracing::info!(email, "sign-up pending confirmation");
                Ok(None)
            }
        }
    }

    pub fn sign_out(&self, session: &Session) -> Result<()> {
        self.post("logout", &session.access_token, json!({}))?;
        tracing::info!(user_id = %session.user_id, "signed out");
        Ok(())
    }
}

fn session_from_token(token: TokenResponse, email: &str, now: i64) -> Session {
    Session {
        user_id: token.user.id,
        email: token.user.email.unwrap_or_else(|| email.to_string()),
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: token.expires_in.map(|secs| now + secs),
    }
}

/// Sign in with the demo credentials from config. Refused unless the config
/// explicitly enables it.
pub fn demo_sign_in(config: &Config) -> Result<Session> {
    if !config.demo.enabled {
        return Err(AppError::DemoDisabled);
    }
    let (Some(email), Some(password)) = (&config.demo.email, &config.demo.password) else {
        return Err(AppError::DemoCredentialsMissing);
    };

    tracing::warn!(email = %email, "signing in with demo account");
    AuthClient::new(&config.backend)?.sign_in(email, password)
}
