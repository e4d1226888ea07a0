//! Route handlers, grouped the way they are merged into the router.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::error::{status_code, PageError};
use super::session::{cleared_cookie, session_cookie, token_from_headers};
use super::{pages, AppState};
use crate::adapters::{render_report, ReportDocument, REPORT_FILE_NAME};
use crate::application::{PredictionRequest, PredictionResponse};
use crate::domain::GUEST_USERNAME;
use crate::HealixError;

type AppStateArc = Arc<AppState>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub phone: Option<String>,
    pub password: Option<String>,
}

// ============================================================================
// Account Routes
// ============================================================================

pub fn account_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

async fn index() -> Redirect {
    Redirect::to("/login")
}

async fn register_form() -> Html<String> {
    Html(pages::register_page(None))
}

async fn register(State(state): State<AppStateArc>, Form(form): Form<CredentialsForm>) -> Response {
    match state
        .accounts
        .register(&form.username, &form.password, form.phone.as_deref())
    {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(err @ HealixError::Conflict(_)) => (
            status_code(&err),
            Html(pages::register_page(Some("Username already exists"))),
        )
            .into_response(),
        Err(HealixError::Validation(message)) => (
            StatusCode::BAD_REQUEST,
            Html(pages::register_page(Some(&message))),
        )
            .into_response(),
        Err(err) => PageError(err).into_response(),
    }
}

async fn login_form() -> Html<String> {
    Html(pages::login_page(None))
}

async fn login(State(state): State<AppStateArc>, Form(form): Form<CredentialsForm>) -> Response {
    match state
        .accounts
        .login(&form.username, &form.password, form.phone.as_deref())
    {
        Ok(user) => {
            let token = state.sessions.create(&user.username);
            info!("User {} logged in", user.id);
            (
                [(header::SET_COOKIE, session_cookie(&token))],
                Redirect::to("/dashboard"),
            )
                .into_response()
        }
        Err(HealixError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Html(pages::login_page(Some("Invalid credentials"))),
        )
            .into_response(),
        Err(err) => PageError(err).into_response(),
    }
}

async fn logout(State(state): State<AppStateArc>, headers: HeaderMap) -> Response {
    if let Some(token) = token_from_headers(&headers) {
        state.sessions.remove(&token);
    }
    (
        [(header::SET_COOKIE, cleared_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

// ============================================================================
// Page Routes
// ============================================================================

pub fn page_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/history", get(history))
        .route("/settings", get(settings_form).post(settings))
        .route("/report/:id", get(public_report))
}

async fn dashboard(State(state): State<AppStateArc>, headers: HeaderMap) -> Response {
    match state.sessions.user_for(&headers) {
        Some(username) => Html(pages::dashboard_page(&username)).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

async fn history(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let Some(username) = state.sessions.user_for(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };
    let records = state.accounts.history(&username)?;
    Ok(Html(pages::history_page(&username, &records)).into_response())
}

async fn settings_form(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let Some(username) = state.sessions.user_for(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };
    let user = state.accounts.profile(&username)?;
    Ok(Html(pages::settings_page(&user, None)).into_response())
}

async fn settings(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Form(form): Form<SettingsForm>,
) -> Result<Response, PageError> {
    let Some(username) = state.sessions.user_for(&headers) else {
        return Ok(Redirect::to("/login").into_response());
    };
    let user = state.accounts.update_settings(
        &username,
        form.phone.as_deref(),
        form.password.as_deref(),
    )?;
    Ok(Html(pages::settings_page(&user, Some("Settings updated"))).into_response())
}

async fn public_report(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let id: i64 = id
        .parse()
        .map_err(|_| HealixError::NotFound(format!("record {id}")))?;
    let record = state.accounts.report(id)?;
    Ok(Html(pages::report_page(&record)))
}

// ============================================================================
// API Routes
// ============================================================================

pub fn api_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/predict", post(predict))
        .route("/download_report", post(download_report))
}

async fn predict(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<PredictionResponse>, HealixError> {
    let request = PredictionRequest::from_value(body)?;
    let username = state.sessions.user_for(&headers);
    let response = state
        .predictions
        .predict(request, username.as_deref())
        .await?;
    Ok(Json(response))
}

async fn download_report(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, HealixError> {
    let Value::Object(payload) = body else {
        warn!("Rejected report download with a non-object body");
        return Err(HealixError::Validation(
            "request body must be a JSON object".to_string(),
        ));
    };
    let username = state
        .sessions
        .user_for(&headers)
        .unwrap_or_else(|| GUEST_USERNAME.to_string());

    let document = ReportDocument::from_payload(&payload, &username, Utc::now());
    let bytes = render_report(&document)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
