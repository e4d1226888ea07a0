//! HTTP surface: axum router, session cookies and server-rendered pages.

mod error;
mod handlers;
pub mod pages;
mod session;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapters::SqliteStorage;
use crate::application::{AccountService, PredictionService};

pub use error::{status_code, PageError};
pub use session::{SessionStore, SESSION_COOKIE};

/// Shared state handed to every handler.
pub struct AppState {
    pub predictions: PredictionService<SqliteStorage>,
    pub accounts: AccountService<SqliteStorage>,
    pub sessions: SessionStore,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::account_routes())
        .merge(handlers::page_routes())
        .merge(handlers::api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DisabledAlerts, MockExtractor, RiskModels};
    use crate::application::{AlertDispatcher, AlertPolicy};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let storage = Arc::new(SqliteStorage::in_memory().expect("Should create storage"));
        let alerts = Arc::new(AlertDispatcher::new(
            Arc::new(DisabledAlerts),
            AlertPolicy::new("/nonexistent/public_url.txt"),
        ));
        let state = AppState {
            predictions: PredictionService::new(
                Arc::new(MockExtractor::with_seed(3)),
                Arc::new(RiskModels::builtin().expect("Should build models")),
                storage.clone(),
                alerts,
            ),
            accounts: AccountService::new(storage),
            sessions: SessionStore::new(),
        };
        router(Arc::new(state))
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).expect("Should build request")
    }

    fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("Should build request")
    }

    fn post_json(uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("Should build request")
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .expect("Should read body")
            .to_bytes()
            .to_vec()
    }

    async fn body_text(response: Response) -> String {
        String::from_utf8(body_bytes(response).await).expect("Should be UTF-8")
    }

    /// Register and log in, returning the `Cookie` header value.
    async fn sign_in(app: &Router, username: &str) -> String {
        let response = app
            .clone()
            .oneshot(post_form(
                "/register",
                &format!("username={username}&password=pw&phone=%2B919876543210"),
                None,
            ))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = app
            .clone()
            .oneshot(post_form(
                "/login",
                &format!("username={username}&password=pw"),
                None,
            ))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("Should set cookie");
        assert!(set_cookie.contains("HttpOnly"));
        set_cookie
            .split(';')
            .next()
            .expect("Should have cookie pair")
            .to_string()
    }

    #[tokio::test]
    async fn test_root_redirects_to_login() {
        let app = create_test_app();
        let response = app.oneshot(get("/", None)).await.expect("Should respond");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_gated_pages_redirect_without_session() {
        let app = create_test_app();
        for uri in ["/dashboard", "/history", "/settings"] {
            let response = app
                .clone()
                .oneshot(get(uri, Some("healix_session=forged")))
                .await
                .expect("Should respond");
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(location(&response), "/login");
        }
    }

    #[tokio::test]
    async fn test_register_login_dashboard() {
        let app = create_test_app();
        let cookie = sign_in(&app, "asha").await;

        let response = app
            .clone()
            .oneshot(get("/dashboard", Some(&cookie)))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Welcome, asha"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rerenders_form() {
        let app = create_test_app();
        sign_in(&app, "asha").await;

        let response = app
            .oneshot(post_form("/register", "username=asha&password=x", None))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(body_text(response).await.contains("Username already exists"));
    }

    #[tokio::test]
    async fn test_guest_registration_rejected() {
        let app = create_test_app();
        let response = app
            .oneshot(post_form("/register", "username=guest&password=pw", None))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("reserved"));
    }

    #[tokio::test]
    async fn test_bad_login() {
        let app = create_test_app();
        sign_in(&app, "asha").await;

        let response = app
            .oneshot(post_form("/login", "username=asha&password=nope", None))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = create_test_app();
        let cookie = sign_in(&app, "asha").await;

        let response = app
            .clone()
            .oneshot(get("/logout", Some(&cookie)))
            .await
            .expect("Should respond");
        assert_eq!(location(&response), "/login");

        let response = app
            .oneshot(get("/dashboard", Some(&cookie)))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_guest_prediction_and_public_report() {
        let app = create_test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/predict",
                &json!({"age": 58, "glucose": "190", "bmi": 33, "language": "hi-IN"}),
                None,
            ))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value =
            serde_json::from_slice(&body_bytes(response).await).expect("Should be JSON");
        for key in [
            "diabetes",
            "heart",
            "kidney",
            "estimates",
            "recommendation",
            "future_risks",
            "precautions",
            "causes",
            "reduction_steps",
            "diet_plan",
            "record_id",
        ] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
        assert_eq!(body["estimates"]["glucose"], json!(190.0));
        let diabetes = body["diabetes"].as_u64().expect("Should be integer");
        assert!(diabetes <= 100);

        let record_id = body["record_id"].as_i64().expect("Should have id");
        let response = app
            .oneshot(get(&format!("/report/{record_id}"), None))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Guest"));
        assert!(html.contains(&format!("Diabetes: {diabetes}%")));
    }

    #[tokio::test]
    async fn test_predict_rejects_non_object() {
        let app = create_test_app();
        let response = app
            .oneshot(post_json("/predict", &json!([1, 2, 3]), None))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logged_in_prediction_shows_in_history() {
        let app = create_test_app();
        let cookie = sign_in(&app, "asha").await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/predict",
                &json!({"message": "always thirsty", "questionnaire": {"thirst": 1}}),
                Some(&cookie),
            ))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get("/history", Some(&cookie)))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("always thirsty"));
    }

    #[tokio::test]
    async fn test_settings_update() {
        let app = create_test_app();
        let cookie = sign_in(&app, "asha").await;

        let response = app
            .clone()
            .oneshot(post_form("/settings", "phone=%2B919800000000&password=", Some(&cookie)))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Settings updated"));
        assert!(html.contains("+919800000000"));

        // password untouched
        let response = app
            .oneshot(post_form("/login", "username=asha&password=pw", None))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_unknown_reports_are_not_found() {
        let app = create_test_app();
        for uri in ["/report/9999", "/report/abc"] {
            let response = app
                .clone()
                .oneshot(get(uri, None))
                .await
                .expect("Should respond");
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_download_report_pdf() {
        let app = create_test_app();
        let response = app
            .oneshot(post_json(
                "/download_report",
                &json!({
                    "estimates": {"age": 45, "bmi": 25},
                    "diabetes": 72,
                    "heart": 20,
                    "kidney": 15,
                    "recommendation": "Walk daily.",
                }),
                None,
            ))
            .await
            .expect("Should respond");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/pdf")
        );
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("healix_report.pdf"));
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }
}
