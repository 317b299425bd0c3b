use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::captcha::{CaptchaVerdict, CaptchaVerifier};
use super::domain::{SignInRequest, SignUpRequest, UserSummary};
use super::service::{AccountError, AccountService};
use crate::store::KeyValueStore;

/// Router exposing sign-up, sign-in, sign-out and the CAPTCHA passthrough.
pub fn account_router<S, V>(service: Arc<AccountService<S, V>>) -> Router
where
    S: KeyValueStore + Clone + 'static,
    V: CaptchaVerifier + 'static,
{
    Router::new()
        .route("/api/verify-captcha", post(verify_captcha_handler::<S, V>))
        .route("/api/v1/accounts/signup", post(sign_up_handler::<S, V>))
        .route("/api/v1/accounts/signin", post(sign_in_handler::<S, V>))
        .route("/api/v1/accounts/signout", post(sign_out_handler::<S, V>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct VerifyCaptchaRequest {
    token: Option<String>,
}

pub(crate) async fn verify_captcha_handler<S, V>(
    State(service): State<Arc<AccountService<S, V>>>,
    Json(request): Json<VerifyCaptchaRequest>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
    V: CaptchaVerifier + 'static,
{
    let Some(token) = request.token.filter(|token| !token.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(CaptchaVerdict::rejected("Missing token")),
        )
            .into_response();
    };

    match service.verifier().verify(&token).await {
        Ok(verdict) => (StatusCode::OK, Json(verdict)).into_response(),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(CaptchaVerdict::rejected(err.to_string())),
        )
            .into_response(),
    }
}

pub(crate) async fn sign_up_handler<S, V>(
    State(service): State<Arc<AccountService<S, V>>>,
    Json(request): Json<SignUpRequest>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
    V: CaptchaVerifier + 'static,
{
    match service.sign_up(request).await {
        Ok(user) => (StatusCode::CREATED, Json(UserSummary::from(&user))).into_response(),
        Err(err) => account_error_response(err),
    }
}

pub(crate) async fn sign_in_handler<S, V>(
    State(service): State<Arc<AccountService<S, V>>>,
    Json(request): Json<SignInRequest>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
    V: CaptchaVerifier + 'static,
{
    match service.sign_in(request) {
        Ok(user) => (StatusCode::OK, Json(UserSummary::from(&user))).into_response(),
        Err(err) => account_error_response(err),
    }
}

pub(crate) async fn sign_out_handler<S, V>(
    State(service): State<Arc<AccountService<S, V>>>,
) -> Response
where
    S: KeyValueStore + Clone + 'static,
    V: CaptchaVerifier + 'static,
{
    match service.sign_out() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => account_error_response(err),
    }
}

fn account_error_response(error: AccountError) -> Response {
    let status = match &error {
        err if err.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AccountError::CaptchaRejected(_) => StatusCode::BAD_REQUEST,
        AccountError::Captcha(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let detail = match &error {
        AccountError::CaptchaRejected(Some(message)) => Some(message.clone()),
        _ => None,
    };
    let payload = json!({
        "error": error.to_string(),
        "detail": detail,
    });
    (status, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::workflows::accounts::captcha::StaticCaptchaVerifier;
    use crate::workflows::accounts::default_accounts;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router(verifier: StaticCaptchaVerifier) -> Router {
        let service = AccountService::new(MemoryStore::new(), Arc::new(verifier));
        service.seed(default_accounts()).expect("seed succeeds");
        account_router(Arc::new(service))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn verify_captcha_requires_token() {
        let response = router(StaticCaptchaVerifier::accepting())
            .oneshot(post_json("/api/verify-captcha", json!({})))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "success": false, "message": "Missing token" }));
    }

    #[tokio::test]
    async fn verify_captcha_passes_verdict_through() {
        let response = router(StaticCaptchaVerifier::rejecting("bad-token"))
            .oneshot(post_json("/api/verify-captcha", json!({ "token": "abc" })))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "bad-token");
    }

    #[tokio::test]
    async fn sign_in_returns_dashboard_for_role() {
        let response = router(StaticCaptchaVerifier::accepting())
            .oneshot(post_json(
                "/api/v1/accounts/signin",
                json!({ "email": "tutor@teachteam.edu", "password": "Tutor1234!" }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["role"], "tutor");
        assert_eq!(body["dashboard"], "/tutor");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn sign_up_maps_captcha_outage_to_bad_gateway() {
        let response = router(StaticCaptchaVerifier::unavailable())
            .oneshot(post_json(
                "/api/v1/accounts/signup",
                json!({
                    "email": "someone@rmit.edu.au",
                    "password": "Password1!",
                    "confirmPassword": "Password1!",
                    "captchaToken": "abc"
                }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to verify CAPTCHA.");
    }

    #[tokio::test]
    async fn sign_up_rejects_weak_password() {
        let response = router(StaticCaptchaVerifier::accepting())
            .oneshot(post_json(
                "/api/v1/accounts/signup",
                json!({
                    "email": "someone@rmit.edu.au",
                    "password": "password",
                    "confirmPassword": "password",
                    "captchaToken": "abc"
                }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
