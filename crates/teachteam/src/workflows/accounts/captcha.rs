//! CAPTCHA verification boundary used by sign-up.
//!
//! Verification is a single request with no retry. Any transport or decoding failure aborts the
//! calling workflow.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CaptchaConfig;

/// Outcome reported to the browser by the verify endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaVerdict {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CaptchaVerdict {
    pub fn passed() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, CaptchaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CaptchaError {
    #[error("captcha verification is not configured")]
    NotConfigured,
    #[error("captcha service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Response shape of the siteverify API.
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Posts tokens to a reCAPTCHA-compatible `siteverify` endpoint.
#[derive(Debug, Clone)]
pub struct HttpCaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl HttpCaptchaVerifier {
    pub fn new(secret: impl Into<String>, verify_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret: secret.into(),
            verify_url: verify_url.into(),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for HttpCaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, CaptchaError> {
        let response: SiteVerifyResponse = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(success = response.success, "captcha verification completed");
        if response.success {
            Ok(CaptchaVerdict::passed())
        } else if response.error_codes.is_empty() {
            Ok(CaptchaVerdict::rejected("CAPTCHA verification did not pass."))
        } else {
            Ok(CaptchaVerdict::rejected(response.error_codes.join(", ")))
        }
    }
}

/// Fixed verdict, for local runs without a secret and for tests.
#[derive(Debug, Clone)]
pub struct StaticCaptchaVerifier {
    verdict: Option<CaptchaVerdict>,
}

impl StaticCaptchaVerifier {
    pub fn accepting() -> Self {
        Self {
            verdict: Some(CaptchaVerdict::passed()),
        }
    }

    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            verdict: Some(CaptchaVerdict::rejected(message)),
        }
    }

    /// Every verification fails with [`CaptchaError::NotConfigured`].
    pub fn unavailable() -> Self {
        Self { verdict: None }
    }
}

#[async_trait]
impl CaptchaVerifier for StaticCaptchaVerifier {
    async fn verify(&self, _token: &str) -> Result<CaptchaVerdict, CaptchaError> {
        self.verdict.clone().ok_or(CaptchaError::NotConfigured)
    }
}

/// Verifier selected from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredCaptchaVerifier {
    Http(HttpCaptchaVerifier),
    Static(StaticCaptchaVerifier),
}

impl ConfiguredCaptchaVerifier {
    /// Use the HTTP verifier when a secret is configured. Without one, `allow_bypass` decides
    /// between accepting every token and refusing every sign-up.
    pub fn from_config(config: &CaptchaConfig, allow_bypass: bool) -> Self {
        match &config.secret {
            Some(secret) => Self::Http(HttpCaptchaVerifier::new(
                secret.clone(),
                config.verify_url.clone(),
            )),
            None if allow_bypass => Self::Static(StaticCaptchaVerifier::accepting()),
            None => Self::Static(StaticCaptchaVerifier::unavailable()),
        }
    }
}

#[async_trait]
impl CaptchaVerifier for ConfiguredCaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, CaptchaError> {
        match self {
            ConfiguredCaptchaVerifier::Http(verifier) => verifier.verify(token).await,
            ConfiguredCaptchaVerifier::Static(verifier) => verifier.verify(token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_verifiers_report_fixed_outcomes() {
        let verdict = StaticCaptchaVerifier::accepting()
            .verify("token")
            .await
            .expect("accepting verifier succeeds");
        assert!(verdict.success);

        let verdict = StaticCaptchaVerifier::rejecting("timeout-or-duplicate")
            .verify("token")
            .await
            .expect("rejecting verifier still answers");
        assert!(!verdict.success);
        assert_eq!(verdict.message.as_deref(), Some("timeout-or-duplicate"));

        assert!(matches!(
            StaticCaptchaVerifier::unavailable().verify("token").await,
            Err(CaptchaError::NotConfigured)
        ));
    }

    #[test]
    fn configured_verifier_prefers_http_when_secret_present() {
        let config = CaptchaConfig {
            secret: Some("secret".to_string()),
            verify_url: "https://captcha.example/siteverify".to_string(),
        };
        assert!(matches!(
            ConfiguredCaptchaVerifier::from_config(&config, false),
            ConfiguredCaptchaVerifier::Http(_)
        ));

        let missing = CaptchaConfig {
            secret: None,
            ..config
        };
        assert!(matches!(
            ConfiguredCaptchaVerifier::from_config(&missing, true),
            ConfiguredCaptchaVerifier::Static(_)
        ));
    }

    #[tokio::test]
    async fn http_verifier_surfaces_transport_failures() {
        let verifier = HttpCaptchaVerifier::new("secret", "http://127.0.0.1:9/siteverify");
        assert!(matches!(
            verifier.verify("token").await,
            Err(CaptchaError::Transport(_))
        ));
    }

    #[test]
    fn verdict_omits_missing_message() {
        let encoded = serde_json::to_value(CaptchaVerdict::passed()).expect("encodes");
        assert_eq!(encoded, serde_json::json!({ "success": true }));
    }
}
