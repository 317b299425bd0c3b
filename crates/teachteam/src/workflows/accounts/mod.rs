//! Account registration, sign-in, and the role gate in front of the dashboards.

pub mod captcha;
pub mod domain;
pub mod router;
pub mod service;
pub mod session;
pub(crate) mod validation;

pub use captcha::{
    CaptchaError, CaptchaVerdict, CaptchaVerifier, ConfiguredCaptchaVerifier,
    HttpCaptchaVerifier, StaticCaptchaVerifier,
};
pub use domain::{Role, SignInRequest, SignUpRequest, User, UserSummary};
pub use router::account_router;
pub use service::{default_accounts, AccountError, AccountService};
pub use session::{AccessError, SessionGate, LOGIN_PATH};
