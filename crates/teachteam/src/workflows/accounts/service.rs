use std::sync::Arc;

use tracing::{info, warn};

use super::captcha::{CaptchaError, CaptchaVerifier};
use super::domain::{Role, SignInRequest, SignUpRequest, User};
use super::session::SessionGate;
use super::validation::{is_acceptable_sign_in_password, is_strong_password, is_valid_email};
use crate::store::{self, KeyValueStore, StoreError, USERS_KEY};

/// Sign-up, sign-in and sign-out over the `users` and `currentUser` entries.
pub struct AccountService<S, V: ?Sized> {
    store: S,
    gate: SessionGate<S>,
    verifier: Arc<V>,
}

impl<S, V> AccountService<S, V>
where
    S: KeyValueStore + Clone,
    V: CaptchaVerifier + ?Sized,
{
    pub fn new(store: S, verifier: Arc<V>) -> Self {
        let gate = SessionGate::new(store.clone());
        Self {
            store,
            gate,
            verifier,
        }
    }

    pub fn gate(&self) -> &SessionGate<S> {
        &self.gate
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn users(&self) -> Vec<User> {
        store::load_collection(&self.store, USERS_KEY)
    }

    /// Register a new account. Checks run in form order and stop at the first failure; nothing
    /// is written unless every check, including CAPTCHA verification, passes.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<User, AccountError> {
        let email = request.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if !is_strong_password(&request.password) {
            return Err(AccountError::WeakPassword);
        }
        let token = request
            .captcha_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AccountError::CaptchaRequired)?;
        if request.password != request.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }

        let verdict = self.verifier.verify(token).await.map_err(|err| {
            warn!(error = %err, "failed to verify captcha");
            AccountError::Captcha(err)
        })?;
        if !verdict.success {
            return Err(AccountError::CaptchaRejected(verdict.message));
        }

        let mut users = self.users();
        if users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(&email))
        {
            return Err(AccountError::EmailTaken);
        }

        let user = User {
            email,
            password: request.password,
            role: request.role,
        };
        users.push(user.clone());
        store::save_value(&self.store, USERS_KEY, &users)?;

        info!(email = %user.email, role = %user.role, "account created");
        Ok(user)
    }

    /// Match credentials against `users` and start a session.
    pub fn sign_in(&self, request: SignInRequest) -> Result<User, AccountError> {
        let email = request.email.trim();
        if !is_valid_email(email) {
            return Err(AccountError::InvalidEmail);
        }
        if !is_acceptable_sign_in_password(&request.password) {
            return Err(AccountError::WeakPassword);
        }

        let user = self
            .users()
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email) && user.password == request.password)
            .ok_or(AccountError::InvalidCredentials)?;

        self.gate.begin(&user)?;
        info!(email = %user.email, role = %user.role, "signed in");
        Ok(user)
    }

    pub fn sign_out(&self) -> Result<(), AccountError> {
        self.gate.end()?;
        Ok(())
    }

    /// Add accounts whose email is not registered yet. Returns how many were added.
    pub fn seed(&self, accounts: impl IntoIterator<Item = User>) -> Result<usize, AccountError> {
        let mut users = self.users();
        let before = users.len();
        for account in accounts {
            if !users
                .iter()
                .any(|user| user.email.eq_ignore_ascii_case(&account.email))
            {
                users.push(account);
            }
        }
        let added = users.len() - before;
        if added > 0 {
            store::save_value(&self.store, USERS_KEY, &users)?;
        }
        Ok(added)
    }
}

/// Default demo accounts, one per role.
pub fn default_accounts() -> Vec<User> {
    vec![
        User {
            email: "lecturer@teachteam.edu".to_string(),
            password: "Lecturer123!".to_string(),
            role: Role::Lecturer,
        },
        User {
            email: "tutor@teachteam.edu".to_string(),
            password: "Tutor1234!".to_string(),
            role: Role::Tutor,
        },
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 8 characters long and include uppercase, lowercase, numbers, and special characters.")]
    WeakPassword,
    #[error("Please complete the CAPTCHA verification.")]
    CaptchaRequired,
    #[error("The passwords do not match. Please try again.")]
    PasswordMismatch,
    #[error("CAPTCHA verification did not pass.")]
    CaptchaRejected(Option<String>),
    #[error("Failed to verify CAPTCHA.")]
    Captcha(#[source] CaptchaError),
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Email or password is incorrect.")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AccountError {
    /// Validation failures are the caller's to fix; the rest are dependency failures.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            AccountError::InvalidEmail
                | AccountError::WeakPassword
                | AccountError::CaptchaRequired
                | AccountError::PasswordMismatch
                | AccountError::EmailTaken
        )
    }
}
