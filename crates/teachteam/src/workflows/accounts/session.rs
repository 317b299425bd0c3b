use tracing::{debug, warn};

use super::domain::{Role, User};
use crate::store::{self, KeyValueStore, StoreError, CURRENT_USER_KEY};

/// Where callers are sent when the gate turns them away.
pub const LOGIN_PATH: &str = "/login";

/// Role gate over the `currentUser` entry. Runs before any dashboard state is loaded.
#[derive(Debug, Clone)]
pub struct SessionGate<S> {
    store: S,
}

impl<S> SessionGate<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The signed-in account; malformed session data counts as signed out.
    pub fn current_user(&self) -> Option<User> {
        store::load_value(&self.store, CURRENT_USER_KEY)
    }

    pub fn require_role(&self, role: Role) -> Result<User, AccessError> {
        let Some(user) = self.current_user() else {
            debug!(required = %role, "no active session");
            return Err(AccessError::NotSignedIn);
        };
        if user.role != role {
            warn!(required = %role, actual = %user.role, "you are not authorized to access this page");
            return Err(AccessError::WrongRole {
                required: role,
                actual: user.role,
            });
        }
        Ok(user)
    }

    pub fn begin(&self, user: &User) -> Result<(), StoreError> {
        store::save_value(&self.store, CURRENT_USER_KEY, user)
    }

    pub fn end(&self) -> Result<(), StoreError> {
        self.store.remove(CURRENT_USER_KEY)
    }
}

/// Authorization failure; callers redirect to [`LOGIN_PATH`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("sign in to continue")]
    NotSignedIn,
    #[error("this page requires the {required} role, signed in as {actual}")]
    WrongRole { required: Role, actual: Role },
}

impl AccessError {
    pub const fn redirect(&self) -> &'static str {
        LOGIN_PATH
    }
}
