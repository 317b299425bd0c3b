use std::fmt;

use serde::{Deserialize, Serialize};

/// Dashboard a signed-in account may reach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Lecturer,
    #[default]
    Tutor,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Lecturer => "lecturer",
            Role::Tutor => "tutor",
        }
    }

    /// Landing page after sign-in.
    pub const fn dashboard_path(self) -> &'static str {
        match self {
            Role::Lecturer => "/lecturer",
            Role::Tutor => "/tutor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored account as persisted under `users` and `currentUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Account view returned to callers, without the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub email: String,
    pub role: Role,
    pub dashboard: &'static str,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            role: user.role,
            dashboard: user.role.dashboard_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub captcha_token: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}
