//! User model
//!
//! Table: users

use std::str::FromStr;

use bl_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Role held by a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    ProductOwner,
    ScrumMaster,
    #[default]
    Developer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::ProductOwner => "PRODUCT_OWNER",
            Self::ScrumMaster => "SCRUM_MASTER",
            Self::Developer => "DEVELOPER",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "PRODUCT_OWNER" => Ok(Self::ProductOwner),
            "SCRUM_MASTER" => Ok(Self::ScrumMaster),
            "DEVELOPER" => Ok(Self::Developer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User entity
///
/// Can own projects, be assigned tasks and author comments. Username and
/// email are unique across users.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    #[validate(length(min = 3, max = 64))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    /// Hash produced by the authentication layer
    #[serde(skip_serializing)]
    pub password_hash: String,

    #[serde(default)]
    pub role: Role,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl_entity!(User, "users", "User");

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            role,
            ..Default::default()
        }
    }

    pub fn is_product_owner(&self) -> bool {
        self.role == Role::ProductOwner
    }
}

/// Input for registering a user
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Option<Role>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

impl From<NewUser> for User {
    fn from(input: NewUser) -> Self {
        Self {
            username: input.username,
            email: input.email,
            password_hash: input.password_hash,
            role: input.role.unwrap_or_default(),
            ..Default::default()
        }
    }
}
