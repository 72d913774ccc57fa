//! User service
//!
//! Handles registration and API-key authentication lookups.

use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::domain::entities::{NewUser, User, UserId, UserRole};
use crate::domain::ports::UserRepository;
use crate::error::{AppError, DomainError};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 50;

/// Service for managing user accounts
pub struct UserService<UR>
where
    UR: UserRepository,
{
    users: Arc<UR>,
    admin_names: Vec<String>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    pub fn new(users: Arc<UR>, admin_names: Vec<String>) -> Self {
        Self { users, admin_names }
    }

    /// Register a new user
    ///
    /// Returns (user, api_key); the key is only shown once
    pub async fn register(&self, name: &str) -> Result<(User, String), AppError> {
        let name = name.trim();
        let len = name.chars().count();
        if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
            return Err(AppError::BadRequest(format!(
                "Name must be between {} and {} characters",
                NAME_MIN_LEN, NAME_MAX_LEN
            )));
        }

        if self.users.find_by_name(name).await?.is_some() {
            return Err(AppError::Domain(DomainError::Conflict(format!(
                "User with name '{}' already exists",
                name
            ))));
        }

        let role = if self.admin_names.iter().any(|n| n == name) {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let api_key = generate_api_key();
        let new_user = NewUser {
            name: name.to_string(),
            api_key_hash: hash_api_key(&api_key),
            role,
        };

        let user = self.users.create(&new_user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");

        Ok((user, api_key))
    }

    /// Find a user by their API key hash
    pub async fn find_by_api_key(&self, api_key_hash: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.find_by_api_key_hash(api_key_hash).await?)
    }

    /// Update user's last seen timestamp
    pub async fn touch(&self, id: &UserId) -> Result<(), AppError> {
        self.users.update_last_seen(id).await?;
        Ok(())
    }
}

/// Generate a random API key
fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!("sk-{}", hex::encode(bytes))
}

/// Hash an API key for storage
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}
