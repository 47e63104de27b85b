//! Credential service: user creation and password authentication.
//!
//! Handlers call into [`AuthService`] and match on [`AuthError`] variants;
//! failure cases are tagged rather than distinguished by message text.

pub mod cookies;
pub mod token;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

use crate::db::{DbPool, User};

/// Role assigned when a signup request doesn't specify one
pub const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user with this email already exists")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("password hashing failed")]
    PasswordHash,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validated input for creating a user. Produced by the validation layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// User persistence and credential checks, backed by the database pool.
#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
}

impl AuthService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user record from validated input.
    ///
    /// Fails with [`AuthError::EmailTaken`] when the email is already on
    /// record. The UNIQUE constraint on `users.email` is the backstop for
    /// concurrent signups with the same address.
    pub async fn create_user(&self, input: NewUser) -> Result<User, AuthError> {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(&input.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&input.password).map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            AuthError::PasswordHash
        })?;

        let now = chrono::Utc::now().to_rfc3339();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: input.email,
            password_hash,
            name: input.name,
            role: input.role,
            created_at: now.clone(),
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.role)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err)
                if db_err.message().contains("UNIQUE constraint failed") =>
            {
                AuthError::EmailTaken
            }
            _ => AuthError::Database(e),
        })?;

        Ok(user)
    }

    /// Authenticate an existing user by email and password.
    ///
    /// Not-found and bad-password are distinct variants here; the API layer
    /// collapses them into one response.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let user = user.ok_or(AuthError::UserNotFound)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidPassword);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "correct horse battery".to_string(),
            role: DEFAULT_ROLE.to_string(),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret-password").unwrap();
        assert_ne!(hash, "secret-password");
        assert!(verify_password("secret-password", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_verify_password_bad_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_create_user_stores_hash_not_password() {
        let pool = db::init_in_memory().await.unwrap();
        let service = AuthService::new(pool);

        let user = service.create_user(new_user("a@example.com")).await.unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.role, "user");
        assert_ne!(user.password_hash, "correct horse battery");
        assert!(verify_password("correct horse battery", &user.password_hash));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let pool = db::init_in_memory().await.unwrap();
        let service = AuthService::new(pool);

        service.create_user(new_user("dup@example.com")).await.unwrap();
        let err = service
            .create_user(new_user("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_authenticate_user() {
        let pool = db::init_in_memory().await.unwrap();
        let service = AuthService::new(pool);

        service.create_user(new_user("b@example.com")).await.unwrap();

        let user = service
            .authenticate_user("b@example.com", "correct horse battery")
            .await
            .unwrap();
        assert_eq!(user.email, "b@example.com");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email() {
        let pool = db::init_in_memory().await.unwrap();
        let service = AuthService::new(pool);

        let err = service
            .authenticate_user("missing@example.com", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let pool = db::init_in_memory().await.unwrap();
        let service = AuthService::new(pool);

        service.create_user(new_user("c@example.com")).await.unwrap();
        let err = service
            .authenticate_user("c@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidPassword));
    }
}
