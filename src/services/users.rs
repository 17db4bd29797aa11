//! Authentication and user management service

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, NewUser, RegisterRequest, User, UserClaims},
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserStore>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    /// Register a new account and return a login token along with it
    pub async fn register(&self, payload: RegisterRequest) -> AppResult<(String, User)> {
        payload.validate()?;

        if self.users.email_exists(&payload.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password = self.hash_password(&payload.password)?;
        let user = self
            .users
            .create(&NewUser {
                email: payload.email,
                password,
            })
            .await?;

        tracing::info!("User {} registered", user.id);
        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Authenticate by email and password and return a token.
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, payload: LoginRequest) -> AppResult<(String, User)> {
        let user = self
            .users
            .get_by_email(&payload.email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, &payload.password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
