//! Admin authentication: shared-secret check and signed session tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Subject carried by every admin session.
pub const ADMIN_SUBJECT: &str = "admin";

const ACCESS_TOKEN: &str = "access";

/// JWT claims of an admin session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub session_id: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Issued on successful login.
#[derive(Debug, Serialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign a new session token valid for `expiry_secs`.
pub fn issue_session(jwt_secret: &str, expiry_secs: i64) -> Result<SessionToken, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: ADMIN_SUBJECT.to_string(),
        session_id: Uuid::new_v4().to_string(),
        token_type: ACCESS_TOKEN.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let access_token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(SessionToken {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: expiry_secs,
    })
}

/// Validate a session token and return its claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());

    let claims = jsonwebtoken::decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)?;

    if claims.token_type != ACCESS_TOKEN || claims.sub != ADMIN_SUBJECT {
        return Err(AppError::Unauthorized);
    }
    Ok(claims)
}

/// Check the shared admin secret and open a session.
pub fn login(config: &AppConfig, password: &str) -> Result<SessionToken, AppError> {
    if password.is_empty() || !verify_password(password, &config.admin_password_hash)? {
        tracing::warn!("Rejected admin login");
        return Err(AppError::Unauthorized);
    }

    let session = issue_session(&config.jwt_secret, config.admin_session_expiry_secs)?;
    tracing::info!(expires_in = session.expires_in, "Admin session opened");
    Ok(session)
}
