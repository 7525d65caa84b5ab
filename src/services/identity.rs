use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Identity;

/// Errors that can occur while establishing who the caller is
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Email address is not verified")]
    EmailNotVerified,

    #[error("University email required (@{0})")]
    WrongDomain(String),
}

/// Claims carried by the identity provider's session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    pub exp: usize,
}

/// Turn a bare campus login ("ps3358") into a university email
///
/// Input is trimmed and lowercased; anything already containing `@` is kept.
pub fn to_university_email(input: &str, domain: &str) -> String {
    let value = input.trim().to_lowercase();
    if value.is_empty() || value.contains('@') {
        return value;
    }
    format!("{}@{}", value, domain)
}

pub fn assert_university_email(email: &str, domain: &str) -> Result<(), AuthError> {
    let suffix = format!("@{}", domain.to_lowercase());
    if email.to_lowercase().ends_with(&suffix) {
        Ok(())
    } else {
        Err(AuthError::WrongDomain(domain.to_string()))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies session tokens issued by the identity provider
pub struct IdentityVerifier {
    key: DecodingKey,
    validation: Validation,
    university_domain: String,
    require_verified_email: bool,
}

impl IdentityVerifier {
    pub fn new(secret: &str, university_domain: &str, require_verified_email: bool) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            university_domain: university_domain.to_string(),
            require_verified_email,
        }
    }

    pub fn university_domain(&self) -> &str {
        &self.university_domain
    }

    /// Validate a token and return the identity it names
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        let claims = data.claims;

        assert_university_email(&claims.email, &self.university_domain)?;

        if self.require_verified_email && !claims.email_verified {
            return Err(AuthError::EmailNotVerified);
        }

        Ok(Identity {
            uid: claims.sub,
            email: claims.email.to_lowercase(),
            email_verified: claims.email_verified,
        })
    }

    /// The identity behind an `Authorization` header
    pub fn current_identity(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}
