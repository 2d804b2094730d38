//! Authenticated principals and token verification.
//!
//! Tokens are HS256 JWTs minted by the identity provider with the shared
//! secret. The backend trusts a verified token without re-reading the user
//! record.

use crate::errors::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried by every principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Platform operator, bypasses ownership checks
    Admin,
    /// Regular buyer/seller account
    User,
}

impl Role {
    /// Wire form, `"ADMIN"` or `"USER"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(Error::validation(format!(
                "user_type must be ADMIN or USER, got {other:?}"
            ))),
        }
    }
}

/// The acting identity of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Stable user id
    pub user_id: String,
    pub role: Role,
}

impl Principal {
    /// A caller identified by `user_id` acting with `role`.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Whether the caller holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// JWT claims exchanged with the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the stable user id
    pub sub: String,
    pub role: Role,
    pub username: String,
    /// Expiration (UTC seconds)
    pub exp: usize,
    /// Issued at (UTC seconds)
    pub iat: usize,
}

/// Mints a token for the given user. Used by the identity provider and tests.
///
/// # Errors
/// Returns an error if the token cannot be encoded.
pub fn issue_token(
    secret: &str,
    user_id: &str,
    username: &str,
    role: Role,
    ttl: Duration,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        username: username.to_string(),
        exp: usize::try_from((now + ttl).timestamp())?,
        iat: usize::try_from(now.timestamp())?,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(Into::into)
}

/// Verifies a token and returns the principal it names.
///
/// # Errors
/// Returns [`Error::Token`] when the signature, expiry or claim shape is invalid.
pub fn verify_token(secret: &str, token: &str) -> Result<Principal> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    let claims = token_data.claims;

    if claims.sub.is_empty() {
        return Err(Error::Unauthorized {
            message: "token has an empty subject".to_string(),
        });
    }

    Ok(Principal::new(claims.sub, claims.role))
}
