//! Unified error type for the escrow backend.
//!
//! Every layer returns [`Result`]; the HTTP layer turns an [`Error`] into a
//! status code and JSON body (see `api::response`).

use std::fmt;
use thiserror::Error;

/// Reference fields checked before a transaction is persisted.
///
/// The [`Display`](fmt::Display) form is the wire code returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    /// Seller username did not resolve
    User,
    /// Buyer username did not resolve
    Customer,
    /// Product id did not resolve
    Product,
    /// Shipping address id did not resolve
    Address,
    /// Payment id did not resolve
    Payment,
}

impl ReferenceField {
    /// Wire code for this reference, e.g. `"customer_error"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::User => "user_error",
            Self::Customer => "customer_error",
            Self::Product => "product_error",
            Self::Address => "address_error",
            Self::Payment => "payment_error",
        }
    }
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Unresolved reference: {field}")]
    Reference { field: ReferenceField },

    #[error("Authentication required: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("{field} is already in use")]
    Duplicate { field: &'static str },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Insufficient funds: balance {current:.2}, requested {required:.2}")]
    InsufficientFunds { current: f64, required: f64 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Forbidden`] with the given message.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
