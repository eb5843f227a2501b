//! Failures surfaced by [`Engine`](crate::Engine) operations.
//!
//! Lookups scoped to a user report a foreign row exactly like a missing one,
//! as [`EngineError::KeyNotFound`].

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid user token")]
    Unauthorized,
    #[error("{0}")]
    KeyNotFound(String),
    #[error("{0} already exists")]
    ExistingKey(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
    #[error("Invalid password: {0}")]
    InvalidPassword(String),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    InUse(String),
    #[error(transparent)]
    PasswordHash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidEmail(a), Self::InvalidEmail(b)) => a == b,
            (Self::InvalidPassword(a), Self::InvalidPassword(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a.to_string() == b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
