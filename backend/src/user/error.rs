use std::fmt;

use crate::db::RepositoryError;
use crate::error::ApiError;

#[derive(Debug, PartialEq)]
pub enum UserError {
    AlreadyExists,
    InvalidCredentials,
    NotFound,
    Validation(String),
    /// Google sign-in is unavailable or the provider rejected the exchange
    IdentityProvider(String),
    Internal(String),
    Database(String),
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::AlreadyExists => write!(f, "User already exists"),
            UserError::InvalidCredentials => write!(f, "Invalid credentials"),
            UserError::NotFound => write!(f, "User not found"),
            UserError::Validation(msg) => write!(f, "{}", msg),
            UserError::IdentityProvider(msg) => write!(f, "Google sign-in failed: {}", msg),
            UserError::Internal(msg) => write!(f, "Internal error: {}", msg),
            UserError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation(_) => UserError::AlreadyExists,
            RepositoryError::Database(msg) => UserError::Database(msg),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::AlreadyExists => ApiError::conflict(&message),
            UserError::InvalidCredentials => ApiError::unauthorized(&message),
            UserError::NotFound => ApiError::not_found(&message),
            UserError::Validation(msg) => ApiError::validation_error(&msg),
            UserError::IdentityProvider(_) => ApiError::bad_gateway(&message),
            UserError::Internal(msg) => {
                log::error!("Account operation failed: {}", msg);
                ApiError::internal_error("Internal server error")
            }
            UserError::Database(msg) => {
                log::error!("User storage failure: {}", msg);
                ApiError::database_error("Failed to access users")
            }
        }
    }
}
