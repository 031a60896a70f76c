use std::fmt;

use crate::db::RepositoryError;
use crate::error::ApiError;

#[derive(Debug, PartialEq)]
pub enum RegistrationError {
    TournamentNotFound,
    UserNotFound,
    RegistrationNotFound,
    AlreadyRegistered,
    ParticipantLimitReached,
    InvalidStatus(String),
    Database(String),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::TournamentNotFound => write!(f, "Tournament not found"),
            RegistrationError::UserNotFound => write!(f, "User not found"),
            RegistrationError::RegistrationNotFound => write!(f, "Registration not found"),
            RegistrationError::AlreadyRegistered => {
                write!(f, "User is already registered for this tournament")
            }
            RegistrationError::ParticipantLimitReached => {
                write!(f, "Tournament has reached its participant limit")
            }
            RegistrationError::InvalidStatus(msg) => write!(f, "{}", msg),
            RegistrationError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl From<RepositoryError> for RegistrationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation(_) => RegistrationError::AlreadyRegistered,
            RepositoryError::Database(msg) => RegistrationError::Database(msg),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        let message = err.to_string();
        match err {
            RegistrationError::TournamentNotFound
            | RegistrationError::UserNotFound
            | RegistrationError::RegistrationNotFound => ApiError::not_found(&message),
            RegistrationError::AlreadyRegistered | RegistrationError::ParticipantLimitReached => {
                ApiError::conflict(&message)
            }
            RegistrationError::InvalidStatus(_) => ApiError::validation_error(&message),
            RegistrationError::Database(msg) => {
                log::error!("Registration storage failure: {}", msg);
                ApiError::database_error("Failed to access registrations")
            }
        }
    }
}
