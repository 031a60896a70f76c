use std::fmt;

use shared::SharedError;

use crate::db::RepositoryError;
use crate::error::ApiError;

#[derive(Debug, PartialEq)]
pub enum TournamentError {
    NotFound,
    Validation(String),
    Database(String),
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentError::NotFound => write!(f, "Tournament not found"),
            TournamentError::Validation(msg) => write!(f, "{}", msg),
            TournamentError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl From<RepositoryError> for TournamentError {
    fn from(err: RepositoryError) -> Self {
        TournamentError::Database(err.to_string())
    }
}

impl From<SharedError> for TournamentError {
    fn from(err: SharedError) -> Self {
        TournamentError::Validation(err.to_string())
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        match &err {
            TournamentError::NotFound => ApiError::not_found(&err.to_string()),
            TournamentError::Validation(msg) => ApiError::validation_error(msg),
            TournamentError::Database(msg) => {
                log::error!("Tournament storage failure: {}", msg);
                ApiError::database_error("Failed to access tournaments")
            }
        }
    }
}
