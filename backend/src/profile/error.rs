use std::fmt;

use crate::db::RepositoryError;
use crate::error::ApiError;

#[derive(Debug, PartialEq)]
pub enum ProfileError {
    UserNotFound,
    Validation(String),
    BadRequest(String),
    FileTooLarge,
    UnsupportedFileType(String),
    MediaStorage(String),
    Sms(String),
    OtpStore(String),
    Database(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::UserNotFound => write!(f, "User not found"),
            ProfileError::Validation(msg) => write!(f, "{}", msg),
            ProfileError::BadRequest(msg) => write!(f, "{}", msg),
            ProfileError::FileTooLarge => write!(f, "File exceeds the 5 MB limit"),
            ProfileError::UnsupportedFileType(allowed) => {
                write!(f, "Unsupported file type; allowed: {}", allowed)
            }
            ProfileError::MediaStorage(msg) => write!(f, "Media upload failed: {}", msg),
            ProfileError::Sms(msg) => write!(f, "Failed to send verification code: {}", msg),
            ProfileError::OtpStore(msg) => write!(f, "OTP store error: {}", msg),
            ProfileError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl From<RepositoryError> for ProfileError {
    fn from(err: RepositoryError) -> Self {
        ProfileError::Database(err.to_string())
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        let message = err.to_string();
        match err {
            ProfileError::UserNotFound => ApiError::not_found(&message),
            ProfileError::Validation(_) | ProfileError::FileTooLarge | ProfileError::UnsupportedFileType(_) => {
                ApiError::validation_error(&message)
            }
            ProfileError::BadRequest(_) => ApiError::bad_request(&message),
            ProfileError::MediaStorage(_) | ProfileError::Sms(_) => {
                log::error!("{}", message);
                ApiError::bad_gateway(&message)
            }
            ProfileError::OtpStore(msg) => {
                log::error!("OTP store failure: {}", msg);
                ApiError::internal_error("Verification codes are temporarily unavailable")
            }
            ProfileError::Database(msg) => {
                log::error!("Profile storage failure: {}", msg);
                ApiError::database_error("Failed to access profile")
            }
        }
    }
}
