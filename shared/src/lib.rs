pub mod models {
    pub mod user;
    pub mod tournament;
    pub mod registration;
}

pub mod dto {
    pub mod auth;
    pub mod common;
    pub mod profile;
    pub mod tournament;
    pub mod registration;
}

pub mod error;

// Re-export commonly used items
pub use error::{SharedError, Result};

// Re-export models
pub use models::{
    user::{User, AuthProvider, DocumentType},
    tournament::Tournament,
    registration::{Registration, RegistrationStatus},
};

// Re-export DTOs
pub use dto::{
    auth::{SignupRequest, LoginRequest, TokenResponse, GoogleAuthResponse, GoogleProfile},
    common::MessageResponse,
    profile::{UserDto, UpdateProfileRequest, RequestPhoneVerificationRequest, VerifyPhoneRequest},
    tournament::{CreateTournamentRequest, TournamentDto},
    registration::{
        RegisterRequest, UpdateStatusRequest, RegistrationDto, UserTournamentDto, ParticipantDto,
    },
};
