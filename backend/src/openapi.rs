use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ApiError;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
        crate::health::detailed_health_check,
        crate::user::controller::signup_handler,
        crate::user::controller::login_handler,
        crate::user::controller::google_redirect_handler,
        crate::user::controller::google_callback_handler,
        crate::profile::controller::get_profile_handler,
        crate::profile::controller::update_profile_handler,
        crate::profile::controller::delete_profile_handler,
        crate::profile::controller::upload_profile_picture_handler,
        crate::profile::controller::upload_portfolio_handler,
        crate::profile::controller::upload_document_handler,
        crate::profile::controller::request_phone_verification_handler,
        crate::profile::controller::verify_phone_handler,
        crate::tournament::controller::create_tournament_handler,
        crate::tournament::controller::list_tournaments_handler,
        crate::tournament::controller::get_tournament_handler,
        crate::registration::controller::register_handler,
        crate::registration::controller::my_tournaments_handler,
        crate::registration::controller::participants_handler,
        crate::registration::controller::update_status_handler,
    ),
    components(schemas(
        crate::health::HealthResponse,
        crate::health::DetailedHealthResponse,
        crate::health::ServicesHealth,
        crate::health::ServiceHealthStatus,
        ApiError,
        shared::dto::auth::SignupRequest,
        shared::dto::auth::LoginRequest,
        shared::dto::auth::TokenResponse,
        shared::dto::auth::GoogleAuthResponse,
        shared::dto::common::MessageResponse,
        shared::dto::profile::UserDto,
        shared::dto::profile::UpdateProfileRequest,
        shared::dto::profile::RequestPhoneVerificationRequest,
        shared::dto::profile::VerifyPhoneRequest,
        shared::dto::tournament::CreateTournamentRequest,
        shared::dto::tournament::TournamentDto,
        shared::dto::registration::RegisterRequest,
        shared::dto::registration::UpdateStatusRequest,
        shared::dto::registration::RegistrationDto,
        shared::dto::registration::UserTournamentDto,
        shared::dto::registration::ParticipantDto,
        shared::models::registration::RegistrationStatus,
        shared::models::user::AuthProvider,
        shared::models::user::DocumentType,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and dependency checks"),
        (name = "auth", description = "Local and Google sign-in"),
        (name = "profile", description = "The signed-in user's profile, media and phone verification"),
        (name = "tournaments", description = "Tournament registry"),
        (name = "registrations", description = "Tournament registrations"),
    ),
    info(
        title = "Arena Tournament API",
        description = "Tournament registry and registration service.\n\n## Authentication\n\nProtected endpoints take a JWT in the Authorization header:\n\n```\nAuthorization: Bearer <token>\n```\n\nTokens come from `/auth/signup`, `/auth/login` or `/auth/google/callback`.",
        version = "0.1.0",
    ),
    servers(
        (url = "http://localhost:3000", description = "Development server"),
    )
)]
pub struct ApiDoc;
