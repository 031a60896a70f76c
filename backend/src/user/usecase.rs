use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use shared::dto::auth::{GoogleAuthResponse, GoogleProfile, LoginRequest, SignupRequest};
use shared::models::user::User;
use validator::Validate;

use crate::auth::TokenService;
use crate::third_party::IdentityProvider;
use crate::user::error::UserError;
use crate::user::repository::UserRepository;

pub const NEW_USER_REDIRECT: &str = "/customize-profile";
pub const RETURNING_USER_REDIRECT: &str = "/userdash";

#[async_trait::async_trait]
pub trait AuthUseCase: Send + Sync {
    /// Returns a bearer token for the new account
    async fn signup(&self, request: SignupRequest) -> Result<String, UserError>;
    async fn login(&self, request: LoginRequest) -> Result<String, UserError>;
    /// Finds, links, or creates the account behind a Google profile; the flag is true for new users
    async fn validate_google_user(&self, profile: GoogleProfile) -> Result<(User, bool), UserError>;
    fn google_authorization_url(&self, state: &str) -> Result<String, UserError>;
    async fn google_sign_in(&self, code: &str) -> Result<GoogleAuthResponse, UserError>;
}

pub struct AuthUseCaseImpl<R: UserRepository> {
    pub users: R,
    pub identity: Arc<dyn IdentityProvider>,
    pub tokens: Arc<TokenService>,
}

fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Internal(format!("Failed to hash password: {}", e)))
}

impl<R: UserRepository> AuthUseCaseImpl<R> {
    fn issue(&self, user: &User) -> Result<String, UserError> {
        self.tokens.issue(user).map_err(|e| UserError::Internal(e.message))
    }
}

#[async_trait::async_trait]
impl<R: UserRepository> AuthUseCase for AuthUseCaseImpl<R> {
    async fn signup(&self, request: SignupRequest) -> Result<String, UserError> {
        request
            .validate()
            .map_err(|e| UserError::Validation(format!("Validation error: {}", e)))?;

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(UserError::AlreadyExists);
        }

        let mut user = User::new_local(email, hash_password(&request.password)?);
        user.name = request.name;
        // The unique email index maps a racing duplicate to AlreadyExists
        let created = self.users.create(user).await?;
        log::info!("New local account {}", created.id);
        self.issue(&created)
    }

    async fn login(&self, request: LoginRequest) -> Result<String, UserError> {
        let user = self
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.verify_password(&request.password) {
            log::info!("Failed login for {}", user.id);
            return Err(UserError::InvalidCredentials);
        }
        self.issue(&user)
    }

    async fn validate_google_user(&self, profile: GoogleProfile) -> Result<(User, bool), UserError> {
        if let Some(mut user) = self.users.find_by_google_id(&profile.google_id).await? {
            if profile.picture.is_some() && user.profile_picture != profile.picture {
                user.profile_picture = profile.picture;
                user.touch();
                user = self.users.update(user).await?;
            }
            return Ok((user, false));
        }

        if let Some(mut user) = self.users.find_by_email(&profile.email).await? {
            log::info!("Linking Google account to existing user {}", user.id);
            user.google_id = Some(profile.google_id);
            if user.name.is_none() {
                user.name = profile.name;
            }
            if profile.picture.is_some() {
                user.profile_picture = profile.picture;
            }
            user.touch();
            let user = self.users.update(user).await?;
            return Ok((user, false));
        }

        let user = User::new_google(
            profile.google_id,
            profile.email.to_lowercase(),
            profile.name,
            profile.picture,
        );
        let created = self.users.create(user).await?;
        log::info!("New Google account {}", created.id);
        Ok((created, true))
    }

    fn google_authorization_url(&self, state: &str) -> Result<String, UserError> {
        self.identity
            .authorization_url(state)
            .map_err(|e| UserError::IdentityProvider(e.to_string()))
    }

    async fn google_sign_in(&self, code: &str) -> Result<GoogleAuthResponse, UserError> {
        let profile = self
            .identity
            .exchange_code(code)
            .await
            .map_err(|e| UserError::IdentityProvider(e.to_string()))?;

        let (user, is_new) = self.validate_google_user(profile).await?;
        let redirect = if is_new { NEW_USER_REDIRECT } else { RETURNING_USER_REDIRECT };
        Ok(GoogleAuthResponse {
            token: self.issue(&user)?,
            redirect_url: redirect.to_string(),
        })
    }
}
