use std::sync::Arc;

use shared::dto::profile::{RequestPhoneVerificationRequest, UpdateProfileRequest, VerifyPhoneRequest};
use shared::models::user::User;
use validator::Validate;

use crate::profile::error::ProfileError;
use crate::profile::otp::{generate_otp, OtpStore};
use crate::profile::upload::{validate_upload, UploadKind, UploadedFile};
use crate::third_party::{MediaStorage, SmsSender};
use crate::user::repository::UserRepository;

#[async_trait::async_trait]
pub trait ProfileUseCase: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<User, ProfileError>;
    async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> Result<User, ProfileError>;
    async fn upload_media(&self, user_id: &str, kind: UploadKind, file: UploadedFile) -> Result<User, ProfileError>;
    async fn request_phone_verification(
        &self,
        user_id: &str,
        request: RequestPhoneVerificationRequest,
    ) -> Result<(), ProfileError>;
    async fn verify_phone(&self, user_id: &str, request: VerifyPhoneRequest) -> Result<User, ProfileError>;
    async fn delete_profile(&self, user_id: &str) -> Result<(), ProfileError>;
}

pub struct ProfileUseCaseImpl<R: UserRepository> {
    pub users: R,
    pub media: Arc<dyn MediaStorage>,
    pub otp: Arc<dyn OtpStore>,
    pub sms: Arc<dyn SmsSender>,
}

fn validation(err: validator::ValidationErrors) -> ProfileError {
    ProfileError::Validation(format!("Validation error: {}", err))
}

impl<R: UserRepository> ProfileUseCaseImpl<R> {
    async fn load(&self, user_id: &str) -> Result<User, ProfileError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ProfileError::UserNotFound)
    }

    async fn save(&self, mut user: User) -> Result<User, ProfileError> {
        user.touch();
        Ok(self.users.update(user).await?)
    }

    /// Post-delete hook: removes every media object the account referenced
    async fn cleanup_media(&self, user: &User) {
        for public_id in user.media_public_ids() {
            if let Err(e) = self.media.destroy(&public_id).await {
                log::warn!("Failed to delete media {} of removed user {}: {}", public_id, user.id, e);
            }
        }
    }
}

fn media_slot(user: &mut User, kind: UploadKind) -> (&mut Option<String>, &mut Option<String>) {
    match kind {
        UploadKind::ProfilePicture => (&mut user.profile_picture, &mut user.profile_picture_public_id),
        UploadKind::Portfolio => (&mut user.portfolio, &mut user.portfolio_public_id),
        UploadKind::DocumentFront => (&mut user.document_front_image, &mut user.document_front_image_public_id),
        UploadKind::DocumentBack => (&mut user.document_back_image, &mut user.document_back_image_public_id),
    }
}

#[async_trait::async_trait]
impl<R: UserRepository> ProfileUseCase for ProfileUseCaseImpl<R> {
    async fn get_profile(&self, user_id: &str) -> Result<User, ProfileError> {
        self.load(user_id).await
    }

    async fn update_profile(&self, user_id: &str, request: UpdateProfileRequest) -> Result<User, ProfileError> {
        request.validate().map_err(validation)?;
        let mut user = self.load(user_id).await?;
        request.apply_to(&mut user);
        self.save(user).await
    }

    async fn upload_media(&self, user_id: &str, kind: UploadKind, file: UploadedFile) -> Result<User, ProfileError> {
        validate_upload(kind, &file)?;
        let mut user = self.load(user_id).await?;

        let uploaded = self
            .media
            .upload(file.bytes, &file.file_name, kind.folder())
            .await
            .map_err(|e| ProfileError::MediaStorage(e.to_string()))?;

        let (url, public_id) = media_slot(&mut user, kind);
        *url = Some(uploaded.url);
        let replaced = public_id.replace(uploaded.public_id);
        let user = self.save(user).await?;

        if let Some(old) = replaced {
            if let Err(e) = self.media.destroy(&old).await {
                log::warn!("Could not delete replaced media {}: {}", old, e);
            }
        }
        Ok(user)
    }

    async fn request_phone_verification(
        &self,
        user_id: &str,
        request: RequestPhoneVerificationRequest,
    ) -> Result<(), ProfileError> {
        request.validate().map_err(validation)?;
        let mut user = self.load(user_id).await?;

        let phone = request.phone_number;
        user.phone_number = Some(phone.clone());
        user.phone_verified = false;
        self.save(user).await?;

        let code = generate_otp();
        self.otp.put(&phone, &code).await.map_err(ProfileError::OtpStore)?;

        if let Err(e) = self.sms.send_otp(&phone, &code).await {
            if let Err(cleanup) = self.otp.remove(&phone).await {
                log::warn!("Could not discard undelivered OTP: {}", cleanup);
            }
            return Err(ProfileError::Sms(e.to_string()));
        }
        Ok(())
    }

    async fn verify_phone(&self, user_id: &str, request: VerifyPhoneRequest) -> Result<User, ProfileError> {
        request.validate().map_err(validation)?;
        let mut user = self.load(user_id).await?;

        let expired = || ProfileError::BadRequest("OTP expired or not found".to_string());
        let phone = user.phone_number.clone().ok_or_else(expired)?;
        let stored = self
            .otp
            .get(&phone)
            .await
            .map_err(ProfileError::OtpStore)?
            .ok_or_else(expired)?;

        if stored != request.otp {
            return Err(ProfileError::BadRequest("Invalid OTP".to_string()));
        }

        user.phone_verified = true;
        let user = self.save(user).await?;
        if let Err(e) = self.otp.remove(&phone).await {
            log::warn!("Could not delete used OTP: {}", e);
        }
        Ok(user)
    }

    async fn delete_profile(&self, user_id: &str) -> Result<(), ProfileError> {
        let user = self.load(user_id).await?;
        if !self.users.delete(&user.id).await? {
            return Err(ProfileError::UserNotFound);
        }
        log::info!("Deleted user {}", user.id);
        self.cleanup_media(&user).await;
        Ok(())
    }
}
