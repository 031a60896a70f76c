pub mod cloudinary;
pub mod fast2sms;
pub mod google {
    pub mod oauth;
}

use anyhow::Result;
use shared::dto::auth::GoogleProfile;

// Re-export commonly used services for convenience
pub use cloudinary::CloudinaryService;
pub use fast2sms::Fast2SmsService;
pub use google::oauth::GoogleOAuthService;

/// A stored media object: public URL plus the host's handle for later deletion
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

#[async_trait::async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, folder: &str) -> Result<UploadedMedia>;
    async fn destroy(&self, public_id: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_otp(&self, phone_number: &str, otp: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent screen URL the browser is redirected to
    fn authorization_url(&self, state: &str) -> Result<String>;
    /// Trades an authorization code for the signed-in account's profile
    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile>;
}

/// Stand-in used when an integration is not configured; every call fails.
pub struct Unconfigured(pub &'static str);

#[async_trait::async_trait]
impl MediaStorage for Unconfigured {
    async fn upload(&self, _bytes: Vec<u8>, _file_name: &str, _folder: &str) -> Result<UploadedMedia> {
        Err(anyhow::anyhow!("{} is not configured", self.0))
    }

    async fn destroy(&self, _public_id: &str) -> Result<()> {
        Err(anyhow::anyhow!("{} is not configured", self.0))
    }
}

#[async_trait::async_trait]
impl SmsSender for Unconfigured {
    async fn send_otp(&self, _phone_number: &str, _otp: &str) -> Result<()> {
        Err(anyhow::anyhow!("{} is not configured", self.0))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for Unconfigured {
    fn authorization_url(&self, _state: &str) -> Result<String> {
        Err(anyhow::anyhow!("{} is not configured", self.0))
    }

    async fn exchange_code(&self, _code: &str) -> Result<GoogleProfile> {
        Err(anyhow::anyhow!("{} is not configured", self.0))
    }
}
