use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::user::{AuthProvider, DocumentType, User};

lazy_static! {
    /// International format: "+", 1-4 digit country code, 10 digit subscriber number
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+\d{1,4}\d{10}$").unwrap();
    pub static ref OTP_REGEX: Regex = Regex::new(r"^\d{6}$").unwrap();
}

/// Account view returned by profile and participant endpoints.
///
/// Carries no password hash and no media host public ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub provider: AuthProvider,
    #[serde(rename = "googleId", skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(rename = "profilePicture", skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(rename = "phoneNumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(rename = "phoneVerified")]
    pub phone_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "documentType", skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    #[serde(rename = "documentFrontImage", skip_serializing_if = "Option::is_none")]
    pub document_front_image: Option<String>,
    #[serde(rename = "documentBackImage", skip_serializing_if = "Option::is_none")]
    pub document_back_image: Option<String>,
    #[serde(rename = "identityVerified")]
    pub identity_verified: bool,
    pub tokens: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<FixedOffset>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            provider: user.provider,
            google_id: user.google_id.clone(),
            profile_picture: user.profile_picture.clone(),
            phone_number: user.phone_number.clone(),
            phone_verified: user.phone_verified,
            portfolio: user.portfolio.clone(),
            country: user.country.clone(),
            document_type: user.document_type,
            document_front_image: user.document_front_image.clone(),
            document_back_image: user.document_back_image.clone(),
            identity_verified: user.identity_verified,
            tokens: user.tokens,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Partial profile update; only provided fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: Option<String>,

    #[serde(rename = "phoneNumber")]
    #[validate(regex(path = "PHONE_REGEX", message = "Phone number must be in international format, e.g. +919876543210"))]
    pub phone_number: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,

    #[serde(rename = "documentType")]
    pub document_type: Option<DocumentType>,
}

impl UpdateProfileRequest {
    /// Copies every provided field onto `user`
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = Some(name.clone());
        }
        if let Some(username) = &self.username {
            user.username = Some(username.clone());
        }
        if let Some(phone) = &self.phone_number {
            if user.phone_number.as_deref() != Some(phone.as_str()) {
                user.phone_verified = false;
            }
            user.phone_number = Some(phone.clone());
        }
        if let Some(country) = &self.country {
            user.country = Some(country.clone());
        }
        if let Some(document_type) = self.document_type {
            user.document_type = Some(document_type);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct RequestPhoneVerificationRequest {
    #[serde(rename = "phoneNumber")]
    #[validate(regex(path = "PHONE_REGEX", message = "Phone number must be in international format, e.g. +919876543210"))]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct VerifyPhoneRequest {
    #[validate(regex(path = "OTP_REGEX", message = "OTP must be 6 digits"))]
    pub otp: String,
}
