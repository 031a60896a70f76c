use serde::{Deserialize, Serialize};
use chrono::{DateTime, FixedOffset, Utc};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use std::str::FromStr;
use crate::error::SharedError;

/// How the account was created
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Local,
    Google,
}

impl Default for AuthProvider {
    fn default() -> Self {
        AuthProvider::Local
    }
}

/// Identity document kinds accepted for verification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Passport,
    Dl,
    National,
}

impl FromStr for DocumentType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passport" => Ok(DocumentType::Passport),
            "dl" => Ok(DocumentType::Dl),
            "national" => Ok(DocumentType::National),
            other => Err(SharedError::Validation(format!(
                "documentType must be one of passport, dl, national (got '{}')",
                other
            ))),
        }
    }
}

/// A platform account as stored in the `user` collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// ArangoDB document ID (format: "user/{key}")
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,

    #[serde(rename = "googleId", default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Argon2 PHC string; absent for Google-only accounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default)]
    pub provider: AuthProvider,

    #[serde(rename = "profilePicture", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,

    #[serde(rename = "profilePicturePublicId", default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_public_id: Option<String>,

    #[serde(rename = "phoneNumber", default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(rename = "phoneVerified", default)]
    pub phone_verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,

    #[serde(rename = "portfolioPublicId", default, skip_serializing_if = "Option::is_none")]
    pub portfolio_public_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(rename = "documentType", default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,

    #[serde(rename = "documentFrontImage", default, skip_serializing_if = "Option::is_none")]
    pub document_front_image: Option<String>,

    #[serde(rename = "documentFrontImagePublicId", default, skip_serializing_if = "Option::is_none")]
    pub document_front_image_public_id: Option<String>,

    #[serde(rename = "documentBackImage", default, skip_serializing_if = "Option::is_none")]
    pub document_back_image: Option<String>,

    #[serde(rename = "documentBackImagePublicId", default, skip_serializing_if = "Option::is_none")]
    pub document_back_image_public_id: Option<String>,

    #[serde(rename = "identityVerified", default)]
    pub identity_verified: bool,

    #[serde(default)]
    pub tokens: i64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<FixedOffset>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<FixedOffset>,
}

impl User {
    fn blank(email: String, provider: AuthProvider) -> Self {
        let now = Utc::now().fixed_offset();
        Self {
            id: String::new(),
            rev: String::new(),
            google_id: None,
            email,
            name: None,
            username: None,
            password: None,
            provider,
            profile_picture: None,
            profile_picture_public_id: None,
            phone_number: None,
            phone_verified: false,
            portfolio: None,
            portfolio_public_id: None,
            country: None,
            document_type: None,
            document_front_image: None,
            document_front_image_public_id: None,
            document_back_image: None,
            document_back_image_public_id: None,
            identity_verified: false,
            tokens: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// New local account; `password_hash` must already be an argon2 PHC string
    pub fn new_local(email: String, password_hash: String) -> Self {
        let mut user = Self::blank(email, AuthProvider::Local);
        user.password = Some(password_hash);
        user
    }

    pub fn new_google(
        google_id: String,
        email: String,
        name: Option<String>,
        profile_picture: Option<String>,
    ) -> Self {
        let mut user = Self::blank(email, AuthProvider::Google);
        user.google_id = Some(google_id);
        user.name = name;
        user.profile_picture = profile_picture;
        user
    }

    /// False for accounts without a local password
    pub fn verify_password(&self, password: &str) -> bool {
        let Some(stored) = self.password.as_deref() else {
            return false;
        };
        if let Ok(parsed_hash) = PasswordHash::new(stored) {
            Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok()
        } else {
            false
        }
    }

    /// Every media object this account references on the media host
    pub fn media_public_ids(&self) -> Vec<String> {
        [
            &self.profile_picture_public_id,
            &self.portfolio_public_id,
            &self.document_front_image_public_id,
            &self.document_back_image_public_id,
        ]
        .into_iter()
        .filter_map(|id| id.clone())
        .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().fixed_offset();
    }
}
