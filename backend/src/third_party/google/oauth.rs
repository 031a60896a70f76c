use anyhow::Result;
use serde::Deserialize;
use shared::dto::auth::GoogleProfile;
use url::Url;

use crate::third_party::IdentityProvider;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl UserInfo {
    fn into_profile(self) -> Result<GoogleProfile> {
        let email = self
            .email
            .ok_or_else(|| anyhow::anyhow!("Google account {} has no email address", self.sub))?;
        Ok(GoogleProfile {
            google_id: self.sub,
            email,
            name: self.name,
            picture: self.picture,
        })
    }
}

#[derive(Clone)]
pub struct GoogleOAuthService {
    client_id: String,
    client_secret: String,
    callback_url: String,
    client: reqwest::Client,
}

impl GoogleOAuthService {
    pub fn new(client_id: String, client_secret: String, callback_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            callback_url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for GoogleOAuthService {
    fn authorization_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", "email profile"),
                ("state", state),
            ],
        )?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<GoogleProfile> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self.client.post(TOKEN_URL).form(&params).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Google token exchange failed ({}): {}", status, text));
        }
        let token: TokenResponse = response.json().await?;

        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Google userinfo request failed: {}", response.status()));
        }

        let info: UserInfo = response.json().await?;
        log::debug!("Google userinfo received for subject {}", info.sub);
        info.into_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_authorization_url_carries_scope_and_callback() {
        let service = GoogleOAuthService::new(
            "client-123".to_string(),
            "secret".to_string(),
            "http://localhost:8080/auth/google/callback".to_string(),
        );
        let url = Url::parse(&service.authorization_url("xyz").unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));

        let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query["client_id"], "client-123");
        assert_eq!(query["scope"], "email profile");
        assert_eq!(query["response_type"], "code");
        assert_eq!(query["redirect_uri"], "http://localhost:8080/auth/google/callback");
        assert_eq!(query["state"], "xyz");
    }

    #[test]
    fn test_userinfo_maps_to_profile() {
        let info: UserInfo = serde_json::from_str(
            r#"{"sub":"1234","email":"g@example.com","name":"G","picture":"https://img/p.png"}"#,
        )
        .unwrap();
        let profile = info.into_profile().unwrap();
        assert_eq!(profile.google_id, "1234");
        assert_eq!(profile.email, "g@example.com");
        assert_eq!(profile.picture.as_deref(), Some("https://img/p.png"));
    }

    #[test]
    fn test_userinfo_without_email_is_rejected() {
        let info: UserInfo = serde_json::from_str(r#"{"sub":"1234"}"#).unwrap();
        assert!(info.into_profile().is_err());
    }
}
