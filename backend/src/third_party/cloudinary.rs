use anyhow::Result;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::third_party::{MediaStorage, UploadedMedia};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

#[derive(Clone)]
pub struct CloudinaryService {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

impl CloudinaryService {
    pub fn new(cloud_name: String, api_key: String, api_secret: String) -> Self {
        Self {
            cloud_name,
            api_key,
            api_secret,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!("{}/{}/{}/{}", API_BASE, self.cloud_name, resource_type, action)
    }

    /// SHA-256 over the `k=v` pairs sorted by key, joined with `&`, then the secret
    fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn error_text(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => format!("{} ({})", body.error.message, status),
            Err(_) => status.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MediaStorage for CloudinaryService {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str, folder: &str) -> Result<UploadedMedia> {
        let timestamp = Utc::now().timestamp().to_string();
        let signed = [("folder", folder.to_string()), ("timestamp", timestamp.clone())];
        let signature = self.sign(&signed);

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string()),
            )
            .text("api_key", self.api_key.clone())
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        log::info!("Uploading '{}' to Cloudinary folder '{}'", file_name, folder);
        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Cloudinary upload failed: {}",
                Self::error_text(response).await
            ));
        }

        let body: UploadResponse = response.json().await?;
        Ok(UploadedMedia {
            url: body.secure_url,
            public_id: body.public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let signed = [("public_id", public_id.to_string()), ("timestamp", timestamp.clone())];
        let signature = self.sign(&signed);

        let params = [
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp),
            ("api_key", self.api_key.clone()),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let response = self
            .client
            .post(self.endpoint("image", "destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Cloudinary destroy failed: {}",
                Self::error_text(response).await
            ));
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                log::warn!("Cloudinary object {} was already gone", public_id);
                Ok(())
            }
            other => Err(anyhow::anyhow!("Cloudinary destroy returned '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn service() -> CloudinaryService {
        CloudinaryService::new("demo".to_string(), "key".to_string(), "secret".to_string())
    }

    #[test]
    fn test_endpoint_format() {
        assert_eq!(
            service().endpoint("image", "destroy"),
            "https://api.cloudinary.com/v1_1/demo/image/destroy"
        );
    }

    #[test]
    fn test_signature_is_order_independent() {
        let svc = service();
        let a = svc.sign(&[("timestamp", "1".to_string()), ("folder", "x".to_string())]);
        let b = svc.sign(&[("folder", "x".to_string()), ("timestamp", "1".to_string())]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_matches_manual_digest() {
        let expected = hex::encode(Sha256::digest(b"folder=documents&timestamp=1700000000secret"));
        let actual = service().sign(&[
            ("timestamp", "1700000000".to_string()),
            ("folder", "documents".to_string()),
        ]);
        assert_eq!(actual, expected);
    }
}
