use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::profile::error::ProfileError;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const PORTFOLIO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ProfilePicture,
    Portfolio,
    DocumentFront,
    DocumentBack,
}

impl UploadKind {
    /// `front` or `back` from `/profile/document/{side}`
    pub fn document_side(side: &str) -> Result<Self, ProfileError> {
        match side {
            "front" => Ok(UploadKind::DocumentFront),
            "back" => Ok(UploadKind::DocumentBack),
            other => Err(ProfileError::BadRequest(format!(
                "Document side must be 'front' or 'back' (got '{}')",
                other
            ))),
        }
    }

    pub fn folder(&self) -> &'static str {
        match self {
            UploadKind::ProfilePicture => "profile-pictures",
            UploadKind::Portfolio => "portfolios",
            UploadKind::DocumentFront | UploadKind::DocumentBack => "documents",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Portfolio => PORTFOLIO_EXTENSIONS,
            _ => IMAGE_EXTENSIONS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

pub fn validate_upload(kind: UploadKind, file: &UploadedFile) -> Result<(), ProfileError> {
    if file.bytes.is_empty() {
        return Err(ProfileError::BadRequest("Uploaded file is empty".to_string()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ProfileError::FileTooLarge);
    }
    let allowed = kind.allowed_extensions();
    match extension(&file.file_name) {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(ProfileError::UnsupportedFileType(allowed.join(", "))),
    }
}

/// Reads the multipart field named `file`, stopping once it passes the size limit
pub async fn read_file_field(mut payload: Multipart) -> Result<UploadedFile, ProfileError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ProfileError::BadRequest(format!("Malformed upload: {}", e)))?;

        let disposition = field.content_disposition();
        if disposition.get_name() != Some("file") {
            continue;
        }
        let file_name = disposition.get_filename().unwrap_or_default().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ProfileError::BadRequest(format!("Malformed upload: {}", e)))?;
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(ProfileError::FileTooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }
        return Ok(UploadedFile { file_name, bytes });
    }
    Err(ProfileError::BadRequest("No file uploaded".to_string()))
}
