use arangors::client::reqwest::ReqwestClient;
use arangors::{ClientError, Database};
use thiserror::Error;

pub const USER_COLLECTION: &str = "user";
pub const TOURNAMENT_COLLECTION: &str = "tournament";
pub const REGISTRATION_COLLECTION: &str = "tournament_registration";

/// ArangoDB "unique constraint violated"
const ERROR_ARANGO_UNIQUE_CONSTRAINT_VIOLATED: u16 = 1210;

#[derive(Debug, Error, PartialEq)]
pub enum RepositoryError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<ClientError> for RepositoryError {
    fn from(err: ClientError) -> Self {
        match &err {
            ClientError::Arango(arango) if arango.error_num() == ERROR_ARANGO_UNIQUE_CONSTRAINT_VIOLATED => {
                RepositoryError::UniqueViolation(arango.message().to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

/// Accepts either a bare key ("123") or a full id ("tournament/123")
pub fn document_id(collection: &str, raw: &str) -> String {
    if raw.contains('/') {
        raw.to_string()
    } else {
        format!("{}/{}", collection, raw)
    }
}

/// The key part of a full document id
pub fn document_key(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Creates any missing collection. Indexes (including the unique ones the
/// registration workflow relies on) are owned by the migrations tool.
pub async fn ensure_collections(db: &Database<ReqwestClient>) -> Result<(), RepositoryError> {
    let existing = db.accessible_collections().await?;
    for name in [USER_COLLECTION, TOURNAMENT_COLLECTION, REGISTRATION_COLLECTION] {
        if existing.iter().any(|c| c.name == name) {
            continue;
        }
        log::warn!("Collection '{}' missing, creating it (run migrations for indexes)", name);
        db.create_collection(name).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_document_id_normalization() {
        assert_eq!(document_id("tournament", "123"), "tournament/123");
        assert_eq!(document_id("tournament", "tournament/123"), "tournament/123");
    }

    #[test]
    fn test_document_key() {
        assert_eq!(document_key("user/abc"), "abc");
        assert_eq!(document_key("abc"), "abc");
    }

    #[test]
    fn test_non_arango_errors_are_database_errors() {
        let err: RepositoryError = ClientError::InvalidServer("nope".to_string()).into();
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}
