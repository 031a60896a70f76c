use arangors::client::reqwest::ReqwestClient;
use arangors::document::options::{InsertOptions, UpdateOptions};
use arangors::Database;
use shared::models::user::User;

use crate::db::{document_key, RepositoryError, USER_COLLECTION};

#[derive(Clone)]
pub struct UserRepositoryImpl {
    pub db: Database<ReqwestClient>,
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<User>, RepositoryError>;
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
    async fn update(&self, user: User) -> Result<User, RepositoryError>;
    /// False when there was nothing to delete
    async fn delete(&self, id: &str) -> Result<bool, RepositoryError>;
}

impl UserRepositoryImpl {
    async fn find_one(&self, aql: &str, name: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query(aql)
            .bind_var(name, value)
            .build();
        let mut cursor: Vec<User> = self.db.aql_query(query).await?;
        Ok(cursor.pop())
    }
}

#[async_trait::async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("FOR u IN user FILTER u._id == @id LIMIT 1 RETURN u", "id", id)
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one(
            "FOR u IN user FILTER LOWER(u.email) == LOWER(@email) LIMIT 1 RETURN u",
            "email",
            email,
        )
        .await
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one(
            "FOR u IN user FILTER u.googleId == @google_id LIMIT 1 RETURN u",
            "google_id",
            google_id,
        )
        .await
    }

    async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<User>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = arangors::AqlQuery::builder()
            .query("FOR u IN user FILTER u._id IN @ids RETURN u")
            .bind_var("ids", ids)
            .build();
        Ok(self.db.aql_query(query).await?)
    }

    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let collection = self.db.collection(USER_COLLECTION).await?;

        let insert_options = InsertOptions::builder().return_new(true).build();
        let result = collection.create_document(user, insert_options).await?;

        result
            .new_doc()
            .cloned()
            .ok_or_else(|| RepositoryError::Database("No document returned after creation".to_string()))
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let collection = self.db.collection(USER_COLLECTION).await?;

        // update_document takes the key, not the full _id
        let key = document_key(&user.id).to_string();
        let update_options = UpdateOptions::builder()
            .ignore_revs(true)
            .return_new(true)
            .build();
        let result = collection.update_document(&key, user, update_options).await?;

        result
            .new_doc()
            .cloned()
            .ok_or_else(|| RepositoryError::Database("No document returned after update".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query("FOR u IN user FILTER u._id == @id REMOVE u IN user RETURN OLD._id")
            .bind_var("id", id)
            .build();
        let removed: Vec<String> = self.db.aql_query(query).await?;
        Ok(!removed.is_empty())
    }
}
