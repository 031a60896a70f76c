use arangors::client::reqwest::ReqwestClient;
use arangors::document::options::InsertOptions;
use arangors::Database;
use shared::models::tournament::Tournament;

use crate::db::{RepositoryError, TOURNAMENT_COLLECTION};

#[derive(Clone)]
pub struct TournamentRepositoryImpl {
    pub db: Database<ReqwestClient>,
}

#[async_trait::async_trait]
pub trait TournamentRepository: Send + Sync {
    async fn create(&self, tournament: Tournament) -> Result<Tournament, RepositoryError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Tournament>, RepositoryError>;
    async fn find_all(&self) -> Result<Vec<Tournament>, RepositoryError>;
    async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<Tournament>, RepositoryError>;
}

#[async_trait::async_trait]
impl TournamentRepository for TournamentRepositoryImpl {
    async fn create(&self, tournament: Tournament) -> Result<Tournament, RepositoryError> {
        let collection = self.db.collection(TOURNAMENT_COLLECTION).await?;

        let insert_options = InsertOptions::builder().return_new(true).build();
        let result = collection.create_document(tournament, insert_options).await?;

        let created = result
            .new_doc()
            .cloned()
            .ok_or_else(|| RepositoryError::Database("No document returned after creation".to_string()))?;
        log::info!("Created tournament {} ({})", created.id, created.name);
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tournament>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query("FOR t IN tournament FILTER t._id == @id LIMIT 1 RETURN t")
            .bind_var("id", id)
            .build();
        let mut cursor: Vec<Tournament> = self.db.aql_query(query).await?;
        Ok(cursor.pop())
    }

    async fn find_all(&self) -> Result<Vec<Tournament>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query("FOR t IN tournament RETURN t")
            .build();
        Ok(self.db.aql_query(query).await?)
    }

    async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<Tournament>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = arangors::AqlQuery::builder()
            .query("FOR t IN tournament FILTER t._id IN @ids RETURN t")
            .bind_var("ids", ids)
            .build();
        Ok(self.db.aql_query(query).await?)
    }
}
