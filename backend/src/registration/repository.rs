use arangors::client::reqwest::ReqwestClient;
use arangors::Database;
use shared::models::registration::{Registration, RegistrationStatus};

use crate::db::RepositoryError;

/// Result of the conditional ledger insert
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(Registration),
    Duplicate,
    CapacityReached,
}

#[derive(Clone)]
pub struct RegistrationRepositoryImpl {
    pub db: Database<ReqwestClient>,
}

#[async_trait::async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, RepositoryError>;
    async fn find_by_user_and_tournament(
        &self,
        user_id: &str,
        tournament_id: &str,
    ) -> Result<Option<Registration>, RepositoryError>;
    /// Registrations that hold a seat (everything except `rejected`)
    async fn count_active(&self, tournament_id: &str) -> Result<usize, RepositoryError>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Registration>, RepositoryError>;
    async fn find_by_tournament(&self, tournament_id: &str) -> Result<Vec<Registration>, RepositoryError>;
    /// Inserts only when the pair is new and a seat is free (`limit == 0` means unlimited)
    async fn insert_if_capacity(
        &self,
        registration: Registration,
        limit: i64,
    ) -> Result<InsertOutcome, RepositoryError>;
    async fn update_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<Option<Registration>, RepositoryError>;
}

// Capacity check and insert run as one statement; the exclusive lock
// serialises concurrent registrations on the ledger collection.
const INSERT_IF_CAPACITY_AQL: &str = r#"
LET existing = FIRST(
    FOR r IN tournament_registration
        FILTER r.userId == @user_id AND r.tournamentId == @tournament_id
        LIMIT 1
        RETURN r._id
)
LET taken = LENGTH(
    FOR r IN tournament_registration
        FILTER r.tournamentId == @tournament_id AND r.status != "rejected"
        RETURN 1
)
FILTER existing == null AND (@limit == 0 OR taken < @limit)
INSERT UNSET(@registration, "_id", "_rev") INTO tournament_registration OPTIONS { exclusive: true }
RETURN NEW
"#;

#[async_trait::async_trait]
impl RegistrationRepository for RegistrationRepositoryImpl {
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query("FOR r IN tournament_registration FILTER r._id == @id LIMIT 1 RETURN r")
            .bind_var("id", id)
            .build();
        let mut cursor: Vec<Registration> = self.db.aql_query(query).await?;
        Ok(cursor.pop())
    }

    async fn find_by_user_and_tournament(
        &self,
        user_id: &str,
        tournament_id: &str,
    ) -> Result<Option<Registration>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query(
                "FOR r IN tournament_registration \
                 FILTER r.userId == @user_id AND r.tournamentId == @tournament_id \
                 LIMIT 1 RETURN r",
            )
            .bind_var("user_id", user_id)
            .bind_var("tournament_id", tournament_id)
            .build();
        let mut cursor: Vec<Registration> = self.db.aql_query(query).await?;
        Ok(cursor.pop())
    }

    async fn count_active(&self, tournament_id: &str) -> Result<usize, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query(
                "RETURN LENGTH(FOR r IN tournament_registration \
                 FILTER r.tournamentId == @tournament_id AND r.status != \"rejected\" RETURN 1)",
            )
            .bind_var("tournament_id", tournament_id)
            .build();
        let counts: Vec<usize> = self.db.aql_query(query).await?;
        Ok(counts.first().copied().unwrap_or(0))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Registration>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query("FOR r IN tournament_registration FILTER r.userId == @user_id RETURN r")
            .bind_var("user_id", user_id)
            .build();
        Ok(self.db.aql_query(query).await?)
    }

    async fn find_by_tournament(&self, tournament_id: &str) -> Result<Vec<Registration>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query("FOR r IN tournament_registration FILTER r.tournamentId == @tournament_id RETURN r")
            .bind_var("tournament_id", tournament_id)
            .build();
        Ok(self.db.aql_query(query).await?)
    }

    async fn insert_if_capacity(
        &self,
        registration: Registration,
        limit: i64,
    ) -> Result<InsertOutcome, RepositoryError> {
        let user_id = registration.user_id.clone();
        let tournament_id = registration.tournament_id.clone();
        let document = serde_json::to_value(&registration)
            .map_err(|e| RepositoryError::Database(format!("Failed to serialize registration: {}", e)))?;

        let query = arangors::AqlQuery::builder()
            .query(INSERT_IF_CAPACITY_AQL)
            .bind_var("user_id", user_id.as_str())
            .bind_var("tournament_id", tournament_id.as_str())
            .bind_var("limit", limit)
            .bind_var("registration", document)
            .build();

        let mut inserted: Vec<Registration> = match self.db.aql_query(query).await {
            Ok(docs) => docs,
            // A concurrent insert of the same pair lost the race on the unique index
            Err(e) => match RepositoryError::from(e) {
                RepositoryError::UniqueViolation(_) => return Ok(InsertOutcome::Duplicate),
                other => return Err(other),
            },
        };

        if let Some(registration) = inserted.pop() {
            log::info!(
                "Registered {} for {} as {}",
                registration.user_id,
                registration.tournament_id,
                registration.status
            );
            return Ok(InsertOutcome::Inserted(registration));
        }

        // Nothing inserted: tell the two guards apart
        if self.find_by_user_and_tournament(&user_id, &tournament_id).await?.is_some() {
            Ok(InsertOutcome::Duplicate)
        } else {
            Ok(InsertOutcome::CapacityReached)
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<Option<Registration>, RepositoryError> {
        let query = arangors::AqlQuery::builder()
            .query(
                "FOR r IN tournament_registration FILTER r._id == @id \
                 UPDATE r WITH { status: @status, updatedAt: @updated_at } IN tournament_registration \
                 RETURN NEW",
            )
            .bind_var("id", id)
            .bind_var("status", status.as_str())
            .bind_var("updated_at", chrono::Utc::now().fixed_offset().to_rfc3339())
            .build();
        let mut cursor: Vec<Registration> = self.db.aql_query(query).await?;
        Ok(cursor.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_statement_guards_both_conditions() {
        assert!(INSERT_IF_CAPACITY_AQL.contains("existing == null"));
        assert!(INSERT_IF_CAPACITY_AQL.contains("@limit == 0 OR taken < @limit"));
        assert!(INSERT_IF_CAPACITY_AQL.contains("exclusive: true"));
        assert!(INSERT_IF_CAPACITY_AQL.contains(r#"r.status != "rejected""#));
    }
}
