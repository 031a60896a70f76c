use shared::dto::tournament::CreateTournamentRequest;
use shared::models::tournament::Tournament;

use crate::tournament::error::TournamentError;
use crate::tournament::repository::TournamentRepository;

#[async_trait::async_trait]
pub trait TournamentUseCase: Send + Sync {
    async fn create_tournament(&self, request: CreateTournamentRequest) -> Result<Tournament, TournamentError>;
    async fn get_tournament(&self, id: &str) -> Result<Tournament, TournamentError>;
    async fn list_tournaments(&self) -> Result<Vec<Tournament>, TournamentError>;
}

pub struct TournamentUseCaseImpl<R: TournamentRepository> {
    pub repo: R,
}

#[async_trait::async_trait]
impl<R: TournamentRepository> TournamentUseCase for TournamentUseCaseImpl<R> {
    async fn create_tournament(&self, request: CreateTournamentRequest) -> Result<Tournament, TournamentError> {
        let tournament = request.try_into_tournament()?;
        Ok(self.repo.create(tournament).await?)
    }

    async fn get_tournament(&self, id: &str) -> Result<Tournament, TournamentError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(TournamentError::NotFound)
    }

    async fn list_tournaments(&self) -> Result<Vec<Tournament>, TournamentError> {
        Ok(self.repo.find_all().await?)
    }
}
