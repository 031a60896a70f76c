use std::collections::HashMap;
use std::str::FromStr;

use shared::dto::profile::UserDto;
use shared::dto::registration::{ParticipantDto, RegisterRequest, UserTournamentDto};
use shared::dto::tournament::TournamentDto;
use shared::models::registration::{Registration, RegistrationStatus};

use crate::registration::error::RegistrationError;
use crate::registration::repository::{InsertOutcome, RegistrationRepository};
use crate::tournament::repository::TournamentRepository;
use crate::user::repository::UserRepository;

#[async_trait::async_trait]
pub trait RegistrationUseCase: Send + Sync {
    async fn register(&self, user_id: &str, request: RegisterRequest) -> Result<Registration, RegistrationError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<UserTournamentDto>, RegistrationError>;
    async fn list_participants(&self, tournament_id: &str) -> Result<Vec<ParticipantDto>, RegistrationError>;
    async fn update_status(&self, registration_id: &str, status: &str) -> Result<Registration, RegistrationError>;
}

pub struct RegistrationUseCaseImpl<RR, TR, UR>
where
    RR: RegistrationRepository,
    TR: TournamentRepository,
    UR: UserRepository,
{
    pub registrations: RR,
    pub tournaments: TR,
    pub users: UR,
}

#[async_trait::async_trait]
impl<RR, TR, UR> RegistrationUseCase for RegistrationUseCaseImpl<RR, TR, UR>
where
    RR: RegistrationRepository,
    TR: TournamentRepository,
    UR: UserRepository,
{
    async fn register(&self, user_id: &str, request: RegisterRequest) -> Result<Registration, RegistrationError> {
        let tournament = self
            .tournaments
            .find_by_id(&request.tournament_id)
            .await?
            .ok_or(RegistrationError::TournamentNotFound)?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(RegistrationError::UserNotFound);
        }

        if self
            .registrations
            .find_by_user_and_tournament(user_id, &tournament.id)
            .await?
            .is_some()
        {
            return Err(RegistrationError::AlreadyRegistered);
        }

        if tournament.participant_limit > 0 {
            let taken = self.registrations.count_active(&tournament.id).await?;
            if !tournament.has_capacity_for(taken) {
                log::info!("Tournament {} is full ({} of {})", tournament.id, taken, tournament.participant_limit);
                return Err(RegistrationError::ParticipantLimitReached);
            }
        }

        let has_paid = request.has_paid.unwrap_or(false);
        let registration = Registration::new_for_db(
            user_id.to_string(),
            tournament.id.clone(),
            RegistrationStatus::initial(tournament.entry_fee, has_paid),
            has_paid,
            request.payment_details,
        );

        // Guards above are re-checked atomically by the insert
        match self
            .registrations
            .insert_if_capacity(registration, tournament.participant_limit)
            .await?
        {
            InsertOutcome::Inserted(registration) => Ok(registration),
            InsertOutcome::Duplicate => Err(RegistrationError::AlreadyRegistered),
            InsertOutcome::CapacityReached => Err(RegistrationError::ParticipantLimitReached),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<UserTournamentDto>, RegistrationError> {
        let registrations = self.registrations.find_by_user(user_id).await?;
        let ids: Vec<String> = registrations.iter().map(|r| r.tournament_id.clone()).collect();
        let tournaments = self.tournaments.find_many_by_ids(&ids).await?;

        let by_tournament: HashMap<&str, &Registration> = registrations
            .iter()
            .map(|r| (r.tournament_id.as_str(), r))
            .collect();

        Ok(tournaments
            .iter()
            .map(|t| {
                let registration = by_tournament.get(t.id.as_str());
                UserTournamentDto {
                    tournament: TournamentDto::from(t),
                    registration_status: registration.map(|r| r.status),
                    has_paid: registration.map(|r| r.has_paid).unwrap_or(false),
                }
            })
            .collect())
    }

    async fn list_participants(&self, tournament_id: &str) -> Result<Vec<ParticipantDto>, RegistrationError> {
        let registrations = self.registrations.find_by_tournament(tournament_id).await?;
        let ids: Vec<String> = registrations.iter().map(|r| r.user_id.clone()).collect();
        let users = self.users.find_many_by_ids(&ids).await?;

        // Registrations whose user row is gone are skipped
        Ok(registrations
            .iter()
            .filter_map(|r| {
                users.iter().find(|u| u.id == r.user_id).map(|user| ParticipantDto {
                    user: UserDto::from(user),
                    registration_status: r.status,
                    has_paid: r.has_paid,
                })
            })
            .collect())
    }

    async fn update_status(&self, registration_id: &str, status: &str) -> Result<Registration, RegistrationError> {
        let status = RegistrationStatus::from_str(status)
            .map_err(|_| RegistrationError::InvalidStatus(format!(
                "Invalid status '{}': expected pending, approved or rejected",
                status
            )))?;

        let updated = self
            .registrations
            .update_status(registration_id, status)
            .await?
            .ok_or(RegistrationError::RegistrationNotFound)?;
        log::info!("Registration {} is now {}", updated.id, updated.status);
        Ok(updated)
    }
}
