//! In-memory stand-ins for the storage and provider seams.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use shared::dto::auth::GoogleProfile;
use shared::models::registration::{Registration, RegistrationStatus};
use shared::models::tournament::Tournament;
use shared::models::user::User;
use tokio::sync::Mutex;

use crate::db::RepositoryError;
use crate::profile::otp::OtpStore;
use crate::registration::repository::{InsertOutcome, RegistrationRepository};
use crate::third_party::{IdentityProvider, MediaStorage, SmsSender, UploadedMedia};
use crate::tournament::repository::TournamentRepository;
use crate::user::rate_limit::LoginRateLimiter;
use crate::user::repository::UserRepository;

fn new_id(collection: &str) -> String {
    format!("{}/{}", collection, uuid::Uuid::new_v4().simple())
}

fn date(text: &str) -> DateTime<FixedOffset> {
    shared::models::tournament::parse_event_date(text).unwrap()
}

pub fn tournament(id: &str, participant_limit: i64, entry_fee: f64) -> Tournament {
    let mut t = Tournament::new_for_db(
        format!("Tournament {}", id),
        date("2025-01-01"),
        date("2025-01-02"),
        None,
        participant_limit,
        entry_fee,
    )
    .unwrap();
    t.id = id.to_string();
    t.rev = "1".to_string();
    t
}

pub fn user(id: &str, email: &str) -> User {
    let mut u = User::new_local(email.to_string(), "not-a-hash".to_string());
    u.id = id.to_string();
    u
}

#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn with(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }
}

#[async_trait::async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, mut user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::UniqueViolation("user.email".to_string()));
        }
        user.id = new_id("user");
        user.rev = "1".to_string();
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(RepositoryError::Database("document not found".to_string())),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut users = self.users.lock().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

#[derive(Clone, Default)]
pub struct MockTournamentRepository {
    pub tournaments: Arc<Mutex<Vec<Tournament>>>,
}

impl MockTournamentRepository {
    pub fn with(tournaments: Vec<Tournament>) -> Self {
        Self {
            tournaments: Arc::new(Mutex::new(tournaments)),
        }
    }
}

#[async_trait::async_trait]
impl TournamentRepository for MockTournamentRepository {
    async fn create(&self, mut tournament: Tournament) -> Result<Tournament, RepositoryError> {
        tournament.id = new_id("tournament");
        tournament.rev = "1".to_string();
        self.tournaments.lock().await.push(tournament.clone());
        Ok(tournament)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Tournament>, RepositoryError> {
        Ok(self.tournaments.lock().await.iter().find(|t| t.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Tournament>, RepositoryError> {
        Ok(self.tournaments.lock().await.clone())
    }

    async fn find_many_by_ids(&self, ids: &[String]) -> Result<Vec<Tournament>, RepositoryError> {
        Ok(self
            .tournaments
            .lock()
            .await
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }
}

/// Ledger whose conditional insert holds the lock for check and write.
/// `forced_outcome` makes the next insert lose a simulated race.
#[derive(Clone, Default)]
pub struct MockRegistrationRepository {
    pub registrations: Arc<Mutex<Vec<Registration>>>,
    pub forced_outcome: Arc<Mutex<Option<InsertOutcome>>>,
}

impl MockRegistrationRepository {
    pub fn with(registrations: Vec<Registration>) -> Self {
        Self {
            registrations: Arc::new(Mutex::new(registrations)),
            forced_outcome: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn all(&self) -> Vec<Registration> {
        self.registrations.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl RegistrationRepository for MockRegistrationRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, RepositoryError> {
        Ok(self.registrations.lock().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_user_and_tournament(
        &self,
        user_id: &str,
        tournament_id: &str,
    ) -> Result<Option<Registration>, RepositoryError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .find(|r| r.user_id == user_id && r.tournament_id == tournament_id)
            .cloned())
    }

    async fn count_active(&self, tournament_id: &str) -> Result<usize, RepositoryError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .filter(|r| r.tournament_id == tournament_id && r.status.counts_toward_capacity())
            .count())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Registration>, RepositoryError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_tournament(&self, tournament_id: &str) -> Result<Vec<Registration>, RepositoryError> {
        Ok(self
            .registrations
            .lock()
            .await
            .iter()
            .filter(|r| r.tournament_id == tournament_id)
            .cloned()
            .collect())
    }

    async fn insert_if_capacity(
        &self,
        mut registration: Registration,
        limit: i64,
    ) -> Result<InsertOutcome, RepositoryError> {
        if let Some(outcome) = self.forced_outcome.lock().await.take() {
            return Ok(outcome);
        }

        let mut registrations = self.registrations.lock().await;
        if registrations
            .iter()
            .any(|r| r.user_id == registration.user_id && r.tournament_id == registration.tournament_id)
        {
            return Ok(InsertOutcome::Duplicate);
        }
        let taken = registrations
            .iter()
            .filter(|r| r.tournament_id == registration.tournament_id && r.status.counts_toward_capacity())
            .count() as i64;
        if limit > 0 && taken >= limit {
            return Ok(InsertOutcome::CapacityReached);
        }

        registration.id = new_id("tournament_registration");
        registration.rev = "1".to_string();
        registrations.push(registration.clone());
        Ok(InsertOutcome::Inserted(registration))
    }

    async fn update_status(
        &self,
        id: &str,
        status: RegistrationStatus,
    ) -> Result<Option<Registration>, RepositoryError> {
        let mut registrations = self.registrations.lock().await;
        Ok(registrations.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            r.clone()
        }))
    }
}

#[derive(Clone, Default)]
pub struct MockMediaStorage {
    /// (folder, file name) per upload
    pub uploads: Arc<Mutex<Vec<(String, String)>>>,
    pub destroyed: Arc<Mutex<Vec<String>>>,
    pub fail_uploads: bool,
    pub fail_destroys: bool,
}

#[async_trait::async_trait]
impl MediaStorage for MockMediaStorage {
    async fn upload(&self, _bytes: Vec<u8>, file_name: &str, folder: &str) -> anyhow::Result<UploadedMedia> {
        if self.fail_uploads {
            return Err(anyhow::anyhow!("media host unavailable"));
        }
        let mut uploads = self.uploads.lock().await;
        uploads.push((folder.to_string(), file_name.to_string()));
        let public_id = format!("{}/media-{}", folder, uploads.len());
        Ok(UploadedMedia {
            url: format!("https://media.example.com/{}", public_id),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> anyhow::Result<()> {
        self.destroyed.lock().await.push(public_id.to_string());
        if self.fail_destroys {
            return Err(anyhow::anyhow!("media host unavailable"));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockSmsSender {
    /// (phone, code) per delivered message
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl SmsSender for MockSmsSender {
    async fn send_otp(&self, phone_number: &str, otp: &str) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow::anyhow!("gateway timeout"));
        }
        self.sent.lock().await.push((phone_number.to_string(), otp.to_string()));
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockOtpStore {
    pub codes: Arc<Mutex<HashMap<String, String>>>,
}

#[async_trait::async_trait]
impl OtpStore for MockOtpStore {
    async fn put(&self, phone_number: &str, code: &str) -> Result<(), String> {
        self.codes.lock().await.insert(phone_number.to_string(), code.to_string());
        Ok(())
    }

    async fn get(&self, phone_number: &str) -> Result<Option<String>, String> {
        Ok(self.codes.lock().await.get(phone_number).cloned())
    }

    async fn remove(&self, phone_number: &str) -> Result<(), String> {
        self.codes.lock().await.remove(phone_number);
        Ok(())
    }
}

/// Answers every code exchange with `profile`, or fails when it is `None`
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    pub profile: Option<GoogleProfile>,
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn authorization_url(&self, state: &str) -> anyhow::Result<String> {
        Ok(format!("https://accounts.example.com/consent?state={}", state))
    }

    async fn exchange_code(&self, _code: &str) -> anyhow::Result<GoogleProfile> {
        self.profile
            .clone()
            .ok_or_else(|| anyhow::anyhow!("invalid_grant"))
    }
}

/// Allows the first `budget` attempts per key
#[derive(Clone)]
pub struct MockLoginRateLimiter {
    pub budget: i64,
    pub attempts: Arc<Mutex<HashMap<String, i64>>>,
}

impl MockLoginRateLimiter {
    pub fn new(budget: i64) -> Self {
        Self {
            budget,
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl LoginRateLimiter for MockLoginRateLimiter {
    async fn allow(&self, key: &str) -> bool {
        let mut attempts = self.attempts.lock().await;
        let count = attempts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count <= self.budget
    }
}
