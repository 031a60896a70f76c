use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::error::{Result, SharedError};
use crate::models::tournament::{deserialize_fee, parse_event_date, Tournament};

/// Request body for `POST /tournaments`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateTournamentRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required and must be at most 200 characters"))]
    pub name: String,

    /// ISO 8601 date or timestamp
    #[serde(rename = "startDate")]
    #[schema(example = "2025-01-01")]
    pub start_date: String,

    /// ISO 8601 date or timestamp
    #[serde(rename = "endDate")]
    #[schema(example = "2025-01-02")]
    pub end_date: String,

    #[serde(default)]
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// 0 means unlimited
    #[serde(rename = "participantLimit", default)]
    #[validate(range(min = 0, message = "participantLimit must be a non-negative integer"))]
    pub participant_limit: i64,

    #[serde(rename = "entryFee", default, deserialize_with = "deserialize_fee")]
    #[validate(range(min = 0.0, message = "entryFee must be a non-negative number"))]
    #[schema(example = 49.99)]
    pub entry_fee: f64,
}

impl CreateTournamentRequest {
    /// Validates the request and converts it into a storable tournament
    pub fn try_into_tournament(self) -> Result<Tournament> {
        self.validate()?;
        let start_date = parse_event_date(&self.start_date)?;
        let end_date = parse_event_date(&self.end_date)?;
        if end_date < start_date {
            return Err(SharedError::InvalidDate(format!(
                "endDate {} is before startDate {}",
                self.end_date, self.start_date
            )));
        }
        Tournament::new_for_db(
            self.name,
            start_date,
            end_date,
            self.description,
            self.participant_limit,
            self.entry_fee,
        )
    }
}

/// Tournament as returned by the API; `entryFee` is always a plain number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct TournamentDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "startDate")]
    pub start_date: DateTime<FixedOffset>,
    #[serde(rename = "endDate")]
    pub end_date: DateTime<FixedOffset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "participantLimit")]
    pub participant_limit: i64,
    #[serde(rename = "entryFee")]
    pub entry_fee: f64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<FixedOffset>,
}

impl From<&Tournament> for TournamentDto {
    fn from(t: &Tournament) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            start_date: t.start_date,
            end_date: t.end_date,
            description: t.description.clone(),
            participant_limit: t.participant_limit,
            entry_fee: t.entry_fee,
            is_active: t.is_active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
