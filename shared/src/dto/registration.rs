use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::dto::profile::UserDto;
use crate::dto::tournament::TournamentDto;
use crate::models::registration::{Registration, RegistrationStatus};

/// Request body for `POST /tournament-registrations`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[serde(rename = "tournamentId")]
    #[validate(length(min = 1, message = "tournamentId is required"))]
    pub tournament_id: String,

    #[serde(rename = "hasPaid", default)]
    pub has_paid: Option<bool>,

    #[serde(rename = "paymentDetails", default)]
    #[schema(value_type = Option<Object>)]
    pub payment_details: Option<serde_json::Value>,
}

/// Request body for `PATCH /tournament-registrations/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, message = "status is required"))]
    #[schema(example = "approved")]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct RegistrationDto {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "tournamentId")]
    pub tournament_id: String,
    pub status: RegistrationStatus,
    #[serde(rename = "hasPaid")]
    pub has_paid: bool,
    #[serde(rename = "paymentDetails", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub payment_details: Option<serde_json::Value>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<FixedOffset>,
}

impl From<&Registration> for RegistrationDto {
    fn from(r: &Registration) -> Self {
        Self {
            id: r.id.clone(),
            user_id: r.user_id.clone(),
            tournament_id: r.tournament_id.clone(),
            status: r.status,
            has_paid: r.has_paid,
            payment_details: r.payment_details.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// A tournament the caller registered for, annotated with their registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct UserTournamentDto {
    #[serde(flatten)]
    pub tournament: TournamentDto,
    #[serde(rename = "registrationStatus")]
    pub registration_status: Option<RegistrationStatus>,
    #[serde(rename = "hasPaid")]
    pub has_paid: bool,
}

/// A registered user (never with password) annotated with their registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, utoipa::ToSchema)]
pub struct ParticipantDto {
    #[serde(flatten)]
    pub user: UserDto,
    #[serde(rename = "registrationStatus")]
    pub registration_status: RegistrationStatus,
    #[serde(rename = "hasPaid")]
    pub has_paid: bool,
}
