use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::SharedError;

/// Lifecycle state of a tournament registration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for RegistrationStatus {
    fn default() -> Self {
        RegistrationStatus::Pending
    }
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
        }
    }

    /// Initial status: free tournaments and paid entries are approved outright
    pub fn initial(entry_fee: f64, has_paid: bool) -> Self {
        if entry_fee == 0.0 || has_paid {
            RegistrationStatus::Approved
        } else {
            RegistrationStatus::Pending
        }
    }

    /// Rejected registrations do not occupy a slot
    pub fn counts_toward_capacity(&self) -> bool {
        *self != RegistrationStatus::Rejected
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "approved" => Ok(RegistrationStatus::Approved),
            "rejected" => Ok(RegistrationStatus::Rejected),
            other => Err(SharedError::UnknownStatus(other.to_string())),
        }
    }
}

/// A row of the registration ledger (`tournament_registration`).
///
/// At most one registration exists per (user, tournament) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,

    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "tournamentId")]
    pub tournament_id: String,

    #[serde(default)]
    pub status: RegistrationStatus,

    #[serde(rename = "hasPaid", default)]
    pub has_paid: bool,

    /// Opaque payment payload; never interpreted here
    #[serde(rename = "paymentDetails", default, skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<serde_json::Value>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<FixedOffset>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<FixedOffset>,
}

impl Registration {
    pub fn new_for_db(
        user_id: String,
        tournament_id: String,
        status: RegistrationStatus,
        has_paid: bool,
        payment_details: Option<serde_json::Value>,
    ) -> Self {
        let now = Utc::now().fixed_offset();
        Self {
            id: String::new(),
            rev: String::new(),
            user_id,
            tournament_id,
            status,
            has_paid,
            payment_details,
            created_at: now,
            updated_at: now,
        }
    }
}
