use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use crate::error::{Result, SharedError};

/// A tournament as stored in the `tournament` collection.
///
/// Tournaments are immutable once created; there is no update path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tournament {
    /// ArangoDB document ID (format: "tournament/{key}")
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// ArangoDB document revision
    #[serde(rename = "_rev", default, skip_serializing_if = "String::is_empty")]
    pub rev: String,

    pub name: String,

    #[serde(rename = "startDate")]
    pub start_date: DateTime<FixedOffset>,

    #[serde(rename = "endDate")]
    pub end_date: DateTime<FixedOffset>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Maximum number of non-rejected registrations; 0 means unlimited
    #[serde(rename = "participantLimit", default)]
    pub participant_limit: i64,

    #[serde(rename = "entryFee", default, deserialize_with = "deserialize_fee")]
    pub entry_fee: f64,

    #[serde(rename = "isActive", default = "default_active")]
    pub is_active: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<FixedOffset>,

    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<FixedOffset>,
}

fn default_active() -> bool {
    true
}

impl Tournament {
    /// Creates a tournament for database insertion (ArangoDB will set id and rev)
    pub fn new_for_db(
        name: String,
        start_date: DateTime<FixedOffset>,
        end_date: DateTime<FixedOffset>,
        description: Option<String>,
        participant_limit: i64,
        entry_fee: f64,
    ) -> Result<Self> {
        if participant_limit < 0 {
            return Err(SharedError::Validation(
                "participantLimit must be a non-negative integer".to_string(),
            ));
        }
        let now = Utc::now().fixed_offset();
        Ok(Self {
            id: String::new(),
            rev: String::new(),
            name,
            start_date,
            end_date,
            description,
            participant_limit,
            entry_fee: normalize_fee(entry_fee)?,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether `taken` non-rejected registrations leave room for one more
    pub fn has_capacity_for(&self, taken: usize) -> bool {
        self.participant_limit == 0 || (taken as i64) < self.participant_limit
    }
}

/// Cents below which a fee is treated as float noise rather than a real fraction
const FEE_EPSILON_CENTS: f64 = 1e-6;

/// Snaps a currency amount to whole cents. Rejects negative and non-finite
/// values, and amounts carrying fractions of a cent.
pub fn normalize_fee(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(SharedError::InvalidAmount(format!("{} is not a finite number", value)));
    }
    if value < 0.0 {
        return Err(SharedError::InvalidAmount(format!("{} is negative", value)));
    }
    let cents = value * 100.0;
    if (cents - cents.round()).abs() > FEE_EPSILON_CENTS {
        return Err(SharedError::InvalidAmount(format!("{} has more than two decimal places", value)));
    }
    Ok(cents.round() / 100.0)
}

/// Parses a fee given as text, e.g. "49.99"
pub fn parse_fee(text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| SharedError::InvalidAmount(format!("'{}' is not a number", text)))?;
    normalize_fee(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredFee {
    Number(f64),
    Text(String),
    Decimal {
        #[serde(rename = "$numberDecimal")]
        value: String,
    },
}

/// Accepts a plain number, a numeric string, or an extended-JSON decimal
/// (`{"$numberDecimal": "49.99"}`) and yields a plain `f64`.
pub fn deserialize_fee<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = StoredFee::deserialize(deserializer)?;
    let parsed = match stored {
        StoredFee::Number(value) => normalize_fee(value),
        StoredFee::Text(text) | StoredFee::Decimal { value: text } => parse_fee(&text),
    };
    parsed.map_err(serde::de::Error::custom)
}

/// Parses an ISO 8601 date or timestamp.
///
/// Accepts RFC 3339 (`2025-01-01T10:00:00Z`), a bare local timestamp taken
/// as UTC (`2025-01-01T10:00:00`), or a calendar date taken as midnight UTC
/// (`2025-01-01`).
pub fn parse_event_date(text: &str) -> Result<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    Err(SharedError::InvalidDate(format!("'{}' is not an ISO 8601 date", text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_tournament(limit: i64, fee: f64) -> Tournament {
        Tournament::new_for_db(
            "Cup".to_string(),
            parse_event_date("2025-01-01").unwrap(),
            parse_event_date("2025-01-02").unwrap(),
            None,
            limit,
            fee,
        )
        .unwrap()
    }

    #[test]
    fn test_new_for_db_sets_active_and_blank_ids() {
        let t = sample_tournament(4, 10.0);
        assert!(t.is_active);
        assert!(t.id.is_empty());
        assert_eq!(t.participant_limit, 4);
    }

    #[test]
    fn test_negative_limit_rejected() {
        let result = Tournament::new_for_db(
            "Cup".to_string(),
            Utc::now().fixed_offset(),
            Utc::now().fixed_offset(),
            None,
            -1,
            0.0,
        );
        assert!(matches!(result, Err(SharedError::Validation(_))));
    }

    #[test]
    fn test_fee_keeps_two_decimals() {
        assert_eq!(normalize_fee(49.99).unwrap(), 49.99);
        assert_eq!(normalize_fee(0.1 + 0.2).unwrap(), 0.3);
        assert!(normalize_fee(-1.0).is_err());
        assert!(normalize_fee(f64::NAN).is_err());
    }

    #[test]
    fn test_fraction_of_a_cent_rejected() {
        assert!(matches!(normalize_fee(0.004), Err(SharedError::InvalidAmount(_))));
        assert!(matches!(normalize_fee(10.125), Err(SharedError::InvalidAmount(_))));
        assert!(matches!(parse_fee("0.004"), Err(SharedError::InvalidAmount(_))));
        assert_eq!(normalize_fee(10.10).unwrap(), 10.1);
    }

    #[test]
    fn test_deserialize_fee_variants() {
        let base = json!({
            "_id": "tournament/1",
            "_rev": "r",
            "name": "Cup",
            "startDate": "2025-01-01T00:00:00+00:00",
            "endDate": "2025-01-02T00:00:00+00:00",
            "participantLimit": 0,
            "createdAt": "2025-01-01T00:00:00+00:00",
            "updatedAt": "2025-01-01T00:00:00+00:00"
        });

        for fee in [json!(49.99), json!("49.99"), json!({"$numberDecimal": "49.99"})] {
            let mut doc = base.clone();
            doc["entryFee"] = fee;
            let t: Tournament = serde_json::from_value(doc).unwrap();
            assert_eq!(t.entry_fee, 49.99);
        }
    }

    #[test]
    fn test_fee_serializes_as_plain_number() {
        let t = sample_tournament(0, 49.99);
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["entryFee"], json!(49.99));
        assert!(value.get("_id").is_none());
    }

    #[test]
    fn test_missing_defaults() {
        let doc = json!({
            "_id": "tournament/2",
            "_rev": "r",
            "name": "Open",
            "startDate": "2025-01-01T00:00:00Z",
            "endDate": "2025-01-02T00:00:00Z",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let t: Tournament = serde_json::from_value(doc).unwrap();
        assert_eq!(t.participant_limit, 0);
        assert_eq!(t.entry_fee, 0.0);
        assert!(t.is_active);
    }

    #[test]
    fn test_capacity() {
        let unlimited = sample_tournament(0, 0.0);
        assert!(unlimited.has_capacity_for(10_000));

        let one = sample_tournament(1, 0.0);
        assert!(one.has_capacity_for(0));
        assert!(!one.has_capacity_for(1));
    }

    #[test]
    fn test_parse_event_date_formats() {
        let day = parse_event_date("2025-01-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2025-01-01T00:00:00+00:00");

        let ts = parse_event_date("2025-01-01T10:30:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-01T10:30:00+00:00");

        let naive = parse_event_date("2025-01-01T10:30:00").unwrap();
        assert_eq!(naive.to_rfc3339(), "2025-01-01T10:30:00+00:00");

        assert!(matches!(parse_event_date("next tuesday"), Err(SharedError::InvalidDate(_))));
    }
}
