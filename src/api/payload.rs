use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use serde::Deserialize;

use super::ApiAccrual;
use super::error::{ApiError, ApiResult};
use crate::core::{Contribution, DEFAULT_PROJECTION_MONTHS, Entity, EntityParams};

pub const MAX_PROJECTION_MONTHS: u32 = 600;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionPayload {
    pub amount: f64,
    #[serde(alias = "created_at", alias = "occurredAt")]
    pub created_at: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityPayload {
    #[serde(default, alias = "bank_name")]
    pub bank_name: Option<String>,
    #[serde(alias = "initial_capital")]
    pub initial_capital: f64,
    #[serde(alias = "annual_interest", alias = "annualInterestRate")]
    pub annual_interest: f64,
    #[serde(default, alias = "savings_goal")]
    pub savings_goal: f64,
    #[serde(alias = "created_at")]
    pub created_at: String,
    #[serde(default)]
    pub contributions: Vec<ContributionPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRequest {
    #[serde(flatten)]
    pub entity: EntityPayload,
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default)]
    pub months: Option<u32>,
    #[serde(default)]
    pub accrual: Option<ApiAccrual>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRequest {
    #[serde(default)]
    pub entities: Vec<EntityPayload>,
    #[serde(default)]
    pub as_of: Option<String>,
    #[serde(default)]
    pub months: Option<u32>,
    #[serde(default)]
    pub accrual: Option<ApiAccrual>,
}

pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(format!("UTC offset must look like +HH:MM or -HH:MM, got {raw:?}")),
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours
        .parse()
        .map_err(|_| format!("invalid UTC offset hours in {raw:?}"))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| format!("invalid UTC offset minutes in {raw:?}"))?;
    if hours > 23 || minutes > 59 {
        return Err(format!("UTC offset out of range: {raw:?}"));
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| format!("UTC offset out of range: {raw:?}"))
}

/// Parses an RFC 3339 instant (converted into `offset`), a naive local
/// timestamp or a bare `YYYY-MM-DD` date (midnight).
pub fn parse_timestamp(field: &str, raw: &str, offset: &FixedOffset) -> ApiResult<NaiveDateTime> {
    let value = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(offset).naive_local());
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(ApiError::InvalidTimestamp {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

pub fn evaluation_instant(as_of: Option<&str>, offset: &FixedOffset) -> ApiResult<NaiveDateTime> {
    match as_of {
        Some(raw) => parse_timestamp("asOf", raw, offset),
        None => Ok(Utc::now().with_timezone(offset).naive_local()),
    }
}

pub fn projection_months(months: Option<u32>) -> ApiResult<u32> {
    let months = months.unwrap_or(DEFAULT_PROJECTION_MONTHS);
    if months > MAX_PROJECTION_MONTHS {
        return Err(ApiError::InvalidInput(format!(
            "months must be <= {MAX_PROJECTION_MONTHS}"
        )));
    }
    Ok(months)
}

fn non_negative(field: &str, value: f64) -> ApiResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::NegativeOrNonFinite {
            field: field.to_string(),
        });
    }
    Ok(value)
}

impl EntityPayload {
    pub fn label(&self) -> &str {
        self.bank_name.as_deref().unwrap_or("entity")
    }

    pub fn into_entity(self, offset: &FixedOffset) -> ApiResult<Entity> {
        let params = EntityParams {
            initial_capital: non_negative("initialCapital", self.initial_capital)?,
            annual_interest_rate: non_negative("annualInterest", self.annual_interest)?,
            created_at: parse_timestamp("createdAt", &self.created_at, offset)?,
            savings_goal: non_negative("savingsGoal", self.savings_goal)?,
        };

        let contributions = self
            .contributions
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                if !c.amount.is_finite() {
                    return Err(ApiError::NonFinite {
                        field: format!("contributions[{i}].amount"),
                    });
                }
                let occurred_at =
                    parse_timestamp(&format!("contributions[{i}].createdAt"), &c.created_at, offset)?;
                Ok(Contribution {
                    amount: c.amount,
                    occurred_at,
                    note: c.note.filter(|note| !note.is_empty()),
                })
            })
            .collect::<ApiResult<Vec<_>>>()?;

        Ok(Entity {
            params,
            contributions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn costa_rica() -> FixedOffset {
        FixedOffset::west_opt(6 * 3600).expect("valid offset")
    }

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(h, min, s)
            .expect("valid time")
    }

    #[test]
    fn parse_utc_offset_accepts_common_forms() {
        assert_eq!(parse_utc_offset("Z"), Ok(utc()));
        assert_eq!(parse_utc_offset("-06:00"), Ok(costa_rica()));
        assert_eq!(parse_utc_offset("-0600"), Ok(costa_rica()));
        assert_eq!(
            parse_utc_offset("+05:30"),
            Ok(FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("valid offset"))
        );
        assert!(parse_utc_offset("06:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
    }

    #[test]
    fn rfc3339_timestamps_are_converted_into_the_evaluation_offset() {
        // 03:30Z is still the previous calendar day in UTC-6
        let parsed = parse_timestamp("createdAt", "2025-03-01T03:30:00Z", &costa_rica())
            .expect("valid timestamp");
        assert_eq!(parsed, ymd_hms(2025, 2, 28, 21, 30, 0));
    }

    #[test]
    fn naive_and_date_only_timestamps_are_taken_as_local() {
        let offset = costa_rica();
        assert_eq!(
            parse_timestamp("createdAt", "2025-03-01T03:30:00.250", &offset).expect("naive"),
            ymd_hms(2025, 3, 1, 3, 30, 0) + chrono::Duration::milliseconds(250)
        );
        assert_eq!(
            parse_timestamp("createdAt", "2025-03-01", &offset).expect("date only"),
            ymd_hms(2025, 3, 1, 0, 0, 0)
        );
    }

    #[test]
    fn unparseable_timestamps_name_the_field() {
        let err = parse_timestamp("asOf", "yesterday", &utc()).expect_err("must reject");
        assert!(err.to_string().contains("asOf"));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn projection_months_defaults_and_caps() {
        assert_eq!(projection_months(None).expect("default"), 12);
        assert_eq!(projection_months(Some(0)).expect("zero"), 0);
        assert!(projection_months(Some(MAX_PROJECTION_MONTHS + 1)).is_err());
    }

    #[test]
    fn entity_payload_parses_dashboard_keys() {
        let json = r#"{
          "bankName": "Banco Nacional",
          "initialCapital": 150000,
          "annualInterest": 5.5,
          "savingsGoal": 1000000,
          "createdAt": "2025-01-15T14:00:00.000Z",
          "contributions": [
            { "amount": 25000, "created_at": "2025-02-01", "note": "" },
            { "amount": 10000, "createdAt": "2025-03-01T09:00:00", "note": "bono" }
          ],
          "asOf": "2025-10-18",
          "months": 6
        }"#;
        let request: EntityRequest = serde_json::from_str(json).expect("json should parse");
        assert_eq!(request.as_of.as_deref(), Some("2025-10-18"));
        assert_eq!(request.months, Some(6));
        assert_eq!(request.entity.label(), "Banco Nacional");

        let entity = request.entity.into_entity(&utc()).expect("valid entity");
        assert_eq!(entity.params.initial_capital, 150_000.0);
        assert_eq!(entity.params.annual_interest_rate, 5.5);
        assert_eq!(entity.params.savings_goal, 1_000_000.0);
        assert_eq!(entity.params.created_at, ymd_hms(2025, 1, 15, 14, 0, 0));
        assert_eq!(entity.contributions.len(), 2);
        assert_eq!(entity.contributions[0].note, None);
        assert_eq!(entity.contributions[1].note.as_deref(), Some("bono"));
    }

    #[test]
    fn entity_payload_rejects_negative_rate() {
        let json = r#"{ "initialCapital": 10, "annualInterest": -1, "createdAt": "2025-01-01" }"#;
        let payload: EntityPayload = serde_json::from_str(json).expect("json should parse");
        let err = payload.into_entity(&utc()).expect_err("must reject negative rate");
        assert!(err.to_string().contains("annualInterest"));
    }

    #[test]
    fn entity_payload_rejects_bad_contribution_date() {
        let json = r#"{
          "initialCapital": 10,
          "annualInterest": 1,
          "createdAt": "2025-01-01",
          "contributions": [{ "amount": 5, "createdAt": "01/02/2025" }]
        }"#;
        let payload: EntityPayload = serde_json::from_str(json).expect("json should parse");
        let err = payload.into_entity(&utc()).expect_err("must reject contribution date");
        assert!(err.to_string().contains("contributions[0].createdAt"));
    }
}
