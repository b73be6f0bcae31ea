use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expiration::Expiration;

/// Qualifications expiring within this many calendar days (inclusive) are flagged.
pub const WARNING_WINDOW_DAYS: i64 = 90;

/// Urgency of a qualification relative to a reference date. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationStatus {
    Normal,
    Warning,
    Expired,
}

impl ExpirationStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Expired, Self::Warning, Self::Normal]
    }

    /// Token used in query strings and serialized payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Expired => "expired",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Expired => "Expired",
        }
    }

    /// Exact, case-sensitive match against the query tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|status| status.as_str() == token)
    }
}

/// Calendar days from `today` until `expiration`; negative once it has passed.
pub fn days_until(expiration: NaiveDate, today: NaiveDate) -> i64 {
    expiration.signed_duration_since(today).num_days()
}

pub fn classify(expiration: Expiration, today: NaiveDate) -> ExpirationStatus {
    let Expiration::On(date) = expiration else {
        return ExpirationStatus::Normal;
    };

    match days_until(date, today) {
        diff if diff < 0 => ExpirationStatus::Expired,
        diff if diff <= WARNING_WINDOW_DAYS => ExpirationStatus::Warning,
        _ => ExpirationStatus::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    fn classify_offset(days: i64) -> ExpirationStatus {
        classify(Expiration::On(today() + Duration::days(days)), today())
    }

    #[test]
    fn permanent_is_always_normal() {
        for reference in [
            NaiveDate::MIN,
            today(),
            NaiveDate::from_ymd_opt(9999, 12, 31).expect("valid date"),
        ] {
            assert_eq!(
                classify(Expiration::Permanent, reference),
                ExpirationStatus::Normal
            );
        }
    }

    #[test]
    fn boundaries_around_today_and_the_warning_window() {
        assert_eq!(classify_offset(-1), ExpirationStatus::Expired);
        assert_eq!(classify_offset(0), ExpirationStatus::Warning);
        assert_eq!(classify_offset(WARNING_WINDOW_DAYS), ExpirationStatus::Warning);
        assert_eq!(classify_offset(WARNING_WINDOW_DAYS + 1), ExpirationStatus::Normal);
    }

    #[test]
    fn counts_calendar_days_across_month_boundaries() {
        let expiration = NaiveDate::from_ymd_opt(2024, 8, 1).expect("valid date");
        assert_eq!(days_until(expiration, today()), 61);
        assert_eq!(
            classify(Expiration::On(expiration), today()),
            ExpirationStatus::Warning
        );

        let lapsed = NaiveDate::from_ymd_opt(2023, 12, 1).expect("valid date");
        assert_eq!(
            classify(Expiration::On(lapsed), today()),
            ExpirationStatus::Expired
        );
    }

    #[test]
    fn tokens_are_exact() {
        assert_eq!(
            ExpirationStatus::from_token("warning"),
            Some(ExpirationStatus::Warning)
        );
        assert_eq!(ExpirationStatus::from_token("Warning"), None);
        assert_eq!(ExpirationStatus::from_token("expiring"), None);
        assert_eq!(
            serde_json::to_string(&ExpirationStatus::Expired).expect("serialize"),
            "\"expired\""
        );
    }
}
