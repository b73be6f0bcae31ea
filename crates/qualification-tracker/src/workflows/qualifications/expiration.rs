use std::fmt;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Literal used for never-expiring values in every serialized form.
pub const PERMANENT: &str = "permanent";

/// Policy applied when a record does not reference a validity policy.
pub const DEFAULT_VALIDITY: ValidityPeriod = ValidityPeriod::Years(1);

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpirationError {
    #[error("invalid calendar date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid validity period '{0}' (expected a positive number of years or 'permanent')")]
    InvalidPolicy(String),
}

/// How long a qualification stays valid after acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawValidityPeriod", into = "String")]
pub enum ValidityPeriod {
    Years(u32),
    Permanent,
}

impl ValidityPeriod {
    pub fn years(years: i64) -> Result<Self, ExpirationError> {
        u32::try_from(years)
            .ok()
            .filter(|years| *years > 0)
            .map(Self::Years)
            .ok_or_else(|| ExpirationError::InvalidPolicy(years.to_string()))
    }

    pub fn parse(raw: &str) -> Result<Self, ExpirationError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(PERMANENT) {
            return Ok(Self::Permanent);
        }

        trimmed
            .parse::<i64>()
            .map_err(|_| ExpirationError::InvalidPolicy(raw.to_string()))
            .and_then(Self::years)
    }
}

impl fmt::Display for ValidityPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Years(years) => write!(f, "{years}"),
            Self::Permanent => f.write_str(PERMANENT),
        }
    }
}

impl From<ValidityPeriod> for String {
    fn from(value: ValidityPeriod) -> Self {
        value.to_string()
    }
}

/// Stored policies carry the period as text, hand-written snapshots often as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValidityPeriod {
    Number(i64),
    Text(String),
}

impl TryFrom<RawValidityPeriod> for ValidityPeriod {
    type Error = ExpirationError;

    fn try_from(value: RawValidityPeriod) -> Result<Self, Self::Error> {
        match value {
            RawValidityPeriod::Number(years) => Self::years(years),
            RawValidityPeriod::Text(raw) => Self::parse(&raw),
        }
    }
}

/// Derived expiration of a qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expiration {
    On(NaiveDate),
    Permanent,
}

impl Expiration {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            Self::On(date) => Some(date),
            Self::Permanent => None,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ExpirationError> {
        if raw.trim().eq_ignore_ascii_case(PERMANENT) {
            Ok(Self::Permanent)
        } else {
            parse_calendar_date(raw).map(Self::On)
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::Permanent => f.write_str(PERMANENT),
        }
    }
}

impl From<Expiration> for String {
    fn from(value: Expiration) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Expiration {
    type Error = ExpirationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// Shorter forms such as `2024-1-5` are rejected even though chrono would
/// accept them, as are impossible dates like `2023-02-29`.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, ExpirationError> {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });

    if !well_formed {
        return Err(ExpirationError::InvalidDate(raw.to_string()));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| ExpirationError::InvalidDate(raw.to_string()))
}

/// Advances `acquired` by the validity period.
///
/// Month and day are preserved. A February 29 acquisition that lands in a
/// non-leap year clamps to February 28.
pub fn compute_expiration(
    acquired: NaiveDate,
    period: ValidityPeriod,
) -> Result<Expiration, ExpirationError> {
    let years = match period {
        ValidityPeriod::Permanent => return Ok(Expiration::Permanent),
        ValidityPeriod::Years(years) => years,
    };

    if years == 0 {
        return Err(ExpirationError::InvalidPolicy(years.to_string()));
    }

    years
        .checked_mul(12)
        .and_then(|months| acquired.checked_add_months(Months::new(months)))
        .map(Expiration::On)
        .ok_or_else(|| ExpirationError::InvalidPolicy(years.to_string()))
}

/// Same as [`compute_expiration`] for values that have not been parsed yet.
pub fn compute_expiration_from_raw(
    acquired: &str,
    period: &str,
) -> Result<Expiration, ExpirationError> {
    let acquired = parse_calendar_date(acquired)?;
    let period = ValidityPeriod::parse(period)?;
    compute_expiration(acquired, period)
}
