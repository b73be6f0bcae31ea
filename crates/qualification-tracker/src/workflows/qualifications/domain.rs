use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::expiration::{Expiration, ValidityPeriod};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// Identifier of a stored qualification record.
    QualificationId
);
identifier!(
    /// Identifier of an employee owned by the directory.
    EmployeeId
);
identifier!(CompanyId);
identifier!(DepartmentId);
identifier!(
    /// Identifier of a validity policy (qualification master).
    PolicyId
);

/// Maximum length of a qualification name, counted in characters.
pub const MAX_QUALIFICATION_NAME_CHARS: usize = 100;

/// A qualification held by one employee.
///
/// `expiration_date` is always derived from `acquired_date` and the validity
/// policy; the service recomputes it on every create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationRecord {
    pub qualification_id: QualificationId,
    pub employee_id: EmployeeId,
    pub qualification_name: String,
    pub acquired_date: NaiveDate,
    pub expiration_date: Expiration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<PolicyId>,
}

/// Template describing how long qualifications of a given type stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityPolicy {
    pub policy_id: PolicyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub validity_period: ValidityPeriod,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub company_id: CompanyId,
    pub company_name: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub department_id: DepartmentId,
    pub department_name: String,
    pub company_id: CompanyId,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub company_id: CompanyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
}

/// Payload accepted when registering a new qualification.
///
/// The acquisition date stays raw so that malformed dates surface as
/// expiration errors rather than opaque body rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationRegistration {
    pub employee_id: EmployeeId,
    pub qualification_name: String,
    pub acquired_date: String,
    #[serde(default)]
    pub qualification_master_id: Option<PolicyId>,
}

/// Payload accepted when editing an existing qualification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationEdit {
    pub qualification_name: String,
    pub acquired_date: String,
    #[serde(default)]
    pub qualification_master_id: Option<PolicyId>,
}

fn active_by_default() -> bool {
    true
}
