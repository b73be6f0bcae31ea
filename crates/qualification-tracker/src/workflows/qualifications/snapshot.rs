use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Company, Department, Employee, EmployeeId, PolicyId, QualificationId, QualificationRecord,
    ValidityPolicy,
};
use super::expiration::{compute_expiration, Expiration, ExpirationError, DEFAULT_VALIDITY};
use super::memory::{InMemoryDirectory, InMemoryQualificationRepository};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("qualification '{qualification_id}' references unknown policy '{policy_id}'")]
    UnknownPolicy {
        qualification_id: QualificationId,
        policy_id: PolicyId,
    },
    #[error(
        "qualification '{qualification_id}' stores expiration {stored} but its policy yields {derived}"
    )]
    InconsistentExpiration {
        qualification_id: QualificationId,
        stored: Expiration,
        derived: Expiration,
    },
    #[error("qualification '{qualification_id}' has no derivable expiration: {source}")]
    Expiration {
        qualification_id: QualificationId,
        #[source]
        source: ExpirationError,
    },
}

/// Stored qualification; `expirationDate` is derived on load and, when present,
/// must equal the derived value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotQualification {
    pub qualification_id: QualificationId,
    pub employee_id: EmployeeId,
    pub qualification_name: String,
    pub acquired_date: NaiveDate,
    #[serde(default)]
    pub expiration_date: Option<Expiration>,
    #[serde(default)]
    pub policy_id: Option<PolicyId>,
}

/// JSON document used to hydrate the in-memory stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub policies: Vec<ValidityPolicy>,
    #[serde(default)]
    pub qualifications: Vec<SnapshotQualification>,
}

impl DirectorySnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn into_stores(
        self,
    ) -> Result<(InMemoryQualificationRepository, InMemoryDirectory), SnapshotError> {
        let policies: BTreeMap<&PolicyId, &ValidityPolicy> = self
            .policies
            .iter()
            .map(|policy| (&policy.policy_id, policy))
            .collect();

        let records = self
            .qualifications
            .iter()
            .map(|stored| materialize(stored, &policies))
            .collect::<Result<Vec<_>, _>>()?;

        let directory =
            InMemoryDirectory::new(self.companies, self.departments, self.employees, self.policies);
        Ok((InMemoryQualificationRepository::with_records(records), directory))
    }
}

fn materialize(
    stored: &SnapshotQualification,
    policies: &BTreeMap<&PolicyId, &ValidityPolicy>,
) -> Result<QualificationRecord, SnapshotError> {
    let period = match &stored.policy_id {
        Some(policy_id) => policies
            .get(policy_id)
            .map(|policy| policy.validity_period)
            .ok_or_else(|| SnapshotError::UnknownPolicy {
                qualification_id: stored.qualification_id.clone(),
                policy_id: policy_id.clone(),
            })?,
        None => DEFAULT_VALIDITY,
    };

    let expiration_date = compute_expiration(stored.acquired_date, period).map_err(|source| {
        SnapshotError::Expiration {
            qualification_id: stored.qualification_id.clone(),
            source,
        }
    })?;
    if let Some(recorded) = stored.expiration_date {
        if recorded != expiration_date {
            return Err(SnapshotError::InconsistentExpiration {
                qualification_id: stored.qualification_id.clone(),
                stored: recorded,
                derived: expiration_date,
            });
        }
    }

    Ok(QualificationRecord {
        qualification_id: stored.qualification_id.clone(),
        employee_id: stored.employee_id.clone(),
        qualification_name: stored.qualification_name.clone(),
        acquired_date: stored.acquired_date,
        expiration_date,
        policy_id: stored.policy_id.clone(),
    })
}
