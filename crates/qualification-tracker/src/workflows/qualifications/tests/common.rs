use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::qualifications::domain::{
    Company, CompanyId, Department, DepartmentId, Employee, EmployeeId, PolicyId,
    QualificationId, QualificationRecord, QualificationRegistration, ValidityPolicy,
};
use crate::workflows::qualifications::expiration::{Expiration, ValidityPeriod};
use crate::workflows::qualifications::memory::{
    InMemoryDirectory, InMemoryQualificationRepository,
};
use crate::workflows::qualifications::repository::{QualificationRepository, RepositoryError};
use crate::workflows::qualifications::service::QualificationService;

pub(super) type MemoryService =
    QualificationService<InMemoryQualificationRepository, InMemoryDirectory>;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Reference date used across the fixtures.
pub(super) fn today() -> NaiveDate {
    date(2024, 6, 1)
}

fn company(id: &str, name: &str, active: bool) -> Company {
    Company {
        company_id: CompanyId::from(id),
        company_name: name.to_string(),
        active,
    }
}

fn department(id: &str, name: &str, company_id: &str) -> Department {
    Department {
        department_id: DepartmentId::from(id),
        department_name: name.to_string(),
        company_id: CompanyId::from(company_id),
        active: true,
    }
}

fn employee(id: &str, name: &str, company_id: &str, department_id: Option<&str>) -> Employee {
    Employee {
        employee_id: EmployeeId::from(id),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        company_id: CompanyId::from(company_id),
        department_id: department_id.map(DepartmentId::from),
    }
}

fn policy(id: &str, name: &str, period: ValidityPeriod, active: bool) -> ValidityPolicy {
    ValidityPolicy {
        policy_id: PolicyId::from(id),
        name: name.to_string(),
        category: Some("IT".to_string()),
        validity_period: period,
        active,
    }
}

pub(super) fn directory() -> InMemoryDirectory {
    InMemoryDirectory::new(
        vec![
            company("comp-b", "Affiliate B", true),
            company("comp-a", "Affiliate A", true),
            company("comp-z", "Closed Co", false),
        ],
        vec![
            department("dept-a-tech", "Engineering", "comp-a"),
            department("dept-b-sales", "Sales", "comp-b"),
            department("dept-b-admin", "Administration", "comp-b"),
        ],
        vec![
            employee("emp-sato", "Sato Hanako", "comp-a", Some("dept-a-tech")),
            employee("emp-tanaka", "Tanaka Ichiro", "comp-b", Some("dept-b-sales")),
            employee("emp-kato", "Kato Jiro", "comp-b", None),
            employee("emp-ghost", "Ghost Worker", "comp-missing", None),
        ],
        vec![
            policy("qm-aws", "AWS Solutions Architect", ValidityPeriod::Years(3), true),
            policy("qm-ap", "Applied IT Engineer", ValidityPeriod::Permanent, true),
            policy("qm-old", "Retired Certification", ValidityPeriod::Years(2), false),
        ],
    )
}

pub(super) fn record(
    id: &str,
    employee_id: &str,
    name: &str,
    acquired: NaiveDate,
    expiration: Expiration,
    policy_id: Option<&str>,
) -> QualificationRecord {
    QualificationRecord {
        qualification_id: QualificationId::from(id),
        employee_id: EmployeeId::from(employee_id),
        qualification_name: name.to_string(),
        acquired_date: acquired,
        expiration_date: expiration,
        policy_id: policy_id.map(PolicyId::from),
    }
}

/// Warning for Sato (30 days left), normal for Tanaka, expired for Kato.
pub(super) fn records() -> InMemoryQualificationRepository {
    InMemoryQualificationRepository::with_records(vec![
        record(
            "qual-aws",
            "emp-sato",
            "AWS SAA",
            date(2021, 7, 1),
            Expiration::On(date(2024, 7, 1)),
            Some("qm-aws"),
        ),
        record(
            "qual-ap",
            "emp-tanaka",
            "Applied Information Technology",
            date(2022, 10, 20),
            Expiration::Permanent,
            Some("qm-ap"),
        ),
        record(
            "qual-cpr",
            "emp-kato",
            "CPR",
            date(2022, 5, 1),
            Expiration::On(date(2023, 5, 1)),
            None,
        ),
        record(
            "qual-orphan",
            "emp-ghost",
            "Forklift",
            date(2023, 1, 1),
            Expiration::On(date(2024, 1, 1)),
            None,
        ),
    ])
}

pub(super) fn build_service() -> (MemoryService, InMemoryQualificationRepository) {
    let records = records();
    let service = QualificationService::new(Arc::new(records.clone()), Arc::new(directory()));
    (service, records)
}

pub(super) fn registration(employee_id: &str, name: &str, acquired: &str) -> QualificationRegistration {
    QualificationRegistration {
        employee_id: EmployeeId::from(employee_id),
        qualification_name: name.to_string(),
        acquired_date: acquired.to_string(),
        qualification_master_id: None,
    }
}

/// Record store whose every call fails.
#[derive(Debug, Default)]
pub(super) struct UnavailableRepository;

impl QualificationRepository for UnavailableRepository {
    fn insert(
        &self,
        _record: QualificationRecord,
    ) -> Result<QualificationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: QualificationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &QualificationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _id: &QualificationId,
    ) -> Result<Option<QualificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_employee(
        &self,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<QualificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<QualificationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Record store that answers the first `remaining` inserts with a conflict.
#[derive(Debug)]
pub(super) struct CrowdedRepository {
    pub inner: InMemoryQualificationRepository,
    pub remaining: AtomicUsize,
    pub rejected: std::sync::Mutex<Vec<QualificationId>>,
}

impl CrowdedRepository {
    pub fn rejecting(count: usize) -> Self {
        Self {
            inner: records(),
            remaining: AtomicUsize::new(count),
            rejected: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl QualificationRepository for CrowdedRepository {
    fn insert(
        &self,
        record: QualificationRecord,
    ) -> Result<QualificationRecord, RepositoryError> {
        let taken = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if taken {
            self.rejected
                .lock()
                .expect("rejected ids lock")
                .push(record.qualification_id);
            return Err(RepositoryError::Conflict);
        }
        self.inner.insert(record)
    }

    fn update(&self, record: QualificationRecord) -> Result<(), RepositoryError> {
        self.inner.update(record)
    }

    fn delete(&self, id: &QualificationId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn fetch(
        &self,
        id: &QualificationId,
    ) -> Result<Option<QualificationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<QualificationRecord>, RepositoryError> {
        self.inner.for_employee(employee_id)
    }

    fn all(&self) -> Result<Vec<QualificationRecord>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
