use super::domain::{
    Company, CompanyId, Department, DepartmentId, Employee, EmployeeId, PolicyId,
    QualificationId, QualificationRecord, ValidityPolicy,
};

/// Storage abstraction for qualification records so the service can be exercised in isolation.
pub trait QualificationRepository: Send + Sync {
    fn insert(&self, record: QualificationRecord)
        -> Result<QualificationRecord, RepositoryError>;
    fn update(&self, record: QualificationRecord) -> Result<(), RepositoryError>;
    fn delete(&self, id: &QualificationId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &QualificationId) -> Result<Option<QualificationRecord>, RepositoryError>;
    fn for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<QualificationRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<QualificationRecord>, RepositoryError>;

    /// Whether another record of `employee_id` already uses `name` (exact match).
    fn name_taken(
        &self,
        employee_id: &EmployeeId,
        name: &str,
        exclude: Option<&QualificationId>,
    ) -> Result<bool, RepositoryError> {
        Ok(self.for_employee(employee_id)?.iter().any(|record| {
            record.qualification_name == name && Some(&record.qualification_id) != exclude
        }))
    }
}

/// Read-only view of the organization and the validity policies.
pub trait DirectoryRepository: Send + Sync {
    fn companies(&self) -> Result<Vec<Company>, RepositoryError>;
    fn company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn departments(&self, company_id: Option<&CompanyId>)
        -> Result<Vec<Department>, RepositoryError>;
    fn department(&self, id: &DepartmentId) -> Result<Option<Department>, RepositoryError>;
    fn employees(&self, company_id: Option<&CompanyId>) -> Result<Vec<Employee>, RepositoryError>;
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError>;
    fn policies(&self) -> Result<Vec<ValidityPolicy>, RepositoryError>;
    fn policy(&self, id: &PolicyId) -> Result<Option<ValidityPolicy>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
