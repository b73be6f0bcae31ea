use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Company, CompanyId, Department, DepartmentId, Employee, EmployeeId, PolicyId,
    QualificationId, QualificationRecord, ValidityPolicy,
};
use super::repository::{DirectoryRepository, QualificationRepository, RepositoryError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store lock poisoned".to_string()))
}

/// Map-backed record store used by the service binary, the CLI and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryQualificationRepository {
    records: Arc<Mutex<BTreeMap<QualificationId, QualificationRecord>>>,
}

impl InMemoryQualificationRepository {
    pub fn with_records(records: impl IntoIterator<Item = QualificationRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.qualification_id.clone(), record))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl QualificationRepository for InMemoryQualificationRepository {
    fn insert(
        &self,
        record: QualificationRecord,
    ) -> Result<QualificationRecord, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&record.qualification_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.qualification_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: QualificationRecord) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.get_mut(&record.qualification_id) {
            Some(existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete(&self, id: &QualificationId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn fetch(&self, id: &QualificationId) -> Result<Option<QualificationRecord>, RepositoryError> {
        Ok(lock(&self.records)?.get(id).cloned())
    }

    fn for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<QualificationRecord>, RepositoryError> {
        Ok(lock(&self.records)?
            .values()
            .filter(|record| &record.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<QualificationRecord>, RepositoryError> {
        Ok(lock(&self.records)?.values().cloned().collect())
    }
}

#[derive(Debug, Default)]
struct DirectoryTables {
    companies: BTreeMap<CompanyId, Company>,
    departments: BTreeMap<DepartmentId, Department>,
    employees: BTreeMap<EmployeeId, Employee>,
    policies: BTreeMap<PolicyId, ValidityPolicy>,
}

/// Map-backed organization directory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    tables: Arc<Mutex<DirectoryTables>>,
}

impl InMemoryDirectory {
    pub fn new(
        companies: Vec<Company>,
        departments: Vec<Department>,
        employees: Vec<Employee>,
        policies: Vec<ValidityPolicy>,
    ) -> Self {
        let tables = DirectoryTables {
            companies: companies
                .into_iter()
                .map(|company| (company.company_id.clone(), company))
                .collect(),
            departments: departments
                .into_iter()
                .map(|department| (department.department_id.clone(), department))
                .collect(),
            employees: employees
                .into_iter()
                .map(|employee| (employee.employee_id.clone(), employee))
                .collect(),
            policies: policies
                .into_iter()
                .map(|policy| (policy.policy_id.clone(), policy))
                .collect(),
        };
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }
}

impl DirectoryRepository for InMemoryDirectory {
    fn companies(&self) -> Result<Vec<Company>, RepositoryError> {
        Ok(lock(&self.tables)?.companies.values().cloned().collect())
    }

    fn company(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError> {
        Ok(lock(&self.tables)?.companies.get(id).cloned())
    }

    fn departments(
        &self,
        company_id: Option<&CompanyId>,
    ) -> Result<Vec<Department>, RepositoryError> {
        Ok(lock(&self.tables)?
            .departments
            .values()
            .filter(|department| company_id.map_or(true, |id| &department.company_id == id))
            .cloned()
            .collect())
    }

    fn department(&self, id: &DepartmentId) -> Result<Option<Department>, RepositoryError> {
        Ok(lock(&self.tables)?.departments.get(id).cloned())
    }

    fn employees(&self, company_id: Option<&CompanyId>) -> Result<Vec<Employee>, RepositoryError> {
        Ok(lock(&self.tables)?
            .employees
            .values()
            .filter(|employee| company_id.map_or(true, |id| &employee.company_id == id))
            .cloned()
            .collect())
    }

    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, RepositoryError> {
        Ok(lock(&self.tables)?.employees.get(id).cloned())
    }

    fn policies(&self) -> Result<Vec<ValidityPolicy>, RepositoryError> {
        Ok(lock(&self.tables)?.policies.values().cloned().collect())
    }

    fn policy(&self, id: &PolicyId) -> Result<Option<ValidityPolicy>, RepositoryError> {
        Ok(lock(&self.tables)?.policies.get(id).cloned())
    }
}
