use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use super::domain::{
    Company, CompanyId, Department, DepartmentId, Employee, EmployeeId, PolicyId,
    QualificationEdit, QualificationId, QualificationRecord, QualificationRegistration,
    ValidityPolicy, MAX_QUALIFICATION_NAME_CHARS,
};
use super::expiration::{
    compute_expiration, parse_calendar_date, ExpirationError, DEFAULT_VALIDITY,
};
use super::export::{export_rows, ColumnSpec, ExportError, ExportedTable};
use super::filter::{filter_rows, EnrichedRow, FilterCriteria, FilterError};
use super::repository::{DirectoryRepository, QualificationRepository, RepositoryError};

/// Input rejected before any repository is consulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("employee id must not be blank")]
    BlankEmployeeId,
    #[error("qualification id must not be blank")]
    BlankQualificationId,
    #[error("qualification master id must not be blank when provided")]
    BlankPolicyReference,
    #[error("qualification name must not be blank")]
    BlankName,
    #[error("qualification name must be at most {max} characters (found {found})")]
    NameTooLong { max: usize, found: usize },
    #[error("acquired date {acquired} is later than today ({today})")]
    FutureAcquisition { acquired: NaiveDate, today: NaiveDate },
}

/// Error raised by the qualification service.
#[derive(Debug, thiserror::Error)]
pub enum QualificationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Expiration(#[from] ExpirationError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("qualification master '{0}' is inactive")]
    InactivePolicy(PolicyId),
    #[error("employee '{employee_id}' already holds a qualification named '{name}'")]
    Duplicate { employee_id: EmployeeId, name: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl QualificationServiceError {
    fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

static QUALIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Upper bound on generated ids tried before a registration gives up.
const MAX_ID_ATTEMPTS: usize = 10_000;

fn next_qualification_id() -> QualificationId {
    let id = QUALIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    QualificationId(format!("qual-{id:06}"))
}

/// Service composing the record store, the directory and the reporting engine.
pub struct QualificationService<Q, D> {
    records: Arc<Q>,
    directory: Arc<D>,
}

impl<Q, D> QualificationService<Q, D>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    pub fn new(records: Arc<Q>, directory: Arc<D>) -> Self {
        Self { records, directory }
    }

    /// Register a qualification, deriving its expiration from the referenced policy.
    pub fn register(
        &self,
        form: QualificationRegistration,
        today: NaiveDate,
    ) -> Result<QualificationRecord, QualificationServiceError> {
        if form.employee_id.as_str().trim().is_empty() {
            return Err(ValidationError::BlankEmployeeId.into());
        }
        let name = validate_name(&form.qualification_name)?;
        let acquired = validate_acquired(&form.acquired_date, today)?;

        if self.directory.employee(&form.employee_id)?.is_none() {
            warn!(
                employee_id = %form.employee_id,
                "qualification registration for unknown employee"
            );
            return Err(QualificationServiceError::not_found("employee", &form.employee_id));
        }

        let period = self
            .resolve_policy(form.qualification_master_id.as_ref())?
            .map_or(DEFAULT_VALIDITY, |policy| policy.validity_period);

        if self.records.name_taken(&form.employee_id, name, None)? {
            warn!(
                employee_id = %form.employee_id,
                qualification_name = name,
                "duplicate qualification rejected"
            );
            return Err(QualificationServiceError::Duplicate {
                employee_id: form.employee_id,
                name: name.to_string(),
            });
        }

        let expiration_date = compute_expiration(acquired, period)?;
        let stored = self.insert_with_fresh_id(|qualification_id| QualificationRecord {
            qualification_id,
            employee_id: form.employee_id.clone(),
            qualification_name: name.to_string(),
            acquired_date: acquired,
            expiration_date,
            policy_id: form.qualification_master_id.clone(),
        })?;
        info!(
            qualification_id = %stored.qualification_id,
            employee_id = %stored.employee_id,
            expiration = %stored.expiration_date,
            "qualification registered"
        );
        Ok(stored)
    }

    /// Replace name, acquisition date and policy of a record; expiration is recomputed.
    pub fn update(
        &self,
        id: &QualificationId,
        form: QualificationEdit,
        today: NaiveDate,
    ) -> Result<QualificationRecord, QualificationServiceError> {
        validate_id(id)?;
        let name = validate_name(&form.qualification_name)?;
        let acquired = validate_acquired(&form.acquired_date, today)?;

        let existing = self
            .records
            .fetch(id)?
            .ok_or_else(|| QualificationServiceError::not_found("qualification", id))?;

        let period = self
            .resolve_policy(form.qualification_master_id.as_ref())?
            .map_or(DEFAULT_VALIDITY, |policy| policy.validity_period);

        if name != existing.qualification_name
            && self.records.name_taken(&existing.employee_id, name, Some(id))?
        {
            warn!(
                qualification_id = %id,
                qualification_name = name,
                "duplicate qualification rename rejected"
            );
            return Err(QualificationServiceError::Duplicate {
                employee_id: existing.employee_id,
                name: name.to_string(),
            });
        }

        let record = QualificationRecord {
            qualification_name: name.to_string(),
            acquired_date: acquired,
            expiration_date: compute_expiration(acquired, period)?,
            policy_id: form.qualification_master_id,
            ..existing
        };

        self.records.update(record.clone())?;
        info!(
            qualification_id = %record.qualification_id,
            expiration = %record.expiration_date,
            "qualification updated"
        );
        Ok(record)
    }

    pub fn delete(&self, id: &QualificationId) -> Result<(), QualificationServiceError> {
        validate_id(id)?;
        let existing = self
            .records
            .fetch(id)?
            .ok_or_else(|| QualificationServiceError::not_found("qualification", id))?;

        self.records.delete(id)?;
        info!(
            qualification_id = %id,
            employee_id = %existing.employee_id,
            "qualification deleted"
        );
        Ok(())
    }

    pub fn get(
        &self,
        id: &QualificationId,
    ) -> Result<QualificationRecord, QualificationServiceError> {
        validate_id(id)?;
        self.records
            .fetch(id)?
            .ok_or_else(|| QualificationServiceError::not_found("qualification", id))
    }

    /// Qualifications of one employee ordered by name.
    pub fn list_for_employee(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Vec<QualificationRecord>, QualificationServiceError> {
        if employee_id.as_str().trim().is_empty() {
            return Err(ValidationError::BlankEmployeeId.into());
        }
        if self.directory.employee(employee_id)?.is_none() {
            return Err(QualificationServiceError::not_found("employee", employee_id));
        }

        let mut records = self.records.for_employee(employee_id)?;
        records.sort_by(|left, right| {
            left.qualification_name
                .cmp(&right.qualification_name)
                .then_with(|| left.qualification_id.cmp(&right.qualification_id))
        });
        Ok(records)
    }

    /// All qualifications joined with the directory, filtered and in report order.
    pub fn list_all(
        &self,
        criteria: &FilterCriteria,
        today: NaiveDate,
    ) -> Result<Vec<EnrichedRow>, QualificationServiceError> {
        let rows = self.enriched_rows(today)?;
        let selected = filter_rows(&rows, criteria);
        debug!(
            total = rows.len(),
            selected = selected.len(),
            %today,
            "qualification listing built"
        );
        Ok(selected)
    }

    pub fn export(
        &self,
        criteria: &FilterCriteria,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<ExportedTable, QualificationServiceError> {
        let rows = self.list_all(criteria, today)?;
        let table = export_rows(&rows, &ColumnSpec::standard(), now)?;
        info!(
            rows = rows.len(),
            bytes = table.content.len(),
            filename = %table.suggested_filename,
            "qualification export generated"
        );
        Ok(table)
    }

    /// Active companies ordered by name.
    pub fn companies(&self) -> Result<Vec<Company>, QualificationServiceError> {
        let mut companies: Vec<Company> = self
            .directory
            .companies()?
            .into_iter()
            .filter(|company| company.active)
            .collect();
        companies.sort_by(|left, right| left.company_name.cmp(&right.company_name));
        Ok(companies)
    }

    /// Active departments, optionally restricted to one company, ordered by name.
    pub fn departments(
        &self,
        company_id: Option<&CompanyId>,
    ) -> Result<Vec<Department>, QualificationServiceError> {
        let mut departments: Vec<Department> = self
            .directory
            .departments(company_id)?
            .into_iter()
            .filter(|department| department.active)
            .collect();
        departments.sort_by(|left, right| left.department_name.cmp(&right.department_name));
        Ok(departments)
    }

    /// Company regardless of its active flag.
    pub fn company(&self, id: &CompanyId) -> Result<Company, QualificationServiceError> {
        self.directory
            .company(id)?
            .ok_or_else(|| QualificationServiceError::not_found("company", id))
    }

    pub fn department(&self, id: &DepartmentId) -> Result<Department, QualificationServiceError> {
        self.directory
            .department(id)?
            .ok_or_else(|| QualificationServiceError::not_found("department", id))
    }

    /// Employees ordered by company name, department name, then employee name.
    ///
    /// Employees without a department follow those with one inside their company;
    /// employees of unknown companies come last.
    pub fn employees(
        &self,
        company_id: Option<&CompanyId>,
    ) -> Result<Vec<Employee>, QualificationServiceError> {
        let company_names: BTreeMap<CompanyId, String> = self
            .directory
            .companies()?
            .into_iter()
            .map(|company| (company.company_id, company.company_name))
            .collect();
        let department_names: BTreeMap<DepartmentId, String> = self
            .directory
            .departments(company_id)?
            .into_iter()
            .map(|department| (department.department_id, department.department_name))
            .collect();

        let mut employees = self.directory.employees(company_id)?;
        employees.sort_by_cached_key(|employee| {
            let company = company_names.get(&employee.company_id);
            let department = employee
                .department_id
                .as_ref()
                .and_then(|id| department_names.get(id));
            (
                company.is_none(),
                company.cloned(),
                department.is_none(),
                department.cloned(),
                employee.name.clone(),
                employee.employee_id.clone(),
            )
        });
        debug!(
            company_id = company_id.map(CompanyId::as_str),
            count = employees.len(),
            "employee listing built"
        );
        Ok(employees)
    }

    pub fn employee(&self, id: &EmployeeId) -> Result<Employee, QualificationServiceError> {
        if id.as_str().trim().is_empty() {
            return Err(ValidationError::BlankEmployeeId.into());
        }
        self.directory
            .employee(id)?
            .ok_or_else(|| QualificationServiceError::not_found("employee", id))
    }

    /// Validity policies ordered by category, then name.
    pub fn policies(&self) -> Result<Vec<ValidityPolicy>, QualificationServiceError> {
        let mut policies = self.directory.policies()?;
        policies.sort_by(|left, right| {
            left.category
                .cmp(&right.category)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(policies)
    }

    // Loaded snapshots may already hold ids from the generated sequence; skip those.
    fn insert_with_fresh_id(
        &self,
        build: impl Fn(QualificationId) -> QualificationRecord,
    ) -> Result<QualificationRecord, QualificationServiceError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let candidate = build(next_qualification_id());
            let qualification_id = candidate.qualification_id.clone();
            match self.records.insert(candidate) {
                Err(RepositoryError::Conflict) => {
                    debug!(%qualification_id, attempt, "generated qualification id taken");
                }
                result => return Ok(result?),
            }
        }
        warn!(attempts = MAX_ID_ATTEMPTS, "no free qualification id found");
        Err(RepositoryError::Conflict.into())
    }

    fn resolve_policy(
        &self,
        policy_id: Option<&PolicyId>,
    ) -> Result<Option<ValidityPolicy>, QualificationServiceError> {
        let Some(policy_id) = policy_id else {
            return Ok(None);
        };
        if policy_id.as_str().trim().is_empty() {
            return Err(ValidationError::BlankPolicyReference.into());
        }

        let policy = self.directory.policy(policy_id)?.ok_or_else(|| {
            QualificationServiceError::not_found("qualification master", policy_id)
        })?;
        if !policy.active {
            warn!(policy_id = %policy_id, "inactive qualification master referenced");
            return Err(QualificationServiceError::InactivePolicy(policy_id.clone()));
        }
        Ok(Some(policy))
    }

    fn enriched_rows(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<EnrichedRow>, QualificationServiceError> {
        let mut rows = Vec::new();
        for record in self.records.all()? {
            let Some(employee) = self.directory.employee(&record.employee_id)? else {
                warn!(
                    qualification_id = %record.qualification_id,
                    employee_id = %record.employee_id,
                    "skipping qualification of unknown employee"
                );
                continue;
            };
            let Some(company) = self.directory.company(&employee.company_id)? else {
                warn!(
                    employee_id = %employee.employee_id,
                    company_id = %employee.company_id,
                    "skipping qualification of employee without company"
                );
                continue;
            };
            let department = match &employee.department_id {
                Some(department_id) => self.directory.department(department_id)?,
                None => None,
            };

            rows.push(EnrichedRow::enrich(
                &record,
                &employee,
                &company,
                department.as_ref(),
                today,
            ));
        }
        Ok(rows)
    }
}

fn validate_id(id: &QualificationId) -> Result<(), ValidationError> {
    if id.as_str().trim().is_empty() {
        Err(ValidationError::BlankQualificationId)
    } else {
        Ok(())
    }
}

fn validate_name(raw: &str) -> Result<&str, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::BlankName);
    }

    let found = name.chars().count();
    if found > MAX_QUALIFICATION_NAME_CHARS {
        return Err(ValidationError::NameTooLong {
            max: MAX_QUALIFICATION_NAME_CHARS,
            found,
        });
    }
    Ok(name)
}

fn validate_acquired(raw: &str, today: NaiveDate) -> Result<NaiveDate, QualificationServiceError> {
    let acquired = parse_calendar_date(raw)?;
    if acquired > today {
        return Err(ValidationError::FutureAcquisition { acquired, today }.into());
    }
    Ok(acquired)
}
