use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Company, CompanyId, Department, DepartmentId, Employee, EmployeeId, QualificationId,
    QualificationRecord,
};
use super::expiration::Expiration;
use super::status::{classify, days_until, ExpirationStatus};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unrecognized expiration status filter '{0}' (expected expired, warning or normal)")]
    InvalidStatus(String),
}

/// A qualification joined with the organizational names used for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRow {
    pub qualification_id: QualificationId,
    pub qualification_name: String,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub company_id: CompanyId,
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    pub acquired_date: NaiveDate,
    pub expiration_date: Expiration,
    pub status: ExpirationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_until_expiration: Option<i64>,
}

impl EnrichedRow {
    pub fn enrich(
        record: &QualificationRecord,
        employee: &Employee,
        company: &Company,
        department: Option<&Department>,
        today: NaiveDate,
    ) -> Self {
        Self {
            qualification_id: record.qualification_id.clone(),
            qualification_name: record.qualification_name.clone(),
            employee_id: employee.employee_id.clone(),
            employee_name: employee.name.clone(),
            company_id: company.company_id.clone(),
            company_name: company.company_name.clone(),
            department_id: department.map(|department| department.department_id.clone()),
            department_name: department.map(|department| department.department_name.clone()),
            acquired_date: record.acquired_date,
            expiration_date: record.expiration_date,
            status: classify(record.expiration_date, today),
            days_until_expiration: record
                .expiration_date
                .date()
                .map(|date| days_until(date, today)),
        }
    }
}

/// Filter parameters exactly as they arrive from a query string or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub expiration_status: Option<String>,
    #[serde(default)]
    pub search_keyword: Option<String>,
    /// Short alias accepted by the export link; `searchKeyword` wins when both are set.
    #[serde(default)]
    pub keyword: Option<String>,
}

/// Validated filter; every populated dimension must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub company_id: Option<CompanyId>,
    pub department_id: Option<DepartmentId>,
    pub expiration_status: Option<ExpirationStatus>,
    keyword: Option<String>,
}

impl FilterCriteria {
    pub fn from_query(query: &FilterQuery) -> Result<Self, FilterError> {
        let expiration_status = match non_blank(query.expiration_status.as_deref()) {
            Some(token) => Some(
                ExpirationStatus::from_token(token)
                    .ok_or_else(|| FilterError::InvalidStatus(token.to_string()))?,
            ),
            None => None,
        };

        let keyword = non_blank(query.search_keyword.as_deref())
            .or_else(|| non_blank(query.keyword.as_deref()));

        Ok(Self {
            company_id: non_blank(query.company_id.as_deref()).map(CompanyId::from),
            department_id: non_blank(query.department_id.as_deref()).map(DepartmentId::from),
            expiration_status,
            keyword: keyword.map(str::to_lowercase),
        })
    }

    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.company_id = Some(company_id);
        self
    }

    pub fn with_department(mut self, department_id: DepartmentId) -> Self {
        self.department_id = Some(department_id);
        self
    }

    pub fn with_status(mut self, status: ExpirationStatus) -> Self {
        self.expiration_status = Some(status);
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keyword = non_blank(Some(keyword)).map(str::to_lowercase);
        self
    }

    /// Lower-cased search keyword, if any.
    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn matches(&self, row: &EnrichedRow) -> bool {
        if let Some(company_id) = &self.company_id {
            if &row.company_id != company_id {
                return false;
            }
        }

        if let Some(department_id) = &self.department_id {
            if row.department_id.as_ref() != Some(department_id) {
                return false;
            }
        }

        if let Some(status) = self.expiration_status {
            if row.status != status {
                return false;
            }
        }

        match &self.keyword {
            Some(keyword) => {
                row.employee_name.to_lowercase().contains(keyword.as_str())
                    || row.qualification_name.to_lowercase().contains(keyword.as_str())
            }
            None => true,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Returns the rows matching `criteria` in report order.
pub fn filter_rows(rows: &[EnrichedRow], criteria: &FilterCriteria) -> Vec<EnrichedRow> {
    let mut selected: Vec<EnrichedRow> = rows
        .iter()
        .filter(|row| criteria.matches(row))
        .cloned()
        .collect();
    sort_rows(&mut selected);
    selected
}

/// Company, department (missing last), employee, qualification name, then id.
pub fn sort_rows(rows: &mut [EnrichedRow]) {
    rows.sort_by(report_order);
}

fn report_order(left: &EnrichedRow, right: &EnrichedRow) -> Ordering {
    left.company_name
        .cmp(&right.company_name)
        .then_with(|| {
            department_order(
                left.department_name.as_deref(),
                right.department_name.as_deref(),
            )
        })
        .then_with(|| left.employee_name.cmp(&right.employee_name))
        .then_with(|| left.qualification_name.cmp(&right.qualification_name))
        .then_with(|| left.qualification_id.cmp(&right.qualification_id))
}

fn department_order(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
