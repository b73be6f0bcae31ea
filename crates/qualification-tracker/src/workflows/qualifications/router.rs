use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::domain::{
    CompanyId, DepartmentId, EmployeeId, QualificationEdit, QualificationId, QualificationRegistration,
};
use super::expiration::parse_calendar_date;
use super::filter::{EnrichedRow, FilterCriteria, FilterQuery};
use super::repository::{DirectoryRepository, QualificationRepository, RepositoryError};
use super::service::{QualificationService, QualificationServiceError};
use crate::error::AppError;

/// Router exposing the listing, export, CRUD, employee and master-data endpoints.
pub fn qualification_router<Q, D>(service: Arc<QualificationService<Q, D>>) -> Router
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/qualifications", post(register_handler::<Q, D>))
        .route(
            "/api/v1/qualifications/all-employees",
            get(listing_handler::<Q, D>),
        )
        .route("/api/v1/qualifications/export", get(export_handler::<Q, D>))
        .route(
            "/api/v1/qualifications/:qualification_id",
            get(get_handler::<Q, D>)
                .put(update_handler::<Q, D>)
                .delete(delete_handler::<Q, D>),
        )
        .route("/api/v1/employees", get(employees_handler::<Q, D>))
        .route(
            "/api/v1/employees/company/:company_id",
            get(company_employees_handler::<Q, D>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            get(employee_detail_handler::<Q, D>),
        )
        .route(
            "/api/v1/employees/:employee_id/qualifications",
            get(employee_handler::<Q, D>),
        )
        .route("/api/v1/companies", get(companies_handler::<Q, D>))
        .route(
            "/api/v1/companies/:company_id",
            get(company_handler::<Q, D>),
        )
        .route("/api/v1/departments", get(departments_handler::<Q, D>))
        .route(
            "/api/v1/departments/:department_id",
            get(department_handler::<Q, D>),
        )
        .route(
            "/api/v1/qualification-masters",
            get(policies_handler::<Q, D>),
        )
        .with_state(service)
}

impl QualificationServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Expiration(_) | Self::Filter(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. }
            | Self::InactivePolicy(_)
            | Self::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } | Self::Repository(RepositoryError::Conflict) => {
                StatusCode::CONFLICT
            }
            Self::Repository(RepositoryError::Unavailable(_)) | Self::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Filter parameters plus an optional `today` override for the reference date.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(flatten)]
    pub(crate) filter: FilterQuery,
    #[serde(default)]
    pub(crate) today: Option<String>,
}

impl ReportQuery {
    fn resolve(&self) -> Result<(FilterCriteria, NaiveDate), QualificationServiceError> {
        let criteria = FilterCriteria::from_query(&self.filter)?;
        let today = match self.today.as_deref().filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => parse_calendar_date(raw)?,
            None => Local::now().date_naive(),
        };
        Ok((criteria, today))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DepartmentQuery {
    #[serde(default)]
    pub(crate) company_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationListing {
    pub today: NaiveDate,
    pub count: usize,
    pub rows: Vec<EnrichedRow>,
}

pub(crate) async fn listing_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<QualificationListing>, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let (criteria, today) = query.resolve()?;
    let rows = service.list_all(&criteria, today)?;
    Ok(Json(QualificationListing {
        today,
        count: rows.len(),
        rows,
    }))
}

pub(crate) async fn export_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let (criteria, today) = query.resolve()?;
    let table = service.export(&criteria, today, Local::now().naive_local())?;
    let disposition = format!("attachment; filename=\"{}\"", table.suggested_filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        table.content,
    ))
}

pub(crate) async fn register_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Json(form): Json<QualificationRegistration>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let record = service.register(form, Local::now().date_naive())?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn get_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(qualification_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let record = service.get(&QualificationId(qualification_id))?;
    Ok(Json(record))
}

pub(crate) async fn update_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(qualification_id): Path<String>,
    Json(form): Json<QualificationEdit>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let record = service.update(
        &QualificationId(qualification_id),
        form,
        Local::now().date_naive(),
    )?;
    Ok(Json(record))
}

pub(crate) async fn delete_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(qualification_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    service.delete(&QualificationId(qualification_id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn employee_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(employee_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let records = service.list_for_employee(&EmployeeId(employee_id))?;
    Ok(Json(records))
}

pub(crate) async fn employees_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Ok(Json(service.employees(None)?))
}

pub(crate) async fn company_employees_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(company_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let company_id = CompanyId(company_id);
    service.company(&company_id)?;
    Ok(Json(service.employees(Some(&company_id))?))
}

pub(crate) async fn employee_detail_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(employee_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Ok(Json(service.employee(&EmployeeId(employee_id))?))
}

pub(crate) async fn company_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(company_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Ok(Json(service.company(&CompanyId(company_id))?))
}

pub(crate) async fn department_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Path(department_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Ok(Json(service.department(&DepartmentId(department_id))?))
}

pub(crate) async fn companies_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Ok(Json(service.companies()?))
}

pub(crate) async fn departments_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
    Query(query): Query<DepartmentQuery>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let company_id = query
        .company_id
        .filter(|id| !id.trim().is_empty())
        .map(CompanyId);
    Ok(Json(service.departments(company_id.as_ref())?))
}

pub(crate) async fn policies_handler<Q, D>(
    State(service): State<Arc<QualificationService<Q, D>>>,
) -> Result<impl IntoResponse, AppError>
where
    Q: QualificationRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Ok(Json(service.policies()?))
}
