use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use qualification_tracker::error::AppError;
use qualification_tracker::workflows::qualifications::{
    parse_calendar_date, DirectorySnapshot, FilterQuery, InMemoryDirectory,
    InMemoryQualificationRepository, QualificationService,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

use crate::seed::seed_snapshot;

pub(crate) type MemoryService =
    QualificationService<InMemoryQualificationRepository, InMemoryDirectory>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Filter flags shared by the `report` and `export` commands.
#[derive(clap::Args, Debug, Default, Clone)]
pub(crate) struct FilterArgs {
    /// Restrict to one company id
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Restrict to one department id
    #[arg(long)]
    pub(crate) department: Option<String>,
    /// Restrict to one status: expired, warning or normal
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Case-insensitive match against employee or qualification name
    #[arg(long)]
    pub(crate) keyword: Option<String>,
}

impl FilterArgs {
    pub(crate) fn to_query(&self) -> FilterQuery {
        FilterQuery {
            company_id: self.company.clone(),
            department_id: self.department.clone(),
            expiration_status: self.status.clone(),
            search_keyword: self.keyword.clone(),
            keyword: None,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(raw).map_err(|err| err.to_string())
}

/// Service over the snapshot at `path`, or over the built-in seed when none is given.
pub(crate) fn build_service(path: Option<&Path>) -> Result<MemoryService, AppError> {
    let snapshot = match path {
        Some(path) => {
            info!(path = %path.display(), "loading directory snapshot");
            DirectorySnapshot::from_path(path)?
        }
        None => {
            info!("no snapshot configured; using built-in seed data");
            seed_snapshot()?
        }
    };

    let (records, directory) = snapshot.into_stores()?;
    Ok(QualificationService::new(
        Arc::new(records),
        Arc::new(directory),
    ))
}
