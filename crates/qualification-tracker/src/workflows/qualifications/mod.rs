//! Qualification lifecycle and expiration reporting.
//!
//! The calculator, classifier, filter and exporter are pure functions over
//! in-memory values; `today` and `now` are always passed in by the caller.
//! The service and router wrap them with validation, repository access and
//! logging.

pub mod domain;
pub mod expiration;
pub mod export;
pub mod filter;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod status;

#[cfg(test)]
mod tests;

pub use domain::{
    Company, CompanyId, Department, DepartmentId, Employee, EmployeeId, PolicyId,
    QualificationEdit, QualificationId, QualificationRecord, QualificationRegistration,
    ValidityPolicy,
};
pub use expiration::{
    compute_expiration, compute_expiration_from_raw, parse_calendar_date, Expiration,
    ExpirationError, ValidityPeriod,
};
pub use export::{export_rows, ColumnSpec, ExportError, ExportedTable, RowField};
pub use filter::{filter_rows, EnrichedRow, FilterCriteria, FilterError, FilterQuery};
pub use memory::{InMemoryDirectory, InMemoryQualificationRepository};
pub use repository::{DirectoryRepository, QualificationRepository, RepositoryError};
pub use router::{qualification_router, QualificationListing};
pub use service::{QualificationService, QualificationServiceError, ValidationError};
pub use snapshot::{DirectorySnapshot, SnapshotError, SnapshotQualification};
pub use status::{classify, ExpirationStatus};
