use std::borrow::Cow;

use chrono::NaiveDateTime;

use super::filter::EnrichedRow;

const FILENAME_PREFIX: &str = "qualifications_export";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode export row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export buffer: {0}")]
    Flush(String),
    #[error("export buffer is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Row attribute rendered into an export column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    QualificationId,
    EmployeeId,
    EmployeeName,
    CompanyName,
    DepartmentName,
    QualificationName,
    AcquiredDate,
    ExpirationDate,
    Status,
}

impl RowField {
    fn render(self, row: &EnrichedRow) -> Cow<'_, str> {
        match self {
            Self::QualificationId => Cow::Borrowed(row.qualification_id.as_str()),
            Self::EmployeeId => Cow::Borrowed(row.employee_id.as_str()),
            Self::EmployeeName => Cow::Borrowed(&row.employee_name),
            Self::CompanyName => Cow::Borrowed(&row.company_name),
            Self::DepartmentName => Cow::Borrowed(row.department_name.as_deref().unwrap_or("")),
            Self::QualificationName => Cow::Borrowed(&row.qualification_name),
            Self::AcquiredDate => Cow::Owned(row.acquired_date.format("%Y-%m-%d").to_string()),
            Self::ExpirationDate => Cow::Owned(row.expiration_date.to_string()),
            Self::Status => Cow::Borrowed(row.status.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub label: String,
    pub field: RowField,
}

impl ColumnSpec {
    pub fn new(label: impl Into<String>, field: RowField) -> Self {
        Self {
            label: label.into(),
            field,
        }
    }

    /// Column layout used by the HTTP and CLI exports.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("Employee ID", RowField::EmployeeId),
            Self::new("Employee Name", RowField::EmployeeName),
            Self::new("Company", RowField::CompanyName),
            Self::new("Department", RowField::DepartmentName),
            Self::new("Qualification", RowField::QualificationName),
            Self::new("Acquired Date", RowField::AcquiredDate),
            Self::new("Expiration Date", RowField::ExpirationDate),
            Self::new("Status", RowField::Status),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTable {
    pub content: String,
    pub suggested_filename: String,
}

/// Writes `rows` as RFC 4180 CSV with CRLF line endings.
///
/// Fields are quoted only when they contain a comma, a double quote or a line
/// break; embedded quotes are doubled. A record made of one empty field is a
/// bare line break.
pub fn export_rows(
    rows: &[EnrichedRow],
    columns: &[ColumnSpec],
    now: NaiveDateTime,
) -> Result<ExportedTable, ExportError> {
    let mut builder = csv::WriterBuilder::new();
    builder
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary);

    let mut buffer = Vec::new();
    let header: Vec<Cow<'_, str>> = columns
        .iter()
        .map(|column| Cow::Borrowed(column.label.as_str()))
        .collect();
    write_line(&builder, &mut buffer, &header)?;

    for row in rows {
        let fields: Vec<Cow<'_, str>> = columns
            .iter()
            .map(|column| column.field.render(row))
            .collect();
        write_line(&builder, &mut buffer, &fields)?;
    }

    Ok(ExportedTable {
        content: String::from_utf8(buffer)?,
        suggested_filename: suggested_filename(now),
    })
}

// csv quotes a lone empty field; the export keeps the line empty.
fn write_line(
    builder: &csv::WriterBuilder,
    buffer: &mut Vec<u8>,
    fields: &[Cow<'_, str>],
) -> Result<(), ExportError> {
    if let [only] = fields {
        if only.is_empty() {
            buffer.extend_from_slice(b"\r\n");
            return Ok(());
        }
    }

    let mut writer = builder.from_writer(&mut *buffer);
    writer.write_record(fields.iter().map(|field| field.as_bytes()))?;
    writer
        .flush()
        .map_err(|err| ExportError::Flush(err.to_string()))
}

pub fn suggested_filename(now: NaiveDateTime) -> String {
    format!("{FILENAME_PREFIX}_{}.csv", now.format("%Y%m%d_%H%M"))
}
