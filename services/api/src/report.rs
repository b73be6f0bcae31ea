use crate::infra::{build_service, parse_date, FilterArgs};
use chrono::{Local, NaiveDate};
use clap::Args;
use qualification_tracker::error::AppError;
use qualification_tracker::workflows::qualifications::{
    EnrichedRow, ExpirationStatus, FilterCriteria, QualificationListing,
    QualificationServiceError,
};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Directory snapshot (JSON); defaults to the built-in seed data
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Reference date for status classification (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the listing as JSON instead of a text table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Directory snapshot (JSON); defaults to the built-in seed data
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) filters: FilterArgs,
    /// Reference date for status classification (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Directory receiving the CSV under its suggested filename; stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        data,
        filters,
        today,
        json,
    } = args;

    let service = build_service(data.as_deref())?;
    let criteria = criteria_from(&filters)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let rows = service.list_all(&criteria, today)?;

    if json {
        let listing = QualificationListing {
            today,
            count: rows.len(),
            rows,
        };
        let rendered = serde_json::to_string_pretty(&listing)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        print!("{}", render_listing(&rows, today));
    }
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        data,
        filters,
        today,
        output,
    } = args;

    let service = build_service(data.as_deref())?;
    let criteria = criteria_from(&filters)?;
    let now = Local::now().naive_local();
    let today = today.unwrap_or_else(|| now.date());
    let table = service.export(&criteria, today, now)?;

    match output {
        Some(dir) => {
            let path = dir.join(&table.suggested_filename);
            std::fs::write(&path, table.content.as_bytes())?;
            println!("Exported qualifications to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(table.content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn criteria_from(filters: &FilterArgs) -> Result<FilterCriteria, QualificationServiceError> {
    Ok(FilterCriteria::from_query(&filters.to_query())?)
}

/// Status tally followed by one line per row.
pub(crate) fn render_listing(rows: &[EnrichedRow], today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Qualification expiration report ({today})");

    let tally: Vec<String> = ExpirationStatus::ordered()
        .into_iter()
        .map(|status| {
            let count = rows.iter().filter(|row| row.status == status).count();
            format!("{}: {count}", status.label())
        })
        .collect();
    let _ = writeln!(out, "{}", tally.join("  "));

    if rows.is_empty() {
        let _ = writeln!(out, "\nNo qualifications match the given filters.");
        return out;
    }

    out.push('\n');
    for row in rows {
        let department = row.department_name.as_deref().unwrap_or("-");
        let remaining = match row.days_until_expiration {
            Some(days) if days < 0 => format!("{} days overdue", -days),
            Some(days) => format!("{days} days left"),
            None => "no expiry".to_string(),
        };
        let _ = writeln!(
            out,
            "[{:<7}] {} / {} / {} - {} (expires {}, {})",
            row.status.label(),
            row.company_name,
            department,
            row.employee_name,
            row.qualification_name,
            row.expiration_date,
            remaining
        );
    }
    out
}
