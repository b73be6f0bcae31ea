use chrono::NaiveDate;
use qualification_tracker::workflows::qualifications::{
    export_rows, ColumnSpec, CompanyId, DepartmentId, EmployeeId, EnrichedRow, Expiration,
    ExpirationStatus, QualificationId, RowField,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn row(id: &str, employee: &str, name: &str, department: Option<&str>) -> EnrichedRow {
    EnrichedRow {
        qualification_id: QualificationId::from(id),
        qualification_name: name.to_string(),
        employee_id: EmployeeId::from("emp-001"),
        employee_name: employee.to_string(),
        company_id: CompanyId::from("comp-a"),
        company_name: "Affiliate A".to_string(),
        department_id: department.map(DepartmentId::from),
        department_name: department.map(str::to_string),
        acquired_date: date(2023, 4, 15),
        expiration_date: Expiration::On(date(2026, 4, 15)),
        status: ExpirationStatus::Normal,
        days_until_expiration: Some(683),
    }
}

#[test]
fn exported_table_reads_back_field_for_field() {
    let rows = vec![
        row("qual-1", "Sato, Hanako", "AWS \"Pro\" Tier", Some("Engineering")),
        row("qual-2", "Tanaka\nIchiro", "情報処理安全確保支援士", None),
        row("qual-3", "  Kato  ", "CPR", Some("Sales")),
    ];
    let now = date(2024, 6, 1).and_hms_opt(17, 45, 12).expect("valid time");

    let table = export_rows(&rows, &ColumnSpec::standard(), now).expect("export succeeds");
    assert_eq!(table.suggested_filename, "qualifications_export_20240601_1745.csv");
    assert!(table.content.ends_with("\r\n"));
    assert!(table.content.contains("\"Sato, Hanako\""));
    assert!(table.content.contains("\"AWS \"\"Pro\"\" Tier\""));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(table.content.as_bytes());

    let headers = reader.headers().expect("headers").clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "Employee ID",
            "Employee Name",
            "Company",
            "Department",
            "Qualification",
            "Acquired Date",
            "Expiration Date",
            "Status"
        ]
    );

    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records parse");
    assert_eq!(records.len(), rows.len());

    for (record, source) in records.iter().zip(&rows) {
        assert_eq!(&record[1], source.employee_name);
        assert_eq!(&record[3], source.department_name.as_deref().unwrap_or(""));
        assert_eq!(&record[4], source.qualification_name);
        assert_eq!(&record[6], "2026-04-15");
        assert_eq!(&record[7], "Normal");
    }
}

#[test]
fn custom_columns_follow_the_given_order() {
    let columns = vec![
        ColumnSpec::new("ID", RowField::QualificationId),
        ColumnSpec::new("Status", RowField::Status),
        ColumnSpec::new("Expires", RowField::ExpirationDate),
    ];
    let mut permanent = row("qual-9", "Sato Hanako", "Applied IT Engineer", None);
    permanent.expiration_date = Expiration::Permanent;
    let now = date(2024, 1, 2).and_hms_opt(0, 0, 0).expect("valid time");

    let table = export_rows(&[permanent], &columns, now).expect("export succeeds");

    assert_eq!(table.content, "ID,Status,Expires\r\nqual-9,Normal,permanent\r\n");
}

#[test]
fn empty_selection_yields_header_only() {
    let now = date(2024, 1, 2).and_hms_opt(0, 0, 0).expect("valid time");
    let table = export_rows(&[], &ColumnSpec::standard(), now).expect("export succeeds");
    assert_eq!(
        table.content,
        "Employee ID,Employee Name,Company,Department,Qualification,Acquired Date,Expiration Date,Status\r\n"
    );
}
