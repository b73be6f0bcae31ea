use qualification_tracker::workflows::qualifications::{
    parse_calendar_date, Company, CompanyId, Department, DepartmentId, DirectorySnapshot,
    Employee, EmployeeId, Expiration, PolicyId, QualificationId, SnapshotError,
    SnapshotQualification, ValidityPeriod, ValidityPolicy,
};

fn company(id: &str, name: &str) -> Company {
    Company {
        company_id: CompanyId::from(id),
        company_name: name.to_string(),
        active: true,
    }
}

fn department(id: &str, name: &str, company_id: &str) -> Department {
    Department {
        department_id: DepartmentId::from(id),
        department_name: name.to_string(),
        company_id: CompanyId::from(company_id),
        active: true,
    }
}

fn employee(id: &str, name: &str, email: &str, company_id: &str, department_id: &str) -> Employee {
    Employee {
        employee_id: EmployeeId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        company_id: CompanyId::from(company_id),
        department_id: Some(DepartmentId::from(department_id)),
    }
}

fn policy(id: &str, name: &str, category: &str, period: ValidityPeriod) -> ValidityPolicy {
    ValidityPolicy {
        policy_id: PolicyId::from(id),
        name: name.to_string(),
        category: Some(category.to_string()),
        validity_period: period,
        active: true,
    }
}

fn qualification(
    id: &str,
    employee_id: &str,
    name: &str,
    acquired: &str,
    expiration: Option<Expiration>,
    policy_id: &str,
) -> Result<SnapshotQualification, SnapshotError> {
    let qualification_id = QualificationId::from(id);
    let acquired_date =
        parse_calendar_date(acquired).map_err(|source| SnapshotError::Expiration {
            qualification_id: qualification_id.clone(),
            source,
        })?;

    Ok(SnapshotQualification {
        qualification_id,
        employee_id: EmployeeId::from(employee_id),
        qualification_name: name.to_string(),
        acquired_date,
        expiration_date: expiration,
        policy_id: Some(PolicyId::from(policy_id)),
    })
}

/// Five affiliated companies with a handful of employees and qualification masters.
pub(crate) fn seed_snapshot() -> Result<DirectorySnapshot, SnapshotError> {
    let qualifications = vec![
        qualification(
            "qual-tanaka-fe",
            "emp-tanaka",
            "Fundamental Information Technology Engineer",
            "2023-04-15",
            Some(Expiration::Permanent),
            "qual-master-fe",
        )?,
        qualification(
            "qual-sato-ap",
            "emp-sato",
            "Applied Information Technology Engineer",
            "2022-10-20",
            Some(Expiration::Permanent),
            "qual-master-ap",
        )?,
        qualification(
            "qual-suzuki-license",
            "emp-suzuki",
            "Ordinary Driver's License",
            "2022-08-01",
            None,
            "qual-master-license",
        )?,
    ];

    Ok(DirectorySnapshot {
        companies: vec![
            company("comp-honsha", "Head Office"),
            company("comp-a", "Affiliate A"),
            company("comp-b", "Affiliate B"),
            company("comp-c", "Affiliate C"),
            company("comp-d", "Affiliate D"),
        ],
        departments: vec![
            department("dept-honsha-kanri", "Administration", "comp-honsha"),
            department("dept-a-tech", "Engineering", "comp-a"),
            department("dept-b-sales", "Sales", "comp-b"),
        ],
        employees: vec![
            employee(
                "emp-tanaka",
                "Tanaka Taro",
                "tanaka@honsha.com",
                "comp-honsha",
                "dept-honsha-kanri",
            ),
            employee(
                "emp-sato",
                "Sato Hanako",
                "sato@comp-a.com",
                "comp-a",
                "dept-a-tech",
            ),
            employee(
                "emp-suzuki",
                "Suzuki Jiro",
                "suzuki@comp-b.com",
                "comp-b",
                "dept-b-sales",
            ),
        ],
        policies: vec![
            policy(
                "qual-master-fe",
                "Fundamental Information Technology Engineer",
                "IT",
                ValidityPeriod::Permanent,
            ),
            policy(
                "qual-master-ap",
                "Applied Information Technology Engineer",
                "IT",
                ValidityPeriod::Permanent,
            ),
            policy(
                "qual-master-license",
                "Ordinary Driver's License",
                "License",
                ValidityPeriod::Years(3),
            ),
            policy(
                "qual-master-boki",
                "Bookkeeping Level 2",
                "Accounting",
                ValidityPeriod::Permanent,
            ),
            policy(
                "qual-master-fp",
                "Financial Planner Level 2",
                "Finance",
                ValidityPeriod::Permanent,
            ),
        ],
        qualifications,
    })
}
