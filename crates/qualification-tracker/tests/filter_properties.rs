use chrono::NaiveDate;
use proptest::collection::vec;
use proptest::prelude::*;
use qualification_tracker::workflows::qualifications::{
    filter_rows, CompanyId, DepartmentId, EmployeeId, EnrichedRow, Expiration, ExpirationStatus,
    FilterCriteria, FilterQuery, QualificationId,
};

const COMPANIES: [(&str, &str); 3] = [
    ("comp-a", "Affiliate A"),
    ("comp-b", "Affiliate B"),
    ("comp-honsha", "Head Office"),
];
const DEPARTMENTS: [&str; 3] = ["Engineering", "Sales", "Administration"];
const EMPLOYEES: [&str; 4] = ["Sato Hanako", "Tanaka Ichiro", "Kato Jiro", "Suzuki Aiko"];
const QUALIFICATIONS: [&str; 4] = ["AWS SAA", "Applied IT Engineer", "TOEIC 800", "CPR"];
const STATUSES: [ExpirationStatus; 3] = [
    ExpirationStatus::Normal,
    ExpirationStatus::Warning,
    ExpirationStatus::Expired,
];

fn build_row(index: usize, picks: (usize, Option<usize>, usize, usize, usize)) -> EnrichedRow {
    let (company, department, employee, qualification, status) = picks;
    let (company_id, company_name) = COMPANIES[company];
    EnrichedRow {
        qualification_id: QualificationId(format!("qual-{index:04}")),
        qualification_name: QUALIFICATIONS[qualification].to_string(),
        employee_id: EmployeeId(format!("emp-{employee}")),
        employee_name: EMPLOYEES[employee].to_string(),
        company_id: CompanyId::from(company_id),
        company_name: company_name.to_string(),
        department_id: department.map(|dept| DepartmentId(format!("dept-{dept}"))),
        department_name: department.map(|dept| DEPARTMENTS[dept].to_string()),
        acquired_date: NaiveDate::from_ymd_opt(2023, 4, 15).expect("valid date"),
        expiration_date: Expiration::Permanent,
        status: STATUSES[status],
        days_until_expiration: None,
    }
}

fn rows_strategy() -> impl Strategy<Value = Vec<EnrichedRow>> {
    vec(
        (0..3usize, proptest::option::of(0..3usize), 0..4usize, 0..4usize, 0..3usize),
        0..40,
    )
    .prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(index, pick)| build_row(index, pick))
            .collect()
    })
}

/// Indices of the populated filter dimensions; `None` leaves a dimension open.
#[derive(Debug, Clone, Copy, Default)]
struct Constraints {
    company: Option<usize>,
    department: Option<usize>,
    status: Option<usize>,
    keyword: Option<&'static str>,
}

impl Constraints {
    fn criteria(self) -> FilterCriteria {
        let mut criteria = FilterCriteria::default();
        if let Some(company) = self.company {
            criteria = criteria.with_company(CompanyId::from(COMPANIES[company].0));
        }
        if let Some(department) = self.department {
            criteria = criteria.with_department(DepartmentId(format!("dept-{department}")));
        }
        if let Some(status) = self.status {
            criteria = criteria.with_status(STATUSES[status]);
        }
        if let Some(keyword) = self.keyword {
            criteria = criteria.with_keyword(keyword);
        }
        criteria
    }

    fn relaxations(self) -> [Self; 5] {
        [
            Self { company: None, ..self },
            Self { department: None, ..self },
            Self { status: None, ..self },
            Self { keyword: None, ..self },
            Self::default(),
        ]
    }
}

fn constraints_strategy() -> impl Strategy<Value = Constraints> {
    (
        proptest::option::of(0..3usize),
        proptest::option::of(0..3usize),
        proptest::option::of(0..3usize),
        proptest::option::of(prop_oneof![
            Just("sato"),
            Just("AWS"),
            Just("engineer"),
            Just("ichiro"),
        ]),
    )
        .prop_map(|(company, department, status, keyword)| Constraints {
            company,
            department,
            status,
            keyword,
        })
}

fn ids(rows: &[EnrichedRow]) -> Vec<&str> {
    rows.iter().map(|row| row.qualification_id.as_str()).collect()
}

proptest! {
    /// Filtering an already filtered set changes nothing.
    #[test]
    fn filtering_is_idempotent(rows in rows_strategy(), constraints in constraints_strategy()) {
        let criteria = constraints.criteria();
        let once = filter_rows(&rows, &criteria);
        let twice = filter_rows(&once, &criteria);
        prop_assert_eq!(once, twice);
    }

    /// Every returned row satisfies every populated constraint.
    #[test]
    fn results_satisfy_all_constraints(
        rows in rows_strategy(),
        constraints in constraints_strategy(),
    ) {
        let criteria = constraints.criteria();
        for row in filter_rows(&rows, &criteria) {
            prop_assert!(criteria.matches(&row));
            if let Some(company_id) = &criteria.company_id {
                prop_assert_eq!(&row.company_id, company_id);
            }
            if let Some(status) = criteria.expiration_status {
                prop_assert_eq!(row.status, status);
            }
        }
    }

    /// Dropping a constraint can only keep or grow the result set.
    #[test]
    fn relaxing_constraints_never_shrinks_results(
        rows in rows_strategy(),
        constraints in constraints_strategy(),
    ) {
        let strict = filter_rows(&rows, &constraints.criteria());
        let strict_ids = ids(&strict);

        for relaxed in constraints.relaxations() {
            let wider = filter_rows(&rows, &relaxed.criteria());
            let wider_ids = ids(&wider);
            for id in &strict_ids {
                prop_assert!(wider_ids.contains(id));
            }
        }
    }

    /// Output order does not depend on input order.
    #[test]
    fn ordering_is_deterministic(rows in rows_strategy(), constraints in constraints_strategy()) {
        let criteria = constraints.criteria();
        let mut reversed = rows.clone();
        reversed.reverse();
        prop_assert_eq!(filter_rows(&rows, &criteria), filter_rows(&reversed, &criteria));
    }
}

#[test]
fn company_and_status_filters_combine() {
    let rows: Vec<EnrichedRow> = [
        (0, Some(0), 0, 0, 2),
        (0, Some(1), 1, 1, 0),
        (1, Some(0), 2, 2, 2),
        (0, None, 3, 3, 2),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, pick)| build_row(index, pick))
    .collect();

    let query = FilterQuery {
        company_id: Some("comp-a".to_string()),
        expiration_status: Some("expired".to_string()),
        ..FilterQuery::default()
    };
    let both = FilterCriteria::from_query(&query).expect("valid query");
    assert_eq!(ids(&filter_rows(&rows, &both)), vec!["qual-0000", "qual-0003"]);

    let company_only = FilterCriteria::default().with_company(CompanyId::from("comp-a"));
    assert_eq!(filter_rows(&rows, &company_only).len(), 3);

    let status_only = FilterCriteria::default().with_status(ExpirationStatus::Expired);
    assert_eq!(filter_rows(&rows, &status_only).len(), 3);
    assert_eq!(both.company_id, company_only.company_id);
}
