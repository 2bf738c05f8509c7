//! Get-or-create access to the per-employee-per-year Leave Summary.

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::model::employee::Employee;
use crate::model::leave_summary::LeaveSummary;
use crate::store::LeaveStore;

use super::entitlement;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2200;

/// Fetch the summary row for `(employee, year)`, creating it seeded with the
/// tenure-derived annual entitlement when absent. On every read the stored
/// entitlement is checked against a fresh computation and healed in place if
/// it went stale (e.g. after a hire-date correction).
pub(crate) fn get_or_create<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    year: i32,
) -> EngineResult<LeaveSummary> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(EngineError::validation(format!(
            "unsupported leave year {year}"
        )));
    }
    let hire_date = employee.hire_date.ok_or_else(|| {
        EngineError::integrity(format!(
            "employee {} has no hire date on record",
            employee.id
        ))
    })?;
    let entitlement = f64::from(entitlement::annual_entitlement_days(hire_date, year));

    match store.get_summary(employee.id, year)? {
        Some(summary) => {
            if summary.annual_leave_entitlement != entitlement {
                tracing::warn!(
                    employee_id = employee.id,
                    year,
                    stored = summary.annual_leave_entitlement,
                    computed = entitlement,
                    "healing stale annual entitlement"
                );
                return store.update_summary(employee.id, year, &mut |s| {
                    s.annual_leave_entitlement = entitlement;
                    Ok(())
                });
            }
            Ok(summary)
        }
        None => {
            let summary = LeaveSummary::seeded(employee.id, year, entitlement, policy);
            store.upsert_summary(&summary)?;
            tracing::info!(employee_id = employee.id, year, entitlement, "leave summary created");
            Ok(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LeaveSummaryStore, MemoryStore};
    use chrono::NaiveDate;

    fn employee(id: u64, hire: Option<NaiveDate>) -> Employee {
        Employee {
            id,
            employee_code: format!("EMP-{id:03}"),
            first_name: "Test".into(),
            last_name: "Person".into(),
            hire_date: hire,
            gender: None,
            status: "active".into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn creates_seeded_summary_on_first_access() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1, Some(date(2020, 1, 1)));

        let summary = get_or_create(&store, &policy, &emp, 2025).unwrap();
        assert_eq!(summary.annual_leave_entitlement, 30.0);
        assert_eq!(summary.sick_leave_full_pay, 15.0);
        assert!(store.get_summary(1, 2025).unwrap().is_some());
    }

    #[test]
    fn heals_stale_entitlement_on_read() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1, Some(date(2020, 1, 1)));

        let mut summary = LeaveSummary::seeded(1, 2025, 12.0, &policy);
        summary.annual_leave_used = 3.0;
        store.upsert_summary(&summary).unwrap();

        let healed = get_or_create(&store, &policy, &emp, 2025).unwrap();
        assert_eq!(healed.annual_leave_entitlement, 30.0);
        // Usage is untouched by the heal.
        assert_eq!(healed.annual_leave_used, 3.0);
    }

    #[test]
    fn missing_hire_date_is_an_integrity_error() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1, None);

        let err = get_or_create(&store, &policy, &emp, 2025).unwrap_err();
        assert!(matches!(err, EngineError::Integrity { .. }));
    }

    #[test]
    fn absurd_year_is_rejected() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1, Some(date(2020, 1, 1)));

        let err = get_or_create(&store, &policy, &emp, 99_999_999).unwrap_err();
        assert!(matches!(err, EngineError::Validation { .. }));
    }
}
