//! Per-type leave request validators.
//!
//! Validators are read-only: they look at the Leave Summary, sibling leave
//! requests, and overtime records, and never mutate anything. Counts are
//! always taken from live store state at call time, never from cached
//! counters, so back-to-back evaluations see each other's pending requests.

use chrono::{Duration, NaiveDate};

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::model::employee::Employee;
use crate::model::leave_request::{CompensationMethod, LeaveStatus, LeaveType};
use crate::model::overtime::OvertimeStatus;
use crate::store::{LeaveStore, RequestFilter};

use super::{dates, summary};

/// Outcome of a validator run. `balance` is what is currently available for
/// the requested type, `projected_balance` what would remain after granting.
#[derive(Debug, Clone)]
pub struct Validation {
    pub valid: bool,
    pub message: Option<String>,
    pub balance: Option<f64>,
    pub projected_balance: Option<f64>,
}

impl Validation {
    fn pass(balance: Option<f64>, projected_balance: Option<f64>) -> Self {
        Self {
            valid: true,
            message: None,
            balance,
            projected_balance,
        }
    }

    fn fail(
        message: impl Into<String>,
        balance: Option<f64>,
        projected_balance: Option<f64>,
    ) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            balance,
            projected_balance,
        }
    }
}

/// Parameters a validator needs about the request under consideration.
pub(crate) struct RequestFacts<'a> {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub number_of_days: f64,
    pub compensation_method: Option<CompensationMethod>,
    pub relationship: Option<&'a str>,
    pub overtime_request_ids: &'a [u64],
}

/// Dispatch to the validator for the request's leave type. Adding a leave
/// type extends this match and the mutation dispatch; the compiler flags
/// both.
pub(crate) fn validate_request<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    facts: &RequestFacts<'_>,
    year: i32,
) -> EngineResult<Validation> {
    match facts.leave_type {
        LeaveType::Annual => {
            validate_annual(store, policy, employee, facts.number_of_days, year)
        }
        LeaveType::Wfh => validate_wfh(store, policy, employee, facts.start_date, year),
        LeaveType::Emergency => validate_emergency(store, policy, employee, facts, year),
        LeaveType::Toil => validate_toil(store, policy, employee, facts.overtime_request_ids),
        LeaveType::Bereavement => Ok(validate_bereavement(
            facts.relationship,
            facts.number_of_days,
        )),
        LeaveType::Sick => validate_sick(store, policy, employee, facts.number_of_days, year),
        LeaveType::Maternity => {
            validate_maternity(store, policy, employee, facts.number_of_days, year)
        }
    }
}

fn validate_annual<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    requested_days: f64,
    year: i32,
) -> EngineResult<Validation> {
    let summary = summary::get_or_create(store, policy, employee, year)?;
    let available = summary.annual_available();
    let projected = available - requested_days;
    if requested_days > available {
        return Ok(Validation::fail(
            format!(
                "Insufficient annual leave balance: requested {requested_days} day(s), available {available}"
            ),
            Some(available),
            Some(projected),
        ));
    }
    Ok(Validation::pass(Some(available), Some(projected)))
}

/// Weekly and monthly counts are recomputed from pending + approved requests
/// in the Sunday-start week and calendar month containing the requested date.
/// The stored rolling counters are deliberately ignored here.
fn validate_wfh<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    requested_date: NaiveDate,
    year: i32,
) -> EngineResult<Validation> {
    let summary = summary::get_or_create(store, policy, employee, year)?;
    let week_start = dates::week_start(requested_date);
    let week_end = week_start + Duration::days(6);
    let (month_start, month_end) = dates::month_bounds(requested_date);

    let existing = store.list_requests(&RequestFilter {
        employee_id: Some(employee.id),
        leave_type: Some(LeaveType::Wfh),
        statuses: vec![LeaveStatus::Pending, LeaveStatus::Approved],
        start_from: Some(week_start.min(month_start)),
        start_to: Some(week_end.max(month_end)),
    })?;

    let week_count = existing
        .iter()
        .filter(|r| dates::week_start(r.start_date) == week_start)
        .count() as u32;
    let month_count = existing
        .iter()
        .filter(|r| r.start_date >= month_start && r.start_date <= month_end)
        .count() as u32;

    if week_count >= summary.wfh_weekly_limit {
        return Ok(Validation::fail(
            format!(
                "Weekly work-from-home limit of {} reached for the week of {week_start}",
                summary.wfh_weekly_limit
            ),
            Some(0.0),
            Some(0.0),
        ));
    }
    if month_count >= summary.wfh_monthly_limit {
        return Ok(Validation::fail(
            format!(
                "Monthly work-from-home limit of {} reached for {}",
                summary.wfh_monthly_limit,
                requested_date.format("%B %Y")
            ),
            Some(0.0),
            Some(0.0),
        ));
    }

    let remaining_this_week = f64::from(summary.wfh_weekly_limit - week_count);
    Ok(Validation::pass(
        Some(remaining_this_week),
        Some(remaining_this_week - 1.0),
    ))
}

/// Emergency leave only gates the balance when it is charged to annual
/// leave; the unpaid and makeup-hours paths carry no balance check.
fn validate_emergency<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    facts: &RequestFacts<'_>,
    year: i32,
) -> EngineResult<Validation> {
    if facts.compensation_method != Some(CompensationMethod::AnnualLeave) {
        return Ok(Validation::pass(None, None));
    }
    let inner = validate_annual(store, policy, employee, facts.number_of_days, year)?;
    if inner.valid {
        return Ok(inner);
    }
    Ok(Validation::fail(
        format!(
            "Emergency leave charged to annual leave: {}",
            inner.message.unwrap_or_default()
        ),
        inner.balance,
        inner.projected_balance,
    ))
}

/// Sum the hours of the referenced overtime records, insisting that each one
/// exists, belongs to the employee, and is approved. Ownership and status
/// problems come back as `Validation` errors; an unknown id is `NotFound`.
pub(crate) fn approved_toil_hours<S: LeaveStore>(
    store: &S,
    employee_id: u64,
    overtime_request_ids: &[u64],
) -> EngineResult<f64> {
    let mut total = 0.0;
    for &id in overtime_request_ids {
        let overtime = store
            .get_overtime_request(id)?
            .ok_or_else(|| EngineError::not_found("overtime request", id))?;
        if overtime.employee_id != employee_id {
            return Err(EngineError::validation(format!(
                "Overtime request {id} does not belong to employee {employee_id}"
            )));
        }
        if overtime.status != OvertimeStatus::Approved {
            return Err(EngineError::validation(format!(
                "Overtime request {id} is not approved"
            )));
        }
        total += overtime.requested_hours;
    }
    Ok(total)
}

fn validate_toil<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    overtime_request_ids: &[u64],
) -> EngineResult<Validation> {
    if overtime_request_ids.is_empty() {
        return Ok(Validation::fail(
            "At least one approved overtime request must be selected",
            None,
            None,
        ));
    }
    let total_hours = match approved_toil_hours(store, employee.id, overtime_request_ids) {
        Ok(total) => total,
        Err(EngineError::Validation { message, .. }) => {
            return Ok(Validation::fail(message, None, None));
        }
        Err(other) => return Err(other),
    };
    if total_hours < policy.toil_hours_per_day {
        return Ok(Validation::fail(
            format!(
                "At least {} overtime hours are required for a day in lieu, selected records total {total_hours}",
                policy.toil_hours_per_day
            ),
            Some(total_hours),
            None,
        ));
    }
    let days = (total_hours / policy.toil_hours_per_day).floor();
    Ok(Validation::pass(Some(total_hours), Some(days)))
}

/// No stored balance: the entitlement is derived from the relationship on
/// the fly (spouse 5 days, anyone else 3) and tracked case by case.
fn validate_bereavement(relationship: Option<&str>, requested_days: f64) -> Validation {
    let relationship = match relationship {
        Some(rel) if !rel.trim().is_empty() => rel,
        _ => {
            return Validation::fail(
                "Relationship to the deceased is required for bereavement leave",
                None,
                None,
            );
        }
    };
    let entitled = bereavement_entitlement_days(relationship);
    Validation::pass(Some(entitled), Some(entitled - requested_days))
}

pub(crate) fn bereavement_entitlement_days(relationship: &str) -> f64 {
    if relationship.trim().eq_ignore_ascii_case("spouse") {
        5.0
    } else {
        3.0
    }
}

/// Pass-through: sick leave is enforced by company policy outside the
/// automated gate; the balance comes along for display only.
fn validate_sick<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    requested_days: f64,
    year: i32,
) -> EngineResult<Validation> {
    let summary = summary::get_or_create(store, policy, employee, year)?;
    let available = summary.sick_available();
    Ok(Validation::pass(
        Some(available),
        Some(available - requested_days),
    ))
}

/// Pass-through, same as sick leave.
fn validate_maternity<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    employee: &Employee,
    requested_days: f64,
    year: i32,
) -> EngineResult<Validation> {
    let summary = summary::get_or_create(store, policy, employee, year)?;
    let available = summary.maternity_leave_entitlement - summary.maternity_leave_used;
    Ok(Validation::pass(
        Some(available),
        Some(available - requested_days),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_summary::LeaveSummary;
    use crate::model::overtime::OvertimeRequest;
    use crate::store::{LeaveRequestDraft, LeaveRequestStore, LeaveSummaryStore, MemoryStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(id: u64) -> Employee {
        Employee {
            id,
            employee_code: format!("EMP-{id:03}"),
            first_name: "Test".into(),
            last_name: "Person".into(),
            hire_date: Some(date(2020, 1, 1)),
            gender: None,
            status: "active".into(),
        }
    }

    fn facts<'a>(leave_type: LeaveType, start: NaiveDate, days: f64) -> RequestFacts<'a> {
        RequestFacts {
            leave_type,
            start_date: start,
            number_of_days: days,
            compensation_method: None,
            relationship: None,
            overtime_request_ids: &[],
        }
    }

    fn wfh_draft(employee_id: u64, start: NaiveDate) -> LeaveRequestDraft {
        LeaveRequestDraft {
            employee_id,
            leave_type: LeaveType::Wfh,
            start_date: start,
            end_date: start,
            is_half_day: false,
            number_of_days: 1.0,
            reason: None,
            compensation_method: None,
            relationship: None,
            overtime_request_ids: vec![],
        }
    }

    #[test]
    fn annual_fails_when_requesting_more_than_available() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        let mut summary = LeaveSummary::seeded(1, 2025, 30.0, &policy);
        summary.annual_leave_used = 28.0;
        store.upsert_summary(&summary).unwrap();

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Annual, date(2025, 6, 2), 3.0),
            2025,
        )
        .unwrap();

        assert!(!result.valid);
        assert_eq!(result.balance, Some(2.0));
        assert_eq!(result.projected_balance, Some(-1.0));
        assert!(result.message.unwrap().contains("Insufficient annual leave"));
    }

    #[test]
    fn annual_passes_and_projects_the_remainder() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Annual, date(2025, 6, 2), 3.0),
            2025,
        )
        .unwrap();

        assert!(result.valid);
        assert_eq!(result.balance, Some(30.0));
        assert_eq!(result.projected_balance, Some(27.0));
    }

    #[test]
    fn carry_over_extends_the_annual_balance() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        let mut summary = LeaveSummary::seeded(1, 2025, 30.0, &policy);
        summary.annual_leave_used = 30.0;
        summary.annual_leave_carried_over = 4.0;
        store.upsert_summary(&summary).unwrap();

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Annual, date(2025, 6, 2), 4.0),
            2025,
        )
        .unwrap();
        assert!(result.valid);
        assert_eq!(result.balance, Some(4.0));
    }

    #[test]
    fn wfh_counts_pending_and_approved_in_the_same_week() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        // Monday of the same week as the requested Wednesday.
        store.insert_request(wfh_draft(1, date(2025, 3, 3))).unwrap();

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Wfh, date(2025, 3, 5), 1.0),
            2025,
        )
        .unwrap();

        assert!(!result.valid);
        assert!(result.message.unwrap().contains("Weekly work-from-home limit"));
    }

    #[test]
    fn wfh_next_week_is_clean() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        store.insert_request(wfh_draft(1, date(2025, 3, 3))).unwrap();

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Wfh, date(2025, 3, 10), 1.0),
            2025,
        )
        .unwrap();
        assert!(result.valid);
    }

    #[test]
    fn wfh_monthly_limit_kicks_in_across_weeks() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        // Four different weeks of March.
        for day in [3, 10, 17, 24] {
            store.insert_request(wfh_draft(1, date(2025, 3, day))).unwrap();
        }

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Wfh, date(2025, 3, 31), 1.0),
            2025,
        )
        .unwrap();

        assert!(!result.valid);
        assert!(result.message.unwrap().contains("Monthly work-from-home limit"));
    }

    #[test]
    fn rejected_wfh_requests_do_not_count() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        let request = store.insert_request(wfh_draft(1, date(2025, 3, 3))).unwrap();
        store
            .transition_status(
                request.id,
                LeaveStatus::Pending,
                LeaveStatus::Rejected,
                crate::store::StatusUpdate {
                    rejection_reason: Some("coverage".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Wfh, date(2025, 3, 5), 1.0),
            2025,
        )
        .unwrap();
        assert!(result.valid);
    }

    #[test]
    fn emergency_without_annual_charge_always_passes() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        let mut f = facts(LeaveType::Emergency, date(2025, 6, 2), 2.0);
        f.compensation_method = Some(CompensationMethod::Unpaid);

        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(result.valid);
        assert!(result.balance.is_none());
    }

    #[test]
    fn emergency_charged_to_annual_rewraps_the_failure() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        let mut summary = LeaveSummary::seeded(1, 2025, 30.0, &policy);
        summary.annual_leave_used = 30.0;
        store.upsert_summary(&summary).unwrap();

        let mut f = facts(LeaveType::Emergency, date(2025, 6, 2), 1.0);
        f.compensation_method = Some(CompensationMethod::AnnualLeave);

        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(!result.valid);
        let message = result.message.unwrap();
        assert!(message.starts_with("Emergency leave charged to annual leave:"));
        assert!(message.contains("Insufficient annual leave"));
    }

    #[test]
    fn toil_requires_at_least_eight_hours() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        store.insert_overtime_request(OvertimeRequest {
            id: 10,
            employee_id: 1,
            requested_hours: 7.9,
            status: OvertimeStatus::Approved,
        });

        let mut f = facts(LeaveType::Toil, date(2025, 6, 2), 1.0);
        let ids = [10u64];
        f.overtime_request_ids = &ids;

        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(!result.valid);
        assert!(result.message.unwrap().contains("At least 8 overtime hours"));
    }

    #[test]
    fn toil_with_exactly_eight_hours_is_one_day() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        store.insert_overtime_request(OvertimeRequest {
            id: 10,
            employee_id: 1,
            requested_hours: 5.0,
            status: OvertimeStatus::Approved,
        });
        store.insert_overtime_request(OvertimeRequest {
            id: 11,
            employee_id: 1,
            requested_hours: 3.0,
            status: OvertimeStatus::Approved,
        });

        let mut f = facts(LeaveType::Toil, date(2025, 6, 2), 1.0);
        let ids = [10u64, 11u64];
        f.overtime_request_ids = &ids;

        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(result.valid);
        assert_eq!(result.balance, Some(8.0));
        assert_eq!(result.projected_balance, Some(1.0));
    }

    #[test]
    fn toil_rejects_foreign_and_unapproved_overtime() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);
        store.insert_overtime_request(OvertimeRequest {
            id: 10,
            employee_id: 2,
            requested_hours: 9.0,
            status: OvertimeStatus::Approved,
        });
        store.insert_overtime_request(OvertimeRequest {
            id: 11,
            employee_id: 1,
            requested_hours: 9.0,
            status: OvertimeStatus::Pending,
        });

        let mut f = facts(LeaveType::Toil, date(2025, 6, 2), 1.0);
        let foreign = [10u64];
        f.overtime_request_ids = &foreign;
        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(!result.valid);
        assert!(result.message.unwrap().contains("does not belong"));

        let unapproved = [11u64];
        f.overtime_request_ids = &unapproved;
        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(!result.valid);
        assert!(result.message.unwrap().contains("not approved"));
    }

    #[test]
    fn toil_with_unknown_overtime_is_not_found() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);

        let mut f = facts(LeaveType::Toil, date(2025, 6, 2), 1.0);
        let ids = [99u64];
        f.overtime_request_ids = &ids;

        let err = validate_request(&store, &policy, &emp, &f, 2025).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { id: 99, .. }));
    }

    #[test]
    fn bereavement_needs_a_relationship() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);

        let result = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Bereavement, date(2025, 6, 2), 3.0),
            2025,
        )
        .unwrap();
        assert!(!result.valid);

        let mut f = facts(LeaveType::Bereavement, date(2025, 6, 2), 3.0);
        f.relationship = Some("spouse");
        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert!(result.valid);
        assert_eq!(result.balance, Some(5.0));

        f.relationship = Some("uncle");
        let result = validate_request(&store, &policy, &emp, &f, 2025).unwrap();
        assert_eq!(result.balance, Some(3.0));
    }

    #[test]
    fn sick_and_maternity_pass_through_with_informational_balance() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        let emp = employee(1);

        let sick = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Sick, date(2025, 6, 2), 120.0),
            2025,
        )
        .unwrap();
        assert!(sick.valid);
        assert_eq!(sick.balance, Some(90.0));

        let maternity = validate_request(
            &store,
            &policy,
            &emp,
            &facts(LeaveType::Maternity, date(2025, 6, 2), 10.0),
            2025,
        )
        .unwrap();
        assert!(maternity.valid);
        assert_eq!(maternity.balance, Some(60.0));
    }
}
