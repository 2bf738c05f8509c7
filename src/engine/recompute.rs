//! Full ledger recomputation.
//!
//! Rebuilds every touched Leave Summary from the approved request history,
//! for drift correction after manual data edits. The job is idempotent: the
//! same approved ledger always produces the same summaries.

use std::collections::BTreeSet;
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::store::{LeaveStore, RequestFilter};

use super::{dates, entitlement, mutation, summary, validate};

// One recomputation at a time; approvals may proceed alongside since the job
// reads the full approved ledger, not incremental deltas.
static RUN_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Employee skipped by a batch job, with the cause.
#[derive(Debug, Clone, Serialize)]
pub struct JobSkip {
    pub employee_id: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecomputationReport {
    pub updated_count: u32,
    pub created_count: u32,
    pub skipped: Vec<JobSkip>,
}

pub(crate) fn run<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    today: NaiveDate,
) -> EngineResult<RecomputationReport> {
    let _run = RUN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    tracing::info!(%today, "leave ledger recomputation starting");

    let approved = store.list_requests(&RequestFilter {
        statuses: vec![LeaveStatus::Approved],
        ..Default::default()
    })?;

    // Every (employee, year) pair with approved history, every existing
    // summary row, and a current-year row for every employee.
    let mut pairs: BTreeSet<(u64, i32)> = approved
        .iter()
        .map(|r| (r.employee_id, r.start_date.year()))
        .collect();
    for existing in store.list_summaries(None)? {
        pairs.insert((existing.employee_id, existing.year));
    }
    for employee in store.list_employees()? {
        pairs.insert((employee.id, today.year()));
    }

    let mut report = RecomputationReport {
        updated_count: 0,
        created_count: 0,
        skipped: Vec::new(),
    };
    for (employee_id, year) in pairs {
        match rebuild_summary(store, policy, &approved, employee_id, year, today) {
            Ok(created) => {
                if created {
                    report.created_count += 1;
                } else {
                    report.updated_count += 1;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, employee_id, year, "skipping employee during recomputation");
                report.skipped.push(JobSkip {
                    employee_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        updated = report.updated_count,
        created = report.created_count,
        skipped = report.skipped.len(),
        "leave ledger recomputation finished"
    );
    Ok(report)
}

/// Rebuild one `(employee, year)` summary from scratch. Returns whether the
/// row had to be created.
fn rebuild_summary<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    approved: &[LeaveRequest],
    employee_id: u64,
    year: i32,
    today: NaiveDate,
) -> EngineResult<bool> {
    let employee = store
        .get_employee(employee_id)?
        .ok_or_else(|| EngineError::not_found("employee", employee_id))?;
    let hire_date = employee.hire_date.ok_or_else(|| {
        EngineError::integrity(format!("employee {employee_id} has no hire date on record"))
    })?;

    let existed = store.get_summary(employee_id, year)?.is_some();
    let mut rebuilt = summary::get_or_create(store, policy, &employee, year)?;
    rebuilt.reset_used_counters();
    rebuilt.annual_leave_entitlement =
        f64::from(entitlement::annual_entitlement_days(hire_date, year));

    let mut replayed: Vec<&LeaveRequest> = approved
        .iter()
        .filter(|r| r.employee_id == employee_id && r.start_date.year() == year)
        .collect();
    replayed.sort_by_key(|r| (r.start_date, r.id));

    for request in &replayed {
        let toil_hours = if request.leave_type == LeaveType::Toil {
            validate::approved_toil_hours(store, employee_id, &request.overtime_request_ids)?
        } else {
            0.0
        };
        mutation::apply(&mut rebuilt, request, toil_hours);
    }

    // WFH window counters come from the replayed set relative to the run
    // date, not from whatever rolling state the row carried before.
    let week = dates::week_start(today);
    let (month_start, month_end) = dates::month_bounds(today);
    let wfh: Vec<_> = replayed
        .iter()
        .filter(|r| r.leave_type == LeaveType::Wfh)
        .collect();
    rebuilt.wfh_used_this_week = wfh
        .iter()
        .filter(|r| dates::week_start(r.start_date) == week)
        .count() as u32;
    rebuilt.wfh_used_this_month = wfh
        .iter()
        .filter(|r| r.start_date >= month_start && r.start_date <= month_end)
        .count() as u32;
    rebuilt.wfh_last_week_start = wfh.last().map(|r| dates::week_start(r.start_date));

    store.upsert_summary(&rebuilt)?;
    Ok(!existed)
}
