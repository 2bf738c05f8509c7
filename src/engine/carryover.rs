//! End-of-year annual leave carry-over.
//!
//! Moves unused annual leave days from the prior year's summary into the new
//! year's `annual_leave_carried_over`, capped by policy. The write is an
//! overwrite, so re-running the job for the same year pair never
//! double-credits.

use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::model::leave_summary::LeaveSummary;
use crate::store::LeaveStore;

use super::recompute::JobSkip;
use super::summary;

static RUN_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Clone, Serialize)]
pub struct CarryOverEntry {
    pub employee_id: u64,
    pub unused_days: f64,
    pub carried_over_days: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarryOverReport {
    pub previous_year: i32,
    pub current_year: i32,
    pub entries: Vec<CarryOverEntry>,
    pub skipped: Vec<JobSkip>,
}

pub(crate) fn run<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    previous_year: i32,
    current_year: i32,
) -> EngineResult<CarryOverReport> {
    let _run = RUN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    tracing::info!(previous_year, current_year, "annual leave carry-over starting");

    let mut report = CarryOverReport {
        previous_year,
        current_year,
        entries: Vec::new(),
        skipped: Vec::new(),
    };
    for prior in store.list_summaries(Some(previous_year))? {
        match carry_one(store, policy, &prior, current_year) {
            Ok(entry) => report.entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    employee_id = prior.employee_id,
                    "skipping employee during carry-over"
                );
                report.skipped.push(JobSkip {
                    employee_id: prior.employee_id,
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        carried = report.entries.len(),
        skipped = report.skipped.len(),
        "annual leave carry-over finished"
    );
    Ok(report)
}

fn carry_one<S: LeaveStore>(
    store: &S,
    policy: &LeavePolicy,
    prior: &LeaveSummary,
    current_year: i32,
) -> EngineResult<CarryOverEntry> {
    let employee = store
        .get_employee(prior.employee_id)?
        .ok_or_else(|| EngineError::not_found("employee", prior.employee_id))?;

    let unused = prior.annual_available().max(0.0);
    let carried = unused.min(policy.max_carry_over_days);

    summary::get_or_create(store, policy, &employee, current_year)?;
    store.update_summary(employee.id, current_year, &mut |s| {
        s.annual_leave_carried_over = carried;
        Ok(())
    })?;

    tracing::info!(
        employee_id = employee.id,
        unused,
        carried,
        current_year,
        "annual leave carried over"
    );
    Ok(CarryOverEntry {
        employee_id: employee.id,
        unused_days: unused,
        carried_over_days: carried,
    })
}
