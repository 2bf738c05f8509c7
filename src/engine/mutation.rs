//! Balance mutation applied when a leave request is approved.
//!
//! The same accumulation runs in two places: once at the approval transition
//! (wrapped in the annual-balance capacity check) and again when the
//! recomputation job replays the approved ledger from scratch.

use crate::error::{EngineError, EngineResult};
use crate::model::leave_request::{CompensationMethod, LeaveRequest, LeaveType};
use crate::model::leave_summary::LeaveSummary;

use super::dates;

/// Whether this request draws down the annual leave balance.
pub(crate) fn charges_annual(request: &LeaveRequest) -> bool {
    match request.leave_type {
        LeaveType::Annual => true,
        LeaveType::Emergency => {
            request.compensation_method == Some(CompensationMethod::AnnualLeave)
        }
        _ => false,
    }
}

/// Per-type accumulation of an approved request into the summary.
/// `toil_hours` is the pre-resolved sum of the referenced approved overtime
/// records and is only read for TOIL requests.
pub(crate) fn apply(summary: &mut LeaveSummary, request: &LeaveRequest, toil_hours: f64) {
    match request.leave_type {
        LeaveType::Annual => summary.annual_leave_used += request.number_of_days,
        LeaveType::Sick => summary.sick_leave_used += request.number_of_days,
        LeaveType::Maternity => summary.maternity_leave_used += request.number_of_days,
        LeaveType::Emergency => {
            if request.compensation_method == Some(CompensationMethod::AnnualLeave) {
                summary.annual_leave_used += request.number_of_days;
            } else {
                summary.emergency_leave_used += request.number_of_days;
            }
        }
        LeaveType::Wfh => {
            summary.wfh_used_this_month += 1;
            let week = dates::week_start(request.start_date);
            if summary.wfh_last_week_start == Some(week) {
                summary.wfh_used_this_week += 1;
            } else {
                summary.wfh_used_this_week = 1;
                summary.wfh_last_week_start = Some(week);
            }
        }
        LeaveType::Toil => summary.toil_hours_used += toil_hours,
        // Case-by-case, not tracked in the ledger.
        LeaveType::Bereavement => {}
    }
}

/// Approval-time variant: refuses to commit an annual-charged request that
/// the balance no longer covers, so the ledger invariant
/// `used <= entitlement + carried_over` survives every mutation. Runs inside
/// the summary row's atomic update.
pub(crate) fn check_and_apply(
    summary: &mut LeaveSummary,
    request: &LeaveRequest,
    toil_hours: f64,
) -> EngineResult<()> {
    if charges_annual(request) {
        let available = summary.annual_available();
        if request.number_of_days > available {
            return Err(EngineError::Validation {
                message: format!(
                    "Insufficient annual leave balance at approval: requested {} day(s), available {available}",
                    request.number_of_days
                ),
                balance: Some(available),
                projected_balance: Some(available - request.number_of_days),
            });
        }
    }
    apply(summary, request, toil_hours);
    Ok(())
}
