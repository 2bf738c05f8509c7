//! The leave engine: request lifecycle, balance reads, and batch jobs.

pub mod dates;
pub mod entitlement;

mod carryover;
mod mutation;
mod recompute;
mod summary;
mod validate;

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LeavePolicy;
use crate::error::{EngineError, EngineResult};
use crate::model::leave_request::{CompensationMethod, LeaveRequest, LeaveStatus, LeaveType};
use crate::store::{LeaveRequestDraft, LeaveStore, StatusUpdate};

pub use carryover::{CarryOverEntry, CarryOverReport};
pub use recompute::{JobSkip, RecomputationReport};

/// Payload for a new leave request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_half_day: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub compensation_method: Option<CompensationMethod>,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub overtime_request_ids: Vec<u64>,
}

/// Successful creation result, with the balances the validator computed.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedLeave {
    pub request: LeaveRequest,
    pub balance: Option<f64>,
    pub projected_balance: Option<f64>,
}

/// Full per-type balance snapshot for one employee and year.
#[derive(Debug, Clone, Serialize)]
pub struct LeaveBalance {
    pub employee_id: u64,
    pub year: i32,
    pub annual_entitlement: f64,
    pub annual_carried_over: f64,
    pub annual_used: f64,
    pub annual_available: f64,
    pub sick_full_pay: f64,
    pub sick_half_pay: f64,
    pub sick_unpaid: f64,
    pub sick_used: f64,
    pub sick_available: f64,
    pub maternity_entitlement: f64,
    pub maternity_used: f64,
    pub emergency_entitlement: f64,
    pub emergency_used: f64,
    pub toil_hours_available: f64,
    pub toil_hours_used: f64,
    pub wfh_weekly_limit: u32,
    pub wfh_monthly_limit: u32,
    pub wfh_used_this_week: u32,
    pub wfh_used_this_month: u32,
}

/// Facade over the validators, the lifecycle state machine, the mutation
/// dispatcher, and the batch jobs.
pub struct LeaveEngine<S> {
    store: Arc<S>,
    policy: LeavePolicy,
}

impl<S: LeaveStore> LeaveEngine<S> {
    pub fn new(store: Arc<S>, policy: LeavePolicy) -> Self {
        Self { store, policy }
    }

    /// Validate and persist a new request in `Pending` status. Nothing is
    /// persisted when validation fails; the error carries the computed
    /// balances for client display.
    pub fn create_leave_request(&self, input: NewLeaveRequest) -> EngineResult<CreatedLeave> {
        let employee = self
            .store
            .get_employee(input.employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", input.employee_id))?;

        let end_date = dates::adjust_end_date(
            input.leave_type,
            input.start_date,
            input.end_date,
            input.is_half_day,
        );
        if input.start_date > end_date {
            return Err(EngineError::validation("start_date cannot be after end_date"));
        }
        let year = input.start_date.year();
        let mut number_of_days =
            dates::number_of_days(input.start_date, end_date, input.is_half_day);

        let facts = validate::RequestFacts {
            leave_type: input.leave_type,
            start_date: input.start_date,
            number_of_days,
            compensation_method: input.compensation_method,
            relationship: input.relationship.as_deref(),
            overtime_request_ids: &input.overtime_request_ids,
        };
        let validation =
            validate::validate_request(&*self.store, &self.policy, &employee, &facts, year)?;
        if !validation.valid {
            return Err(EngineError::Validation {
                message: validation
                    .message
                    .unwrap_or_else(|| "invalid leave request".to_string()),
                balance: validation.balance,
                projected_balance: validation.projected_balance,
            });
        }

        if input.leave_type == LeaveType::Toil {
            // A day in lieu per full block of overtime hours.
            let hours = validate::approved_toil_hours(
                &*self.store,
                employee.id,
                &input.overtime_request_ids,
            )?;
            number_of_days = (hours / self.policy.toil_hours_per_day).floor();
        }

        let request = self.store.insert_request(LeaveRequestDraft {
            employee_id: input.employee_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date,
            is_half_day: input.is_half_day,
            number_of_days,
            reason: input.reason,
            compensation_method: input.compensation_method,
            relationship: input.relationship,
            overtime_request_ids: input.overtime_request_ids,
        })?;
        tracing::info!(
            request_id = request.id,
            employee_id = request.employee_id,
            leave_type = %request.leave_type,
            number_of_days = request.number_of_days,
            "leave request submitted"
        );
        Ok(CreatedLeave {
            request,
            balance: validation.balance,
            projected_balance: validation.projected_balance,
        })
    }

    /// PENDING -> APPROVED, then the balance mutation, exactly once. A
    /// request that is no longer pending comes back as a `Conflict`. When the
    /// balance no longer covers an annual-charged request the approval is
    /// rolled back and the validation failure surfaced.
    pub fn approve_leave_request(
        &self,
        request_id: u64,
        approver_id: u64,
    ) -> EngineResult<LeaveRequest> {
        let request = self
            .store
            .get_request(request_id)?
            .ok_or_else(|| EngineError::not_found("leave request", request_id))?;
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::Conflict {
                request_id,
                status: request.status,
            });
        }
        let employee = self
            .store
            .get_employee(request.employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", request.employee_id))?;
        let year = request.start_date.year();
        summary::get_or_create(&*self.store, &self.policy, &employee, year)?;

        let toil_hours = if request.leave_type == LeaveType::Toil {
            validate::approved_toil_hours(
                &*self.store,
                request.employee_id,
                &request.overtime_request_ids,
            )?
        } else {
            0.0
        };

        // Compare-and-set first: a concurrent second approval loses here.
        let approved = self.store.transition_status(
            request_id,
            LeaveStatus::Pending,
            LeaveStatus::Approved,
            StatusUpdate {
                approved_by: Some(approver_id),
                approval_date: Some(Utc::now().date_naive()),
                rejection_reason: None,
            },
        )?;

        let mutated = self.store.update_summary(request.employee_id, year, &mut |s| {
            mutation::check_and_apply(s, &approved, toil_hours)
        });
        if let Err(refused) = mutated {
            // The balance moved between validation and approval; put the
            // request back where it was.
            if let Err(rollback) = self.store.transition_status(
                request_id,
                LeaveStatus::Approved,
                LeaveStatus::Pending,
                StatusUpdate::default(),
            ) {
                tracing::error!(
                    error = %rollback,
                    request_id,
                    "failed to roll back approval after refused balance mutation"
                );
            }
            return Err(refused);
        }

        tracing::info!(
            request_id,
            employee_id = request.employee_id,
            approver_id,
            leave_type = %approved.leave_type,
            "leave request approved"
        );
        Ok(approved)
    }

    /// PENDING -> REJECTED. Requires a non-empty reason; no balance mutation.
    pub fn reject_leave_request(
        &self,
        request_id: u64,
        approver_id: u64,
        reason: &str,
    ) -> EngineResult<LeaveRequest> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::validation("Rejection reason is required"));
        }
        let request = self
            .store
            .get_request(request_id)?
            .ok_or_else(|| EngineError::not_found("leave request", request_id))?;
        if request.status != LeaveStatus::Pending {
            return Err(EngineError::Conflict {
                request_id,
                status: request.status,
            });
        }
        let rejected = self.store.transition_status(
            request_id,
            LeaveStatus::Pending,
            LeaveStatus::Rejected,
            StatusUpdate {
                approved_by: None,
                approval_date: None,
                rejection_reason: Some(reason.to_string()),
            },
        )?;
        tracing::info!(
            request_id,
            employee_id = rejected.employee_id,
            approver_id,
            "leave request rejected"
        );
        Ok(rejected)
    }

    /// Current per-type balance snapshot, self-healing the stored annual
    /// entitlement on the way.
    pub fn get_leave_balance(&self, employee_id: u64, year: i32) -> EngineResult<LeaveBalance> {
        let employee = self
            .store
            .get_employee(employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))?;
        let summary = summary::get_or_create(&*self.store, &self.policy, &employee, year)?;
        Ok(LeaveBalance {
            employee_id,
            year,
            annual_entitlement: summary.annual_leave_entitlement,
            annual_carried_over: summary.annual_leave_carried_over,
            annual_used: summary.annual_leave_used,
            annual_available: summary.annual_available(),
            sick_full_pay: summary.sick_leave_full_pay,
            sick_half_pay: summary.sick_leave_half_pay,
            sick_unpaid: summary.sick_leave_unpaid,
            sick_used: summary.sick_leave_used,
            sick_available: summary.sick_available(),
            maternity_entitlement: summary.maternity_leave_entitlement,
            maternity_used: summary.maternity_leave_used,
            emergency_entitlement: summary.emergency_leave_entitlement,
            emergency_used: summary.emergency_leave_used,
            toil_hours_available: summary.toil_hours_available,
            toil_hours_used: summary.toil_hours_used,
            wfh_weekly_limit: summary.wfh_weekly_limit,
            wfh_monthly_limit: summary.wfh_monthly_limit,
            wfh_used_this_week: summary.wfh_used_this_week,
            wfh_used_this_month: summary.wfh_used_this_month,
        })
    }

    /// Rebuild all summaries from the approved ledger as of today.
    pub fn run_recomputation(&self) -> EngineResult<RecomputationReport> {
        self.run_recomputation_as_of(Utc::now().date_naive())
    }

    /// Deterministic variant for schedulers and tests.
    pub fn run_recomputation_as_of(&self, today: NaiveDate) -> EngineResult<RecomputationReport> {
        recompute::run(&*self.store, &self.policy, today)
    }

    /// Carry unused annual leave from `previous_year` into `current_year`.
    /// Defaults to the year turning over right now.
    pub fn run_carry_over(
        &self,
        previous_year: Option<i32>,
        current_year: Option<i32>,
    ) -> EngineResult<CarryOverReport> {
        let current = current_year.unwrap_or_else(|| Utc::now().date_naive().year());
        let previous = previous_year.unwrap_or(current - 1);
        carryover::run(&*self.store, &self.policy, previous, current)
    }
}
