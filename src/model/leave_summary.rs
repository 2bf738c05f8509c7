use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::LeavePolicy;

/// Per-employee-per-year ledger of leave entitlements and usage.
///
/// Unique key is `(employee_id, year)`. Rows are created lazily on first
/// access, mutated only by request approval, the recomputation job, and the
/// carry-over job. After every mutation `used <= entitlement + carried_over`
/// must hold for each tracked leave type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveSummary {
    pub employee_id: u64,
    pub year: i32,

    pub annual_leave_entitlement: f64,
    pub annual_leave_used: f64,
    pub annual_leave_carried_over: f64,

    // 90-day sick bank split into pay tiers
    pub sick_leave_full_pay: f64,
    pub sick_leave_half_pay: f64,
    pub sick_leave_unpaid: f64,
    pub sick_leave_used: f64,

    pub maternity_leave_entitlement: f64,
    pub maternity_leave_used: f64,

    pub emergency_leave_entitlement: f64,
    pub emergency_leave_used: f64,

    // 8 hours = 1 day
    pub toil_hours_available: f64,
    pub toil_hours_used: f64,

    // Rolling-window counters, maintained on approval. The validators never
    // trust these; they recount from live requests. The recomputation job
    // rebuilds them from the approved ledger.
    pub wfh_weekly_limit: u32,
    pub wfh_monthly_limit: u32,
    pub wfh_used_this_week: u32,
    pub wfh_used_this_month: u32,
    pub wfh_last_week_start: Option<NaiveDate>,
}

impl LeaveSummary {
    /// Fresh row for `(employee_id, year)` seeded with the tenure-derived
    /// annual entitlement and the policy's fixed per-type entitlements.
    pub fn seeded(
        employee_id: u64,
        year: i32,
        annual_entitlement_days: f64,
        policy: &LeavePolicy,
    ) -> Self {
        Self {
            employee_id,
            year,
            annual_leave_entitlement: annual_entitlement_days,
            annual_leave_used: 0.0,
            annual_leave_carried_over: 0.0,
            sick_leave_full_pay: policy.sick_full_pay_days,
            sick_leave_half_pay: policy.sick_half_pay_days,
            sick_leave_unpaid: policy.sick_unpaid_days,
            sick_leave_used: 0.0,
            maternity_leave_entitlement: policy.maternity_days,
            maternity_leave_used: 0.0,
            emergency_leave_entitlement: policy.emergency_days,
            emergency_leave_used: 0.0,
            toil_hours_available: 0.0,
            toil_hours_used: 0.0,
            wfh_weekly_limit: policy.wfh_weekly_limit,
            wfh_monthly_limit: policy.wfh_monthly_limit,
            wfh_used_this_week: 0,
            wfh_used_this_month: 0,
            wfh_last_week_start: None,
        }
    }

    /// Annual leave days still available this year.
    pub fn annual_available(&self) -> f64 {
        self.annual_leave_entitlement + self.annual_leave_carried_over - self.annual_leave_used
    }

    pub fn sick_total_entitlement(&self) -> f64 {
        self.sick_leave_full_pay + self.sick_leave_half_pay + self.sick_leave_unpaid
    }

    pub fn sick_available(&self) -> f64 {
        self.sick_total_entitlement() - self.sick_leave_used
    }

    /// Zeroes every usage counter ahead of a ledger replay. Entitlements and
    /// the carried-over amount are left alone; they are owned by the
    /// entitlement calculator and the carry-over job respectively.
    pub(crate) fn reset_used_counters(&mut self) {
        self.annual_leave_used = 0.0;
        self.sick_leave_used = 0.0;
        self.maternity_leave_used = 0.0;
        self.emergency_leave_used = 0.0;
        self.toil_hours_used = 0.0;
        self.wfh_used_this_week = 0;
        self.wfh_used_this_month = 0;
        self.wfh_last_week_start = None;
    }
}
