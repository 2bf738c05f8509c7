use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Maternity,
    Emergency,
    Toil,
    Wfh,
    Bereavement,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// How an emergency-leave absence is covered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CompensationMethod {
    /// Charged against the annual leave balance.
    AnnualLeave,
    Unpaid,
    MakeupHours,
}

/// One leave instance, append-only.
///
/// Status moves PENDING -> APPROVED or PENDING -> REJECTED exactly once; the
/// balance mutation runs at the approval transition and never again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_half_day: bool,
    pub number_of_days: f64,
    pub status: LeaveStatus,
    pub reason: Option<String>,
    /// Emergency leave only.
    pub compensation_method: Option<CompensationMethod>,
    /// Bereavement leave only.
    pub relationship: Option<String>,
    /// TOIL only: approved overtime records consumed by this request.
    #[serde(default)]
    pub overtime_request_ids: Vec<u64>,
    pub approved_by: Option<u64>,
    pub approval_date: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
