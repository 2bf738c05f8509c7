use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OvertimeStatus {
    Pending,
    Approved,
    Rejected,
}

/// Read-only view of an overtime request.
///
/// Time-off-in-lieu requests reference approved overtime records and convert
/// their hours into leave days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeRequest {
    pub id: u64,
    pub employee_id: u64,
    pub requested_hours: f64,
    pub status: OvertimeStatus,
}
