use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-only view of an employee record.
///
/// The engine never mutates employees; it only needs the hire date for
/// entitlement computation. `hire_date` can be absent on legacy imports, in
/// which case entitlement computation fails with an integrity error instead
/// of silently defaulting to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub status: String,
}
