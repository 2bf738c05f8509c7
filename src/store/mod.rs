//! Storage contracts for the leave engine.
//!
//! The engine talks to a transactional record store through these traits so
//! the domain logic stays independent of the storage backend. Implementations
//! must provide uniqueness on `(employee_id, year)` for summaries, atomic
//! read-modify-write on a summary row, and compare-and-set semantics for the
//! leave request status transition.

pub mod memory;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::model::employee::Employee;
use crate::model::leave_request::{CompensationMethod, LeaveRequest, LeaveStatus, LeaveType};
use crate::model::leave_summary::LeaveSummary;
use crate::model::overtime::OvertimeRequest;

pub use memory::MemoryStore;

/// Filter over leave requests. Empty `statuses` means any status; the date
/// bounds apply to the request's start date.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub employee_id: Option<u64>,
    pub leave_type: Option<LeaveType>,
    pub statuses: Vec<LeaveStatus>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
}

/// Fields stamped onto a request during a status transition.
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
    pub approved_by: Option<u64>,
    pub approval_date: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
}

/// Insert payload for a new leave request. The store assigns the id, stamps
/// `created_at`, and starts the request in `Pending`.
#[derive(Debug, Clone)]
pub struct LeaveRequestDraft {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_half_day: bool,
    pub number_of_days: f64,
    pub reason: Option<String>,
    pub compensation_method: Option<CompensationMethod>,
    pub relationship: Option<String>,
    pub overtime_request_ids: Vec<u64>,
}

pub trait EmployeeStore: Send + Sync {
    /// Retrieve an employee by id.
    fn get_employee(&self, id: u64) -> EngineResult<Option<Employee>>;

    /// List all employees.
    fn list_employees(&self) -> EngineResult<Vec<Employee>>;
}

pub trait OvertimeStore: Send + Sync {
    /// Retrieve an overtime request by id.
    fn get_overtime_request(&self, id: u64) -> EngineResult<Option<OvertimeRequest>>;
}

pub trait LeaveRequestStore: Send + Sync {
    /// Persist a new request in `Pending` status and return the stored row.
    fn insert_request(&self, draft: LeaveRequestDraft) -> EngineResult<LeaveRequest>;

    /// Retrieve a request by id.
    fn get_request(&self, id: u64) -> EngineResult<Option<LeaveRequest>>;

    /// List requests matching the filter, ordered by start date then id.
    fn list_requests(&self, filter: &RequestFilter) -> EngineResult<Vec<LeaveRequest>>;

    /// Compare-and-set status transition. Fails with `Conflict` when the
    /// current status differs from `from`, so two concurrent dispositions of
    /// the same request cannot both succeed.
    fn transition_status(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
        update: StatusUpdate,
    ) -> EngineResult<LeaveRequest>;
}

pub trait LeaveSummaryStore: Send + Sync {
    /// Retrieve the summary row for `(employee_id, year)`.
    fn get_summary(&self, employee_id: u64, year: i32) -> EngineResult<Option<LeaveSummary>>;

    /// Create or replace the summary row keyed by `(employee_id, year)`.
    fn upsert_summary(&self, summary: &LeaveSummary) -> EngineResult<()>;

    /// Atomic read-modify-write on one summary row. The closure runs under
    /// the row's lock; returning an error aborts the update without
    /// committing anything.
    fn update_summary(
        &self,
        employee_id: u64,
        year: i32,
        apply: &mut dyn FnMut(&mut LeaveSummary) -> EngineResult<()>,
    ) -> EngineResult<LeaveSummary>;

    /// List summary rows, optionally restricted to one year.
    fn list_summaries(&self, year: Option<i32>) -> EngineResult<Vec<LeaveSummary>>;
}

/// Everything the leave engine needs from the backing store.
pub trait LeaveStore: EmployeeStore + OvertimeStore + LeaveRequestStore + LeaveSummaryStore {}

impl<T: EmployeeStore + OvertimeStore + LeaveRequestStore + LeaveSummaryStore> LeaveStore for T {}
