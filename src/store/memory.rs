//! In-process store backing the batch runner and the test suites.
//!
//! Every collection sits behind its own mutex; summary mutation and the
//! status compare-and-set happen entirely under the respective lock, which
//! gives the single-writer-per-record discipline the engine requires.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::error::{EngineError, EngineResult};
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::model::leave_summary::LeaveSummary;
use crate::model::overtime::OvertimeRequest;

use super::{
    EmployeeStore, LeaveRequestDraft, LeaveRequestStore, LeaveSummaryStore, OvertimeStore,
    RequestFilter, StatusUpdate,
};

#[derive(Default)]
pub struct MemoryStore {
    employees: Mutex<BTreeMap<u64, Employee>>,
    overtime: Mutex<BTreeMap<u64, OvertimeRequest>>,
    requests: Mutex<BTreeMap<u64, LeaveRequest>>,
    summaries: Mutex<BTreeMap<(u64, i32), LeaveSummary>>,
    next_request_id: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_request_id: AtomicU64::new(1),
            ..Self::default()
        }
    }

    pub fn insert_employee(&self, employee: Employee) {
        lock(&self.employees).insert(employee.id, employee);
    }

    pub fn insert_overtime_request(&self, overtime: OvertimeRequest) {
        lock(&self.overtime).insert(overtime.id, overtime);
    }

    /// Seed a fully-formed request, e.g. when loading a ledger snapshot.
    /// Keeps the id sequence ahead of the highest seeded id.
    pub fn put_request(&self, request: LeaveRequest) {
        self.next_request_id
            .fetch_max(request.id + 1, Ordering::SeqCst);
        lock(&self.requests).insert(request.id, request);
    }

    pub fn put_summary(&self, summary: LeaveSummary) {
        lock(&self.summaries).insert((summary.employee_id, summary.year), summary);
    }
}

impl EmployeeStore for MemoryStore {
    fn get_employee(&self, id: u64) -> EngineResult<Option<Employee>> {
        Ok(lock(&self.employees).get(&id).cloned())
    }

    fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(lock(&self.employees).values().cloned().collect())
    }
}

impl OvertimeStore for MemoryStore {
    fn get_overtime_request(&self, id: u64) -> EngineResult<Option<OvertimeRequest>> {
        Ok(lock(&self.overtime).get(&id).cloned())
    }
}

impl LeaveRequestStore for MemoryStore {
    fn insert_request(&self, draft: LeaveRequestDraft) -> EngineResult<LeaveRequest> {
        let id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let request = LeaveRequest {
            id,
            employee_id: draft.employee_id,
            leave_type: draft.leave_type,
            start_date: draft.start_date,
            end_date: draft.end_date,
            is_half_day: draft.is_half_day,
            number_of_days: draft.number_of_days,
            status: LeaveStatus::Pending,
            reason: draft.reason,
            compensation_method: draft.compensation_method,
            relationship: draft.relationship,
            overtime_request_ids: draft.overtime_request_ids,
            approved_by: None,
            approval_date: None,
            rejection_reason: None,
            created_at: Utc::now(),
        };
        lock(&self.requests).insert(id, request.clone());
        Ok(request)
    }

    fn get_request(&self, id: u64) -> EngineResult<Option<LeaveRequest>> {
        Ok(lock(&self.requests).get(&id).cloned())
    }

    fn list_requests(&self, filter: &RequestFilter) -> EngineResult<Vec<LeaveRequest>> {
        let requests = lock(&self.requests);
        let mut matched: Vec<LeaveRequest> = requests
            .values()
            .filter(|r| filter.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| filter.leave_type.is_none_or(|t| r.leave_type == t))
            .filter(|r| filter.statuses.is_empty() || filter.statuses.contains(&r.status))
            .filter(|r| filter.start_from.is_none_or(|d| r.start_date >= d))
            .filter(|r| filter.start_to.is_none_or(|d| r.start_date <= d))
            .cloned()
            .collect();
        matched.sort_by_key(|r| (r.start_date, r.id));
        Ok(matched)
    }

    fn transition_status(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
        update: StatusUpdate,
    ) -> EngineResult<LeaveRequest> {
        let mut requests = lock(&self.requests);
        let request = requests
            .get_mut(&id)
            .ok_or_else(|| EngineError::not_found("leave request", id))?;
        if request.status != from {
            return Err(EngineError::Conflict {
                request_id: id,
                status: request.status,
            });
        }
        request.status = to;
        match to {
            // Transitioning back to pending undoes a disposition entirely.
            LeaveStatus::Pending => {
                request.approved_by = None;
                request.approval_date = None;
                request.rejection_reason = None;
            }
            LeaveStatus::Approved | LeaveStatus::Rejected => {
                if update.approved_by.is_some() {
                    request.approved_by = update.approved_by;
                }
                if update.approval_date.is_some() {
                    request.approval_date = update.approval_date;
                }
                if update.rejection_reason.is_some() {
                    request.rejection_reason = update.rejection_reason;
                }
            }
        }
        Ok(request.clone())
    }
}

impl LeaveSummaryStore for MemoryStore {
    fn get_summary(&self, employee_id: u64, year: i32) -> EngineResult<Option<LeaveSummary>> {
        Ok(lock(&self.summaries).get(&(employee_id, year)).cloned())
    }

    fn upsert_summary(&self, summary: &LeaveSummary) -> EngineResult<()> {
        lock(&self.summaries).insert((summary.employee_id, summary.year), summary.clone());
        Ok(())
    }

    fn update_summary(
        &self,
        employee_id: u64,
        year: i32,
        apply: &mut dyn FnMut(&mut LeaveSummary) -> EngineResult<()>,
    ) -> EngineResult<LeaveSummary> {
        let mut summaries = lock(&self.summaries);
        let current = summaries
            .get(&(employee_id, year))
            .ok_or_else(|| EngineError::not_found("leave summary", employee_id))?;
        // Work on a copy so a refused update commits nothing.
        let mut updated = current.clone();
        apply(&mut updated)?;
        summaries.insert((employee_id, year), updated.clone());
        Ok(updated)
    }

    fn list_summaries(&self, year: Option<i32>) -> EngineResult<Vec<LeaveSummary>> {
        Ok(lock(&self.summaries)
            .values()
            .filter(|s| year.is_none_or(|y| s.year == y))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeavePolicy;
    use crate::model::leave_request::LeaveType;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(employee_id: u64, start: NaiveDate) -> LeaveRequestDraft {
        LeaveRequestDraft {
            employee_id,
            leave_type: LeaveType::Annual,
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
    fn insert_assigns_sequential_ids_and_pending_status() {
        let store = MemoryStore::new();
        let first = store.insert_request(draft(1, date(2025, 3, 3))).unwrap();
        let second = store.insert_request(draft(1, date(2025, 3, 4))).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, LeaveStatus::Pending);
    }

    #[test]
    fn transition_is_compare_and_set() {
        let store = MemoryStore::new();
        let request = store.insert_request(draft(1, date(2025, 3, 3))).unwrap();

        store
            .transition_status(
                request.id,
                LeaveStatus::Pending,
                LeaveStatus::Approved,
                StatusUpdate {
                    approved_by: Some(9),
                    approval_date: Some(date(2025, 3, 1)),
                    rejection_reason: None,
                },
            )
            .unwrap();

        // Second approval of the same request must lose.
        let err = store
            .transition_status(
                request.id,
                LeaveStatus::Pending,
                LeaveStatus::Approved,
                StatusUpdate::default(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Conflict {
                status: LeaveStatus::Approved,
                ..
            }
        ));
    }

    #[test]
    fn transition_back_to_pending_clears_disposition() {
        let store = MemoryStore::new();
        let request = store.insert_request(draft(1, date(2025, 3, 3))).unwrap();
        store
            .transition_status(
                request.id,
                LeaveStatus::Pending,
                LeaveStatus::Approved,
                StatusUpdate {
                    approved_by: Some(9),
                    approval_date: Some(date(2025, 3, 1)),
                    rejection_reason: None,
                },
            )
            .unwrap();

        let restored = store
            .transition_status(
                request.id,
                LeaveStatus::Approved,
                LeaveStatus::Pending,
                StatusUpdate::default(),
            )
            .unwrap();
        assert_eq!(restored.status, LeaveStatus::Pending);
        assert!(restored.approved_by.is_none());
        assert!(restored.approval_date.is_none());
    }

    #[test]
    fn refused_summary_update_commits_nothing() {
        let store = MemoryStore::new();
        let policy = LeavePolicy::default();
        store.put_summary(crate::model::leave_summary::LeaveSummary::seeded(
            1, 2025, 30.0, &policy,
        ));

        let err = store.update_summary(1, 2025, &mut |s| {
            s.annual_leave_used += 10.0;
            Err(EngineError::validation("refused"))
        });
        assert!(err.is_err());

        let summary = store.get_summary(1, 2025).unwrap().unwrap();
        assert_eq!(summary.annual_leave_used, 0.0);
    }

    #[test]
    fn filter_narrows_by_type_status_and_dates() {
        let store = MemoryStore::new();
        let mut wfh = draft(1, date(2025, 3, 3));
        wfh.leave_type = LeaveType::Wfh;
        store.insert_request(wfh).unwrap();
        store.insert_request(draft(1, date(2025, 4, 1))).unwrap();
        store.insert_request(draft(2, date(2025, 3, 3))).unwrap();

        let matched = store
            .list_requests(&RequestFilter {
                employee_id: Some(1),
                leave_type: Some(LeaveType::Wfh),
                statuses: vec![LeaveStatus::Pending, LeaveStatus::Approved],
                start_from: Some(date(2025, 3, 1)),
                start_to: Some(date(2025, 3, 31)),
            })
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].leave_type, LeaveType::Wfh);
    }
}
