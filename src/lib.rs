//! Leave balance & entitlement engine for the HRM backend.
//!
//! Computes tenure-based leave entitlements, gates new leave requests
//! against current balances, mutates balances on approval, and keeps the
//! per-employee ledgers consistent with the approved request history through
//! the recomputation and carry-over batch jobs.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;

pub use config::{Config, LeavePolicy};
pub use engine::{
    CarryOverEntry, CarryOverReport, CreatedLeave, JobSkip, LeaveBalance, LeaveEngine,
    NewLeaveRequest, RecomputationReport,
};
pub use error::{EngineError, EngineResult};
