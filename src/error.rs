use thiserror::Error;

use crate::model::leave_request::LeaveStatus;

/// Alias for results produced by the leave engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error taxonomy of the leave engine.
///
/// Business-rule failures (`Validation`) are expected outcomes and carry the
/// computed balances so the caller can explain the rejection. `Conflict`
/// signals a state-machine violation, `NotFound` an unknown reference,
/// `Integrity` broken master data, and `Store` an infrastructure failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{message}")]
    Validation {
        message: String,
        /// Balance currently available for the requested leave type, if one applies.
        balance: Option<f64>,
        /// Balance that would remain had the request been granted.
        projected_balance: Option<f64>,
    },

    #[error("leave request {request_id} is already {status}")]
    Conflict {
        request_id: u64,
        status: LeaveStatus,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    #[error("{message}")]
    Integrity { message: String },

    #[error("storage failure: {message}")]
    Store { message: String },
}

impl EngineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            balance: None,
            projected_balance: None,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: u64) -> Self {
        EngineError::NotFound { entity, id }
    }

    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        EngineError::Integrity {
            message: message.into(),
        }
    }
}
