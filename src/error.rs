//! Error types for the shift planning core.
//!
//! Validation failures are the caller's fault and happen before any store
//! call. Store failures come from the external shift store and may arrive
//! after some shifts of the same call have already been persisted.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::ReplicationOutcome;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    DayOfWeekOutOfRange(i64),
    #[error("Month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),
    #[error("Year {0} is outside the supported calendar range")]
    YearOutOfRange(i64),
    #[error("Invalid time of day for {field}: '{value}' (expected HH:MM, 24h)")]
    InvalidTime { field: &'static str, value: String },
    #[error("Start time {start} must be strictly before end time {end}")]
    StartNotBeforeEnd { start: String, end: String },
    #[error("Unknown hospital: {0}")]
    UnknownHospital(String),
    #[error("Unknown group: {0}")]
    UnknownGroup(String),
    #[error("Unknown professional: {0}")]
    UnknownProfessional(String),
    #[error("Group {group_id} does not belong to hospital {hospital_id}")]
    GroupNotInHospital {
        group_id: String,
        hospital_id: String,
    },
    #[error("Professional {user_id} is not a member of group {group_id}")]
    NotAGroupMember { user_id: String, group_id: String },
    #[error("Professional {0} is inactive")]
    InactiveProfessional(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Shift store unavailable: {0}")]
    Unavailable(String),
    #[error("Not found in shift store: {0}")]
    NotFound(String),
    #[error("Shift store rejected the write: {0}")]
    Rejected(String),
}

/// Failure of a replication run.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The store failed while processing `date`. `outcome` holds what was
    /// created or skipped before that date; later dates were not attempted.
    #[error("Replication stopped at {date} after {} created: {source}", .outcome.created_count)]
    Store {
        date: NaiveDate,
        #[source]
        source: StoreError,
        outcome: ReplicationOutcome,
    },
}

impl PlanError {
    /// Progress made before the failure, if any store call had started.
    pub fn partial_outcome(&self) -> Option<&ReplicationOutcome> {
        match self {
            PlanError::Validation(_) => None,
            PlanError::Store { outcome, .. } => Some(outcome),
        }
    }
}

#[derive(Error, Debug)]
pub enum ShiftError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Shift not found: {0}")]
    NotFound(String),
    #[error("Professional {user_id} already has shift {existing_id} overlapping this window")]
    Conflict { user_id: String, existing_id: String },
    #[error("Cannot move shift {id} from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum TradeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Requester and target of a trade must be different professionals")]
    SameProfessional,
    #[error("Trade {0} has already been reviewed")]
    AlreadyReviewed(String),
    #[error("Shift not found: {0}")]
    ShiftNotFound(String),
    #[error("Shift {shift_id} is not assigned to requester {requester_id}")]
    NotShiftOwner {
        shift_id: String,
        requester_id: String,
    },
    #[error("Shift {0} is cancelled and cannot be traded")]
    ShiftCancelled(String),
    #[error("Target professional {user_id} already has shift {existing_id} at that time")]
    Conflict { user_id: String, existing_id: String },
}
