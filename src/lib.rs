//! Hospital shift planning core.
//!
//! The central operation is [`planner::ReplicationPlanner::plan`]: expand a
//! recurring shift (one weekday, one time window, one month) into concrete
//! shifts for a professional, skipping dates where they are already busy.

pub mod calendar;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod planner;
pub mod shifts;
pub mod store;
pub mod trades;

pub use error::{PlanError, ShiftError, StoreError, TradeError, ValidationError};
pub use models::{
    RecurrenceRequest, ReplicationOutcome, ReplicationRequest, Shift, ShiftInstance, ShiftStatus,
    SkipReason, SkippedDate,
};
pub use planner::ReplicationPlanner;
pub use store::{InMemoryShiftStore, ShiftStore};
