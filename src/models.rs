//! Data models for the shift planning core.
//!
//! - ShiftStatus: lifecycle of a persisted shift
//! - Shift / NewShift: persisted shift records and creation commands
//! - ReplicationRequest: the loosely typed payload received at the boundary
//! - RecurrenceRequest: the validated replication request the planner accepts
//! - ShiftInstance: one candidate occurrence computed by the planner
//! - ReplicationOutcome: what a replication run created and skipped

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::ValidationError;

/// Lifecycle state of a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl ShiftStatus {
    /// Convert a string to a ShiftStatus. Accepts the panel's Portuguese
    /// labels as well as the English names.
    pub fn from_string(value: &str) -> Result<Self, String> {
        match value.to_lowercase().trim() {
            "scheduled" | "agendado" => Ok(ShiftStatus::Scheduled),
            "completed" | "concluido" => Ok(ShiftStatus::Completed),
            "cancelled" | "canceled" | "cancelado" => Ok(ShiftStatus::Cancelled),
            _ => Err(format!(
                "Invalid shift status: '{}'. Must be one of: scheduled, completed, cancelled",
                value
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShiftStatus::Scheduled => "SCHEDULED",
            ShiftStatus::Completed => "COMPLETED",
            ShiftStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether a shift in this state occupies the professional's time.
    pub fn blocks_time(&self) -> bool {
        !matches!(self, ShiftStatus::Cancelled)
    }
}

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`. Touching intervals do not overlap.
pub fn intervals_overlap(
    s1: NaiveDateTime,
    e1: NaiveDateTime,
    s2: NaiveDateTime,
    e2: NaiveDateTime,
) -> bool {
    s1 < e2 && s2 < e1
}

/// A persisted shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub hospital_id: String,
    pub group_id: String,
    pub user_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
}

impl Shift {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Check whether this shift occupies any part of `[start, end)`.
    /// Cancelled shifts never do.
    pub fn conflicts_with(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.status.blocks_time() && intervals_overlap(self.start, self.end, start, end)
    }
}

/// Command to create a shift. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShift {
    pub hospital_id: String,
    pub group_id: String,
    pub user_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
}

impl NewShift {
    /// Create a scheduled shift command with validation.
    pub fn new(
        hospital_id: String,
        group_id: String,
        user_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let hospital_id = required("hospitalId", Some(hospital_id))?;
        let group_id = required("groupId", Some(group_id))?;
        let user_id = required("userId", Some(user_id))?;
        check_window(start, end)?;

        Ok(NewShift {
            hospital_id,
            group_id,
            user_id,
            start,
            end,
            notes: normalize_notes(notes),
            status: ShiftStatus::Scheduled,
        })
    }

    /// Re-check the invariants `new` enforces, for commands built field by field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("hospitalId", &self.hospital_id),
            ("groupId", &self.group_id),
            ("userId", &self.user_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        check_window(self.start, self.end)
    }

    pub fn into_shift(self, id: String) -> Shift {
        Shift {
            id,
            hospital_id: self.hospital_id,
            group_id: self.group_id,
            user_id: self.user_id,
            start: self.start,
            end: self.end,
            notes: self.notes,
            status: self.status,
        }
    }
}

/// Replication payload as it arrives from a caller, before validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicationRequest {
    pub hospital_id: Option<String>,
    pub group_id: Option<String>,
    pub user_id: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub day_of_week: Option<i64>,
    pub month: Option<i64>,
    pub year: Option<i64>,
    pub notes: Option<String>,
}

impl ReplicationRequest {
    /// Check every field and build the request the planner accepts.
    pub fn validate(self) -> Result<RecurrenceRequest, ValidationError> {
        let hospital_id = required("hospitalId", self.hospital_id)?;
        let group_id = required("groupId", self.group_id)?;
        let user_id = required("userId", self.user_id)?;
        let start_time = required("startTime", self.start_time)?;
        let end_time = required("endTime", self.end_time)?;
        let day_of_week = self
            .day_of_week
            .ok_or(ValidationError::MissingField("dayOfWeek"))?;
        let month = self.month.ok_or(ValidationError::MissingField("month"))?;
        let year = self.year.ok_or(ValidationError::MissingField("year"))?;

        RecurrenceRequest::new(
            hospital_id,
            group_id,
            user_id,
            &start_time,
            &end_time,
            day_of_week,
            month,
            year,
            self.notes,
        )
    }
}

/// A validated replication request.
///
/// Fields are private so a value of this type always satisfies the
/// request invariants: known weekday and month, a representable year,
/// and `start_time < end_time` on the same day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRequest {
    hospital_id: String,
    group_id: String,
    user_id: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    day_of_week: Weekday,
    month: u32,
    year: i32,
    notes: Option<String>,
}

impl RecurrenceRequest {
    /// Create a recurrence request with validation.
    ///
    /// `day_of_week` counts from 0 = Sunday to 6 = Saturday.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        hospital_id: String,
        group_id: String,
        user_id: String,
        start_time: &str,
        end_time: &str,
        day_of_week: i64,
        month: i64,
        year: i64,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let hospital_id = required("hospitalId", Some(hospital_id))?;
        let group_id = required("groupId", Some(group_id))?;
        let user_id = required("userId", Some(user_id))?;

        let start = calendar::parse_time_of_day("startTime", start_time)?;
        let end = calendar::parse_time_of_day("endTime", end_time)?;
        if start >= end {
            return Err(ValidationError::StartNotBeforeEnd {
                start: start_time.trim().to_string(),
                end: end_time.trim().to_string(),
            });
        }

        let weekday = calendar::weekday_from_index(day_of_week)?;
        if !(1..=12).contains(&month) {
            return Err(ValidationError::MonthOutOfRange(month));
        }
        let year = i32::try_from(year).map_err(|_| ValidationError::YearOutOfRange(year))?;
        let month = month as u32;
        // Rejects years the calendar cannot represent up front.
        calendar::month_bounds(year, month)?;

        Ok(RecurrenceRequest {
            hospital_id,
            group_id,
            user_id,
            start_time: start,
            end_time: end,
            day_of_week: weekday,
            month,
            year,
            notes: normalize_notes(notes),
        })
    }

    pub fn hospital_id(&self) -> &str {
        &self.hospital_id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Build the candidate shift for one calendar date.
    pub fn instance_on(&self, date: NaiveDate) -> ShiftInstance {
        ShiftInstance {
            date,
            start: date.and_time(self.start_time),
            end: date.and_time(self.end_time),
            hospital_id: self.hospital_id.clone(),
            group_id: self.group_id.clone(),
            user_id: self.user_id.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// One candidate occurrence of a recurring shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInstance {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub hospital_id: String,
    pub group_id: String,
    pub user_id: String,
    pub notes: Option<String>,
}

impl ShiftInstance {
    pub fn into_new_shift(self) -> NewShift {
        NewShift {
            hospital_id: self.hospital_id,
            group_id: self.group_id,
            user_id: self.user_id,
            start: self.start,
            end: self.end,
            notes: self.notes,
            status: ShiftStatus::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// Result of a replication run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationOutcome {
    pub created_count: usize,
    pub created: Vec<Shift>,
    pub skipped: Vec<SkippedDate>,
}

impl ReplicationOutcome {
    /// Total number of candidate dates processed so far.
    pub fn processed(&self) -> usize {
        self.created_count + self.skipped.len()
    }

    /// Last date processed, created or skipped.
    pub fn last_processed(&self) -> Option<NaiveDate> {
        let last_created = self.created.last().map(|s| s.start.date());
        let last_skipped = self.skipped.last().map(|s| s.date);
        last_created.max(last_skipped)
    }
}

pub(crate) fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// A shift window must end strictly after it starts.
pub fn check_window(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::StartNotBeforeEnd {
            start: start.format("%Y-%m-%d %H:%M").to_string(),
            end: end.format("%Y-%m-%d %H:%M").to_string(),
        });
    }
    Ok(())
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}
