//! Shift storage.
//!
//! The planner and the administration operations talk to persisted shifts
//! only through [`ShiftStore`]. The caller opens the store, lends it to
//! each operation, and closes it when done.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewShift, Shift};

/// Contract of the persisted shift store.
pub trait ShiftStore {
    /// Return a non-cancelled shift of `user_id` overlapping `[start, end)`,
    /// if there is one.
    fn find_overlapping_shift(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<Shift>, StoreError>;

    /// Persist a new shift and return it with its assigned id.
    fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError>;

    fn get_shift(&self, id: &str) -> Result<Option<Shift>, StoreError>;

    /// All shifts of a professional, sorted by start time.
    fn shifts_for_user(&self, user_id: &str) -> Result<Vec<Shift>, StoreError>;

    /// Replace a stored shift, matched by id.
    fn update_shift(&mut self, shift: Shift) -> Result<(), StoreError>;

    /// Remove a shift and return what was stored.
    fn delete_shift(&mut self, id: &str) -> Result<Shift, StoreError>;
}

/// HashMap-backed shift store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShiftStore {
    shifts: HashMap<String, Shift>,
}

impl InMemoryShiftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Get all shifts sorted by start time.
    pub fn shifts(&self) -> Vec<Shift> {
        let mut shifts: Vec<Shift> = self.shifts.values().cloned().collect();
        shifts.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.user_id.cmp(&b.user_id)));
        shifts
    }
}

impl ShiftStore for InMemoryShiftStore {
    fn find_overlapping_shift(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<Shift>, StoreError> {
        Ok(self
            .shifts
            .values()
            .filter(|s| s.user_id == user_id && s.conflicts_with(start, end))
            .min_by_key(|s| s.start)
            .cloned())
    }

    fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError> {
        let shift = shift.into_shift(Uuid::new_v4().to_string());
        self.shifts.insert(shift.id.clone(), shift.clone());
        Ok(shift)
    }

    fn get_shift(&self, id: &str) -> Result<Option<Shift>, StoreError> {
        Ok(self.shifts.get(id).cloned())
    }

    fn shifts_for_user(&self, user_id: &str) -> Result<Vec<Shift>, StoreError> {
        let mut shifts: Vec<Shift> = self
            .shifts
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        shifts.sort_by_key(|s| s.start);
        Ok(shifts)
    }

    fn update_shift(&mut self, shift: Shift) -> Result<(), StoreError> {
        match self.shifts.get_mut(&shift.id) {
            Some(stored) => {
                *stored = shift;
                Ok(())
            }
            None => Err(StoreError::NotFound(shift.id)),
        }
    }

    fn delete_shift(&mut self, id: &str) -> Result<Shift, StoreError> {
        self.shifts
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl std::fmt::Display for InMemoryShiftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InMemoryShiftStore(shifts={})", self.shifts.len())
    }
}
