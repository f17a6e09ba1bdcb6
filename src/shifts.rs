//! Single-shift administration: manual scheduling, rescheduling,
//! deletion and status changes.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::error::ShiftError;
use crate::models::{check_window, NewShift, Shift, ShiftStatus};
use crate::store::ShiftStore;

/// Schedule one shift, refusing it if the professional is already busy.
pub fn schedule_shift<S: ShiftStore + ?Sized>(
    store: &mut S,
    shift: NewShift,
) -> Result<Shift, ShiftError> {
    shift.validate()?;

    if let Some(existing) = store.find_overlapping_shift(&shift.user_id, shift.start, shift.end)? {
        warn!(user_id = %shift.user_id, existing_id = %existing.id, "Shift overlaps an existing one");
        return Err(ShiftError::Conflict {
            user_id: shift.user_id,
            existing_id: existing.id,
        });
    }

    let created = store.create_shift(shift)?;
    info!(shift_id = %created.id, user_id = %created.user_id, start = %created.start, "Shift scheduled");
    Ok(created)
}

/// Move a shift to a new window.
///
/// The shift's own current window is ignored by the conflict check, so a
/// shift can be shortened or shifted into time it already occupies.
pub fn reschedule_shift<S: ShiftStore + ?Sized>(
    store: &mut S,
    id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Shift, ShiftError> {
    check_window(start, end)?;

    let mut shift = store
        .get_shift(id)?
        .ok_or_else(|| ShiftError::NotFound(id.to_string()))?;

    if shift.status.blocks_time() {
        if let Some(existing) = store
            .shifts_for_user(&shift.user_id)?
            .into_iter()
            .find(|s| s.id != shift.id && s.conflicts_with(start, end))
        {
            warn!(shift_id = %shift.id, existing_id = %existing.id, "Rescheduled window overlaps another shift");
            return Err(ShiftError::Conflict {
                user_id: shift.user_id,
                existing_id: existing.id,
            });
        }
    }

    shift.start = start;
    shift.end = end;
    store.update_shift(shift.clone())?;
    info!(shift_id = %shift.id, start = %shift.start, end = %shift.end, "Shift rescheduled");
    Ok(shift)
}

/// Remove a shift from the store and return it.
pub fn delete_shift<S: ShiftStore + ?Sized>(store: &mut S, id: &str) -> Result<Shift, ShiftError> {
    if store.get_shift(id)?.is_none() {
        return Err(ShiftError::NotFound(id.to_string()));
    }
    let removed = store.delete_shift(id)?;
    info!(shift_id = %removed.id, user_id = %removed.user_id, "Shift deleted");
    Ok(removed)
}

/// Cancel a shift. Cancelling an already cancelled shift is a no-op.
pub fn cancel_shift<S: ShiftStore + ?Sized>(store: &mut S, id: &str) -> Result<Shift, ShiftError> {
    transition(store, id, ShiftStatus::Cancelled)
}

/// Mark a scheduled shift as completed.
pub fn complete_shift<S: ShiftStore + ?Sized>(store: &mut S, id: &str) -> Result<Shift, ShiftError> {
    transition(store, id, ShiftStatus::Completed)
}

fn transition<S: ShiftStore + ?Sized>(
    store: &mut S,
    id: &str,
    to: ShiftStatus,
) -> Result<Shift, ShiftError> {
    let mut shift = store
        .get_shift(id)?
        .ok_or_else(|| ShiftError::NotFound(id.to_string()))?;

    if shift.status == to {
        return Ok(shift);
    }

    let allowed = matches!(
        (shift.status, to),
        (ShiftStatus::Scheduled, ShiftStatus::Completed)
            | (ShiftStatus::Scheduled, ShiftStatus::Cancelled)
            | (ShiftStatus::Completed, ShiftStatus::Cancelled)
    );
    if !allowed {
        return Err(ShiftError::InvalidTransition {
            id: id.to_string(),
            from: shift.status.name(),
            to: to.name(),
        });
    }

    shift.status = to;
    store.update_shift(shift.clone())?;
    info!(shift_id = %shift.id, status = shift.status.name(), "Shift status changed");
    Ok(shift)
}
