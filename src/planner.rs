//! Monthly shift replication.
//!
//! This module provides the ReplicationPlanner which expands a recurring
//! shift request into one shift per matching weekday of a month, skipping
//! dates where the professional is already busy.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::calendar;
use crate::error::{PlanError, StoreError};
use crate::models::{RecurrenceRequest, ReplicationOutcome, ShiftInstance, SkipReason, SkippedDate};
use crate::store::ShiftStore;

/// Replication planner bound to a shift store.
///
/// The planner keeps no state of its own between calls; everything it
/// knows about existing shifts comes from the store at the moment of each
/// conflict check.
pub struct ReplicationPlanner<'s, S: ShiftStore + ?Sized> {
    store: &'s mut S,
}

impl<'s, S: ShiftStore + ?Sized> ReplicationPlanner<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        ReplicationPlanner { store }
    }

    /// Candidate instances for a request, without consulting the store.
    pub fn preview(request: &RecurrenceRequest) -> Result<Vec<ShiftInstance>, PlanError> {
        let dates = calendar::weekday_dates(request.year(), request.month(), request.day_of_week())?;
        Ok(dates.into_iter().map(|d| request.instance_on(d)).collect())
    }

    /// Create one shift per matching date of the requested month.
    ///
    /// Dates on which the professional already has an overlapping shift
    /// are reported as skipped and left untouched. A store failure stops
    /// the run; the returned error carries the failing date and everything
    /// done before it.
    pub fn plan(&mut self, request: &RecurrenceRequest) -> Result<ReplicationOutcome, PlanError> {
        let candidates = Self::preview(request)?;

        info!(
            user_id = request.user_id(),
            hospital_id = request.hospital_id(),
            group_id = request.group_id(),
            year = request.year(),
            month = request.month(),
            weekday = %request.day_of_week(),
            candidates = candidates.len(),
            "Replicating shifts"
        );

        let mut outcome = ReplicationOutcome::default();

        for instance in candidates {
            let date = instance.date;
            if let Err(source) = self.process(instance, &mut outcome) {
                warn!(%date, error = %source, created = outcome.created_count, "Replication halted by store failure");
                return Err(PlanError::Store {
                    date,
                    source,
                    outcome,
                });
            }
        }

        info!(
            created = outcome.created_count,
            skipped = outcome.skipped.len(),
            "Replication finished"
        );

        Ok(outcome)
    }

    fn process(
        &mut self,
        instance: ShiftInstance,
        outcome: &mut ReplicationOutcome,
    ) -> Result<(), StoreError> {
        let date: NaiveDate = instance.date;

        if let Some(existing) =
            self.store
                .find_overlapping_shift(&instance.user_id, instance.start, instance.end)?
        {
            warn!(%date, existing_id = %existing.id, "Skipping date, professional already has a shift");
            outcome.skipped.push(SkippedDate {
                date,
                reason: SkipReason::Conflict,
            });
            return Ok(());
        }

        let created = self.store.create_shift(instance.into_new_shift())?;
        debug!(%date, shift_id = %created.id, "Shift created");
        outcome.created_count += 1;
        outcome.created.push(created);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::models::{NewShift, Shift, ShiftStatus};
    use crate::store::InMemoryShiftStore;
    use chrono::{Datelike, NaiveDateTime, Weekday};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn request(day_of_week: i64, month: i64, year: i64, start: &str, end: &str) -> RecurrenceRequest {
        RecurrenceRequest::new(
            "hospital-srn".to_string(),
            "hospital-srn-plantonista-ortopedia".to_string(),
            "u-1".to_string(),
            start,
            end,
            day_of_week,
            month,
            year,
            Some("Plantão diurno".to_string()),
        )
        .unwrap()
    }

    /// Store that fails on the n-th creation call.
    struct FailingStore {
        inner: InMemoryShiftStore,
        creates_before_failure: usize,
        fail_reads: bool,
    }

    impl ShiftStore for FailingStore {
        fn find_overlapping_shift(
            &self,
            user_id: &str,
            start: NaiveDateTime,
            end: NaiveDateTime,
        ) -> Result<Option<Shift>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Unavailable("read timeout".to_string()));
            }
            self.inner.find_overlapping_shift(user_id, start, end)
        }

        fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError> {
            if self.creates_before_failure == 0 {
                return Err(StoreError::Unavailable("connection reset".to_string()));
            }
            self.creates_before_failure -= 1;
            self.inner.create_shift(shift)
        }

        fn get_shift(&self, id: &str) -> Result<Option<Shift>, StoreError> {
            self.inner.get_shift(id)
        }

        fn shifts_for_user(&self, user_id: &str) -> Result<Vec<Shift>, StoreError> {
            self.inner.shifts_for_user(user_id)
        }

        fn update_shift(&mut self, shift: Shift) -> Result<(), StoreError> {
            self.inner.update_shift(shift)
        }

        fn delete_shift(&mut self, id: &str) -> Result<Shift, StoreError> {
            self.inner.delete_shift(id)
        }
    }

    #[test_log::test]
    fn test_plan_creates_every_monday_of_september_2025() {
        let mut store = InMemoryShiftStore::new();
        let outcome = ReplicationPlanner::new(&mut store)
            .plan(&request(1, 9, 2025, "07:00", "19:00"))
            .unwrap();

        assert_eq!(outcome.created_count, 5);
        assert!(outcome.skipped.is_empty());
        let days: Vec<u32> = outcome.created.iter().map(|s| s.start.day()).collect();
        assert_eq!(days, vec![1, 8, 15, 22, 29]);
        for shift in &outcome.created {
            assert_eq!(shift.start.weekday(), Weekday::Mon);
            assert_eq!(shift.status, ShiftStatus::Scheduled);
            assert_eq!(shift.notes.as_deref(), Some("Plantão diurno"));
            assert_eq!(shift.duration().num_hours(), 12);
        }
        assert_eq!(store.len(), 5);
    }

    #[test_log::test]
    fn test_second_run_skips_every_date() {
        let mut store = InMemoryShiftStore::new();
        let req = request(1, 9, 2025, "07:00", "19:00");
        ReplicationPlanner::new(&mut store).plan(&req).unwrap();

        let second = ReplicationPlanner::new(&mut store).plan(&req).unwrap();
        assert_eq!(second.created_count, 0);
        assert_eq!(second.skipped.len(), 5);
        assert!(second.skipped.iter().all(|s| s.reason == SkipReason::Conflict));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_partial_overlap_skips_only_that_date() {
        let mut store = InMemoryShiftStore::new();
        store
            .create_shift(
                NewShift::new(
                    "hospital-valenca".to_string(),
                    "g-2".to_string(),
                    "u-1".to_string(),
                    dt("2024-02-15 18:00"),
                    dt("2024-02-16 06:00"),
                    None,
                )
                .unwrap(),
            )
            .unwrap();

        let outcome = ReplicationPlanner::new(&mut store)
            .plan(&request(4, 2, 2024, "07:00", "19:00"))
            .unwrap();

        assert_eq!(outcome.created_count, 4);
        assert_eq!(
            outcome.skipped,
            vec![SkippedDate {
                date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
                reason: SkipReason::Conflict,
            }]
        );
        assert!(outcome
            .created
            .iter()
            .any(|s| s.start == dt("2024-02-29 07:00")));
    }

    #[test]
    fn test_adjacent_shift_is_not_a_conflict() {
        let mut store = InMemoryShiftStore::new();
        ReplicationPlanner::new(&mut store)
            .plan(&request(3, 1, 2025, "07:00", "19:00"))
            .unwrap();

        let night = ReplicationPlanner::new(&mut store)
            .plan(&request(3, 1, 2025, "19:00", "23:59"))
            .unwrap();
        assert_eq!(night.created_count, 5);
        assert!(night.skipped.is_empty());
    }

    #[test]
    fn test_store_failure_reports_progress() {
        let mut store = FailingStore {
            inner: InMemoryShiftStore::new(),
            creates_before_failure: 2,
            fail_reads: false,
        };

        let err = ReplicationPlanner::new(&mut store)
            .plan(&request(1, 9, 2025, "07:00", "19:00"))
            .unwrap_err();

        match err {
            PlanError::Store {
                date,
                source,
                outcome,
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 15).unwrap());
                assert_eq!(source, StoreError::Unavailable("connection reset".to_string()));
                assert_eq!(outcome.created_count, 2);
                assert_eq!(
                    outcome.last_processed(),
                    NaiveDate::from_ymd_opt(2025, 9, 8)
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.inner.len(), 2);
    }

    #[test]
    fn test_read_failure_before_any_write() {
        let mut store = FailingStore {
            inner: InMemoryShiftStore::new(),
            creates_before_failure: 10,
            fail_reads: true,
        };

        let err = ReplicationPlanner::new(&mut store)
            .plan(&request(0, 6, 2025, "07:00", "19:00"))
            .unwrap_err();

        assert_eq!(err.partial_outcome().map(|o| o.processed()), Some(0));
        assert!(store.inner.is_empty());
    }

    #[test]
    fn test_preview_does_not_touch_store() {
        let req = request(4, 2, 2024, "07:00", "19:00");
        let instances = ReplicationPlanner::<InMemoryShiftStore>::preview(&req).unwrap();
        assert_eq!(instances.len(), 5);
        assert_eq!(instances[4].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_validation_happens_before_store_calls() {
        let err = RecurrenceRequest::new(
            "h".to_string(),
            "g".to_string(),
            "u".to_string(),
            "19:00",
            "19:00",
            1,
            9,
            2025,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::StartNotBeforeEnd { .. }));
    }
}
