use chrono::{Datelike, NaiveDate, NaiveDateTime};
use shiftplan::calendar::weekday_from_index;
use shiftplan::models::{intervals_overlap, NewShift};
use shiftplan::{
    InMemoryShiftStore, PlanError, ReplicationOutcome, ReplicationPlanner, ReplicationRequest, Shift,
    ShiftStore, SkipReason, StoreError, ValidationError,
};
use std::cell::Cell;

fn payload(day_of_week: i64, month: i64, year: i64) -> ReplicationRequest {
    ReplicationRequest {
        hospital_id: Some("hospital-valenca".to_string()),
        group_id: Some("hospital-valenca-ortopedista-plantonista".to_string()),
        user_id: Some("user-john-doe".to_string()),
        start_time: Some("07:00".to_string()),
        end_time: Some("19:00".to_string()),
        day_of_week: Some(day_of_week),
        month: Some(month),
        year: Some(year),
        notes: Some("Plantão".to_string()),
    }
}

/// Counts every store call, to prove which paths reach the store.
#[derive(Default)]
struct CountingStore {
    inner: InMemoryShiftStore,
    reads: Cell<usize>,
    writes: usize,
}

impl ShiftStore for CountingStore {
    fn find_overlapping_shift(
        &self,
        user_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Option<Shift>, StoreError> {
        self.reads.set(self.reads.get() + 1);
        self.inner.find_overlapping_shift(user_id, start, end)
    }

    fn create_shift(&mut self, shift: NewShift) -> Result<Shift, StoreError> {
        self.writes += 1;
        self.inner.create_shift(shift)
    }

    fn get_shift(&self, id: &str) -> Result<Option<Shift>, StoreError> {
        self.inner.get_shift(id)
    }

    fn shifts_for_user(&self, user_id: &str) -> Result<Vec<Shift>, StoreError> {
        self.inner.shifts_for_user(user_id)
    }

    fn update_shift(&mut self, shift: Shift) -> Result<(), StoreError> {
        self.writes += 1;
        self.inner.update_shift(shift)
    }

    fn delete_shift(&mut self, id: &str) -> Result<Shift, StoreError> {
        self.writes += 1;
        self.inner.delete_shift(id)
    }
}

/// Boundary flow of a caller: validate the payload, then plan against the store.
fn replicate<S: ShiftStore>(
    store: &mut S,
    payload: ReplicationRequest,
) -> Result<ReplicationOutcome, PlanError> {
    let request = payload.validate()?;
    ReplicationPlanner::new(store).plan(&request)
}

#[test_log::test]
fn created_dates_match_weekday_and_month() {
    for year in [2024, 2025, 2026] {
        for month in 1..=12 {
            for day in 0..7 {
                let mut store = InMemoryShiftStore::new();
                let request = payload(day, month, year).validate().unwrap();
                let outcome = ReplicationPlanner::new(&mut store).plan(&request).unwrap();

                let weekday = weekday_from_index(day).unwrap();
                assert!(outcome.created_count == 4 || outcome.created_count == 5);
                assert!(outcome.skipped.is_empty());
                for shift in &outcome.created {
                    let date = shift.start.date();
                    assert_eq!(date.weekday(), weekday);
                    assert_eq!(date.month() as i64, month);
                    assert_eq!(date.year() as i64, year);
                    assert_eq!(shift.end.date(), date);
                }
            }
        }
    }
}

#[test]
fn february_2024_thursdays() {
    let mut store = InMemoryShiftStore::new();
    let request = payload(4, 2, 2024).validate().unwrap();
    let outcome = ReplicationPlanner::new(&mut store).plan(&request).unwrap();

    let dates: Vec<NaiveDate> = outcome.created.iter().map(|s| s.start.date()).collect();
    let expected: Vec<NaiveDate> = [1, 8, 15, 22, 29]
        .iter()
        .map(|&d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap())
        .collect();
    assert_eq!(dates, expected);
}

#[test_log::test]
fn replicating_twice_creates_nothing_the_second_time() {
    let mut store = CountingStore::default();
    let request = payload(1, 9, 2025).validate().unwrap();

    let first = ReplicationPlanner::new(&mut store).plan(&request).unwrap();
    assert_eq!(first.created_count, 5);
    assert!(first.skipped.is_empty());

    let second = ReplicationPlanner::new(&mut store).plan(&request).unwrap();
    assert_eq!(second.created_count, 0);
    assert_eq!(second.skipped.len(), 5);
    assert!(second.skipped.iter().all(|s| s.reason == SkipReason::Conflict));

    assert_eq!(store.reads.get(), 10);
    assert_eq!(store.writes, 5);
}

#[test]
fn no_two_shifts_of_a_professional_overlap() {
    let mut store = InMemoryShiftStore::new();
    let windows = [("07:00", "19:00"), ("06:00", "08:00"), ("18:00", "23:00"), ("19:00", "23:59")];

    for (start, end) in windows {
        for day in [1, 3, 5] {
            let mut p = payload(day, 3, 2025);
            p.start_time = Some(start.to_string());
            p.end_time = Some(end.to_string());
            let request = p.validate().unwrap();
            ReplicationPlanner::new(&mut store).plan(&request).unwrap();
        }
    }

    let shifts = store.shifts_for_user("user-john-doe").unwrap();
    assert!(!shifts.is_empty());
    for (i, a) in shifts.iter().enumerate() {
        for b in &shifts[i + 1..] {
            assert!(
                !intervals_overlap(a.start, a.end, b.start, b.end),
                "{} - {} overlaps {} - {}",
                a.start,
                a.end,
                b.start,
                b.end
            );
        }
    }
}

#[test]
fn invalid_windows_fail_before_any_store_call() {
    let mut store = CountingStore::default();

    for (start, end) in [("19:00", "19:00"), ("19:00", "07:00"), ("25:00", "26:00")] {
        let mut p = payload(1, 9, 2025);
        p.start_time = Some(start.to_string());
        p.end_time = Some(end.to_string());
        let err = replicate(&mut store, p).unwrap_err();
        assert!(matches!(err, PlanError::Validation(_)), "{start}-{end}: {err}");
        assert!(err.partial_outcome().is_none());
    }

    let err = replicate(&mut store, payload(1, 0, 2025)).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::MonthOutOfRange(0))
    ));

    assert_eq!(store.reads.get(), 0);
    assert_eq!(store.writes, 0);
    assert!(store.inner.is_empty());

    // The same store serves a valid payload once the caller fixes it.
    let outcome = replicate(&mut store, payload(1, 9, 2025)).unwrap();
    assert_eq!(outcome.created_count, 5);
    assert_eq!(store.writes, 5);
}

#[test]
fn validation_error_converts_into_plan_error() {
    let err: PlanError = ValidationError::MissingField("userId").into();
    assert!(err.partial_outcome().is_none());
    assert_eq!(err.to_string(), "Missing required field: userId");
}

#[test]
fn outcome_serializes_for_the_caller() {
    let mut store = InMemoryShiftStore::new();
    let request = payload(1, 9, 2025).validate().unwrap();
    ReplicationPlanner::new(&mut store).plan(&request).unwrap();
    let outcome = ReplicationPlanner::new(&mut store).plan(&request).unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["createdCount"], 0);
    assert_eq!(json["skipped"][0]["date"], "2025-09-01");
    assert_eq!(json["skipped"][0]["reason"], "CONFLICT");
    assert_eq!(json["skipped"].as_array().map(Vec::len), Some(5));
}
