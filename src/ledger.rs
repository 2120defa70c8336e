use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::models::Completion;

/// Append-only collection of completion records.
///
/// Records are never mutated after insertion; the only removal path is the
/// cascade when a habit is deleted. All date queries work on the local
/// calendar day, not a rolling 24-hour window, so a completion at 23:59 and a
/// query at 00:01 the next day land in different buckets.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<Completion>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Completion>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, completion: Completion) {
        self.records.push(completion);
    }

    pub fn records(&self) -> &[Completion] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All completions for one habit, insertion order preserved.
    pub fn for_habit(&self, habit_id: i64) -> Vec<&Completion> {
        self.records
            .iter()
            .filter(|c| c.habit_id == habit_id)
            .collect()
    }

    /// Completions whose timestamp falls in `[start, end)`.
    pub fn in_range(&self, start: DateTime<Local>, end: DateTime<Local>) -> Vec<&Completion> {
        self.records
            .iter()
            .filter(|c| c.completed_at >= start && c.completed_at < end)
            .collect()
    }

    /// Completions recorded on one local calendar day.
    pub fn on_day(&self, day: NaiveDate) -> Vec<&Completion> {
        self.records
            .iter()
            .filter(|c| c.completed_at.date_naive() == day)
            .collect()
    }

    /// Completions for one habit on one local calendar day.
    pub fn for_habit_on_day(&self, habit_id: i64, day: NaiveDate) -> Vec<&Completion> {
        self.records
            .iter()
            .filter(|c| c.habit_id == habit_id && c.completed_at.date_naive() == day)
            .collect()
    }

    /// Cascade delete, used only when a habit is removed.
    pub fn remove_for_habit(&mut self, habit_id: i64) {
        self.records.retain(|c| c.habit_id != habit_id);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Build a local timestamp at a fixed time of day, for deterministic tests and
/// date arithmetic. Falls back across DST gaps to the earliest valid instant.
pub fn local_at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Local> {
    let naive = day
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| day.and_hms_opt(0, 0, 0).expect("midnight is always valid"));
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt,
        None => Local::now(),
    }
}
