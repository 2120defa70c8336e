use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::{Completion, Habit};

/// Per-habit completion figures for a single day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HabitProgress {
    pub completed: i64,
    pub target: i64,
    pub percentage: f64,
}

impl HabitProgress {
    pub const ZERO: HabitProgress = HabitProgress {
        completed: 0,
        target: 0,
        percentage: 0.0,
    };
}

/// One bucket of the Sunday-through-Saturday week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayProgress {
    pub day: NaiveDate,
    /// Distinct completion records that day, across all habits. Counts are
    /// not summed here; one record is one event.
    pub completions: usize,
    pub percentage: f64,
}

/// Daily completion percentage for one habit, clamped so over-completion
/// never reports above 100. A zero target yields the zero progress default
/// rather than a division by zero.
pub fn habit_progress(habit: &Habit, todays_completions: &[&Completion]) -> HabitProgress {
    if habit.target_count <= 0 {
        return HabitProgress::ZERO;
    }

    let completed: i64 = todays_completions.iter().map(|c| c.count).sum();
    let percentage = (completed as f64 / habit.target_count as f64 * 100.0).min(100.0);

    HabitProgress {
        completed,
        target: habit.target_count,
        percentage,
    }
}

/// The local Sunday starting the week that contains `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let days_from_sunday = day.weekday().num_days_from_sunday() as i64;
    day - Duration::days(days_from_sunday)
}

/// Per-day event counts for the week containing `reference`, Sunday first.
///
/// The percentage is `events_that_day / habit_count * 100`. It measures how
/// many habit-completion events happened, not how many habits were fully
/// satisfied. With no habits every bucket reports 0.
pub fn weekly_progress(
    completions: &[Completion],
    habit_count: usize,
    reference: NaiveDate,
) -> [DayProgress; 7] {
    let start = week_start(reference);

    std::array::from_fn(|i| {
        let day = start + Duration::days(i as i64);
        let events = completions
            .iter()
            .filter(|c| c.completed_at.date_naive() == day)
            .count();
        let percentage = if habit_count == 0 {
            0.0
        } else {
            events as f64 / habit_count as f64 * 100.0
        };
        DayProgress {
            day,
            completions: events,
            percentage,
        }
    })
}

/// Headline weekly figure: the mean of the seven daily percentages, rounded
/// to the nearest integer for display.
pub fn weekly_aggregate(week: &[DayProgress; 7]) -> u32 {
    let total: f64 = week.iter().map(|d| d.percentage).sum();
    (total / 7.0).round() as u32
}

/// Level curve: one level per 100 points, starting at level 1.
pub fn level_for_points(total_points: i64) -> i64 {
    total_points / 100 + 1
}

/// Short label for a weekday column, Sunday first.
pub fn day_label(day: NaiveDate) -> &'static str {
    match day.weekday() {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::local_at;
    use crate::models::{Category, Difficulty};

    fn habit_with_target(target: i64) -> Habit {
        let mut habit = Habit::new("Water".to_string(), Category::Health, Difficulty::Easy);
        habit.target_count = target;
        habit
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn completion_on(habit_id: i64, day: NaiveDate, count: i64) -> Completion {
        let mut c = Completion::new(habit_id, count);
        c.completed_at = local_at(day, 12, 0);
        c
    }

    #[test]
    fn sums_partial_counts_toward_target() {
        let habit = habit_with_target(8);
        let a = completion_on(1, date(2024, 3, 4), 3);
        let b = completion_on(1, date(2024, 3, 4), 3);
        let progress = habit_progress(&habit, &[&a, &b]);
        assert_eq!(progress.completed, 6);
        assert_eq!(progress.target, 8);
        assert_eq!(progress.percentage, 75.0);
    }

    #[test]
    fn percentage_never_exceeds_100() {
        let habit = habit_with_target(2);
        let a = completion_on(1, date(2024, 3, 4), 50);
        let progress = habit_progress(&habit, &[&a]);
        assert_eq!(progress.percentage, 100.0);
    }

    #[test]
    fn zero_target_yields_zero_progress_not_division_by_zero() {
        let habit = habit_with_target(0);
        let a = completion_on(1, date(2024, 3, 4), 1);
        assert_eq!(habit_progress(&habit, &[&a]), HabitProgress::ZERO);
    }

    #[test]
    fn week_starts_on_local_sunday() {
        // 2024-03-06 is a Wednesday; its week starts Sunday 2024-03-03.
        assert_eq!(week_start(date(2024, 3, 6)), date(2024, 3, 3));
        // A Sunday is its own week start.
        assert_eq!(week_start(date(2024, 3, 3)), date(2024, 3, 3));
        assert_eq!(week_start(date(2024, 3, 9)), date(2024, 3, 3));
    }

    #[test]
    fn weekly_buckets_count_records_not_summed_counts() {
        // Monday 2024-03-04 with 3 completion records across 4 habits -> 75%.
        let monday = date(2024, 3, 4);
        let completions = vec![
            completion_on(1, monday, 5),
            completion_on(2, monday, 1),
            completion_on(3, monday, 2),
        ];
        let week = weekly_progress(&completions, 4, monday);
        // Sunday bucket first, Monday is index 1.
        assert_eq!(week[1].completions, 3);
        assert_eq!(week[1].percentage, 75.0);
        assert_eq!(week[0].completions, 0);
    }

    #[test]
    fn weekly_with_no_habits_reports_zero_everywhere() {
        let monday = date(2024, 3, 4);
        let completions = vec![completion_on(1, monday, 1)];
        let week = weekly_progress(&completions, 0, monday);
        assert!(week.iter().all(|d| d.percentage == 0.0));
    }

    #[test]
    fn aggregate_rounds_the_seven_day_average() {
        let monday = date(2024, 3, 4);
        let completions = vec![
            completion_on(1, monday, 1),
            completion_on(2, monday, 1),
            completion_on(3, monday, 1),
        ];
        // One day at 75%, six at 0% -> 75/7 = 10.71 -> 11.
        let week = weekly_progress(&completions, 4, monday);
        assert_eq!(weekly_aggregate(&week), 11);
    }

    #[test]
    fn level_curve_is_floor_points_over_100_plus_1() {
        assert_eq!(level_for_points(0), 1);
        assert_eq!(level_for_points(99), 1);
        assert_eq!(level_for_points(100), 2);
        assert_eq!(level_for_points(250), 3);
        assert_eq!(level_for_points(1000), 11);
    }
}
