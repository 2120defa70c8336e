use crate::models::{Habit, User};
use crate::progress::level_for_points;

/// Advance a habit's own streak for one completion event.
///
/// There is no day-boundary check on this path: a habit streak only ever
/// grows when the habit is completed, and never resets for a skipped day.
pub fn record_habit_completion(habit: &mut Habit) {
    habit.current_streak += 1;
    habit.longest_streak = habit.longest_streak.max(habit.current_streak);
}

/// Base points for a completion: the habit's point value times the recorded
/// count. No cap.
pub fn points_for_completion(habit: &Habit, count: i64) -> i64 {
    habit.points * count
}

/// Tiered streak bonus. Tiers are checked in ascending order and the last
/// matching assignment wins, so the highest applicable tier determines the
/// whole bonus; tiers are never summed.
pub fn streak_bonus(new_streak: i64) -> i64 {
    let mut bonus = 0;
    if new_streak >= 7 {
        bonus = 20;
    }
    if new_streak >= 30 {
        bonus = 50;
    }
    if new_streak >= 100 {
        bonus = 100;
    }
    bonus
}

/// Add earned points and recompute the level from the total.
pub fn apply_points_to_user(user: &mut User, points_earned: i64) {
    user.total_points += points_earned;
    user.level = level_for_points(user.total_points);
}

/// Advance (or reset) the user-level streak after a completion was recorded.
///
/// `completions_today` includes the completion just recorded, so on any day
/// with activity the streak increments once per completion event. Completing
/// three habits in one day bumps the streak three times; that is the
/// documented behavior, kept as-is.
pub fn update_user_streak_on_completion(user: &mut User, completions_today: usize) {
    if completions_today > 0 {
        user.current_streak += 1;
    } else {
        user.current_streak = 0;
    }
    user.longest_streak = user.longest_streak.max(user.current_streak);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Difficulty};

    fn hard_habit() -> Habit {
        Habit::new("Run".to_string(), Category::Fitness, Difficulty::Hard)
    }

    #[test]
    fn habit_streak_grows_and_tracks_longest() {
        let mut habit = hard_habit();
        habit.current_streak = 4;
        habit.longest_streak = 9;

        record_habit_completion(&mut habit);
        assert_eq!(habit.current_streak, 5);
        assert_eq!(habit.longest_streak, 9);

        habit.current_streak = 9;
        record_habit_completion(&mut habit);
        assert_eq!(habit.current_streak, 10);
        assert_eq!(habit.longest_streak, 10);
    }

    #[test]
    fn longest_streak_invariant_holds_after_every_completion() {
        let mut habit = hard_habit();
        for _ in 0..120 {
            record_habit_completion(&mut habit);
            assert!(habit.longest_streak >= habit.current_streak);
        }
    }

    #[test]
    fn points_scale_with_count_uncapped() {
        let habit = hard_habit();
        assert_eq!(points_for_completion(&habit, 1), 25);
        assert_eq!(points_for_completion(&habit, 6), 150);
        assert_eq!(points_for_completion(&habit, 1000), 25_000);
    }

    #[test]
    fn streak_bonus_tiers_are_highest_wins_not_cumulative() {
        assert_eq!(streak_bonus(0), 0);
        assert_eq!(streak_bonus(6), 0);
        assert_eq!(streak_bonus(7), 20);
        assert_eq!(streak_bonus(29), 20);
        assert_eq!(streak_bonus(30), 50);
        assert_eq!(streak_bonus(99), 50);
        assert_eq!(streak_bonus(100), 100);
        assert_eq!(streak_bonus(365), 100);
    }

    #[test]
    fn applying_points_recomputes_level() {
        let mut user = User::default();
        apply_points_to_user(&mut user, 95);
        assert_eq!(user.level, 1);
        apply_points_to_user(&mut user, 10);
        assert_eq!(user.total_points, 105);
        assert_eq!(user.level, 2);
    }

    #[test]
    fn user_streak_increments_per_completion_event() {
        let mut user = User::default();
        // Three habits completed the same day: three increments.
        update_user_streak_on_completion(&mut user, 1);
        update_user_streak_on_completion(&mut user, 2);
        update_user_streak_on_completion(&mut user, 3);
        assert_eq!(user.current_streak, 3);
        assert_eq!(user.longest_streak, 3);
    }

    #[test]
    fn user_streak_resets_when_no_completions_today() {
        let mut user = User::default();
        user.current_streak = 5;
        user.longest_streak = 5;
        update_user_streak_on_completion(&mut user, 0);
        assert_eq!(user.current_streak, 0);
        assert_eq!(user.longest_streak, 5);
    }
}
