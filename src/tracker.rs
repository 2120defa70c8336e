use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::database::{Database, DatabaseError};
use crate::gamification;
use crate::ledger::Ledger;
use crate::models::{Category, Completion, Difficulty, Frequency, Habit, Stats, User};
use crate::progress::{self, DayProgress, HabitProgress};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("No habit with id {0}")]
    HabitNotFound(i64),
    #[error("Invalid habit: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
}

/// Input for creating a habit; everything derived (points, streaks, creation
/// time) is filled in by the tracker.
#[derive(Debug, Clone)]
pub struct HabitDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub frequency: Frequency,
    pub target_count: i64,
    pub difficulty: Difficulty,
}

/// Owns the in-memory habit set, completion ledger and user profile, and the
/// persistence handle. Every mutation goes through a method here; nothing
/// else writes to the collections.
///
/// Persistence discipline: each operation validates first, persists second,
/// and only commits to memory once the database write succeeded, so a failed
/// save leaves the prior in-memory state as the user-visible truth.
pub struct Tracker {
    db: Database,
    habits: Vec<Habit>,
    ledger: Ledger,
    user: User,
}

impl Tracker {
    /// Hydrate state from the database. A failed read of any collection
    /// degrades to an empty collection (reported on stderr) rather than a
    /// crash; a missing profile row creates a fresh default user.
    pub fn load(db: Database) -> Result<Self, TrackerError> {
        let habits = db.load_habits().unwrap_or_else(|e| {
            eprintln!("warning: failed to load habits, starting empty: {}", e);
            Vec::new()
        });
        let completions = db.load_completions().unwrap_or_else(|e| {
            eprintln!("warning: failed to load completions, starting empty: {}", e);
            Vec::new()
        });
        let user = match db.load_user() {
            Ok(Some(user)) => user,
            Ok(None) => {
                let user = User::default();
                db.save_user(&user)?;
                user
            }
            Err(e) => {
                eprintln!("warning: failed to load profile, using default: {}", e);
                User::default()
            }
        };

        Ok(Self {
            db,
            habits,
            ledger: Ledger::from_records(completions),
            user,
        })
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    fn habit_index(&self, id: i64) -> Result<usize, TrackerError> {
        self.habits
            .iter()
            .position(|h| h.id == Some(id))
            .ok_or(TrackerError::HabitNotFound(id))
    }

    pub fn habit(&self, id: i64) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == Some(id))
    }

    /// Validate and create a habit. Rejected drafts create no entity.
    pub fn add_habit(&mut self, draft: HabitDraft) -> Result<&Habit, TrackerError> {
        if draft.title.trim().is_empty() {
            return Err(TrackerError::Validation("title must not be empty".to_string()));
        }
        if draft.target_count < 1 {
            return Err(TrackerError::Validation(
                "target count must be at least 1".to_string(),
            ));
        }

        let mut habit = Habit::new(draft.title.trim().to_string(), draft.category, draft.difficulty);
        habit.description = draft.description.filter(|d| !d.trim().is_empty());
        habit.frequency = draft.frequency;
        habit.target_count = draft.target_count;

        let id = self.db.insert_habit(&habit)?;
        habit.id = Some(id);
        self.habits.push(habit);
        Ok(self
            .habits
            .last()
            .expect("habit was just pushed"))
    }

    /// Record one completion event. Runs the whole sequence (ledger append,
    /// habit streak, points + streak bonus, user points, user streak) and
    /// commits it as a unit. Returns the points earned (base + bonus).
    pub fn complete_habit(
        &mut self,
        habit_id: i64,
        count: i64,
        note: Option<String>,
    ) -> Result<i64, TrackerError> {
        if count < 1 {
            return Err(TrackerError::Validation(
                "completion count must be at least 1".to_string(),
            ));
        }
        let index = self.habit_index(habit_id)?;

        // Work on copies; memory is only updated after the transaction lands.
        let mut habit = self.habits[index].clone();
        let mut user = self.user.clone();

        let mut completion = Completion::new(habit_id, count);
        completion.note = note.filter(|n| !n.trim().is_empty());

        gamification::record_habit_completion(&mut habit);
        let earned = gamification::points_for_completion(&habit, count)
            + gamification::streak_bonus(habit.current_streak);
        gamification::apply_points_to_user(&mut user, earned);

        let completions_today = self
            .ledger
            .on_day(completion.completed_at.date_naive())
            .len()
            + 1;
        gamification::update_user_streak_on_completion(&mut user, completions_today);

        let completion_id = self.db.record_completion(&completion, &habit, &user)?;
        completion.id = Some(completion_id);

        self.ledger.append(completion);
        self.habits[index] = habit;
        self.user = user;
        Ok(earned)
    }

    /// Delete a habit and every completion that references it.
    pub fn delete_habit(&mut self, habit_id: i64) -> Result<(), TrackerError> {
        let index = self.habit_index(habit_id)?;
        self.db.delete_habit(habit_id)?;
        self.habits.remove(index);
        self.ledger.remove_for_habit(habit_id);
        Ok(())
    }

    pub fn toggle_active(&mut self, habit_id: i64) -> Result<bool, TrackerError> {
        let index = self.habit_index(habit_id)?;
        let mut habit = self.habits[index].clone();
        habit.active = !habit.active;
        self.db.update_habit(&habit)?;
        let active = habit.active;
        self.habits[index] = habit;
        Ok(active)
    }

    /// Profile edit: name and email only.
    pub fn update_profile(
        &mut self,
        name: String,
        email: Option<String>,
    ) -> Result<(), TrackerError> {
        if name.trim().is_empty() {
            return Err(TrackerError::Validation("name must not be empty".to_string()));
        }
        let mut user = self.user.clone();
        user.name = name.trim().to_string();
        user.email = email.filter(|e| !e.trim().is_empty());
        self.db.save_user(&user)?;
        self.user = user;
        Ok(())
    }

    /// Direct level override. This is the one place the level can drift from
    /// the point total; the next point award recomputes it.
    pub fn set_level(&mut self, level: i64) -> Result<(), TrackerError> {
        if level < 1 {
            return Err(TrackerError::Validation("level must be at least 1".to_string()));
        }
        let mut user = self.user.clone();
        user.level = level;
        self.db.save_user(&user)?;
        self.user = user;
        Ok(())
    }

    /// Today's progress for one habit. An unknown id reports the
    /// zero-progress default, never an error; dangling completions from a
    /// partial cascade contribute nothing.
    pub fn habit_progress(&self, habit_id: i64) -> HabitProgress {
        let Some(habit) = self.habit(habit_id) else {
            return HabitProgress::ZERO;
        };
        let today = Local::now().date_naive();
        let todays = self.ledger.for_habit_on_day(habit_id, today);
        progress::habit_progress(habit, &todays)
    }

    /// Seven Sunday-first buckets for the week containing `reference`.
    pub fn weekly(&self, reference: NaiveDate) -> [DayProgress; 7] {
        progress::weekly_progress(self.ledger.records(), self.habits.len(), reference)
    }

    pub fn stats(&self) -> Stats {
        let today = Local::now().date_naive();
        let completed_today = self.ledger.on_day(today).len();
        let week = self.weekly(today);

        Stats {
            total_habits: self.habits.len(),
            active_habits: self.habits.iter().filter(|h| h.active).count(),
            completed_today,
            current_streak: self.user.current_streak,
            total_points: self.user.total_points,
            level: self.user.level,
            weekly_progress: progress::weekly_aggregate(&week),
        }
    }

    /// Irreversible: clears every habit and completion and restores a fresh
    /// zero-point, level-1 user, in persistence first and memory second.
    pub fn reset_all(&mut self) -> Result<(), TrackerError> {
        self.db.clear_all()?;
        let user = User::default();
        self.db.save_user(&user)?;
        self.habits.clear();
        self.ledger.clear();
        self.user = user;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn setup_tracker() -> (Tracker, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        let tracker = Tracker::load(db).unwrap();
        (tracker, dir)
    }

    fn draft(title: &str, difficulty: Difficulty, target: i64) -> HabitDraft {
        HabitDraft {
            title: title.to_string(),
            description: None,
            category: Category::Health,
            frequency: Frequency::Daily,
            target_count: target,
            difficulty,
        }
    }

    #[test]
    fn fresh_tracker_has_default_user_and_no_habits() {
        let (tracker, _dir) = setup_tracker();
        assert!(tracker.habits().is_empty());
        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.user().level, 1);
        assert_eq!(tracker.user().total_points, 0);
    }

    #[test]
    fn add_habit_rejects_empty_title_and_bad_target() {
        let (mut tracker, _dir) = setup_tracker();
        assert!(matches!(
            tracker.add_habit(draft("   ", Difficulty::Easy, 1)),
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            tracker.add_habit(draft("Stretch", Difficulty::Easy, 0)),
            Err(TrackerError::Validation(_))
        ));
        assert!(tracker.habits().is_empty());
    }

    #[test]
    fn completing_a_hard_habit_awards_25_points_and_starts_streaks() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Run", Difficulty::Hard, 1))
            .unwrap()
            .id
            .unwrap();

        let earned = tracker.complete_habit(id, 1, None).unwrap();
        assert_eq!(earned, 25);
        assert_eq!(tracker.user().total_points, 25);
        assert_eq!(tracker.user().current_streak, 1);
        let habit = tracker.habit(id).unwrap();
        assert_eq!(habit.current_streak, 1);
        assert_eq!(habit.longest_streak, 1);
    }

    #[test]
    fn streak_bonus_applies_at_exactly_the_crossed_tier() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Meditate", Difficulty::Easy, 1))
            .unwrap()
            .id
            .unwrap();

        // Six completions: 6 * 10 points, no bonus yet.
        for _ in 0..6 {
            tracker.complete_habit(id, 1, None).unwrap();
        }
        assert_eq!(tracker.user().total_points, 60);

        // Seventh completion crosses the 7-day tier: 10 + 20, not cumulative.
        let earned = tracker.complete_habit(id, 1, None).unwrap();
        assert_eq!(earned, 30);

        // Drive the streak to 29, then the next completion hits the 30 tier:
        // 10 + 50, not 10 + 20 + 50.
        for _ in 7..29 {
            tracker.complete_habit(id, 1, None).unwrap();
        }
        assert_eq!(tracker.habit(id).unwrap().current_streak, 29);
        let earned = tracker.complete_habit(id, 1, None).unwrap();
        assert_eq!(earned, 60);
    }

    #[test]
    fn invariants_hold_after_every_completion() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Journal", Difficulty::Medium, 3))
            .unwrap()
            .id
            .unwrap();

        for _ in 0..40 {
            tracker.complete_habit(id, 2, None).unwrap();
            let habit = tracker.habit(id).unwrap();
            assert!(habit.longest_streak >= habit.current_streak);
            let user = tracker.user();
            assert!(user.longest_streak >= user.current_streak);
            assert_eq!(user.level, user.total_points / 100 + 1);
        }
    }

    #[test]
    fn completing_unknown_habit_creates_no_ledger_entry() {
        let (mut tracker, _dir) = setup_tracker();
        assert!(matches!(
            tracker.complete_habit(999, 1, None),
            Err(TrackerError::HabitNotFound(999))
        ));
        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.user().total_points, 0);
    }

    #[test]
    fn completion_count_below_one_is_rejected() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Water", Difficulty::Easy, 8))
            .unwrap()
            .id
            .unwrap();
        assert!(matches!(
            tracker.complete_habit(id, 0, None),
            Err(TrackerError::Validation(_))
        ));
        assert!(tracker.ledger().is_empty());
    }

    #[test]
    fn delete_cascades_and_progress_reverts_to_zero_default() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Sketch", Difficulty::Easy, 1))
            .unwrap()
            .id
            .unwrap();
        tracker.complete_habit(id, 1, None).unwrap();
        assert_eq!(tracker.ledger().len(), 1);

        tracker.delete_habit(id).unwrap();
        assert!(tracker.habits().is_empty());
        assert!(tracker.ledger().is_empty());
        assert_eq!(tracker.habit_progress(id), HabitProgress::ZERO);
    }

    #[test]
    fn partial_progress_counts_toward_target() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Water", Difficulty::Easy, 8))
            .unwrap()
            .id
            .unwrap();
        tracker.complete_habit(id, 6, None).unwrap();

        let progress = tracker.habit_progress(id);
        assert_eq!(progress.completed, 6);
        assert_eq!(progress.target, 8);
        assert_eq!(progress.percentage, 75.0);
    }

    #[test]
    fn state_survives_reload() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let id = {
            let db = Database::new(db_path.to_str().unwrap()).unwrap();
            let mut tracker = Tracker::load(db).unwrap();
            let id = tracker
                .add_habit(draft("Read", Difficulty::Hard, 1))
                .unwrap()
                .id
                .unwrap();
            tracker.complete_habit(id, 1, None).unwrap();
            id
        };

        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        let tracker = Tracker::load(db).unwrap();
        assert_eq!(tracker.habits().len(), 1);
        assert_eq!(tracker.ledger().len(), 1);
        assert_eq!(tracker.user().total_points, 25);
        assert_eq!(tracker.habit(id).unwrap().current_streak, 1);
    }

    #[test]
    fn reset_restores_fresh_state_and_zeroed_stats() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Run", Difficulty::Hard, 1))
            .unwrap()
            .id
            .unwrap();
        tracker.complete_habit(id, 1, None).unwrap();

        tracker.reset_all().unwrap();
        assert!(tracker.habits().is_empty());
        assert!(tracker.ledger().is_empty());
        let stats = tracker.stats();
        assert_eq!(stats.total_habits, 0);
        assert_eq!(stats.completed_today, 0);
        assert_eq!(stats.total_points, 0);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.weekly_progress, 0);
    }

    #[test]
    fn toggle_active_flips_and_persists() {
        let (mut tracker, _dir) = setup_tracker();
        let id = tracker
            .add_habit(draft("Call mom", Difficulty::Easy, 1))
            .unwrap()
            .id
            .unwrap();
        assert!(!tracker.toggle_active(id).unwrap());
        assert!(tracker.toggle_active(id).unwrap());
        assert!(matches!(
            tracker.toggle_active(999),
            Err(TrackerError::HabitNotFound(999))
        ));
    }

    #[test]
    fn stats_reflect_todays_activity() {
        let (mut tracker, _dir) = setup_tracker();
        let a = tracker
            .add_habit(draft("One", Difficulty::Easy, 1))
            .unwrap()
            .id
            .unwrap();
        let b = tracker
            .add_habit(draft("Two", Difficulty::Medium, 1))
            .unwrap()
            .id
            .unwrap();
        tracker.toggle_active(b).unwrap();
        tracker.complete_habit(a, 1, None).unwrap();

        let stats = tracker.stats();
        assert_eq!(stats.total_habits, 2);
        assert_eq!(stats.active_habits, 1);
        assert_eq!(stats.completed_today, 1);
        assert_eq!(stats.total_points, 10);
        assert_eq!(stats.level, 1);
    }

    #[test]
    fn level_override_is_possible_but_next_award_recomputes() {
        let (mut tracker, _dir) = setup_tracker();
        tracker.set_level(7).unwrap();
        assert_eq!(tracker.user().level, 7);

        let id = tracker
            .add_habit(draft("Run", Difficulty::Easy, 1))
            .unwrap()
            .id
            .unwrap();
        tracker.complete_habit(id, 1, None).unwrap();
        // 10 points -> level derived from the total again.
        assert_eq!(tracker.user().level, 1);
    }

    #[test]
    fn update_profile_trims_and_rejects_empty_name() {
        let (mut tracker, _dir) = setup_tracker();
        tracker
            .update_profile("  Ada  ".to_string(), Some("ada@example.com".to_string()))
            .unwrap();
        assert_eq!(tracker.user().name, "Ada");
        assert_eq!(tracker.user().email.as_deref(), Some("ada@example.com"));
        assert!(matches!(
            tracker.update_profile("  ".to_string(), None),
            Err(TrackerError::Validation(_))
        ));
    }
}
