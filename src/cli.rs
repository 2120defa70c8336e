use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use crate::models::{Category, Completion, Difficulty, Frequency, Habit, User};
use crate::progress;
use crate::tracker::{HabitDraft, Tracker, TrackerError};

#[derive(Parser)]
#[command(name = "habitflow")]
#[command(about = "Habit tracker with streaks, points and levels")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Create a new habit
    AddHabit {
        /// Habit title
        title: String,
        /// Category: health, fitness, productivity, mindfulness, learning, social, creativity, finance
        #[arg(long, default_value = "health")]
        category: Category,
        /// Difficulty: easy (10 pts), medium (15 pts), hard (25 pts)
        #[arg(long, default_value = "easy")]
        difficulty: Difficulty,
        /// Target count per period
        #[arg(long, default_value_t = 1)]
        target: i64,
        /// Frequency: daily, weekly, monthly
        #[arg(long, default_value = "daily")]
        frequency: Frequency,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },
    /// Record a completion for a habit
    Complete {
        /// Habit ID (see `habitflow list`)
        id: i64,
        /// Units completed this time
        #[arg(long, default_value_t = 1)]
        count: i64,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
    },
    /// List habits with today's progress
    List,
    /// Show or edit the profile
    Profile {
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New email address
        #[arg(long)]
        email: Option<String>,
        /// Override the level directly (recomputed on the next point award)
        #[arg(long)]
        level: Option<i64>,
    },
    /// Show profile stats and the weekly chart
    Stats,
    /// Delete a habit and all its completions
    Delete {
        /// Habit ID
        id: i64,
    },
    /// Erase all habits, completions and the profile
    Reset {
        /// Confirm the wipe without prompting
        #[arg(long)]
        yes: bool,
    },
    /// Dump all data as JSON to stdout
    Export,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    TrackerError(#[from] TrackerError),
    #[error("Failed to serialize export: {0}")]
    ExportError(#[from] serde_json::Error),
    #[error("{0}")]
    Aborted(String),
}

/// Handle the add-habit command
pub fn handle_add_habit(
    title: String,
    category: Category,
    difficulty: Difficulty,
    target: i64,
    frequency: Frequency,
    description: Option<String>,
    tracker: &mut Tracker,
) -> Result<(), CliError> {
    let habit = tracker.add_habit(HabitDraft {
        title,
        description,
        category,
        frequency,
        target_count: target,
        difficulty,
    })?;
    let id = habit.id.unwrap_or_default();
    println!(
        "Habit created successfully (ID: {}, {} pts per completion)",
        id, habit.points
    );
    Ok(())
}

/// Handle the complete command
pub fn handle_complete(
    id: i64,
    count: i64,
    note: Option<String>,
    tracker: &mut Tracker,
) -> Result<(), CliError> {
    let earned = tracker.complete_habit(id, count, note)?;
    let user = tracker.user();
    println!(
        "Completion recorded: +{} pts (total {}, level {})",
        earned, user.total_points, user.level
    );

    let progress = tracker.habit_progress(id);
    println!(
        "Today: {}/{} ({:.0}%)",
        progress.completed, progress.target, progress.percentage
    );
    Ok(())
}

/// Handle the list command
pub fn handle_list(tracker: &Tracker) -> Result<(), CliError> {
    if tracker.habits().is_empty() {
        println!("No habits yet. Create one with `habitflow add-habit <title>`.");
        return Ok(());
    }

    for habit in tracker.habits() {
        let id = habit.id.unwrap_or_default();
        let progress = tracker.habit_progress(id);
        let active_marker = if habit.active { "" } else { " [paused]" };
        println!(
            "{:>4}  {} {}{}  [{}] streak {} (best {})  today {}/{} ({:.0}%)",
            id,
            habit.category.icon(),
            habit.title,
            active_marker,
            habit.category,
            habit.current_streak,
            habit.longest_streak,
            progress.completed,
            progress.target,
            progress.percentage
        );
    }
    Ok(())
}

/// Handle the profile command. With no flags it prints the profile; with
/// flags it applies the edits.
pub fn handle_profile(
    name: Option<String>,
    email: Option<String>,
    level: Option<i64>,
    tracker: &mut Tracker,
) -> Result<(), CliError> {
    if name.is_none() && email.is_none() && level.is_none() {
        let user = tracker.user();
        println!(
            "{} <{}>",
            user.name,
            user.email.as_deref().unwrap_or("no email")
        );
        println!(
            "Level {} ({} pts), streak {} days (best {})",
            user.level, user.total_points, user.current_streak, user.longest_streak
        );
        return Ok(());
    }

    if name.is_some() || email.is_some() {
        let current = tracker.user();
        let new_name = name.unwrap_or_else(|| current.name.clone());
        let new_email = email.or_else(|| current.email.clone());
        tracker.update_profile(new_name, new_email)?;
    }
    if let Some(level) = level {
        tracker.set_level(level)?;
    }

    let user = tracker.user();
    println!("Profile updated: {} (level {})", user.name, user.level);
    Ok(())
}

/// Handle the stats command
pub fn handle_stats(tracker: &Tracker) -> Result<(), CliError> {
    let stats = tracker.stats();
    let user = tracker.user();

    println!(
        "{} - level {} ({} pts)",
        user.name, stats.level, stats.total_points
    );
    println!(
        "Streak: {} days (best {})",
        stats.current_streak, user.longest_streak
    );
    println!(
        "Habits: {} total, {} active, {} completions today",
        stats.total_habits, stats.active_habits, stats.completed_today
    );
    println!("Weekly progress: {}%", stats.weekly_progress);

    let week = tracker.weekly(chrono::Local::now().date_naive());
    for day in &week {
        // Simple horizontal bar, one step per 10%
        let steps = (day.percentage.min(100.0) / 10.0).round() as usize;
        println!(
            "  {}  {:<10} {} events",
            progress::day_label(day.day),
            "#".repeat(steps),
            day.completions
        );
    }
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(id: i64, tracker: &mut Tracker) -> Result<(), CliError> {
    tracker.delete_habit(id)?;
    println!("Habit {} deleted (completions removed)", id);
    Ok(())
}

/// Handle the reset command
pub fn handle_reset(yes: bool, tracker: &mut Tracker) -> Result<(), CliError> {
    if !yes {
        return Err(CliError::Aborted(
            "Refusing to erase data without --yes".to_string(),
        ));
    }
    tracker.reset_all()?;
    println!("All data cleared; profile reset to level 1");
    Ok(())
}

#[derive(Serialize)]
struct ExportSnapshot<'a> {
    habits: &'a [Habit],
    completions: &'a [Completion],
    user: &'a User,
}

/// Handle the export command: a JSON snapshot of everything, timestamps as
/// ISO-8601 strings.
pub fn handle_export(tracker: &Tracker) -> Result<(), CliError> {
    let snapshot = ExportSnapshot {
        habits: tracker.habits(),
        completions: tracker.ledger().records(),
        user: tracker.user(),
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use clap::Parser;
    use tempfile::{TempDir, tempdir};

    fn setup_tracker() -> (Tracker, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        (Tracker::load(db).unwrap(), dir)
    }

    #[test]
    fn add_habit_args_parse_with_typed_defaults() {
        let cli = Cli::try_parse_from(["habitflow", "add-habit", "Run"]).unwrap();
        match cli.command {
            Some(Commands::AddHabit {
                title,
                category,
                difficulty,
                target,
                frequency,
                ..
            }) => {
                assert_eq!(title, "Run");
                assert_eq!(category, Category::Health);
                assert_eq!(difficulty, Difficulty::Easy);
                assert_eq!(target, 1);
                assert_eq!(frequency, Frequency::Daily);
            }
            _ => panic!("expected add-habit"),
        }
    }

    #[test]
    fn invalid_enum_argument_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["habitflow", "add-habit", "Run", "--difficulty", "brutal"])
            .is_err());
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["habitflow"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dev);
    }

    #[test]
    fn reset_refuses_without_yes() {
        let (mut tracker, _dir) = setup_tracker();
        assert!(matches!(
            handle_reset(false, &mut tracker),
            Err(CliError::Aborted(_))
        ));
        assert!(handle_reset(true, &mut tracker).is_ok());
    }

    #[test]
    fn profile_edits_apply_name_and_level_override() {
        let (mut tracker, _dir) = setup_tracker();
        handle_profile(Some("Ada".to_string()), None, Some(4), &mut tracker).unwrap();
        assert_eq!(tracker.user().name, "Ada");
        assert_eq!(tracker.user().level, 4);
    }

    #[test]
    fn export_snapshot_serializes_all_sections() {
        let (mut tracker, _dir) = setup_tracker();
        handle_add_habit(
            "Run".to_string(),
            Category::Fitness,
            Difficulty::Hard,
            1,
            Frequency::Daily,
            None,
            &mut tracker,
        )
        .unwrap();
        let id = tracker.habits()[0].id.unwrap();
        handle_complete(id, 1, None, &mut tracker).unwrap();

        let snapshot = ExportSnapshot {
            habits: tracker.habits(),
            completions: tracker.ledger().records(),
            user: tracker.user(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
        assert_eq!(json["habits"].as_array().unwrap().len(), 1);
        assert_eq!(json["completions"].as_array().unwrap().len(), 1);
        assert_eq!(json["user"]["total_points"], 25);
    }
}
