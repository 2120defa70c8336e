use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Habit categories form a closed set; the icon/color pair for each one lives
/// in a lookup table here rather than on the habit row, so an invalid category
/// string can never enter the data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Health,
    Fitness,
    Productivity,
    Mindfulness,
    Learning,
    Social,
    Creativity,
    Finance,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Health,
        Category::Fitness,
        Category::Productivity,
        Category::Mindfulness,
        Category::Learning,
        Category::Social,
        Category::Creativity,
        Category::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Fitness => "fitness",
            Category::Productivity => "productivity",
            Category::Mindfulness => "mindfulness",
            Category::Learning => "learning",
            Category::Social => "social",
            Category::Creativity => "creativity",
            Category::Finance => "finance",
        }
    }

    /// Icon glyph shown next to habit titles.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Health => "♥",
            Category::Fitness => "⚡",
            Category::Productivity => "▲",
            Category::Mindfulness => "☯",
            Category::Learning => "✎",
            Category::Social => "☺",
            Category::Creativity => "✦",
            Category::Finance => "$",
        }
    }

    /// Accent color name, resolvable by the TUI color parser.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Health => "lightred",
            Category::Fitness => "yellow",
            Category::Productivity => "lightblue",
            Category::Mindfulness => "magenta",
            Category::Learning => "cyan",
            Category::Social => "lightgreen",
            Category::Creativity => "lightmagenta",
            Category::Finance => "green",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(Category::Health),
            "fitness" => Ok(Category::Fitness),
            "productivity" => Ok(Category::Productivity),
            "mindfulness" => Ok(Category::Mindfulness),
            "learning" => Ok(Category::Learning),
            "social" => Ok(Category::Social),
            "creativity" => Ok(Category::Creativity),
            "finance" => Ok(Category::Finance),
            _ => Err(format!("unknown category: {}", s)),
        }
    }
}

/// Difficulty fixes the point value of a habit at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Points awarded per unit of completion.
    pub fn points(&self) -> i64 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 25,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!("unknown difficulty: {}", s)),
        }
    }
}

/// Recorded on the habit but not enforced by any scheduling logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Weekly, Frequency::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(format!("unknown frequency: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub frequency: Frequency,
    pub target_count: i64,
    pub difficulty: Difficulty,
    pub points: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub active: bool,
    pub created_at: DateTime<Local>,
}

impl Habit {
    pub fn new(title: String, category: Category, difficulty: Difficulty) -> Self {
        Self {
            id: None,
            title,
            description: None,
            category,
            frequency: Frequency::Daily,
            target_count: 1,
            difficulty,
            points: difficulty.points(),
            current_streak: 0,
            longest_streak: 0,
            active: true,
            created_at: Local::now(),
        }
    }
}

/// One recorded instance of progress against a habit's target. Immutable once
/// created; only removed when its habit is cascade-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub id: Option<i64>,
    pub habit_id: i64,
    pub completed_at: DateTime<Local>,
    pub count: i64,
    pub note: Option<String>,
}

impl Completion {
    pub fn new(habit_id: i64, count: i64) -> Self {
        Self {
            id: None,
            habit_id,
            completed_at: Local::now(),
            count,
            note: None,
        }
    }
}

/// The single local profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: Option<String>,
    pub level: i64,
    pub total_points: i64,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub joined_at: DateTime<Local>,
    pub premium: bool,
    pub avatar: Option<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: "HabitFlow User".to_string(),
            email: None,
            level: 1,
            total_points: 0,
            current_streak: 0,
            longest_streak: 0,
            joined_at: Local::now(),
            premium: false,
            avatar: None,
        }
    }
}

/// Derived dashboard numbers, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_habits: usize,
    pub active_habits: usize,
    pub completed_today: usize,
    pub current_streak: i64,
    pub total_points: i64,
    pub level: i64,
    pub weekly_progress: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_fixes_point_value() {
        assert_eq!(Difficulty::Easy.points(), 10);
        assert_eq!(Difficulty::Medium.points(), 15);
        assert_eq!(Difficulty::Hard.points(), 25);
    }

    #[test]
    fn new_habit_derives_points_and_zero_streaks() {
        let habit = Habit::new("Read".to_string(), Category::Learning, Difficulty::Hard);
        assert_eq!(habit.points, 25);
        assert_eq!(habit.current_streak, 0);
        assert_eq!(habit.longest_streak, 0);
        assert!(habit.active);
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn unknown_enum_strings_are_rejected() {
        assert!("cooking".parse::<Category>().is_err());
        assert!("extreme".parse::<Difficulty>().is_err());
        assert!("hourly".parse::<Frequency>().is_err());
    }

    #[test]
    fn default_user_starts_at_level_one() {
        let user = User::default();
        assert_eq!(user.level, 1);
        assert_eq!(user.total_points, 0);
        assert_eq!(user.current_streak, 0);
    }
}
