use chrono::{DateTime, Local};
use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Completion, Habit, User};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

pub struct Database {
    conn: Connection,
}

fn timestamp_to_sql(ts: &DateTime<Local>) -> String {
    ts.to_rfc3339()
}

fn timestamp_from_sql(idx: usize, value: String) -> Result<DateTime<Local>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn enum_from_sql<T: std::str::FromStr<Err = String>>(
    idx: usize,
    value: String,
) -> Result<T, rusqlite::Error> {
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        // Open or create the database
        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// Initialize the database schema (tables and indexes). Idempotent; there
    /// is no versioned migration layer beyond this.
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS habits (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT,
                category        TEXT NOT NULL,
                frequency       TEXT NOT NULL,
                target_count    INTEGER NOT NULL,
                difficulty      TEXT NOT NULL,
                points          INTEGER NOT NULL,
                current_streak  INTEGER DEFAULT 0,
                longest_streak  INTEGER DEFAULT 0,
                active          INTEGER DEFAULT 1,
                created_at      TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS completions (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                habit_id        INTEGER NOT NULL,
                completed_at    TEXT NOT NULL,
                count           INTEGER NOT NULL,
                note            TEXT
            )",
            [],
        )?;

        // Single-row profile table
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS user (
                id              INTEGER PRIMARY KEY CHECK (id = 1),
                name            TEXT NOT NULL,
                email           TEXT,
                level           INTEGER DEFAULT 1,
                total_points    INTEGER DEFAULT 0,
                current_streak  INTEGER DEFAULT 0,
                longest_streak  INTEGER DEFAULT 0,
                joined_at       TEXT NOT NULL,
                premium         INTEGER DEFAULT 0,
                avatar          TEXT
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_completions_habit_id ON completions(habit_id)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_completions_completed_at ON completions(completed_at)",
            [],
        )?;

        Ok(())
    }

    /// Insert a habit and return its ID
    pub fn insert_habit(&self, habit: &Habit) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO habits (title, description, category, frequency, target_count, difficulty, points, current_streak, longest_streak, active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                habit.title,
                habit.description,
                habit.category.as_str(),
                habit.frequency.as_str(),
                habit.target_count,
                habit.difficulty.as_str(),
                habit.points,
                habit.current_streak,
                habit.longest_streak,
                if habit.active { 1 } else { 0 },
                timestamp_to_sql(&habit.created_at)
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
        Ok(Habit {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            category: enum_from_sql(3, row.get(3)?)?,
            frequency: enum_from_sql(4, row.get(4)?)?,
            target_count: row.get(5)?,
            difficulty: enum_from_sql(6, row.get(6)?)?,
            points: row.get(7)?,
            current_streak: row.get(8)?,
            longest_streak: row.get(9)?,
            active: row.get::<_, i64>(10)? != 0,
            created_at: timestamp_from_sql(11, row.get(11)?)?,
        })
    }

    /// All habits in creation order
    pub fn load_habits(&self) -> Result<Vec<Habit>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, category, frequency, target_count, difficulty, points, current_streak, longest_streak, active, created_at
             FROM habits ORDER BY id ASC",
        )?;
        let habits = stmt
            .query_map([], Self::row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    /// Update the mutable fields of an existing habit
    pub fn update_habit(&self, habit: &Habit) -> Result<(), DatabaseError> {
        let id = habit.id.ok_or_else(|| {
            DatabaseError::SqliteError(rusqlite::Error::InvalidColumnType(
                0,
                "id".to_string(),
                rusqlite::types::Type::Null,
            ))
        })?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE habits SET title = ?1, description = ?2, target_count = ?3,
             current_streak = ?4, longest_streak = ?5, active = ?6 WHERE id = ?7",
            rusqlite::params![
                habit.title,
                habit.description,
                habit.target_count,
                habit.current_streak,
                habit.longest_streak,
                if habit.active { 1 } else { 0 },
                id
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a habit and cascade-delete its completions in one transaction
    pub fn delete_habit(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM completions WHERE habit_id = ?1",
            rusqlite::params![id],
        )?;
        tx.execute("DELETE FROM habits WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn row_to_completion(row: &rusqlite::Row) -> Result<Completion, rusqlite::Error> {
        Ok(Completion {
            id: Some(row.get(0)?),
            habit_id: row.get(1)?,
            completed_at: timestamp_from_sql(2, row.get(2)?)?,
            count: row.get(3)?,
            note: row.get(4)?,
        })
    }

    /// All completions in insertion order
    pub fn load_completions(&self) -> Result<Vec<Completion>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, completed_at, count, note
             FROM completions ORDER BY id ASC",
        )?;
        let completions = stmt
            .query_map([], Self::row_to_completion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(completions)
    }

    fn insert_completion_tx(
        tx: &rusqlite::Transaction,
        completion: &Completion,
    ) -> Result<i64, rusqlite::Error> {
        tx.execute(
            "INSERT INTO completions (habit_id, completed_at, count, note)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                completion.habit_id,
                timestamp_to_sql(&completion.completed_at),
                completion.count,
                completion.note
            ],
        )?;
        Ok(tx.last_insert_rowid())
    }

    fn save_user_tx(tx: &rusqlite::Transaction, user: &User) -> Result<(), rusqlite::Error> {
        tx.execute(
            "INSERT INTO user (id, name, email, level, total_points, current_streak, longest_streak, joined_at, premium, avatar)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                level = excluded.level,
                total_points = excluded.total_points,
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                joined_at = excluded.joined_at,
                premium = excluded.premium,
                avatar = excluded.avatar",
            rusqlite::params![
                user.name,
                user.email,
                user.level,
                user.total_points,
                user.current_streak,
                user.longest_streak,
                timestamp_to_sql(&user.joined_at),
                if user.premium { 1 } else { 0 },
                user.avatar
            ],
        )?;
        Ok(())
    }

    /// Persist one completion event as a unit: the ledger row, the habit's
    /// streak fields and the user's point/streak fields all commit together
    /// or not at all. Returns the new completion ID.
    pub fn record_completion(
        &self,
        completion: &Completion,
        habit: &Habit,
        user: &User,
    ) -> Result<i64, DatabaseError> {
        let habit_id = habit.id.ok_or_else(|| {
            DatabaseError::SqliteError(rusqlite::Error::InvalidColumnType(
                0,
                "id".to_string(),
                rusqlite::types::Type::Null,
            ))
        })?;

        let tx = self.conn.unchecked_transaction()?;
        let completion_id = Self::insert_completion_tx(&tx, completion)?;
        tx.execute(
            "UPDATE habits SET current_streak = ?1, longest_streak = ?2 WHERE id = ?3",
            rusqlite::params![habit.current_streak, habit.longest_streak, habit_id],
        )?;
        Self::save_user_tx(&tx, user)?;
        tx.commit()?;
        Ok(completion_id)
    }

    /// Load the profile row, if one has been created
    pub fn load_user(&self) -> Result<Option<User>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, email, level, total_points, current_streak, longest_streak, joined_at, premium, avatar
             FROM user WHERE id = 1",
        )?;

        let result = stmt.query_row([], |row| {
            Ok(User {
                name: row.get(0)?,
                email: row.get(1)?,
                level: row.get(2)?,
                total_points: row.get(3)?,
                current_streak: row.get(4)?,
                longest_streak: row.get(5)?,
                joined_at: timestamp_from_sql(6, row.get(6)?)?,
                premium: row.get::<_, i64>(7)? != 0,
                avatar: row.get(8)?,
            })
        });

        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Create or replace the profile row
    pub fn save_user(&self, user: &User) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        Self::save_user_tx(&tx, user)?;
        tx.commit()?;
        Ok(())
    }

    /// Irreversibly wipe habits, completions and the profile row
    pub fn clear_all(&self) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM completions", [])?;
        tx.execute("DELETE FROM habits", [])?;
        tx.execute("DELETE FROM user", [])?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification;
    use crate::models::{Category, Difficulty};
    use tempfile::{TempDir, tempdir};

    fn setup_db() -> (Database, TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        (db, dir)
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).unwrap();
        db.initialize_schema().unwrap();

        for table in ["habits", "completions", "user"] {
            let count: i64 = db
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "table {} should exist", table);
        }
    }

    #[test]
    fn habits_round_trip_with_typed_fields() {
        let (db, _dir) = setup_db();
        let mut habit = Habit::new("Meditate".to_string(), Category::Mindfulness, Difficulty::Medium);
        habit.description = Some("10 minutes".to_string());
        habit.target_count = 2;
        let id = db.insert_habit(&habit).unwrap();

        let loaded = db.load_habits().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, Some(id));
        assert_eq!(loaded[0].category, Category::Mindfulness);
        assert_eq!(loaded[0].difficulty, Difficulty::Medium);
        assert_eq!(loaded[0].points, 15);
        assert_eq!(loaded[0].description.as_deref(), Some("10 minutes"));
    }

    #[test]
    fn missing_optional_fields_load_as_none() {
        let (db, _dir) = setup_db();
        let habit = Habit::new("Save".to_string(), Category::Finance, Difficulty::Easy);
        db.insert_habit(&habit).unwrap();

        let loaded = db.load_habits().unwrap();
        assert_eq!(loaded[0].description, None);

        let mut user = User::default();
        user.email = None;
        user.avatar = None;
        db.save_user(&user).unwrap();
        let loaded = db.load_user().unwrap().unwrap();
        assert_eq!(loaded.email, None);
        assert_eq!(loaded.avatar, None);
    }

    #[test]
    fn load_user_returns_none_before_first_save() {
        let (db, _dir) = setup_db();
        assert!(db.load_user().unwrap().is_none());
    }

    #[test]
    fn record_completion_commits_all_three_updates() {
        let (db, _dir) = setup_db();
        let mut habit = Habit::new("Run".to_string(), Category::Fitness, Difficulty::Hard);
        let id = db.insert_habit(&habit).unwrap();
        habit.id = Some(id);

        let mut user = User::default();
        db.save_user(&user).unwrap();

        gamification::record_habit_completion(&mut habit);
        gamification::apply_points_to_user(&mut user, 25);
        gamification::update_user_streak_on_completion(&mut user, 1);
        let completion = Completion::new(id, 1);
        db.record_completion(&completion, &habit, &user).unwrap();

        assert_eq!(db.load_completions().unwrap().len(), 1);
        assert_eq!(db.load_habits().unwrap()[0].current_streak, 1);
        let loaded_user = db.load_user().unwrap().unwrap();
        assert_eq!(loaded_user.total_points, 25);
        assert_eq!(loaded_user.current_streak, 1);
    }

    #[test]
    fn delete_habit_cascades_to_completions() {
        let (db, _dir) = setup_db();
        let habit = Habit::new("Draw".to_string(), Category::Creativity, Difficulty::Easy);
        let id = db.insert_habit(&habit).unwrap();
        let other = Habit::new("Call".to_string(), Category::Social, Difficulty::Easy);
        let other_id = db.insert_habit(&other).unwrap();

        let tx = db.conn.unchecked_transaction().unwrap();
        Database::insert_completion_tx(&tx, &Completion::new(id, 1)).unwrap();
        Database::insert_completion_tx(&tx, &Completion::new(other_id, 1)).unwrap();
        tx.commit().unwrap();

        db.delete_habit(id).unwrap();
        let completions = db.load_completions().unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].habit_id, other_id);
    }

    #[test]
    fn clear_all_empties_every_table() {
        let (db, _dir) = setup_db();
        let habit = Habit::new("Read".to_string(), Category::Learning, Difficulty::Easy);
        let id = db.insert_habit(&habit).unwrap();
        let tx = db.conn.unchecked_transaction().unwrap();
        Database::insert_completion_tx(&tx, &Completion::new(id, 1)).unwrap();
        tx.commit().unwrap();
        db.save_user(&User::default()).unwrap();

        db.clear_all().unwrap();
        assert!(db.load_habits().unwrap().is_empty());
        assert!(db.load_completions().unwrap().is_empty());
        assert!(db.load_user().unwrap().is_none());
    }
}
