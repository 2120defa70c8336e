pub mod cli;
pub mod config;
pub mod database;
pub mod gamification;
pub mod ledger;
pub mod models;
pub mod progress;
pub mod tracker;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use ledger::Ledger;
pub use models::{Completion, Habit, Stats, User};
pub use tracker::Tracker;
pub use utils::Profile;
