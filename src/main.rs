use clap::Parser;
use color_eyre::Result;
use habitflow::{
    Config, Database, Profile, Tracker,
    cli::{Cli, Commands},
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Load configuration: an explicit --config path wins over the profile
    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&habitflow::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    // Open database and hydrate tracker state
    let db_path = config.get_database_path();
    let db = Database::new(
        db_path
            .to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?,
    )?;
    let mut tracker = Tracker::load(db)?;

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = habitflow::tui::App::new(config, tracker);
            habitflow::tui::run_event_loop(app)?;
        }
        Commands::AddHabit {
            title,
            category,
            difficulty,
            target,
            frequency,
            description,
        } => {
            habitflow::cli::handle_add_habit(
                title,
                category,
                difficulty,
                target,
                frequency,
                description,
                &mut tracker,
            )?;
        }
        Commands::Complete { id, count, note } => {
            habitflow::cli::handle_complete(id, count, note, &mut tracker)?;
        }
        Commands::List => {
            habitflow::cli::handle_list(&tracker)?;
        }
        Commands::Profile { name, email, level } => {
            habitflow::cli::handle_profile(name, email, level, &mut tracker)?;
        }
        Commands::Stats => {
            habitflow::cli::handle_stats(&tracker)?;
        }
        Commands::Delete { id } => {
            habitflow::cli::handle_delete(id, &mut tracker)?;
        }
        Commands::Reset { yes } => {
            habitflow::cli::handle_reset(yes, &mut tracker)?;
        }
        Commands::Export => {
            habitflow::cli::handle_export(&tracker)?;
        }
    }

    Ok(())
}
