//! FitTrack command-line entry point.
//!
//! # Responsibility
//! - Map subcommands onto exercise store use cases.
//! - Enforce form validation before input reaches the store.

use clap::{Parser, Subcommand};
use fittrack_core::db::open_db;
use fittrack_core::{
    default_log_level, flush_logging, init_logging, ExerciseId, ExerciseStore, NewExercise,
    SqliteKvRepository,
};
use log::{debug, warn};
use std::error::Error;
use std::path::{Path, PathBuf};

mod render;

const DEFAULT_DB_FILE_NAME: &str = "fittrack.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "fittrack", version, about = "Personal exercise logger")]
struct Cli {
    /// SQLite database file holding the exercise log
    #[arg(long, global = true, env = "FITTRACK_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "FITTRACK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "FITTRACK_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log a new exercise
    Add {
        /// Activity name, e.g. "Running"
        #[arg(long, short)]
        activity: String,
        /// Duration in minutes
        #[arg(long, short)]
        duration: f64,
        /// Calories burned
        #[arg(long, short)]
        calories: f64,
    },
    /// Show logged exercises, newest first
    List,
    /// Delete one exercise by id
    Delete {
        #[arg(allow_negative_numbers = true)]
        id: ExerciseId,
    },
    /// Show total duration and calories
    Summary,
    /// Remove every logged exercise
    Clear,
}

impl Commands {
    /// Subcommand name for log events; never includes user input.
    fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::List => "list",
            Self::Delete { .. } => "delete",
            Self::Summary => "summary",
            Self::Clear => "clear",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let result = run(cli);
    flush_logging();
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, absolute_path(log_dir)?)?;
    }

    let command = cli.command.name();
    let result = execute(cli);
    if result.is_err() {
        warn!("event=cli_exit module=cli status=error command={command}");
    }
    result
}

fn execute(cli: Cli) -> Result<(), Box<dyn Error>> {
    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    debug!(
        "event=cli_start module=cli status=ok command={}",
        cli.command.name()
    );

    let conn = open_db(&db_path)?;
    let mut store = ExerciseStore::open(SqliteKvRepository::new(&conn))?;

    match cli.command {
        Commands::Add {
            activity,
            duration,
            calories,
        } => {
            let input = NewExercise::new(activity, duration, calories).normalized();
            input.validate()?;
            let exercise = store.add(input)?;
            println!("{}", render::render_added(&exercise));
        }
        Commands::List => println!("{}", render::render_list(store.exercises())),
        Commands::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted exercise {id}");
            } else {
                println!("No exercise with id {id}");
            }
        }
        Commands::Summary => println!("{}", render::render_summary(&store.summary())),
        Commands::Clear => {
            store.clear()?;
            println!("Cleared exercise log");
        }
    }
    Ok(())
}

fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
