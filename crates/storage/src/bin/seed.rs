use std::fmt;

use chrono::{DateTime, Utc};
use lingua_core::model::{Percent, PhraseKey, ScenarioId, UserProgress};
use lingua_core::time::DayPolicy;
use lingua_core::{achievements, catalog};
use storage::repository::{ABSENT_VERSION, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    reset: bool,
    demo_progress: bool,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LINGUA_DB_URL").unwrap_or_else(|_| "sqlite:lingua.sqlite3".into());
        let mut reset = false;
        let mut demo_progress = false;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--reset" => reset = true,
                "--demo-progress" => demo_progress = true,
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            reset,
            demo_progress,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:lingua.sqlite3)");
    eprintln!("  --reset                   Clear all stored data before seeding");
    eprintln!("  --demo-progress           Also write a sample progress record");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LINGUA_DB_URL");
}

fn demo_progress(now: DateTime<Utc>) -> Result<UserProgress, Box<dyn std::error::Error>> {
    let mut progress = UserProgress::default();
    progress.complete_scenario(&ScenarioId::new("cafe-1")?, now, &DayPolicy::utc());
    progress.add_study_time(12);
    progress.record_pronunciation(
        PhraseKey::new("cafe-1-I would like a cappuccino, please.")?,
        Percent::new(84)?,
    );
    achievements::evaluate(&mut progress, now);
    Ok(progress)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    if args.reset {
        storage.progress.clear_all().await?;
    }

    let cards = catalog::seed_flashcards();
    let seeded = match storage.flashcards.load_flashcards().await? {
        Some(existing) => {
            println!(
                "Flashcards already present ({} cards), leaving them alone",
                existing.value.len()
            );
            false
        }
        None => {
            storage
                .flashcards
                .save_flashcards(&cards, ABSENT_VERSION)
                .await?;
            true
        }
    };

    if args.demo_progress {
        let progress = demo_progress(now)?;
        let expected = storage
            .progress
            .load_progress()
            .await?
            .map_or(ABSENT_VERSION, |stored| stored.version);
        storage.progress.save_progress(&progress, expected).await?;
        println!(
            "Wrote demo progress: score {}, level {}",
            progress.score, progress.level
        );
    }

    if seeded {
        println!("Seeded {} flashcards into {}", cards.len(), args.db_url);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
