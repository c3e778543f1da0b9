use std::fmt;

use chrono::{DateTime, Utc};
use lingua_core::model::{
    FlashcardId, Rating, RatingParseError, ReviewFilter, ReviewMode, ScenarioId,
};
use lingua_core::time::DayPolicy;

pub const DEFAULT_DB_URL: &str = "sqlite:lingua.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
    InvalidOffset { raw: String },
    InvalidMinutes { raw: String },
    InvalidId { raw: String },
    InvalidRating(RatingParseError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
            ArgsError::InvalidOffset { raw } => {
                write!(f, "invalid --utc-offset value (minutes, under 24h): {raw}")
            }
            ArgsError::InvalidMinutes { raw } => write!(f, "invalid minutes: {raw}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw:?}"),
            ArgsError::InvalidRating(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Complete { scenario: ScenarioId },
    Study { minutes: u32 },
    Cards { filter: ReviewFilter },
    Rate { card: FlashcardId, rating: Rating },
    Pronounce { phrase: String, recording: String },
    Reset,
    Help,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub days: DayPolicy,
    pub now: Option<DateTime<Utc>>,
    pub command: Command,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_offset(raw: &str) -> Result<DayPolicy, ArgsError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(|minutes| DayPolicy::with_offset_minutes(minutes).ok())
        .ok_or_else(|| ArgsError::InvalidOffset { raw: raw.to_owned() })
}

fn positional(
    positionals: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String, ArgsError> {
    positionals
        .next()
        .ok_or(ArgsError::MissingArgument { command, name })
}

impl Config {
    /// Parse `args` (without the program name), reading fallbacks through `env`.
    pub fn parse_from(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("LINGUA_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_owned());
        let mut days = match env("LINGUA_UTC_OFFSET_MINUTES") {
            Some(raw) => parse_offset(&raw)?,
            None => DayPolicy::local(),
        };
        let mut now = None;
        let mut mode = ReviewMode::All;
        let mut category = None;
        let mut recording = None;
        let mut help = false;
        let mut positionals = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--utc-offset" => {
                    days = parse_offset(&require_value(&mut args, "--utc-offset")?)?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--mode" => {
                    mode = require_value(&mut args, "--mode")?
                        .parse()
                        .map_err(ArgsError::InvalidRating)?;
                }
                "--category" => category = Some(require_value(&mut args, "--category")?),
                "--recording" => recording = Some(require_value(&mut args, "--recording")?),
                "--help" | "-h" => help = true,
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        if help {
            positionals.clear();
            positionals.push("help".to_owned());
        }

        let mut positionals = positionals.into_iter();
        let command = match positionals.next().as_deref() {
            None | Some("status") => Command::Status,
            Some("help") => Command::Help,
            Some("complete") => {
                let raw = positional(&mut positionals, "complete", "scenario-id")?;
                let scenario =
                    ScenarioId::new(raw.as_str()).map_err(|_| ArgsError::InvalidId { raw })?;
                Command::Complete { scenario }
            }
            Some("study") => {
                let raw = positional(&mut positionals, "study", "minutes")?;
                let minutes = raw
                    .parse::<u32>()
                    .map_err(|_| ArgsError::InvalidMinutes { raw: raw.clone() })?;
                Command::Study { minutes }
            }
            Some("cards") => {
                let filter = ReviewFilter::new(mode);
                Command::Cards {
                    filter: match category {
                        Some(category) => filter.with_category(category),
                        None => filter,
                    },
                }
            }
            Some("rate") => {
                let raw = positional(&mut positionals, "rate", "card-id")?;
                let card = FlashcardId::new(raw.as_str()).map_err(|_| ArgsError::InvalidId { raw })?;
                let rating = positional(&mut positionals, "rate", "rating")?
                    .parse()
                    .map_err(ArgsError::InvalidRating)?;
                Command::Rate { card, rating }
            }
            Some("pronounce") => {
                let first = positional(&mut positionals, "pronounce", "phrase")?;
                // Unquoted phrases arrive as several words.
                let phrase = std::iter::once(first)
                    .chain(positionals.by_ref())
                    .collect::<Vec<_>>()
                    .join(" ");
                Command::Pronounce {
                    phrase,
                    recording: recording.unwrap_or_else(|| "recording.m4a".to_owned()),
                }
            }
            Some("reset") => Command::Reset,
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        if let Some(extra) = positionals.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self {
            db_url: normalize_sqlite_url(db_url),
            days,
            now,
            command,
        })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  lingua [options] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                          Level, score, streak and achievements (default)");
    eprintln!("  complete <scenario-id>          Mark a conversation scenario completed");
    eprintln!("  study <minutes>                 Add study time");
    eprintln!("  cards [--mode all|due|learned] [--category <c>]");
    eprintln!("                                  List flashcards in review order");
    eprintln!("  rate <card-id> <easy|medium|hard>");
    eprintln!("                                  Rate a flashcard");
    eprintln!("  pronounce <phrase> [--recording <ref>]");
    eprintln!("                                  Score a pronunciation attempt");
    eprintln!("  reset                           Clear all stored progress and cards");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: {DEFAULT_DB_URL})");
    eprintln!("  --utc-offset <minutes>    Offset used for calendar days (default: local time)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic runs");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LINGUA_DB_URL, LINGUA_UTC_OFFSET_MINUTES, RUST_LOG");
}

pub const MEMORY_DB_URL: &str = "sqlite::memory:";

/// Turn `sqlite:relative.db` or a bare path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim();
    if raw == MEMORY_DB_URL || raw.starts_with("sqlite://") {
        return raw.to_owned();
    }

    let path = std::path::Path::new(raw.strip_prefix("sqlite:").unwrap_or(raw));
    if path.is_absolute() {
        return format!("sqlite://{}", path.display());
    }
    let base = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    format!("sqlite://{}", base.join(path).display())
}

/// File path behind a normalized URL; `None` for in-memory databases.
pub fn sqlite_file_path(db_url: &str) -> Result<Option<&std::path::Path>, ArgsError> {
    if db_url == MEMORY_DB_URL {
        return Ok(None);
    }
    let path = db_url
        .strip_prefix("sqlite://")
        .and_then(|rest| rest.split('?').next())
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    Ok(Some(std::path::Path::new(path)))
}
