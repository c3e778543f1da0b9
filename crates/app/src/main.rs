use lingua_core::achievements;
use lingua_core::model::{Flashcard, UserProgress};
use lingua_core::time::Clock;
use services::AppServices;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{ArgsError, Command, Config, print_usage, sqlite_file_path};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_progress(progress: &UserProgress) {
    println!(
        "Level {} | {} points ({} to next level)",
        progress.level,
        progress.score,
        progress.points_to_next_level()
    );
    println!(
        "Streak {} day(s) | {} min studied | {} scenario(s) | {} word(s) learned | pronunciation {:.0}%",
        progress.daily_streak,
        progress.total_study_time,
        progress.completed_scenarios.len(),
        progress.learned_word_count(),
        progress.average_pronunciation()
    );
}

fn print_achievements(progress: &UserProgress) {
    println!(
        "Achievements {}/{}",
        achievements::unlocked_count(progress),
        progress.achievements.len()
    );
    for achievement in &progress.achievements {
        let state = match achievement.unlocked_date {
            Some(at) if achievement.unlocked => format!("unlocked {}", at.format("%Y-%m-%d")),
            _ => "locked".to_owned(),
        };
        println!(
            "  {} {:<22} {}  ({})",
            achievement.icon, achievement.title, achievement.description, state
        );
    }
    if let Some(next) = achievements::next_locked(progress) {
        println!("Next up: {} ({})", next.title, next.description);
    }
}

fn print_card(card: &Flashcard) {
    let reviewed = card
        .last_reviewed
        .map_or_else(|| "never".to_owned(), |at| at.format("%Y-%m-%d").to_string());
    println!(
        "  {:<4} {:<14} [{} / {}] interval {}d, ease {:.2}, reviews {}, last {}{}",
        card.id.as_str(),
        card.front,
        card.category,
        card.difficulty,
        card.interval,
        card.ease_factor,
        card.review_count,
        reviewed,
        if card.is_learned { ", learned" } else { "" }
    );
}

async fn dispatch(app: &AppServices, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Help => print_usage(),
        Command::Status => {
            let progress = app.progress().load().await;
            print_progress(&progress);
            print_achievements(&progress);
        }
        Command::Complete { scenario } => {
            let before = app.progress().load().await;
            let progress = app.progress().complete_scenario(&scenario).await;
            if before.has_completed(&scenario) {
                println!("{scenario} was already completed");
            } else {
                println!("Completed {scenario} (+100 points)");
            }
            print_progress(&progress);
        }
        Command::Study { minutes } => {
            let progress = app.progress().add_study_time(minutes).await;
            print_progress(&progress);
        }
        Command::Cards { filter } => {
            let cards = app.flashcards().select(&filter).await;
            if cards.is_empty() {
                println!("No cards match");
            }
            for card in &cards {
                print_card(card);
            }
        }
        Command::Rate { card, rating } => match app.reviews().rate(&card, rating).await {
            Some(rated) => {
                println!("Rated {} as {rating}", rated.card.front);
                print_card(&rated.card);
                print_progress(&rated.progress);
            }
            None => return Err(format!("no flashcard with id {card}").into()),
        },
        Command::Pronounce { phrase, recording } => {
            app.narrator().speak(&phrase).await;
            let outcome = app.pronunciation().practice(&recording, &phrase).await;
            let result = outcome.result;
            println!("Score {}%: {}", result.score, result.feedback);
            println!(
                "  accuracy {}%, fluency {}%, completeness {}%",
                result.detailed_scores.accuracy,
                result.detailed_scores.fluency,
                result.detailed_scores.completeness
            );
            for phoneme in &result.phonemes {
                println!(
                    "  {:<12} {}%  {}",
                    phoneme.phoneme, phoneme.accuracy, phoneme.feedback
                );
            }
            if let Some(progress) = outcome.progress {
                print_progress(&progress);
            }
        }
        Command::Reset => {
            app.progress().reset_all().await;
            println!("All progress cleared");
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_from(std::env::args().skip(1), |key| std::env::var(key).ok())
        .map_err(|e: ArgsError| {
            eprintln!("{e}");
            print_usage();
            e
        })?;

    if config.command == Command::Help {
        print_usage();
        return Ok(());
    }

    prepare_sqlite_file(&config.db_url)?;
    let clock = config.now.map_or_else(Clock::default_clock, Clock::fixed);
    let app = AppServices::sqlite(&config.db_url, clock, config.days).await?;
    tracing::debug!(db = %config.db_url, offset = %config.days.offset(), "services ready");

    dispatch(&app, config.command).await
}

/// Make sure the database file and its directory exist before sqlx opens it.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = sqlite_file_path(db_url)? else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
