//! Static content shipped with the app: achievements, seed flashcards and scenario ids.

use crate::model::{
    Achievement, AchievementDef, DifficultyTier, Flashcard, FlashcardId, Requirement, ScenarioId,
};

pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_scenario",
        title: "First Steps",
        description: "Complete your first conversation scenario",
        icon: "🎯",
        requirement: Requirement::Scenarios { target: 1 },
    },
    AchievementDef {
        id: "scenario_master",
        title: "Conversation Master",
        description: "Complete 5 conversation scenarios",
        icon: "🏆",
        requirement: Requirement::Scenarios { target: 5 },
    },
    AchievementDef {
        id: "scenario_expert",
        title: "Expert Speaker",
        description: "Complete 10 conversation scenarios",
        icon: "⭐",
        requirement: Requirement::Scenarios { target: 10 },
    },
    AchievementDef {
        id: "streak_3",
        title: "Consistency",
        description: "Practice for 3 days in a row",
        icon: "🔥",
        requirement: Requirement::Streak { target: 3 },
    },
    AchievementDef {
        id: "streak_7",
        title: "Week Warrior",
        description: "Practice for 7 days in a row",
        icon: "🚀",
        requirement: Requirement::Streak { target: 7 },
    },
    AchievementDef {
        id: "streak_30",
        title: "Dedication Champion",
        description: "Practice for 30 days in a row",
        icon: "💎",
        requirement: Requirement::Streak { target: 30 },
    },
    AchievementDef {
        id: "vocab_25",
        title: "Word Collector",
        description: "Learn 25 vocabulary words",
        icon: "📚",
        requirement: Requirement::Vocabulary { target: 25 },
    },
    AchievementDef {
        id: "vocab_50",
        title: "Vocabulary Master",
        description: "Learn 50 vocabulary words",
        icon: "🎓",
        requirement: Requirement::Vocabulary { target: 50 },
    },
    AchievementDef {
        id: "vocab_100",
        title: "Word Wizard",
        description: "Learn 100 vocabulary words",
        icon: "🧙",
        requirement: Requirement::Vocabulary { target: 100 },
    },
    AchievementDef {
        id: "pronunciation_80",
        title: "Clear Speaker",
        description: "Achieve 80% average pronunciation score",
        icon: "🎤",
        requirement: Requirement::Pronunciation { target: 80 },
    },
    AchievementDef {
        id: "pronunciation_90",
        title: "Perfect Pronunciation",
        description: "Achieve 90% average pronunciation score",
        icon: "🎵",
        requirement: Requirement::Pronunciation { target: 90 },
    },
    AchievementDef {
        id: "time_30",
        title: "Dedicated Learner",
        description: "Study for 30 minutes total",
        icon: "⏰",
        requirement: Requirement::Time { target: 30 },
    },
    AchievementDef {
        id: "time_60",
        title: "Study Hero",
        description: "Study for 1 hour total",
        icon: "🦸",
        requirement: Requirement::Time { target: 60 },
    },
    AchievementDef {
        id: "time_300",
        title: "Learning Machine",
        description: "Study for 5 hours total",
        icon: "🤖",
        requirement: Requirement::Time { target: 300 },
    },
];

/// The full achievement catalog, all locked.
#[must_use]
pub fn default_achievements() -> Vec<Achievement> {
    ACHIEVEMENTS.iter().filter_map(Achievement::locked).collect()
}

/// Scenarios the app ships with.
pub const SCENARIOS: &[&str] = &[
    "cafe-1",
    "airport-1",
    "restaurant-1",
    "hotel-1",
    "shopping-1",
];

/// Ids of the bundled scenarios.
#[must_use]
pub fn scenario_ids() -> Vec<ScenarioId> {
    SCENARIOS
        .iter()
        .filter_map(|id| ScenarioId::new(*id).ok())
        .collect()
}

struct SeedCard {
    id: &'static str,
    front: &'static str,
    back: &'static str,
    example: &'static str,
    category: &'static str,
    tier: DifficultyTier,
    audio: &'static str,
}

const SEED_CARDS: &[SeedCard] = &[
    SeedCard {
        id: "v1",
        front: "cappuccino",
        back: "An Italian coffee drink prepared with espresso and steamed milk foam",
        example: "I would like a cappuccino, please.",
        category: "drinks",
        tier: DifficultyTier::Beginner,
        audio: "vocab-cappuccino.mp3",
    },
    SeedCard {
        id: "v2",
        front: "croissant",
        back: "A buttery, flaky, viennoiserie pastry",
        example: "I would like a croissant with my coffee.",
        category: "food",
        tier: DifficultyTier::Beginner,
        audio: "vocab-croissant.mp3",
    },
    SeedCard {
        id: "v3",
        front: "check-in",
        back: "The process of registering for a flight",
        example: "I need to check in for my flight.",
        category: "travel",
        tier: DifficultyTier::Intermediate,
        audio: "vocab-checkin.mp3",
    },
    SeedCard {
        id: "v4",
        front: "boarding pass",
        back: "A document that gives you permission to board the plane",
        example: "Here is your boarding pass.",
        category: "travel",
        tier: DifficultyTier::Intermediate,
        audio: "vocab-boardingpass.mp3",
    },
    SeedCard {
        id: "v5",
        front: "reservation",
        back: "A booking for a table at a restaurant",
        example: "I have a reservation for two people.",
        category: "dining",
        tier: DifficultyTier::Intermediate,
        audio: "vocab-reservation.mp3",
    },
    SeedCard {
        id: "v6",
        front: "key card",
        back: "A plastic card used to unlock hotel room doors",
        example: "Here is your key card for room 305.",
        category: "hotel",
        tier: DifficultyTier::Beginner,
        audio: "vocab-keycard.mp3",
    },
    SeedCard {
        id: "v7",
        front: "fitting room",
        back: "A small room where you can try on clothes before buying",
        example: "The fitting rooms are at the back of the store.",
        category: "shopping",
        tier: DifficultyTier::Intermediate,
        audio: "vocab-fittingroom.mp3",
    },
];

/// Cards written to storage the first time the collection is loaded.
#[must_use]
pub fn seed_flashcards() -> Vec<Flashcard> {
    SEED_CARDS
        .iter()
        .filter_map(|seed| {
            let id = FlashcardId::new(seed.id).ok()?;
            Some(
                Flashcard::new(id, seed.front, seed.back, seed.category, seed.tier)
                    .with_example(seed.example)
                    .with_audio(seed.audio),
            )
        })
        .collect()
}
