use crate::models::{Game, ScheduleEntry};
use serde::{Deserialize, Serialize};

/// Both teams carry a ranking
pub fn both_ranked(game: &Game) -> bool {
    game.visitor.is_ranked() && game.home.is_ranked()
}

/// At least one team carries a ranking
pub fn either_ranked(game: &Game) -> bool {
    game.visitor.is_ranked() || game.home.is_ranked()
}

/// Listing entries that point at a real game
pub fn not_bye(entry: &ScheduleEntry) -> bool {
    !matches!(entry, ScheduleEntry::NoGame)
}

/// Which games a calendar keeps after they are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameFilter {
    #[default]
    All,
    EitherRanked,
    BothRanked,
}

impl GameFilter {
    pub fn matches(&self, game: &Game) -> bool {
        match self {
            GameFilter::All => true,
            GameFilter::EitherRanked => either_ranked(game),
            GameFilter::BothRanked => both_ranked(game),
        }
    }

    /// Keep matching games in their original order
    pub fn apply(&self, games: Vec<Game>) -> Vec<Game> {
        games.into_iter().filter(|game| self.matches(game)).collect()
    }
}
