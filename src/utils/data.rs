use crate::models::Game;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Flattened game row for spreadsheet export
#[derive(Debug, Serialize)]
struct GameRow<'a> {
    id: &'a str,
    kickoff: String,
    network: &'a str,
    line: &'a str,
    over_under: &'a str,
    visitor: &'a str,
    visitor_rank: &'a str,
    visitor_score: &'a str,
    home: &'a str,
    home_rank: &'a str,
    home_score: &'a str,
}

impl<'a> From<&'a Game> for GameRow<'a> {
    fn from(game: &'a Game) -> Self {
        Self {
            id: game.id.as_str(),
            kickoff: game.kickoff.to_string(),
            network: &game.network,
            line: &game.line,
            over_under: &game.over_under,
            visitor: &game.visitor.name,
            visitor_rank: &game.visitor.rank,
            visitor_score: &game.visitor.score,
            home: &game.home.name,
            home_rank: &game.home.rank,
            home_score: &game.home.score,
        }
    }
}

/// Save scraped games to CSV, one row per game
pub fn save_games_to_csv(games: &[Game], filename: impl AsRef<Path>) -> Result<()> {
    let filename = filename.as_ref();
    let mut writer = csv::Writer::from_path(filename)
        .with_context(|| format!("Failed to create CSV file {}", filename.display()))?;

    for game in games {
        writer
            .serialize(GameRow::from(game))
            .context("Failed to write game row")?;
    }

    writer.flush().context("Failed to flush CSV file")?;
    Ok(())
}

/// Save scraped games to a pretty-printed JSON file
pub fn save_games_to_json(games: &[Game], filename: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(games).context("Failed to serialize games")?;
    std::fs::write(filename.as_ref(), json).context("Failed to write JSON file")?;
    Ok(())
}

/// Load games previously saved with [`save_games_to_json`]
pub fn load_games_from_json(filename: impl AsRef<Path>) -> Result<Vec<Game>> {
    let json = std::fs::read_to_string(filename.as_ref()).context("Failed to read JSON file")?;
    let games = serde_json::from_str(&json).context("Failed to deserialize games")?;
    Ok(games)
}
