pub mod ics;

use crate::models::{game_duration, CalendarEvent, Feed, Game, League};
use crate::utils::slugify;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

pub const CALENDAR_DOMAIN: &str = "hathaway.cc";
pub const FOOTBALL_EMOJI: char = '\u{1F3C8}';

/// How long clients should cache a feed before refreshing
pub fn feed_ttl() -> Duration {
    Duration::hours(24)
}

/// Public URL a calendar is published under
pub fn calendar_url(name: &str) -> String {
    format!("https://{}/calendars/{}", CALENDAR_DOMAIN, slugify(name))
}

/// "#3 " for ranked teams, nothing otherwise
fn rank_tag(rank: &str) -> String {
    match rank {
        "" => String::new(),
        r if r.starts_with('#') => format!("{} ", r),
        r => format!("#{} ", r),
    }
}

/// "🏈 #3 Michigan at #2 Ohio State"
pub fn summary(game: &Game) -> String {
    format!(
        "{} {}{} at {}{}",
        FOOTBALL_EMOJI,
        rank_tag(&game.visitor.rank),
        game.visitor.name,
        rank_tag(&game.home.rank),
        game.home.name
    )
}

/// Betting line and over/under, one per line, skipping whichever is missing
pub fn description(game: &Game) -> String {
    [&game.line, &game.over_under]
        .into_iter()
        .filter(|text| !text.is_empty())
        .map(|text| format!("{}\n", text))
        .collect()
}

/// Final score once either team has points, otherwise where to watch
pub fn location(game: &Game) -> String {
    if game.visitor.has_score() || game.home.has_score() {
        format!(
            "FINAL: {} {}, {} {}",
            game.visitor.name, game.visitor.score, game.home.name, game.home.score
        )
    } else if !game.network.is_empty() {
        format!("Watch on {}", game.network)
    } else {
        String::new()
    }
}

/// The calendar event for one game, or `None` when its kickoff is unknown
pub fn event_for_game(league: League, game: &Game) -> Option<CalendarEvent> {
    let start = game.kickoff.instant()?;

    Some(CalendarEvent {
        uid: format!("{}@{}", game.id, CALENDAR_DOMAIN),
        start,
        end: start + game_duration(),
        summary: summary(game),
        location: location(game),
        url: league.game_url(&game.id),
        description: description(game),
    })
}

/// Assemble a named feed from the selected games, in game order
pub fn build_feed(name: &str, league: League, games: &[Game]) -> Feed {
    build_feed_at(name, league, games, Utc::now())
}

pub fn build_feed_at(
    name: &str,
    league: League,
    games: &[Game],
    generated_at: DateTime<Utc>,
) -> Feed {
    let events: Vec<CalendarEvent> = games
        .iter()
        .filter_map(|game| {
            let event = event_for_game(league, game);
            if event.is_none() {
                warn!(
                    calendar = name,
                    game_id = %game.id,
                    kickoff = %game.kickoff,
                    "Skipping game without a usable kickoff time"
                );
            }
            event
        })
        .collect();

    info!(calendar = name, events = events.len(), "Built calendar");

    Feed {
        name: name.to_string(),
        url: calendar_url(name),
        league,
        ttl: feed_ttl(),
        generated_at,
        events,
    }
}
