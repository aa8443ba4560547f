use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const CFB_SCHEDULE_URL: &str = "https://www.espn.com/college-football/schedule";
const CFB_TEAM_URL_BASE: &str = "https://www.espn.com/college-football/team/_/id/";
const CFB_GAME_URL_BASE: &str = "https://www.espn.com/college-football/game/_/gameId/";

const NFL_SCHEDULE_URL: &str = "https://www.espn.com/nfl/schedule";
const NFL_TEAM_URL_BASE: &str = "https://www.espn.com/nfl/team/_/id/";
const NFL_GAME_URL_BASE: &str = "https://www.espn.com/nfl/game/_/gameId/";

/// Every calendar event is blocked out for the same length of time
pub fn game_duration() -> Duration {
    Duration::minutes(210)
}

/// Which ESPN site a calendar is scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum League {
    CollegeFootball,
    Nfl,
}

impl League {
    pub fn schedule_url(&self) -> &'static str {
        match self {
            League::CollegeFootball => CFB_SCHEDULE_URL,
            League::Nfl => NFL_SCHEDULE_URL,
        }
    }

    pub fn team_url(&self, team_id: u32) -> String {
        match self {
            League::CollegeFootball => format!("{}{}", CFB_TEAM_URL_BASE, team_id),
            League::Nfl => format!("{}{}", NFL_TEAM_URL_BASE, team_id),
        }
    }

    pub fn game_url(&self, id: &GameId) -> String {
        match self {
            League::CollegeFootball => format!("{}{}", CFB_GAME_URL_BASE, id),
            League::Nfl => format!("{}{}", NFL_GAME_URL_BASE, id),
        }
    }

    /// Product name written into the feed's PRODID
    pub fn product(&self) -> &'static str {
        match self {
            League::CollegeFootball => "college-football-calendar",
            League::Nfl => "nfl-football-calendar",
        }
    }
}

/// ESPN's numeric game id, kept as the digit string found in the link
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// One row or cell of a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleEntry {
    Game(GameId),
    /// Bye week, placeholder row, or a link we could not read an id from
    NoGame,
}

/// One side of a matchup. Empty strings mean "not shown on the page".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSide {
    pub name: String,
    pub rank: String,
    pub score: String,
}

impl TeamSide {
    pub fn is_ranked(&self) -> bool {
        !self.rank.is_empty()
    }

    pub fn has_score(&self) -> bool {
        !self.score.is_empty()
    }
}

/// Kickoff as scraped: a resolved UTC instant, or the raw text when it
/// could not be parsed (e.g. "TBD")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KickoffTime {
    At(DateTime<Utc>),
    Unparsed(String),
}

impl KickoffTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            KickoffTime::At(at) => Some(*at),
            KickoffTime::Unparsed(_) => None,
        }
    }
}

impl fmt::Display for KickoffTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KickoffTime::At(at) => write!(f, "{}", at.to_rfc3339()),
            KickoffTime::Unparsed(raw) => f.write_str(raw),
        }
    }
}

/// A game scraped from a detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub kickoff: KickoffTime,
    pub network: String,
    pub line: String,
    pub over_under: String,
    pub home: TeamSide,
    pub visitor: TeamSide,
}

/// A single VEVENT, derived from one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub location: String,
    pub url: String,
    pub description: String,
}

/// A named calendar ready to be serialized
#[derive(Debug, Clone)]
pub struct Feed {
    pub name: String,
    pub url: String,
    pub league: League,
    pub ttl: Duration,
    pub generated_at: DateTime<Utc>,
    pub events: Vec<CalendarEvent>,
}
