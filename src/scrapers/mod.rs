pub mod college_football;
pub mod nfl;

pub use college_football::CollegeFootballScraper;
pub use nfl::NflScraper;

use crate::error::{CalendarError, Result};
use crate::models::{Game, GameId, League, ScheduleEntry};
use scraper::{ElementRef, Selector};

const GAME_ID_MARKER: &str = "gameId/";
const COVERAGE_PREFIX: &str = "Coverage: ";

/// Page layout rules for one ESPN site
pub trait ScheduleScraper: Send + Sync {
    fn league(&self) -> League;

    /// Game entries on the weekly schedule page
    fn find_games(&self, html: &str) -> Result<Vec<ScheduleEntry>>;

    /// Game entries on a single team's season page
    fn find_team_games(&self, html: &str) -> Result<Vec<ScheduleEntry>>;

    /// Read a game detail page. Missing fields become empty strings.
    fn parse_game(&self, id: &GameId, html: &str) -> Result<Game>;
}

/// Scraper for the given league's page layouts
pub fn scraper_for(league: League) -> Box<dyn ScheduleScraper> {
    match league {
        League::CollegeFootball => Box::new(CollegeFootballScraper),
        League::Nfl => Box::new(NflScraper),
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CalendarError::Selector(format!("{css}: {e}")))
}

/// Trimmed text content of an element
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of every match under `scope`, joined together
pub(crate) fn select_text(scope: ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Pull the numeric id out of a link such as `/nfl/game/_/gameId/401671789`
pub fn parse_game_id(href: &str) -> Option<GameId> {
    let start = href.find(GAME_ID_MARKER)? + GAME_ID_MARKER.len();
    let digits: String = href[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        None
    } else {
        Some(GameId(digits))
    }
}

/// Listing entry for a link, `NoGame` when there is no usable id
pub(crate) fn entry_from_href(href: Option<&str>) -> ScheduleEntry {
    match href.and_then(parse_game_id) {
        Some(id) => ScheduleEntry::Game(id),
        None => ScheduleEntry::NoGame,
    }
}

/// "Coverage: ESPN" -> "ESPN"
pub(crate) fn strip_coverage(network: &str) -> String {
    network.replacen(COVERAGE_PREFIX, "", 1).trim().to_string()
}
