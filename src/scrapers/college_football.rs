use super::{element_text, entry_from_href, select_text, selector, strip_coverage, ScheduleScraper};
use crate::error::Result;
use crate::models::{Game, GameId, KickoffTime, League, ScheduleEntry, TeamSide};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use scraper::{ElementRef, Html, Selector};

/// ESPN renders college kickoffs in Eastern time with no zone marker
pub const KICKOFF_OFFSET_HOURS: i64 = 4;

/// "7:30 PM, September 7, 2024" (month names may be abbreviated)
const KICKOFF_FORMAT: &str = "%I:%M %p, %B %d, %Y";

/// Date part of a time-TBD kickoff, "TBD, September 7, 2024"
const KICKOFF_DATE_FORMAT: &str = "%B %d, %Y";

/// ESPN college football schedule and gamecast pages
#[derive(Debug, Clone, Copy, Default)]
pub struct CollegeFootballScraper;

struct TeamSelectors {
    name: Selector,
    rank: Selector,
    score: Selector,
}

impl TeamSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            name: selector(".ScoreCell__TeamName")?,
            rank: selector(".ScoreCell__Rank")?,
            score: selector(".Gamestrip__Score .score")?,
        })
    }

    fn read(&self, team: Option<ElementRef>) -> TeamSide {
        match team {
            Some(team) => TeamSide {
                name: select_text(team, &self.name),
                rank: select_text(team, &self.rank),
                score: select_text(team, &self.score),
            },
            None => TeamSide::default(),
        }
    }
}

impl ScheduleScraper for CollegeFootballScraper {
    fn league(&self) -> League {
        League::CollegeFootball
    }

    /// One entry per date column of the weekly schedule tables
    fn find_games(&self, html: &str) -> Result<Vec<ScheduleEntry>> {
        let document = Html::parse_document(html);
        let cell_selector = selector("td.date__col")?;
        let link_selector = selector("a[href]")?;

        Ok(document
            .select(&cell_selector)
            .map(|cell| {
                let href = cell
                    .select(&link_selector)
                    .next()
                    .and_then(|a| a.value().attr("href"));
                entry_from_href(href)
            })
            .collect())
    }

    fn find_team_games(&self, html: &str) -> Result<Vec<ScheduleEntry>> {
        let document = Html::parse_document(html);
        let game_selector = selector("a.Schedule__Game")?;

        Ok(document
            .select(&game_selector)
            .map(|a| entry_from_href(a.value().attr("href")))
            .collect())
    }

    fn parse_game(&self, id: &GameId, html: &str) -> Result<Game> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        // First span is the kickoff, second is the broadcast
        let meta_selector = selector(".GameInfo__Meta span")?;
        let mut meta = document.select(&meta_selector).map(element_text);
        let raw_time = meta.next().unwrap_or_default();
        let network = strip_coverage(&meta.next().unwrap_or_default());

        let (line, over_under) = betting_lines(root)?;

        let team_selector = selector(".Gamestrip__TeamContent")?;
        let mut teams = document.select(&team_selector);
        let side = TeamSelectors::new()?;
        let visitor = side.read(teams.next());
        let home = side.read(teams.next());

        Ok(Game {
            id: id.clone(),
            kickoff: parse_kickoff(&raw_time),
            network,
            line,
            over_under,
            home,
            visitor,
        })
    }
}

/// Spread and total from the betting block. Pages without the
/// `.line`/`.ou` markers list the spread first and the total second.
fn betting_lines(root: ElementRef) -> Result<(String, String)> {
    let item_selector = selector(".GameInfo__BettingItem")?;
    let line_selector = selector(".GameInfo__BettingItem.line")?;
    let ou_selector = selector(".GameInfo__BettingItem.ou")?;

    let has_markers =
        root.select(&line_selector).next().is_some() || root.select(&ou_selector).next().is_some();
    if has_markers {
        return Ok((
            select_text(root, &line_selector),
            select_text(root, &ou_selector),
        ));
    }

    let mut items = root.select(&item_selector).map(element_text);
    let line = items.next().unwrap_or_default();
    let over_under = items.next().unwrap_or_default();
    Ok((line, over_under))
}

/// Parse the page's local kickoff text and shift it to UTC.
///
/// A date without a time is placed at local midnight. Text with no
/// readable date stays [`KickoffTime::Unparsed`].
pub fn parse_kickoff(raw: &str) -> KickoffTime {
    let raw = raw.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, KICKOFF_FORMAT) {
        return KickoffTime::At(shift_to_utc(naive));
    }

    let date = std::iter::once(raw)
        .chain(raw.split_once(", ").map(|(_, date)| date))
        .find_map(|text| NaiveDate::parse_from_str(text, KICKOFF_DATE_FORMAT).ok());
    match date {
        Some(date) => KickoffTime::At(shift_to_utc(date.and_time(NaiveTime::MIN))),
        None => KickoffTime::Unparsed(raw.to_string()),
    }
}

fn shift_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    naive.and_utc() + Duration::hours(KICKOFF_OFFSET_HOURS)
}
