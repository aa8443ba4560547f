use super::{
    element_text, entry_from_href, select_text, selector, strip_coverage, ScheduleScraper,
};
use crate::error::Result;
use crate::models::{Game, GameId, KickoffTime, League, ScheduleEntry, TeamSide};
use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::Html;

/// ESPN NFL schedule and gamecast pages
#[derive(Debug, Clone, Copy, Default)]
pub struct NflScraper;

impl ScheduleScraper for NflScraper {
    fn league(&self) -> League {
        League::Nfl
    }

    /// One entry per schedule row; the third cell links to the game.
    /// Bye rows have no link there and come back as `NoGame`.
    fn find_games(&self, html: &str) -> Result<Vec<ScheduleEntry>> {
        let document = Html::parse_document(html);
        let row_selector = selector(".schedule tbody tr")?;
        let cell_selector = selector("td")?;
        let link_selector = selector("a[href]")?;

        Ok(document
            .select(&row_selector)
            .map(|row| {
                let href = row
                    .select(&cell_selector)
                    .nth(2)
                    .and_then(|cell| cell.select(&link_selector).next())
                    .and_then(|a| a.value().attr("href"));
                entry_from_href(href)
            })
            .collect())
    }

    fn find_team_games(&self, html: &str) -> Result<Vec<ScheduleEntry>> {
        let document = Html::parse_document(html);
        let game_selector = selector("[data-module='schedule'] li a[rel$='gamecast']")?;

        Ok(document
            .select(&game_selector)
            .map(|a| entry_from_href(a.value().attr("href")))
            .collect())
    }

    fn parse_game(&self, id: &GameId, html: &str) -> Result<Game> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let network = strip_coverage(&select_text(root, &selector(".game-details .game-network")?));

        let date_selector = selector(".game-details .game-date-time [data-date]")?;
        let kickoff = root
            .select(&date_selector)
            .next()
            .and_then(|el| el.value().attr("data-date"))
            .map(parse_kickoff)
            .unwrap_or_else(|| KickoffTime::Unparsed(String::new()));

        let odds_selector = selector(".odds-details li")?;
        let line = root
            .select(&odds_selector)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let over_under = select_text(root, &selector(".odds-details li.ou")?);

        let home = TeamSide {
            name: select_text(root, &selector(".team.home .team-info-wrapper .long-name")?),
            rank: String::new(),
            score: select_text(root, &selector(".team.home .score")?),
        };
        let visitor = TeamSide {
            name: select_text(root, &selector(".team.away .team-info-wrapper .long-name")?),
            rank: String::new(),
            score: select_text(root, &selector(".team.away .score")?),
        };

        Ok(Game {
            id: id.clone(),
            kickoff,
            network,
            line,
            over_under,
            home,
            visitor,
        })
    }
}

/// `data-date` carries a UTC timestamp such as `2024-09-06T00:20Z`
pub fn parse_kickoff(raw: &str) -> KickoffTime {
    let raw = raw.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return KickoffTime::At(at.with_timezone(&Utc));
    }

    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ") {
        Ok(naive) => KickoffTime::At(naive.and_utc()),
        Err(_) => KickoffTime::Unparsed(raw.to_string()),
    }
}
