//! Named calendar builds: listing page -> game ids -> detail pages ->
//! filter -> feed -> publish.

use crate::api::PageSource;
use crate::calendar::{build_feed, ics};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Game, GameId, League, ScheduleEntry};
use crate::publisher::{calendar_key, Publisher};
use crate::scrapers::{scraper_for, ScheduleScraper};
use crate::utils::{not_bye, slugify, GameFilter};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Which listing page a calendar starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Weekly,
    Team(u32),
}

/// Everything needed to build and publish one calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarPipeline {
    pub name: String,
    pub league: League,
    pub listing: Listing,
    pub filter: GameFilter,
}

impl CalendarPipeline {
    pub fn weekly(name: &str, league: League, filter: GameFilter) -> Self {
        Self {
            name: name.to_string(),
            league,
            listing: Listing::Weekly,
            filter,
        }
    }

    pub fn team(name: &str, league: League, team_id: u32) -> Self {
        Self {
            name: name.to_string(),
            league,
            listing: Listing::Team(team_id),
            filter: GameFilter::All,
        }
    }

    pub fn listing_url(&self) -> String {
        match self.listing {
            Listing::Weekly => self.league.schedule_url().to_string(),
            Listing::Team(team_id) => self.league.team_url(team_id),
        }
    }

    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// The calendars built on every run, in run order
pub fn default_calendars(config: &Config) -> Vec<CalendarPipeline> {
    let mut calendars = vec![
        CalendarPipeline::weekly(
            "College Football Top 25",
            League::CollegeFootball,
            GameFilter::EitherRanked,
        ),
        CalendarPipeline::weekly(
            "College Football Top 25 Matchups",
            League::CollegeFootball,
            GameFilter::BothRanked,
        ),
    ];

    calendars.extend(
        config
            .teams
            .iter()
            .map(|team| CalendarPipeline::team(&team.name, team.league, team.team_id)),
    );

    calendars.push(CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All));
    calendars
}

/// Find a default calendar by its name or slug
pub fn find_calendar<'a>(
    calendars: &'a [CalendarPipeline],
    name: &str,
) -> Option<&'a CalendarPipeline> {
    let wanted = slugify(name);
    calendars.iter().find(|c| c.slug() == wanted)
}

/// Outcome of one calendar build
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub key: String,
    pub games: usize,
    pub events: usize,
    pub published: bool,
}

/// Build the feed for games that were already selected and publish it
pub async fn publish_games(
    publisher: &Publisher,
    pipeline: &CalendarPipeline,
    games: &[Game],
) -> RunSummary {
    let feed = build_feed(&pipeline.name, pipeline.league, games);
    let document = ics::render(&feed);
    let published = publisher.publish(&pipeline.name, document.as_bytes()).await;

    RunSummary {
        name: pipeline.name.clone(),
        key: calendar_key(&pipeline.name),
        games: games.len(),
        events: feed.events.len(),
        published,
    }
}

/// Runs calendar pipelines against a page source and a publisher
pub struct Orchestrator {
    source: Arc<dyn PageSource>,
    publisher: Publisher,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn PageSource>, publisher: Publisher, concurrency: usize) -> Self {
        Self {
            source,
            publisher,
            concurrency: concurrency.max(1),
        }
    }

    /// Game ids on the pipeline's listing page, placeholders removed
    pub async fn fetch_game_ids(
        &self,
        pipeline: &CalendarPipeline,
        scraper: &dyn ScheduleScraper,
    ) -> Result<Vec<GameId>> {
        let url = pipeline.listing_url();
        info!(calendar = %pipeline.name, url = %url, "Fetching listing page");
        let html = self.source.fetch(&url).await?;

        let entries = match pipeline.listing {
            Listing::Weekly => scraper.find_games(&html)?,
            Listing::Team(_) => scraper.find_team_games(&html)?,
        };

        let total = entries.len();
        let ids: Vec<GameId> = entries
            .into_iter()
            .filter(not_bye)
            .filter_map(|entry| match entry {
                ScheduleEntry::Game(id) => Some(id),
                ScheduleEntry::NoGame => None,
            })
            .collect();

        if ids.len() < total {
            warn!(
                calendar = %pipeline.name,
                skipped = total - ids.len(),
                "Skipping listing entries without a game"
            );
        }

        Ok(ids)
    }

    /// Fetch and parse one detail page
    pub async fn fetch_game(&self, scraper: &dyn ScheduleScraper, id: &GameId) -> Result<Game> {
        let url = scraper.league().game_url(id);
        info!(url = %url, "Getting game");
        let html = self.source.fetch(&url).await?;
        scraper.parse_game(id, &html)
    }

    /// Fetch every game concurrently (bounded), keeping listing order.
    /// The first failed fetch fails the whole batch.
    pub async fn fetch_games(
        &self,
        scraper: &dyn ScheduleScraper,
        ids: &[GameId],
    ) -> Result<Vec<Game>> {
        stream::iter(ids.iter().cloned())
            .map(move |id| async move { self.fetch_game(scraper, &id).await })
            .buffered(self.concurrency)
            .try_collect()
            .await
    }

    /// Selected games for a calendar, without building or publishing
    pub async fn collect_games(&self, pipeline: &CalendarPipeline) -> Result<Vec<Game>> {
        let scraper = scraper_for(pipeline.league);
        let ids = self.fetch_game_ids(pipeline, scraper.as_ref()).await?;
        let games = self.fetch_games(scraper.as_ref(), &ids).await?;
        let fetched = games.len();
        let games = pipeline.filter.apply(games);

        info!(
            calendar = %pipeline.name,
            fetched,
            selected = games.len(),
            "Selected games"
        );
        Ok(games)
    }

    /// Build and publish one calendar. Fetch failures are returned; a
    /// publish failure is logged and shows up as `published: false`.
    pub async fn run_pipeline(&self, pipeline: &CalendarPipeline) -> Result<RunSummary> {
        info!(calendar = %pipeline.name, "Building calendar");

        let games = self.collect_games(pipeline).await?;
        Ok(publish_games(&self.publisher, pipeline, &games).await)
    }

    /// Run calendars one after another, stopping at the first failure
    pub async fn run_all(&self, pipelines: &[CalendarPipeline]) -> Result<Vec<RunSummary>> {
        let mut summaries = Vec::with_capacity(pipelines.len());
        for pipeline in pipelines {
            summaries.push(self.run_pipeline(pipeline).await?);
        }
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CalendarStore, MemoryStore};
    use crate::config::TeamCalendar;
    use crate::error::CalendarError;
    use crate::scrapers::nfl::tests::{game_html, SCHEDULE_HTML};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned pages and records every URL requested
    #[derive(Default)]
    struct FixturePages {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl FixturePages {
        fn with(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for FixturePages {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| CalendarError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl CalendarStore for BrokenStore {
        async fn put(&self, key: &str, _body: Vec<u8>) -> Result<()> {
            Err(CalendarError::Store {
                key: key.to_string(),
                message: "NoSuchBucket".to_string(),
            })
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    const RAVENS_URL: &str = "https://www.espn.com/nfl/game/_/gameId/401671789";
    const PACKERS_URL: &str = "https://www.espn.com/nfl/game/_/gameId/401671805";

    fn nfl_pages() -> FixturePages {
        FixturePages::default()
            .with("https://www.espn.com/nfl/schedule", SCHEDULE_HTML)
            .with(
                RAVENS_URL,
                game_html("Baltimore Ravens", "Kansas City Chiefs", "2024-09-06T00:20Z", "NBC"),
            )
            .with(
                PACKERS_URL,
                game_html("Green Bay Packers", "Philadelphia Eagles", "2024-09-07T00:15Z", "Peacock"),
            )
    }

    fn college_game_html(visitor: (&str, &str), home: (&str, &str)) -> String {
        format!(
            r#"
            <div class="Gamestrip__TeamContent">
              <span class="ScoreCell__Rank">{}</span><span class="ScoreCell__TeamName">{}</span>
            </div>
            <div class="Gamestrip__TeamContent">
              <span class="ScoreCell__Rank">{}</span><span class="ScoreCell__TeamName">{}</span>
            </div>
            <div class="GameInfo__Meta"><span>3:30 PM, October 12, 2024</span><span>Coverage: CBS</span></div>
            "#,
            visitor.0, visitor.1, home.0, home.1
        )
    }

    fn college_pages() -> FixturePages {
        let listing = r#"
            <table><tbody>
              <tr><td class="date__col"><a href="/college-football/game/_/gameId/1">3:30 PM</a></td></tr>
              <tr><td class="date__col"><a href="/college-football/game/_/gameId/2">7:00 PM</a></td></tr>
              <tr><td class="date__col"><a href="/college-football/game/_/gameId/3">7:30 PM</a></td></tr>
              <tr><td class="date__col">TBD</td></tr>
            </tbody></table>
        "#;
        let base = "https://www.espn.com/college-football/game/_/gameId/";

        FixturePages::default()
            .with("https://www.espn.com/college-football/schedule", listing)
            .with(&format!("{base}1"), college_game_html(("", "Purdue"), ("1", "Oregon")))
            .with(&format!("{base}2"), college_game_html(("", "Navy"), ("", "Army")))
            .with(&format!("{base}3"), college_game_html(("4", "Penn State"), ("9", "USC")))
    }

    fn orchestrator(pages: Arc<FixturePages>, store: Arc<dyn CalendarStore>) -> Orchestrator {
        Orchestrator::new(pages, Publisher::new(store), 4)
    }

    #[tokio::test]
    async fn test_nfl_pipeline_skips_bye_and_keeps_row_order() {
        let pages = Arc::new(nfl_pages());
        let store = Arc::new(MemoryStore::new());
        let runner = orchestrator(pages.clone(), store.clone());

        let pipeline = CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All);
        let summary = runner.run_pipeline(&pipeline).await.unwrap();

        let detail_requests: Vec<String> = pages
            .requests()
            .into_iter()
            .filter(|url| url.contains("gameId"))
            .collect();
        assert_eq!(detail_requests.len(), 2);

        assert_eq!(summary.key, "calendars/nfl.ics");
        assert_eq!(summary.games, 2);
        assert_eq!(summary.events, 2);
        assert!(summary.published);

        let ics = String::from_utf8(store.get("calendars/nfl.ics").unwrap()).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        let ravens = ics.find("UID:401671789@hathaway.cc").unwrap();
        let packers = ics.find("UID:401671805@hathaway.cc").unwrap();
        assert!(ravens < packers);
    }

    #[tokio::test]
    async fn test_fetch_games_preserves_order_with_single_slot() {
        let pages = Arc::new(nfl_pages());
        let runner = Orchestrator::new(pages, Publisher::new(Arc::new(MemoryStore::new())), 0);
        let ids = [GameId::new("401671805"), GameId::new("401671789")];

        let games = runner.fetch_games(&crate::scrapers::NflScraper, &ids).await.unwrap();

        let names: Vec<&str> = games.iter().map(|g| g.visitor.name.as_str()).collect();
        assert_eq!(names, vec!["Green Bay Packers", "Baltimore Ravens"]);
    }

    #[tokio::test]
    async fn test_pipeline_runs_on_spawned_task() {
        let pages = Arc::new(nfl_pages());
        let store = Arc::new(MemoryStore::new());
        let runner = Arc::new(orchestrator(pages, store.clone()));
        let pipelines = vec![CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All)];

        let handle = tokio::spawn({
            let runner = runner.clone();
            async move { runner.run_all(&pipelines).await }
        });
        let summaries = handle.await.unwrap().unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].events, 2);
        assert!(store.get("calendars/nfl.ics").is_some());
    }

    #[tokio::test]
    async fn test_ranked_filters() {
        let pages = Arc::new(college_pages());
        let runner = orchestrator(pages, Arc::new(MemoryStore::new()));

        let either = CalendarPipeline::weekly(
            "College Football Top 25",
            League::CollegeFootball,
            GameFilter::EitherRanked,
        );
        let games = runner.collect_games(&either).await.unwrap();
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let both = CalendarPipeline::weekly(
            "College Football Top 25 Matchups",
            League::CollegeFootball,
            GameFilter::BothRanked,
        );
        let games = runner.collect_games(&both).await.unwrap();
        let ids: Vec<&str> = games.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[tokio::test]
    async fn test_team_pipeline_publishes_every_game() {
        let team_page = r#"
            <table><tbody>
              <tr><td><a class="Schedule__Game" href="/college-football/game/_/gameId/11">vs Texas A&amp;M</a></td></tr>
              <tr><td>BYE WEEK</td></tr>
              <tr><td><a class="Schedule__Game" href="/college-football/game/_/gameId/12">@ Purdue</a></td></tr>
            </tbody></table>
        "#;
        let base = "https://www.espn.com/college-football/game/_/gameId/";
        let pages = Arc::new(
            FixturePages::default()
                .with("https://www.espn.com/college-football/team/_/id/87", team_page)
                .with(&format!("{base}11"), college_game_html(("20", "Texas A&M"), ("7", "Notre Dame")))
                .with(&format!("{base}12"), college_game_html(("", "Notre Dame"), ("", "Purdue"))),
        );
        let store = Arc::new(MemoryStore::new());
        let runner = orchestrator(pages.clone(), store.clone());

        let pipeline = CalendarPipeline::team("Notre Dame Football", League::CollegeFootball, 87);
        let summary = runner.run_pipeline(&pipeline).await.unwrap();

        let mut requests = pages.requests();
        assert_eq!(requests.remove(0), "https://www.espn.com/college-football/team/_/id/87");
        requests.sort();
        assert_eq!(requests, vec![format!("{base}11"), format!("{base}12")]);
        assert_eq!(summary.key, "calendars/notre-dame-football.ics");
        assert_eq!(summary.games, 2);
        assert_eq!(summary.events, 2);
        assert!(summary.published);

        let ics = String::from_utf8(store.get("calendars/notre-dame-football.ics").unwrap()).unwrap();
        assert!(ics.contains("X-WR-CALNAME:Notre Dame Football"));
        let first = ics.find("UID:11@hathaway.cc").unwrap();
        let second = ics.find("UID:12@hathaway.cc").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_empty_listing_publishes_empty_feed() {
        let pages = Arc::new(
            FixturePages::default().with("https://www.espn.com/nfl/schedule", "<html></html>"),
        );
        let store = Arc::new(MemoryStore::new());
        let runner = orchestrator(pages, store.clone());

        let pipeline = CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All);
        let summary = runner.run_pipeline(&pipeline).await.unwrap();

        assert_eq!(summary.events, 0);
        let ics = String::from_utf8(store.get("calendars/nfl.ics").unwrap()).unwrap();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
    }

    #[tokio::test]
    async fn test_missing_detail_page_aborts_without_publishing() {
        let pages = Arc::new(
            FixturePages::default()
                .with("https://www.espn.com/nfl/schedule", SCHEDULE_HTML)
                .with(
                    RAVENS_URL,
                    game_html("Baltimore Ravens", "Kansas City Chiefs", "2024-09-06T00:20Z", "NBC"),
                ),
        );
        let store = Arc::new(MemoryStore::new());
        let runner = orchestrator(pages, store.clone());

        let pipeline = CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All);
        let err = runner.run_pipeline(&pipeline).await.unwrap_err();

        assert_eq!(err.kind(), "status");
        assert!(store.objects().is_empty());
    }

    #[tokio::test]
    async fn test_run_all_stops_at_first_failure() {
        let pages = Arc::new(nfl_pages());
        let store = Arc::new(MemoryStore::new());
        let runner = orchestrator(pages.clone(), store.clone());

        let pipelines = vec![
            CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All),
            CalendarPipeline::team("Notre Dame Football", League::CollegeFootball, 87),
            CalendarPipeline::weekly("NFL Again", League::Nfl, GameFilter::All),
        ];

        assert!(runner.run_all(&pipelines).await.is_err());
        assert!(store.get("calendars/nfl.ics").is_some());
        assert!(store.get("calendars/nfl-again.ics").is_none());
        // NFL listing, two games, then the missing team page
        assert_eq!(pages.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_publish_saved_games_without_fetching() {
        let pages = Arc::new(nfl_pages());
        let runner = orchestrator(pages, Arc::new(MemoryStore::new()));
        let pipeline = CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All);
        let games = runner.collect_games(&pipeline).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nfl.json");
        crate::utils::data::save_games_to_json(&games, &path).unwrap();
        let saved = crate::utils::data::load_games_from_json(&path).unwrap();

        let store = Arc::new(MemoryStore::new());
        let summary = publish_games(&Publisher::new(store.clone()), &pipeline, &saved).await;

        assert_eq!(summary.events, 2);
        assert!(summary.published);
        let ics = String::from_utf8(store.get("calendars/nfl.ics").unwrap()).unwrap();
        assert!(ics.contains("UID:401671789@hathaway.cc"));
        assert!(ics.contains("UID:401671805@hathaway.cc"));
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_stop_later_calendars() {
        let pages = Arc::new(nfl_pages());
        let runner = orchestrator(pages.clone(), Arc::new(BrokenStore));

        let pipelines = vec![
            CalendarPipeline::weekly("NFL", League::Nfl, GameFilter::All),
            CalendarPipeline::weekly("NFL Copy", League::Nfl, GameFilter::All),
        ];
        let summaries = runner.run_all(&pipelines).await.unwrap();

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().all(|s| !s.published));
        assert_eq!(summaries[1].events, 2);
    }

    #[test]
    fn test_default_calendars() {
        let config = Config::from_lookup(|_| None).unwrap();
        let calendars = default_calendars(&config);
        let names: Vec<&str> = calendars.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "College Football Top 25",
                "College Football Top 25 Matchups",
                "Notre Dame Football",
                "Ohio State Football",
                "NFL",
            ]
        );
        assert_eq!(calendars[0].filter, GameFilter::EitherRanked);
        assert_eq!(calendars[1].filter, GameFilter::BothRanked);
        assert_eq!(calendars[2].listing, Listing::Team(87));
        assert_eq!(
            calendars[3].listing_url(),
            "https://www.espn.com/college-football/team/_/id/194"
        );
        assert_eq!(calendars[4].league, League::Nfl);
        assert_eq!(calendars[4].filter, GameFilter::All);
    }

    #[test]
    fn test_find_calendar_by_name_or_slug() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.teams = vec![TeamCalendar {
            name: "Oklahoma Football".to_string(),
            league: League::CollegeFootball,
            team_id: 201,
        }];
        let calendars = default_calendars(&config);

        assert_eq!(
            find_calendar(&calendars, "oklahoma-football").map(|c| c.listing),
            Some(Listing::Team(201))
        );
        assert_eq!(
            find_calendar(&calendars, "College Football Top 25").map(|c| c.filter),
            Some(GameFilter::EitherRanked)
        );
        assert!(find_calendar(&calendars, "Notre Dame Football").is_none());
    }
}
