//! The odds board: last scrape result for today and tomorrow, served until it
//! goes stale.

use crate::feed::demo::DemoFeed;
use crate::feed::types::GameOdds;
use crate::feed::OddsFeed;
use chrono::{Days, NaiveDate};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardSource {
    Empty,
    Live(String),
    Demo,
}

/// Outcome of one refresh, for logging and the dashboard status line.
#[derive(Debug, Clone, Default)]
pub struct RefreshSummary {
    pub today: usize,
    pub tomorrow: usize,
    /// Dates whose fetch failed, with the error chain.
    pub failures: Vec<(NaiveDate, String)>,
    pub used_demo: bool,
}

pub struct OddsBoard {
    pub today: Vec<GameOdds>,
    pub tomorrow: Vec<GameOdds>,
    pub source: BoardSource,
    today_date: Option<NaiveDate>,
    fetched_at: Option<Instant>,
    ttl: Duration,
    demo_fallback: bool,
}

impl OddsBoard {
    pub fn new(ttl: Duration, demo_fallback: bool) -> Self {
        Self {
            today: Vec::new(),
            tomorrow: Vec::new(),
            source: BoardSource::Empty,
            today_date: None,
            fetched_at: None,
            ttl,
            demo_fallback,
        }
    }

    pub fn today_date(&self) -> Option<NaiveDate> {
        self.today_date
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    /// Stale when never fetched, older than the TTL, or the calendar day rolled over.
    pub fn is_stale(&self, now: Instant, today: NaiveDate) -> bool {
        match (self.fetched_at, self.today_date) {
            (Some(at), Some(day)) => day != today || now.saturating_duration_since(at) >= self.ttl,
            _ => true,
        }
    }

    pub fn games(&self) -> impl Iterator<Item = &GameOdds> {
        self.today.iter().chain(self.tomorrow.iter())
    }

    /// Scrape today and tomorrow in sequence. A failed date is logged and
    /// left empty; never fails as a whole.
    pub async fn refresh(&mut self, feed: &mut dyn OddsFeed, today: NaiveDate) -> RefreshSummary {
        let tomorrow = today + Days::new(1);
        let mut summary = RefreshSummary::default();
        let mut slates: [Vec<GameOdds>; 2] = [Vec::new(), Vec::new()];

        for (slot, date) in [today, tomorrow].into_iter().enumerate() {
            match feed.fetch_games(date).await {
                Ok(games) => slates[slot] = games,
                Err(e) => {
                    let msg = format!("{:#}", e);
                    tracing::warn!(%date, source = feed.source_name(), error = %msg, "odds fetch failed");
                    summary.failures.push((date, msg));
                }
            }
        }

        let [today_games, tomorrow_games] = slates;
        if today_games.is_empty() && tomorrow_games.is_empty() && self.demo_fallback {
            tracing::info!("no live games, falling back to demo slate");
            let demo = DemoFeed::new(today).games();
            let (t, n): (Vec<_>, Vec<_>) = demo.into_iter().partition(|g| g.date == today);
            self.today = t;
            self.tomorrow = n;
            self.source = BoardSource::Demo;
            summary.used_demo = true;
        } else {
            self.today = today_games;
            self.tomorrow = tomorrow_games;
            self.source = BoardSource::Live(feed.source_name().to_string());
        }

        self.today_date = Some(today);
        self.fetched_at = Some(Instant::now());
        summary.today = self.today.len();
        summary.tomorrow = self.tomorrow.len();
        summary
    }

    /// Refresh only when stale. Returns `None` when the cached result was kept.
    pub async fn refresh_if_stale(
        &mut self,
        feed: &mut dyn OddsFeed,
        today: NaiveDate,
    ) -> Option<RefreshSummary> {
        if !self.is_stale(Instant::now(), today) {
            return None;
        }
        Some(self.refresh(feed, today).await)
    }
}
