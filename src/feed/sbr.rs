//! sportsbookreview.com MLB odds pages.
//!
//! Each market lives on its own page, all date-parameterized:
//!   moneyline  {base}/?date=YYYY-MM-DD
//!   run line   {base}/pointspread/full-game/?date=YYYY-MM-DD
//!   totals     {base}/totals/full-game/?date=YYYY-MM-DD
//! The moneyline page is authoritative for the game list; the other two pages
//! are joined onto it by game id.

use super::extract::extract_page;
use super::next_data::extract_next_data;
use super::types::{BetType, BookOdds, GameInfo, GameOdds, MarketLines};
use super::OddsFeed;
use crate::config::ScraperConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;

const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One market page: game info paired with the selected book's lines.
pub type PageRows = Vec<(GameInfo, MarketLines)>;

pub struct SbrFeed {
    client: Client,
    base_url: String,
    bookmaker: String,
    user_agents: Vec<String>,
    min_delay: Duration,
    max_delay: Duration,
    rng: StdRng,
    requests_sent: u64,
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers
}

impl SbrFeed {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .default_headers(browser_headers())
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bookmaker: config.bookmaker.clone(),
            user_agents: config.user_agents.clone(),
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.min_delay_ms)),
            rng: StdRng::from_entropy(),
            requests_sent: 0,
        })
    }

    /// Page URL for one market on one slate date.
    pub fn build_url(base_url: &str, bet_type: BetType, date: NaiveDate) -> String {
        format!(
            "{}/{}?date={}",
            base_url.trim_end_matches('/'),
            bet_type.url_path(),
            date.format("%Y-%m-%d")
        )
    }

    fn next_user_agent(&mut self) -> &str {
        if self.user_agents.is_empty() {
            return FALLBACK_USER_AGENT;
        }
        let i = self.rng.gen_range(0..self.user_agents.len());
        &self.user_agents[i]
    }

    fn politeness_delay(&mut self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        let ms = self
            .rng
            .gen_range(self.min_delay.as_millis() as u64..=self.max_delay.as_millis() as u64);
        Duration::from_millis(ms)
    }

    async fn fetch_page(&mut self, url: &str) -> Result<String> {
        if self.requests_sent > 0 {
            tokio::time::sleep(self.politeness_delay()).await;
        }
        self.requests_sent += 1;

        let user_agent = self.next_user_agent().to_string();
        let resp = self
            .client
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .with_context(|| format!("request failed: {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("odds page HTTP {} for {}", status, url);
        }

        resp.text().await.context("odds page body read failed")
    }

    async fn fetch_market(&mut self, date: NaiveDate, bet_type: BetType) -> Result<PageRows> {
        let url = Self::build_url(&self.base_url, bet_type, date);
        tracing::info!(%date, market = bet_type.label(), "fetching odds page");
        let html = self.fetch_page(&url).await?;
        let payload = extract_next_data(&html)
            .with_context(|| format!("{} page for {}", bet_type.label(), date))?;
        Ok(extract_page(&payload, &self.bookmaker, bet_type))
    }

    /// Optional markets: a failure is logged and leaves the market empty.
    async fn fetch_optional_market(&mut self, date: NaiveDate, bet_type: BetType) -> Option<PageRows> {
        match self.fetch_market(date, bet_type).await {
            Ok(rows) => Some(rows),
            Err(e) => {
                let msg = format!("{:#}", e);
                tracing::warn!(%date, market = bet_type.label(), error = %msg, "market page unavailable");
                None
            }
        }
    }
}

/// Find the row for `info` on another market's page: by game id when both
/// sides have one, otherwise by position.
fn lookup_lines(rows: &PageRows, info: &GameInfo, index: usize) -> MarketLines {
    if let Some(id) = info.game_id.as_deref() {
        if let Some((_, lines)) = rows.iter().find(|(other, _)| other.game_id.as_deref() == Some(id)) {
            return *lines;
        }
        if rows.iter().any(|(other, _)| other.game_id.is_some()) {
            return MarketLines::default();
        }
    }
    rows.get(index).map(|(_, lines)| *lines).unwrap_or_default()
}

/// Join the three market pages into one row per game.
pub fn merge_pages(
    date: NaiveDate,
    moneyline: PageRows,
    run_line: Option<&PageRows>,
    totals: Option<&PageRows>,
) -> Vec<GameOdds> {
    moneyline
        .into_iter()
        .enumerate()
        .filter_map(|(i, (info, ml))| {
            if info.away_team.is_empty() || info.home_team.is_empty() {
                tracing::debug!(index = i, "skipping game row without team names");
                return None;
            }
            let odds = BookOdds {
                moneyline: ml,
                run_line: run_line.map(|rows| lookup_lines(rows, &info, i)).unwrap_or_default(),
                total: totals.map(|rows| lookup_lines(rows, &info, i)).unwrap_or_default(),
            };
            Some(GameOdds { date, info, odds })
        })
        .collect()
}

#[async_trait]
impl OddsFeed for SbrFeed {
    async fn fetch_games(&mut self, date: NaiveDate) -> Result<Vec<GameOdds>> {
        let moneyline = self.fetch_market(date, BetType::Moneyline).await?;
        if moneyline.is_empty() {
            tracing::info!(%date, "no games listed");
            return Ok(Vec::new());
        }
        if moneyline.iter().all(|(_, lines)| lines.is_empty()) {
            tracing::warn!(%date, bookmaker = %self.bookmaker, "bookmaker has no moneyline on any game");
        }

        let run_line = self.fetch_optional_market(date, BetType::RunLine).await;
        let totals = self.fetch_optional_market(date, BetType::Total).await;

        let games = merge_pages(date, moneyline, run_line.as_ref(), totals.as_ref());
        tracing::info!(%date, games = games.len(), "slate scraped");
        Ok(games)
    }

    fn source_name(&self) -> &str {
        "sportsbookreview"
    }
}
