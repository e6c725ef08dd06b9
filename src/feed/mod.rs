pub mod demo;
pub mod extract;
pub mod next_data;
pub mod sbr;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use types::GameOdds;

/// A source of one sportsbook's MLB lines for a slate date.
#[async_trait]
pub trait OddsFeed: Send + Sync {
    async fn fetch_games(&mut self, date: NaiveDate) -> Result<Vec<GameOdds>>;
    fn source_name(&self) -> &str;
}
