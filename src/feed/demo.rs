//! Static demo slate, shown when the live site yields nothing.
//!
//! Two games: the first is dated on the anchor day ("today"), the second on
//! the day after.

use super::types::{BookOdds, GameInfo, GameOdds, LineSnapshot, MarketLines};
use super::OddsFeed;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};

pub struct DemoFeed {
    anchor: NaiveDate,
}

fn moneyline(opening: (f64, f64), current: (f64, f64)) -> MarketLines {
    let snap = |(away, home): (f64, f64)| LineSnapshot {
        away_odds: Some(away),
        home_odds: Some(home),
        ..LineSnapshot::default()
    };
    MarketLines { opening: snap(opening), current: snap(current) }
}

/// `(away_spread, away_odds, home_odds)` per side of the comparison.
fn run_line(opening: (f64, f64, f64), current: (f64, f64, f64)) -> MarketLines {
    let snap = |(spread, away, home): (f64, f64, f64)| LineSnapshot {
        away_odds: Some(away),
        home_odds: Some(home),
        away_spread: Some(spread),
        home_spread: Some(-spread),
        ..LineSnapshot::default()
    };
    MarketLines { opening: snap(opening), current: snap(current) }
}

/// `(line, over_odds, under_odds)` per side of the comparison.
fn total(opening: (f64, f64, f64), current: (f64, f64, f64)) -> MarketLines {
    let snap = |(line, over, under): (f64, f64, f64)| LineSnapshot {
        total: Some(line),
        over_odds: Some(over),
        under_odds: Some(under),
        ..LineSnapshot::default()
    };
    MarketLines { opening: snap(opening), current: snap(current) }
}

impl DemoFeed {
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    /// The full demo slate, both days.
    pub fn games(&self) -> Vec<GameOdds> {
        let tomorrow = self.anchor + Days::new(1);
        vec![
            GameOdds {
                date: self.anchor,
                info: GameInfo {
                    game_id: Some("demo-1".to_string()),
                    start_time: Some(format!("{}T20:10:00+00:00", self.anchor)),
                    away_team: "Miami".to_string(),
                    home_team: "Milwaukee".to_string(),
                    away_abbr: Some("MIA".to_string()),
                    home_abbr: Some("MIL".to_string()),
                    venue: Some("American Family Field".to_string()),
                },
                odds: BookOdds {
                    moneyline: moneyline((168.0, -200.0), (190.0, -230.0)),
                    run_line: run_line((1.5, -125.0, 104.0), (1.5, -110.0, -110.0)),
                    total: total((8.0, -115.0, -105.0), (8.0, -102.0, -120.0)),
                },
            },
            GameOdds {
                date: tomorrow,
                info: GameInfo {
                    game_id: Some("demo-2".to_string()),
                    start_time: Some(format!("{}T19:00:00+00:00", tomorrow)),
                    away_team: "Arizona".to_string(),
                    home_team: "Pittsburgh".to_string(),
                    away_abbr: Some("ARI".to_string()),
                    home_abbr: Some("PIT".to_string()),
                    venue: Some("PNC Park".to_string()),
                },
                odds: BookOdds {
                    moneyline: moneyline((-136.0, 116.0), (-118.0, -108.0)),
                    run_line: run_line((-1.5, 122.0, -146.0), (-1.5, 142.0, -192.0)),
                    total: total((9.0, -110.0, -110.0), (8.5, -132.0, 100.0)),
                },
            },
        ]
    }
}

#[async_trait]
impl OddsFeed for DemoFeed {
    async fn fetch_games(&mut self, date: NaiveDate) -> Result<Vec<GameOdds>> {
        Ok(self.games().into_iter().filter(|g| g.date == date).collect())
    }

    fn source_name(&self) -> &str {
        "demo"
    }
}
