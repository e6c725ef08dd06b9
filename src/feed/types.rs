//! Normalized internal types shared by the feeds, the board and the dashboard.

use chrono::NaiveDate;

/// The three markets tracked per game. Each one is scraped from its own page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetType {
    Moneyline,
    RunLine,
    Total,
}

impl BetType {
    pub const ALL: [BetType; 3] = [BetType::Moneyline, BetType::RunLine, BetType::Total];

    /// Path segment appended to the odds site's MLB base URL.
    pub fn url_path(self) -> &'static str {
        match self {
            BetType::Moneyline => "",
            BetType::RunLine => "pointspread/full-game/",
            BetType::Total => "totals/full-game/",
        }
    }

    /// Sub-object key used by the keyed (`sportsbookData`) page layout.
    pub fn legacy_key(self) -> &'static str {
        match self {
            BetType::Moneyline => "ml",
            BetType::RunLine => "ps",
            BetType::Total => "total",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BetType::Moneyline => "Moneyline",
            BetType::RunLine => "Run Line",
            BetType::Total => "Total",
        }
    }
}

/// One side of the opening/current comparison. American odds and line values;
/// fields that do not apply to a market stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineSnapshot {
    pub away_odds: Option<f64>,
    pub home_odds: Option<f64>,
    pub away_spread: Option<f64>,
    pub home_spread: Option<f64>,
    pub total: Option<f64>,
    pub over_odds: Option<f64>,
    pub under_odds: Option<f64>,
}

impl LineSnapshot {
    pub fn is_empty(&self) -> bool {
        *self == LineSnapshot::default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketLines {
    pub opening: LineSnapshot,
    pub current: LineSnapshot,
}

impl MarketLines {
    pub fn is_empty(&self) -> bool {
        self.opening.is_empty() && self.current.is_empty()
    }
}

/// Opening and current lines for all three markets, for a single sportsbook.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookOdds {
    pub moneyline: MarketLines,
    pub run_line: MarketLines,
    pub total: MarketLines,
}

impl BookOdds {
    pub fn market(&self, bet_type: BetType) -> &MarketLines {
        match bet_type {
            BetType::Moneyline => &self.moneyline,
            BetType::RunLine => &self.run_line,
            BetType::Total => &self.total,
        }
    }

    pub fn market_mut(&mut self, bet_type: BetType) -> &mut MarketLines {
        match bet_type {
            BetType::Moneyline => &mut self.moneyline,
            BetType::RunLine => &mut self.run_line,
            BetType::Total => &mut self.total,
        }
    }
}

/// Teams, venue and start time of a game as listed on the odds page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameInfo {
    pub game_id: Option<String>,
    /// RFC 3339 timestamp as published by the site.
    pub start_time: Option<String>,
    pub away_team: String,
    pub home_team: String,
    pub away_abbr: Option<String>,
    pub home_abbr: Option<String>,
    pub venue: Option<String>,
}

/// One row of the board: a game on a given slate date with one book's odds.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOdds {
    pub date: NaiveDate,
    pub info: GameInfo,
    pub odds: BookOdds,
}

impl GameOdds {
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.info.away_team, self.info.home_team)
    }
}
