//! Display formatting for odds, spreads, totals and start times.

use crate::feed::types::{BetType, GameInfo, LineSnapshot};
use chrono::FixedOffset;

/// Shown wherever a value is missing or unusable.
pub const PLACEHOLDER: &str = "Unavailable";

/// American odds: "+150" for positive, "-180" for negative, placeholder for none.
/// Fractional values are truncated toward zero.
pub fn format_odds(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => {
            let odds = v.trunc() as i64;
            if odds > 0 {
                format!("+{}", odds)
            } else {
                odds.to_string()
            }
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// Whole numbers keep one decimal place ("8.0"), others print as-is ("8.5").
pub fn format_decimal(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Run-line spread: same sign rule as odds, decimal precision kept ("+1.5").
pub fn format_spread(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) if v > 0.0 => format!("+{}", format_decimal(v)),
        Some(v) => format_decimal(v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Total (over/under) line, never signed.
pub fn format_total(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format_decimal(v),
        None => PLACEHOLDER.to_string(),
    }
}

/// "8:10 PM ET" in the given display offset; "TBD" when missing or unparseable.
pub fn format_start_time(start: Option<&str>, offset: FixedOffset, tz_label: &str) -> String {
    start
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| format!("{} {}", dt.with_timezone(&offset).format("%-I:%M %p"), tz_label))
        .unwrap_or_else(|| "TBD".to_string())
}

/// The two text lines a card shows for one market at one point in time.
///
/// Moneyline: `Away: +168` / `Home: -200`
/// Run line:  `Away +1.5: -125` / `Home -1.5: +104`
/// Total:     `O 8.0: -115` / `U 8.0: -105`
pub fn market_lines(info: &GameInfo, snap: &LineSnapshot, bet_type: BetType) -> [String; 2] {
    match bet_type {
        BetType::Moneyline => [
            format!("{}: {}", info.away_team, format_odds(snap.away_odds)),
            format!("{}: {}", info.home_team, format_odds(snap.home_odds)),
        ],
        BetType::RunLine => [
            format!(
                "{} {}: {}",
                info.away_team,
                format_spread(snap.away_spread),
                format_odds(snap.away_odds)
            ),
            format!(
                "{} {}: {}",
                info.home_team,
                format_spread(snap.home_spread),
                format_odds(snap.home_odds)
            ),
        ],
        BetType::Total => {
            let line = format_total(snap.total);
            [
                format!("O {}: {}", line, format_odds(snap.over_odds)),
                format!("U {}: {}", line, format_odds(snap.under_odds)),
            ]
        }
    }
}
