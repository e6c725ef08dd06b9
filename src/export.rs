//! CSV export: one row per game, named odds columns, empty cells for nulls.

use crate::feed::types::GameOdds;
use crate::format::format_decimal;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "date,game_time,away_team,home_team,away_abbr,home_abbr,venue,\
ml_opening_away,ml_opening_home,ml_current_away,ml_current_home,\
rl_opening_away_spread,rl_opening_away,rl_opening_home_spread,rl_opening_home,\
rl_current_away_spread,rl_current_away,rl_current_home_spread,rl_current_home,\
total_opening,total_opening_over,total_opening_under,\
total_current,total_current_over,total_current_under";

/// Quote a text cell when it would otherwise break the row.
fn text_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_text(value: Option<&str>) -> String {
    value.map(text_cell).unwrap_or_default()
}

fn num_cell(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Spreads and totals, written the way the dashboard shows them ("8.0").
fn line_cell(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(format_decimal)
        .unwrap_or_default()
}

/// One CSV line for a game, without the trailing newline.
pub fn csv_row(game: &GameOdds) -> String {
    let info = &game.info;
    let ml = &game.odds.moneyline;
    let rl = &game.odds.run_line;
    let tot = &game.odds.total;

    let mut cells = vec![
        game.date.format("%Y-%m-%d").to_string(),
        opt_text(info.start_time.as_deref()),
        text_cell(&info.away_team),
        text_cell(&info.home_team),
        opt_text(info.away_abbr.as_deref()),
        opt_text(info.home_abbr.as_deref()),
        opt_text(info.venue.as_deref()),
    ];
    cells.extend([
        num_cell(ml.opening.away_odds),
        num_cell(ml.opening.home_odds),
        num_cell(ml.current.away_odds),
        num_cell(ml.current.home_odds),
        line_cell(rl.opening.away_spread),
        num_cell(rl.opening.away_odds),
        line_cell(rl.opening.home_spread),
        num_cell(rl.opening.home_odds),
        line_cell(rl.current.away_spread),
        num_cell(rl.current.away_odds),
        line_cell(rl.current.home_spread),
        num_cell(rl.current.home_odds),
        line_cell(tot.opening.total),
        num_cell(tot.opening.over_odds),
        num_cell(tot.opening.under_odds),
        line_cell(tot.current.total),
        num_cell(tot.current.over_odds),
        num_cell(tot.current.under_odds),
    ]);
    cells.join(",")
}

/// Write the header plus one row per game, replacing any existing file.
pub fn write_csv<'a>(path: &Path, games: impl IntoIterator<Item = &'a GameOdds>) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", CSV_HEADER)?;
    let mut count = 0;
    for game in games {
        writeln!(writer, "{}", csv_row(game))?;
        count += 1;
    }
    writer.flush().with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = count, "CSV exported");
    Ok(count)
}
