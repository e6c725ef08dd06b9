//! Background refresh loop: owns the board and the feed, keeps the dashboard
//! state current, and services refresh/export requests.

use crate::board::{OddsBoard, RefreshSummary};
use crate::export;
use crate::feed::OddsFeed;
use crate::tui::state::AppState;
use crate::tui::TuiCommand;
use chrono::{FixedOffset, NaiveDate, Utc};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Written by the `e` key when no export path is configured.
pub const DEFAULT_CSV_PATH: &str = "mlb_odds.csv";

/// How often the loop checks whether the board has gone stale.
const TICK: Duration = Duration::from_secs(1);

pub struct RefreshLoop {
    board: OddsBoard,
    feed: Box<dyn OddsFeed>,
    /// Auto-export target after every refresh. `None` disables auto-export.
    csv_path: Option<PathBuf>,
    display_offset: FixedOffset,
}

/// Calendar day in the display offset, so "today" matches the slate users see.
pub fn local_today(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

impl RefreshLoop {
    pub fn new(
        board: OddsBoard,
        feed: Box<dyn OddsFeed>,
        csv_path: Option<PathBuf>,
        display_offset: FixedOffset,
    ) -> Self {
        Self { board, feed, csv_path, display_offset }
    }

    pub fn board(&self) -> &OddsBoard {
        &self.board
    }

    /// Run until `Quit` arrives or the command channel closes.
    pub async fn run(mut self, state_tx: watch::Sender<AppState>, mut cmd_rx: mpsc::Receiver<TuiCommand>) {
        let mut interval = tokio::time::interval(TICK);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.cycle(&state_tx, false).await;
                }
                cmd = cmd_rx.recv() => match cmd {
                    Some(TuiCommand::Refresh) => {
                        state_tx.send_modify(|s| s.push_log("INFO", "manual refresh".to_string()));
                        self.cycle(&state_tx, true).await;
                    }
                    Some(TuiCommand::Export) => {
                        let path = self
                            .csv_path
                            .clone()
                            .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
                        self.export_to(&state_tx, path);
                    }
                    Some(TuiCommand::Quit) | None => {
                        tracing::debug!("refresh loop stopping");
                        return;
                    }
                },
            }
        }
    }

    /// Refresh when stale (or when forced) and publish the result.
    /// Returns the summary when a fetch actually happened.
    pub async fn cycle(&mut self, state_tx: &watch::Sender<AppState>, force: bool) -> Option<RefreshSummary> {
        let today = local_today(self.display_offset);
        if !force && !self.board.is_stale(std::time::Instant::now(), today) {
            return None;
        }

        state_tx.send_modify(|s| s.is_refreshing = true);
        let summary = self.board.refresh(self.feed.as_mut(), today).await;
        tracing::info!(
            today = summary.today,
            tomorrow = summary.tomorrow,
            failures = summary.failures.len(),
            demo = summary.used_demo,
            "board refreshed"
        );

        let board = &self.board;
        state_tx.send_modify(|s| {
            s.is_refreshing = false;
            s.apply_board(board);
            for (date, err) in &summary.failures {
                s.push_log("WARN", format!("{}: {}", date, err));
            }
            if summary.used_demo {
                s.push_log("WARN", "no live odds, showing demo slate".to_string());
            }
            s.push_log(
                "INFO",
                format!("{} games today, {} tomorrow", summary.today, summary.tomorrow),
            );
        });

        if let Some(path) = self.csv_path.clone() {
            self.export_to(state_tx, path);
        }
        Some(summary)
    }

    fn export_to(&self, state_tx: &watch::Sender<AppState>, path: PathBuf) {
        match export::write_csv(&path, self.board.games()) {
            Ok(rows) => state_tx.send_modify(|s| {
                s.push_log("EXPORT", format!("{} rows -> {}", rows, path.display()));
            }),
            Err(e) => {
                let msg = format!("{:#}", e);
                tracing::warn!(path = %path.display(), error = %msg, "CSV export failed");
                state_tx.send_modify(|s| s.push_log("ERROR", format!("export failed: {}", msg)));
            }
        }
    }
}
