use crate::board::{BoardSource, OddsBoard};
use crate::feed::types::GameOdds;
use chrono::{Days, FixedOffset, NaiveDate};
use std::collections::VecDeque;
use std::time::Instant;

pub const TAB_TODAY: usize = 0;
pub const TAB_TOMORROW: usize = 1;

#[derive(Debug, Clone)]
pub struct AppState {
    pub bookmaker: String,
    pub source: BoardSource,
    pub start_time: Instant,
    pub is_refreshing: bool,
    pub last_refresh: Option<Instant>,
    pub today_date: NaiveDate,
    pub today: Vec<GameOdds>,
    pub tomorrow: Vec<GameOdds>,
    pub active_tab: usize,
    pub scroll_offset: usize,
    pub logs: VecDeque<LogEntry>,
    pub log_focus: bool,
    pub log_scroll_offset: usize,
    pub display_offset: FixedOffset,
    pub tz_label: String,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn new(bookmaker: &str, today_date: NaiveDate, display_offset: FixedOffset, tz_label: &str) -> Self {
        Self {
            bookmaker: bookmaker.to_string(),
            source: BoardSource::Empty,
            start_time: Instant::now(),
            is_refreshing: false,
            last_refresh: None,
            today_date,
            today: Vec::new(),
            tomorrow: Vec::new(),
            active_tab: TAB_TODAY,
            scroll_offset: 0,
            logs: VecDeque::with_capacity(200),
            log_focus: false,
            log_scroll_offset: 0,
            display_offset,
            tz_label: tz_label.to_string(),
        }
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= 200 {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    /// Copy the board's current contents into the view.
    pub fn apply_board(&mut self, board: &OddsBoard) {
        self.today = board.today.clone();
        self.tomorrow = board.tomorrow.clone();
        self.source = board.source.clone();
        self.last_refresh = board.fetched_at();
        if let Some(day) = board.today_date() {
            self.today_date = day;
        }
        self.scroll_offset = self.scroll_offset.min(self.active_games().len().saturating_sub(1));
    }

    pub fn tomorrow_date(&self) -> NaiveDate {
        self.today_date + Days::new(1)
    }

    pub fn active_games(&self) -> &[GameOdds] {
        if self.active_tab == TAB_TOMORROW {
            &self.tomorrow
        } else {
            &self.today
        }
    }

    /// "Today - Jul 25, 2025", "Tomorrow - Jul 26, 2025"
    pub fn tab_titles(&self) -> [String; 2] {
        [
            format!("Today - {}", self.today_date.format("%b %-d, %Y")),
            format!("Tomorrow - {}", self.tomorrow_date().format("%b %-d, %Y")),
        ]
    }

    pub fn switch_tab(&mut self) {
        self.active_tab = if self.active_tab == TAB_TODAY { TAB_TOMORROW } else { TAB_TODAY };
        self.scroll_offset = 0;
    }

    pub fn select_tab(&mut self, tab: usize) {
        if tab != self.active_tab && tab <= TAB_TOMORROW {
            self.active_tab = tab;
            self.scroll_offset = 0;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.log_focus {
            self.log_scroll_offset = (self.log_scroll_offset + 1).min(self.logs.len().saturating_sub(1));
        } else {
            self.scroll_offset = (self.scroll_offset + 1).min(self.active_games().len().saturating_sub(1));
        }
    }

    pub fn scroll_up(&mut self) {
        if self.log_focus {
            self.log_scroll_offset = self.log_scroll_offset.saturating_sub(1);
        } else {
            self.scroll_offset = self.scroll_offset.saturating_sub(1);
        }
    }

    pub fn toggle_logs(&mut self) {
        self.log_focus = !self.log_focus;
        self.log_scroll_offset = 0;
    }

    pub fn source_label(&self) -> String {
        match &self.source {
            BoardSource::Empty => "no data".to_string(),
            BoardSource::Live(name) => name.clone(),
            BoardSource::Demo => "demo data".to_string(),
        }
    }

    /// "2m 05s ago", or "never".
    pub fn refresh_age(&self) -> String {
        match self.last_refresh {
            Some(at) => {
                let secs = at.elapsed().as_secs();
                if secs >= 60 {
                    format!("{}m {:02}s ago", secs / 60, secs % 60)
                } else {
                    format!("{}s ago", secs)
                }
            }
            None => "never".to_string(),
        }
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }
}
