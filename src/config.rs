use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sportsbook whose lines are shown. Matched case-insensitively as a
    /// substring of the site's name.
    #[serde(default = "default_bookmaker")]
    pub bookmaker: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_min_delay")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

fn default_base_url() -> String {
    "https://www.sportsbookreview.com/betting-odds/mlb-baseball".to_string()
}
fn default_bookmaker() -> String { "fanduel".to_string() }
fn default_timeout() -> u64 { 30_000 }
fn default_min_delay() -> u64 { 2_000 }
fn default_max_delay() -> u64 { 5_000 }

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
    ]
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bookmaker: default_bookmaker(),
            request_timeout_ms: default_timeout(),
            min_delay_ms: default_min_delay(),
            max_delay_ms: default_max_delay(),
            user_agents: default_user_agents(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long a scrape result is served before the board refetches.
    #[serde(default = "default_ttl")]
    pub ttl_s: u64,
}

fn default_ttl() -> u64 { 300 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_s: default_ttl() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExportConfig {
    /// CSV written after each refresh when set.
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Offset from UTC used to display start times (ET during the season).
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
    #[serde(default = "default_tz_label")]
    pub tz_label: String,
    /// Show the built-in demo games when a scrape comes back empty.
    #[serde(default = "default_true")]
    pub demo_fallback: bool,
}

fn default_utc_offset() -> i32 { -4 }
fn default_tz_label() -> String { "ET".to_string() }
fn default_true() -> bool { true }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset(),
            tz_label: default_tz_label(),
            demo_fallback: true,
        }
    }
}

impl DashboardConfig {
    pub fn display_offset(&self) -> chrono::FixedOffset {
        use chrono::Offset;
        chrono::FixedOffset::east_opt(self.utc_offset_hours.clamp(-23, 23) * 3600)
            .unwrap_or_else(|| chrono::Utc.fix())
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        if self.scraper.bookmaker.trim().is_empty() {
            anyhow::bail!("scraper.bookmaker cannot be empty");
        }
        if self.scraper.min_delay_ms > self.scraper.max_delay_ms {
            anyhow::bail!(
                "scraper.min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.scraper.min_delay_ms,
                self.scraper.max_delay_ms
            );
        }
        if self.cache.ttl_s == 0 {
            anyhow::bail!("cache.ttl_s must be at least 1 second");
        }
        Ok(())
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(ENV_FILE) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in parse_env_lines(&content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Apply `MLB_ODDS_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).map(|v| sanitize_value(&v)).filter(|v| !v.is_empty());
        if let Some(book) = lookup("MLB_ODDS_BOOKMAKER") {
            self.scraper.bookmaker = book;
        }
        if let Some(url) = lookup("MLB_ODDS_BASE_URL") {
            self.scraper.base_url = url;
        }
        if let Some(path) = lookup("MLB_ODDS_CSV") {
            self.export.csv_path = Some(PathBuf::from(path));
        }
    }
}

/// KEY=VALUE pairs from a .env file body; comments and blank lines skipped.
fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Strip carriage returns, BOM, and other invisible chars from a value.
fn sanitize_value(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}
