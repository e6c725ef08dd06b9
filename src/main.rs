use anyhow::{Context, Result};
use mlb_odds_board::board::{BoardSource, OddsBoard};
use mlb_odds_board::config::Config;
use mlb_odds_board::export;
use mlb_odds_board::feed::demo::DemoFeed;
use mlb_odds_board::feed::sbr::SbrFeed;
use mlb_odds_board::feed::types::{BetType, GameOdds};
use mlb_odds_board::feed::OddsFeed;
use mlb_odds_board::format::{format_start_time, market_lines};
use mlb_odds_board::pipeline::{self, RefreshLoop, DEFAULT_CSV_PATH};
use mlb_odds_board::tui::{self, state::AppState};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const LOG_FILE: &str = "mlb-odds-board.log";

struct CliArgs {
    once: bool,
    demo: bool,
    config_path: PathBuf,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut cli = CliArgs {
        once: false,
        demo: false,
        config_path: PathBuf::from("config.toml"),
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--once" => cli.once = true,
            "--demo" => cli.demo = true,
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                cli.config_path = PathBuf::from(path);
            }
            other => anyhow::bail!("unknown argument: {} (expected --once, --demo, --config <path>)", other),
        }
    }
    Ok(cli)
}

fn build_feed(config: &Config, demo: bool, today: chrono::NaiveDate) -> Result<Box<dyn OddsFeed>> {
    if demo {
        return Ok(Box::new(DemoFeed::new(today)));
    }
    Ok(Box::new(SbrFeed::new(&config.scraper)?))
}

fn print_game(game: &GameOdds, config: &Config) {
    let start = format_start_time(
        game.info.start_time.as_deref(),
        config.dashboard.display_offset(),
        &config.dashboard.tz_label,
    );
    match &game.info.venue {
        Some(venue) => println!("  {}  ({} \u{2022} {})", game.matchup(), venue, start),
        None => println!("  {}  ({})", game.matchup(), start),
    }
    for bet_type in BetType::ALL {
        let market = game.odds.market(bet_type);
        let [open_away, open_home] = market_lines(&game.info, &market.opening, bet_type);
        let [cur_away, cur_home] = market_lines(&game.info, &market.current, bet_type);
        println!(
            "    {:<10} open: {} / {}   current: {} / {}",
            bet_type.label(),
            open_away,
            open_home,
            cur_away,
            cur_home
        );
    }
}

/// One scrape, a printed summary, and a CSV file.
async fn run_once(config: &Config, feed: &mut dyn OddsFeed) -> Result<()> {
    let today = pipeline::local_today(config.dashboard.display_offset());
    let mut board = OddsBoard::new(Duration::from_secs(config.cache.ttl_s), config.dashboard.demo_fallback);
    let summary = board.refresh(feed, today).await;

    for (date, err) in &summary.failures {
        eprintln!("  warning: {}: {}", date, err);
    }
    if board.source == BoardSource::Demo {
        println!("  No live odds found, showing demo data.");
    }

    for (label, games) in [("Today", &board.today), ("Tomorrow", &board.tomorrow)] {
        let date = if label == "Today" { today } else { today + chrono::Days::new(1) };
        println!();
        println!("  {} - {} ({} games)", label, date.format("%b %-d, %Y"), games.len());
        for game in games.iter() {
            print_game(game, config);
        }
    }

    let path = config
        .export
        .csv_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH));
    let rows = export::write_csv(&path, board.games())?;
    println!();
    println!("  Wrote {} rows to {}", rows, path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create(LOG_FILE)
        .with_context(|| format!("failed to create {}", LOG_FILE))?;
    tracing_subscriber::fmt()
        .with_env_filter("mlb_odds_board=info")
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let cli = parse_args(std::env::args().skip(1))?;

    // Load saved settings from .env (real env vars take precedence)
    Config::load_env_file();
    let mut config = Config::load_or_default(&cli.config_path)?;
    config.apply_env_overrides();
    tracing::info!(
        bookmaker = %config.scraper.bookmaker,
        demo = cli.demo,
        once = cli.once,
        "starting"
    );

    let offset = config.dashboard.display_offset();
    let today = pipeline::local_today(offset);
    let mut feed = build_feed(&config, cli.demo, today)?;

    if cli.once {
        return run_once(&config, feed.as_mut()).await;
    }

    let (state_tx, _state_rx) = watch::channel(AppState::new(
        &config.scraper.bookmaker,
        today,
        offset,
        &config.dashboard.tz_label,
    ));
    let (cmd_tx, cmd_rx) = mpsc::channel::<tui::TuiCommand>(16);

    let board = OddsBoard::new(Duration::from_secs(config.cache.ttl_s), config.dashboard.demo_fallback);
    let refresh = RefreshLoop::new(board, feed, config.export.csv_path.clone(), offset);
    let refresh_handle = tokio::spawn(refresh.run(state_tx.clone(), cmd_rx));

    // Blocks until quit
    tui::run_tui(state_tx, cmd_tx).await?;

    // A fetch in flight is not worth waiting for
    refresh_handle.abort();
    tracing::debug!("shutting down");
    Ok(())
}
