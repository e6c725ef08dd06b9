//! End-to-end scrape against a local HTTP server serving canned odds pages.

use chrono::NaiveDate;
use mlb_odds_board::config::ScraperConfig;
use mlb_odds_board::export;
use mlb_odds_board::feed::extract::extract_page;
use mlb_odds_board::feed::next_data::extract_next_data;
use mlb_odds_board::feed::sbr::SbrFeed;
use mlb_odds_board::feed::types::BetType;
use mlb_odds_board::feed::OddsFeed;
use mlb_odds_board::format::{format_odds, format_spread, format_total, market_lines, PLACEHOLDER};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const MONEYLINE: &str = r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{"gameRows":[
    {
        "gameView": {
            "gameId": 1001,
            "startDate": "2025-07-25T23:10:00+00:00",
            "awayTeam": {"fullName": "Miami", "shortName": "MIA"},
            "homeTeam": {"fullName": "Milwaukee", "shortName": "MIL"},
            "venueName": "American Family Field"
        },
        "oddsViews": [
            {"sportsbook": "draftkings", "openingLine": {"awayOdds": 160, "homeOdds": -190}, "currentLine": {"awayOdds": 180, "homeOdds": -220}},
            {"sportsbook": "fanduel", "openingLine": {"awayOdds": 168, "homeOdds": -200}, "currentLine": {"awayOdds": 190, "homeOdds": -230}}
        ]
    },
    {
        "gameView": {
            "gameId": 1002,
            "startDate": "2025-07-25T22:35:00+00:00",
            "awayTeam": {"fullName": "Arizona", "shortName": "ARI"},
            "homeTeam": {"fullName": "Pittsburgh", "shortName": "PIT"},
            "venueName": "PNC Park"
        },
        "oddsViews": [
            {"sportsbook": "draftkings", "openingLine": {"awayOdds": -130, "homeOdds": 110}, "currentLine": {"awayOdds": -120, "homeOdds": 100}}
        ]
    }
]}}]}}}"#;

// Listed in the opposite order to the moneyline page
const RUN_LINE: &str = r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{"gameRows":[
    {
        "gameView": {"gameId": 1002, "awayTeam": {"fullName": "Arizona"}, "homeTeam": {"fullName": "Pittsburgh"}},
        "oddsViews": []
    },
    {
        "gameView": {"gameId": 1001, "awayTeam": {"fullName": "Miami"}, "homeTeam": {"fullName": "Milwaukee"}},
        "oddsViews": [
            {"sportsbook": "FanDuel", "openingLine": {"awayOdds": -125, "homeOdds": 104, "awaySpread": 1.5, "homeSpread": -1.5}, "currentLine": {"awayOdds": -110, "homeOdds": -110, "awaySpread": 1.5}}
        ]
    }
]}}]}}}"#;

const TOTALS: &str = r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{"gameRows":[
    {
        "gameView": {"gameId": 1001, "awayTeam": {"fullName": "Miami"}, "homeTeam": {"fullName": "Milwaukee"}},
        "oddsViews": [
            {"sportsbook": "fanduel", "openingLine": {"total": 8, "overOdds": -115, "underOdds": -105}, "currentLine": {"total": 8.5, "overOdds": "-102", "underOdds": "-120"}}
        ]
    }
]}}]}}}"#;

fn html(payload: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><title>MLB Odds</title></head><body>
        <div id="__next"><table><tr><td>rendered table</td></tr></table></div>
        <script id="__NEXT_DATA__" type="application/json">{}</script>
        </body></html>"#,
        payload
    )
}

/// Serve the three market pages. `totals_status` lets a test break the totals page.
async fn serve(totals_status: u16) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                while read < buf.len() {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let request = String::from_utf8_lossy(&buf[..read]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = if path.contains("/pointspread/full-game/") {
                    (200, html(RUN_LINE))
                } else if path.contains("/totals/full-game/") {
                    (totals_status, html(TOTALS))
                } else if path.contains("date=2025-07-26") {
                    (200, html(r#"{"props":{"pageProps":{"oddsTables":[]}}}"#))
                } else {
                    (200, html(MONEYLINE))
                };
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

fn scraper_config(addr: SocketAddr) -> ScraperConfig {
    ScraperConfig {
        base_url: format!("http://{}/betting-odds/mlb-baseball/", addr),
        request_timeout_ms: 5_000,
        min_delay_ms: 0,
        max_delay_ms: 0,
        ..ScraperConfig::default()
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 25).unwrap()
}

#[tokio::test]
async fn test_full_slate_scrape() {
    let addr = serve(200).await;
    let mut feed = SbrFeed::new(&scraper_config(addr)).unwrap();
    let games = feed.fetch_games(date()).await.unwrap();
    assert_eq!(games.len(), 2);

    let mia = &games[0];
    assert_eq!(mia.matchup(), "Miami @ Milwaukee");
    assert_eq!(mia.info.game_id.as_deref(), Some("1001"));
    assert_eq!(mia.info.venue.as_deref(), Some("American Family Field"));
    assert_eq!(mia.odds.moneyline.opening.away_odds, Some(168.0));
    assert_eq!(mia.odds.moneyline.current.home_odds, Some(-230.0));
    assert_eq!(mia.odds.run_line.opening.home_spread, Some(-1.5));
    // One-sided spread filled from the other side
    assert_eq!(mia.odds.run_line.current.home_spread, Some(-1.5));
    assert_eq!(mia.odds.total.opening.total, Some(8.0));
    assert_eq!(mia.odds.total.current.over_odds, Some(-102.0));

    // FanDuel never priced this game
    let ari = &games[1];
    assert_eq!(ari.matchup(), "Arizona @ Pittsburgh");
    assert!(ari.odds.moneyline.is_empty());
    assert!(ari.odds.run_line.is_empty());
    assert!(ari.odds.total.is_empty());
}

#[tokio::test]
async fn test_failed_totals_page_leaves_totals_empty() {
    let addr = serve(503).await;
    let mut feed = SbrFeed::new(&scraper_config(addr)).unwrap();
    let games = feed.fetch_games(date()).await.unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].odds.moneyline.opening.away_odds, Some(168.0));
    assert_eq!(games[0].odds.run_line.opening.away_odds, Some(-125.0));
    assert!(games[0].odds.total.is_empty());
}

#[tokio::test]
async fn test_empty_slate() {
    let addr = serve(200).await;
    let mut feed = SbrFeed::new(&scraper_config(addr)).unwrap();
    let games = feed
        .fetch_games(NaiveDate::from_ymd_opt(2025, 7, 26).unwrap())
        .await
        .unwrap();
    assert!(games.is_empty());
}

#[tokio::test]
async fn test_unreachable_site_is_an_error() {
    // Bind then drop so the port is closed
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let mut feed = SbrFeed::new(&scraper_config(addr)).unwrap();
    assert!(feed.fetch_games(date()).await.is_err());
}

#[test]
fn test_extraction_from_html_is_idempotent() {
    let page = html(MONEYLINE);
    let first = extract_page(&extract_next_data(&page).unwrap(), "fanduel", BetType::Moneyline);
    let second = extract_page(&extract_next_data(&page).unwrap(), "fanduel", BetType::Moneyline);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_missing_bookmaker_yields_all_null() {
    let payload = extract_next_data(&html(MONEYLINE)).unwrap();
    let rows = extract_page(&payload, "caesars", BetType::Moneyline);
    assert_eq!(rows.len(), 2);
    for (info, lines) in &rows {
        assert!(!info.away_team.is_empty());
        assert!(lines.is_empty());
        let [away, home] = market_lines(info, &lines.current, BetType::Moneyline);
        assert!(away.ends_with(PLACEHOLDER));
        assert!(home.ends_with(PLACEHOLDER));
    }
}

#[tokio::test]
async fn test_scraped_values_format_and_export() {
    let addr = serve(200).await;
    let mut feed = SbrFeed::new(&scraper_config(addr)).unwrap();
    let games = feed.fetch_games(date()).await.unwrap();
    let mia = &games[0];

    assert_eq!(format_odds(mia.odds.moneyline.opening.away_odds), "+168");
    assert_eq!(format_spread(mia.odds.run_line.opening.away_spread), "+1.5");
    assert_eq!(format_total(mia.odds.total.current.total), "8.5");
    assert_eq!(
        market_lines(&mia.info, &mia.odds.run_line.opening, BetType::RunLine),
        ["Miami +1.5: -125".to_string(), "Milwaukee -1.5: +104".to_string()]
    );

    let dir = std::env::temp_dir().join(format!("mlb-odds-scrape-flow-{}", std::process::id()));
    let path = dir.join("odds.csv");
    assert_eq!(export::write_csv(&path, &games).unwrap(), 2);
    let body = std::fs::read_to_string(&path).unwrap();
    assert!(body.lines().nth(1).unwrap().starts_with("2025-07-25,2025-07-25T23:10:00+00:00,Miami,Milwaukee,MIA,MIL"));
    let _ = std::fs::remove_dir_all(&dir);
}
