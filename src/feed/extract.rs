//! Opening/current odds extraction from an odds-table payload.
//!
//! Everything here is a pure function of the JSON it is given. The site's
//! payload shape drifts between deployments, so nothing in this module fails:
//! a missing key, a `null` where an object was expected, or a string where a
//! number was expected all read as "no data" for that field.
//!
//! Two row layouts are understood:
//! - `oddsViews`: a per-row list of `{sportsbook, openingLine, currentLine}`
//!   entries (entries may be `null`).
//! - keyed: a table-level `sportsbooks` list of `{id, name}` plus a per-row
//!   `sportsbookData` map keyed by sportsbook id, with `ml` / `ps` / `total`
//!   objects each holding `opening` / `current`.

use super::next_data::{game_rows, table_sportsbooks};
use super::types::{BetType, BookOdds, GameInfo, LineSnapshot, MarketLines};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Parse an American odds string: "+150", "-180", "EVEN" (= +100).
pub fn parse_american_odds(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("EVEN") {
        return Some(100.0);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a JSON value to a number. Numeric strings are accepted.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_american_odds(s),
        _ => None,
    }
}

fn number_field(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(as_number)
}

fn text_field(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Case-insensitive containment: "fanduel" matches "FanDuel Sportsbook".
fn names_match(candidate: &str, wanted: &str) -> bool {
    let wanted = wanted.trim().to_lowercase();
    !wanted.is_empty() && candidate.to_lowercase().contains(&wanted)
}

/// Which sportsbook to read, resolved once per page.
#[derive(Debug, Clone)]
pub struct BookSelector<'a> {
    name: &'a str,
    keyed_id: Option<String>,
}

impl<'a> BookSelector<'a> {
    /// Selector for the `oddsViews` layout only.
    pub fn new(name: &'a str) -> Self {
        Self { name, keyed_id: None }
    }

    /// Selector that can also read the keyed layout, resolving the book id
    /// from the page's `sportsbooks` list (first name containing `name`).
    pub fn for_page(name: &'a str, payload: &Value) -> Self {
        let keyed_id = table_sportsbooks(payload)
            .iter()
            .find(|book| {
                book.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| names_match(n, name))
            })
            .and_then(|book| text_field(book, "id"));
        Self { name, keyed_id }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn keyed_id(&self) -> Option<&str> {
        self.keyed_id.as_deref()
    }
}

/// Read the fields relevant to `bet_type` out of one line object.
fn snapshot(line: &Value, bet_type: BetType) -> LineSnapshot {
    match bet_type {
        BetType::Moneyline => LineSnapshot {
            away_odds: number_field(line, "awayOdds"),
            home_odds: number_field(line, "homeOdds"),
            ..LineSnapshot::default()
        },
        BetType::RunLine => {
            let away_spread = number_field(line, "awaySpread");
            let home_spread = number_field(line, "homeSpread");
            // Run lines are symmetric; the site sometimes publishes one side only.
            LineSnapshot {
                away_odds: number_field(line, "awayOdds"),
                home_odds: number_field(line, "homeOdds"),
                away_spread: away_spread.or(home_spread.map(|s| -s)),
                home_spread: home_spread.or(away_spread.map(|s| -s)),
                ..LineSnapshot::default()
            }
        }
        BetType::Total => LineSnapshot {
            total: number_field(line, "total"),
            over_odds: number_field(line, "overOdds"),
            under_odds: number_field(line, "underOdds"),
            ..LineSnapshot::default()
        },
    }
}

fn market_from(container: &Value, opening_key: &str, current_key: &str, bet_type: BetType) -> MarketLines {
    MarketLines {
        opening: container
            .get(opening_key)
            .map(|line| snapshot(line, bet_type))
            .unwrap_or_default(),
        current: container
            .get(current_key)
            .map(|line| snapshot(line, bet_type))
            .unwrap_or_default(),
    }
}

/// Find the first `oddsViews` entry for the selected book.
fn find_odds_view<'v>(views: &'v [Value], book: &str) -> Option<&'v Value> {
    views.iter().find(|view| {
        view.get("sportsbook")
            .and_then(Value::as_str)
            .is_some_and(|n| names_match(n, book))
    })
}

/// Opening and current lines of one market for one game row.
///
/// Returns all-`None` lines when the book is not listed for the row.
pub fn extract_market(row: &Value, book: &BookSelector<'_>, bet_type: BetType) -> MarketLines {
    if let Some(views) = row.get("oddsViews").and_then(Value::as_array) {
        return find_odds_view(views, book.name())
            .map(|view| market_from(view, "openingLine", "currentLine", bet_type))
            .unwrap_or_default();
    }

    let Some(id) = book.keyed_id() else {
        return MarketLines::default();
    };
    row.get("sportsbookData")
        .and_then(|data| data.get(id))
        .and_then(|entry| entry.get(bet_type.legacy_key()))
        .map(|market| market_from(market, "opening", "current", bet_type))
        .unwrap_or_default()
}

/// All three markets read from a single row. Used when one payload carries
/// every market; the live site splits them across pages (see `extract_page`).
pub fn extract_book_odds(row: &Value, book: &BookSelector<'_>) -> BookOdds {
    let mut odds = BookOdds::default();
    for bet_type in BetType::ALL {
        *odds.market_mut(bet_type) = extract_market(row, book, bet_type);
    }
    odds
}

fn team_name(team: &Value) -> Option<String> {
    ["fullName", "name", "displayName", "shortName"]
        .iter()
        .find_map(|key| text_field(team, key))
}

fn team_abbr(team: &Value) -> Option<String> {
    ["shortName", "abbreviation"]
        .iter()
        .find_map(|key| text_field(team, key))
}

/// Teams, venue and start time for a game row.
pub fn game_info(row: &Value) -> GameInfo {
    let view = row.get("gameView").filter(|v| v.is_object()).unwrap_or(row);
    let away = view.get("awayTeam").unwrap_or(&NULL);
    let home = view.get("homeTeam").unwrap_or(&NULL);

    GameInfo {
        game_id: text_field(view, "gameId"),
        start_time: text_field(view, "startDate").or_else(|| text_field(view, "startTime")),
        away_team: team_name(away).unwrap_or_default(),
        home_team: team_name(home).unwrap_or_default(),
        away_abbr: team_abbr(away),
        home_abbr: team_abbr(home),
        venue: text_field(view, "venueName").or_else(|| text_field(view, "venue")),
    }
}

/// Every game on a page paired with the selected book's lines for `bet_type`.
pub fn extract_page(payload: &Value, bookmaker: &str, bet_type: BetType) -> Vec<(GameInfo, MarketLines)> {
    let book = BookSelector::for_page(bookmaker, payload);
    game_rows(payload)
        .iter()
        .map(|row| (game_info(row), extract_market(row, &book, bet_type)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moneyline_payload() -> Value {
        serde_json::from_str(
            r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{"gameRows":[
                {
                    "gameView": {
                        "gameId": 291047,
                        "startDate": "2025-07-25T20:10:00+00:00",
                        "awayTeam": {"fullName": "Miami Marlins", "shortName": "MIA"},
                        "homeTeam": {"fullName": "Milwaukee Brewers", "shortName": "MIL"},
                        "venueName": "American Family Field"
                    },
                    "oddsViews": [
                        null,
                        {
                            "sportsbook": "betmgm",
                            "openingLine": {"awayOdds": 160, "homeOdds": -190},
                            "currentLine": {"awayOdds": 185, "homeOdds": -225}
                        },
                        {
                            "sportsbook": "fanduel",
                            "openingLine": {"awayOdds": 168, "homeOdds": -200},
                            "currentLine": {"awayOdds": 190, "homeOdds": -230}
                        },
                        {
                            "sportsbook": "FanDuel",
                            "openingLine": {"awayOdds": 1, "homeOdds": 1},
                            "currentLine": {"awayOdds": 1, "homeOdds": 1}
                        }
                    ]
                }
            ]}}]}}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_american_odds() {
        assert!((parse_american_odds("+130").unwrap() - 130.0).abs() < f64::EPSILON);
        assert!((parse_american_odds("-150").unwrap() - (-150.0)).abs() < f64::EPSILON);
        assert!((parse_american_odds("even").unwrap() - 100.0).abs() < f64::EPSILON);
        assert!(parse_american_odds("").is_none());
        assert!(parse_american_odds("abc").is_none());
        assert!(parse_american_odds("NaN").is_none());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&serde_json::json!(-110)), Some(-110.0));
        assert_eq!(as_number(&serde_json::json!(8.5)), Some(8.5));
        assert_eq!(as_number(&serde_json::json!("+105")), Some(105.0));
        assert_eq!(as_number(&serde_json::json!(null)), None);
        assert_eq!(as_number(&serde_json::json!({"odds": 100})), None);
        assert_eq!(as_number(&serde_json::json!(true)), None);
    }

    #[test]
    fn test_extract_market_first_case_insensitive_match() {
        let payload = moneyline_payload();
        let row = &game_rows(&payload)[0];
        let ml = extract_market(row, &BookSelector::new("FANDUEL"), BetType::Moneyline);
        assert_eq!(ml.opening.away_odds, Some(168.0));
        assert_eq!(ml.opening.home_odds, Some(-200.0));
        assert_eq!(ml.current.away_odds, Some(190.0));
        assert_eq!(ml.current.home_odds, Some(-230.0));
        assert_eq!(ml.current.total, None);
        assert_eq!(ml.current.away_spread, None);
    }

    #[test]
    fn test_extract_market_missing_book_is_all_none() {
        let payload = moneyline_payload();
        let row = &game_rows(&payload)[0];
        let ml = extract_market(row, &BookSelector::new("Caesars"), BetType::Moneyline);
        assert!(ml.is_empty());
        assert_eq!(ml, MarketLines::default());
    }

    #[test]
    fn test_extract_market_is_idempotent() {
        let payload = moneyline_payload();
        let first = extract_page(&payload, "fanduel", BetType::Moneyline);
        let second = extract_page(&payload, "fanduel", BetType::Moneyline);
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_market_wrong_types_read_as_none() {
        let row: Value = serde_json::from_str(
            r#"{"oddsViews":[{
                "sportsbook":"fanduel",
                "openingLine":"closed",
                "currentLine":{"awayOdds":{"v":1},"homeOdds":"-118","awaySpread":[1.5]}
            }]}"#,
        )
        .unwrap();
        let rl = extract_market(&row, &BookSelector::new("fanduel"), BetType::RunLine);
        assert!(rl.opening.is_empty());
        assert_eq!(rl.current.away_odds, None);
        assert_eq!(rl.current.home_odds, Some(-118.0));
        assert_eq!(rl.current.away_spread, None);
    }

    #[test]
    fn test_extract_market_non_object_row() {
        let row = serde_json::json!([1, 2, 3]);
        let book = BookSelector::new("fanduel");
        for bet_type in BetType::ALL {
            assert!(extract_market(&row, &book, bet_type).is_empty());
        }
        assert!(extract_market(&Value::Null, &book, BetType::Total).is_empty());
    }

    #[test]
    fn test_run_line_fills_missing_side() {
        let row: Value = serde_json::from_str(
            r#"{"oddsViews":[{
                "sportsbook":"fanduel",
                "openingLine":{"awayOdds":-125,"homeOdds":104,"homeSpread":-1.5},
                "currentLine":{"awayOdds":-110,"homeOdds":-110,"awaySpread":1.5,"homeSpread":-1.5}
            }]}"#,
        )
        .unwrap();
        let rl = extract_market(&row, &BookSelector::new("fanduel"), BetType::RunLine);
        assert_eq!(rl.opening.away_spread, Some(1.5));
        assert_eq!(rl.opening.home_spread, Some(-1.5));
        assert_eq!(rl.opening.away_odds, Some(-125.0));
        assert_eq!(rl.current.home_odds, Some(-110.0));
    }

    #[test]
    fn test_totals_fields() {
        let row: Value = serde_json::from_str(
            r#"{"oddsViews":[{
                "sportsbook":"fanduel",
                "openingLine":{"total":9.0,"overOdds":-110,"underOdds":-110},
                "currentLine":{"total":8.5,"overOdds":-132,"underOdds":"EVEN"}
            }]}"#,
        )
        .unwrap();
        let t = extract_market(&row, &BookSelector::new("fanduel"), BetType::Total);
        assert_eq!(t.opening.total, Some(9.0));
        assert_eq!(t.current.total, Some(8.5));
        assert_eq!(t.current.over_odds, Some(-132.0));
        assert_eq!(t.current.under_odds, Some(100.0));
        assert_eq!(t.current.home_odds, None);
    }

    #[test]
    fn test_keyed_layout() {
        let payload: Value = serde_json::from_str(
            r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{
                "sportsbooks":[{"id":12,"name":"DraftKings"},{"id":"fd","name":"FanDuel Sportsbook"},{"id":"fd2","name":"fanduel"}],
                "gameRows":[{
                    "startTime":"2025-07-26T19:00:00+00:00",
                    "awayTeam":{"name":"Arizona","abbreviation":"ARI"},
                    "homeTeam":{"name":"Pittsburgh","abbreviation":"PIT"},
                    "sportsbookData":{
                        "fd":{
                            "ml":{"opening":{"homeOdds":116,"awayOdds":-136},"current":{"homeOdds":-108,"awayOdds":-118}},
                            "ps":{"opening":{"homeOdds":-146,"awayOdds":122,"homeSpread":1.5},"current":{}},
                            "total":{"opening":{"total":9,"overOdds":-110,"underOdds":-110}}
                        },
                        "fd2":{
                            "ml":{"opening":{"homeOdds":1,"awayOdds":1}}
                        }
                    }
                }]
            }}]}}}"#,
        )
        .unwrap();

        // First book whose name contains "fanduel" wins
        let book = BookSelector::for_page("FanDuel", &payload);
        assert_eq!(book.keyed_id(), Some("fd"));

        let row = &game_rows(&payload)[0];
        let odds = extract_book_odds(row, &book);
        assert_eq!(odds.moneyline.opening.away_odds, Some(-136.0));
        assert_eq!(odds.moneyline.current.home_odds, Some(-108.0));
        assert_eq!(odds.run_line.opening.home_spread, Some(1.5));
        assert_eq!(odds.run_line.opening.away_spread, Some(-1.5));
        assert!(odds.run_line.current.is_empty());
        assert_eq!(odds.total.opening.total, Some(9.0));
        assert!(odds.total.current.is_empty());

        let info = game_info(row);
        assert_eq!(info.away_team, "Arizona");
        assert_eq!(info.home_abbr.as_deref(), Some("PIT"));
        assert_eq!(info.start_time.as_deref(), Some("2025-07-26T19:00:00+00:00"));
        assert_eq!(info.game_id, None);
    }

    #[test]
    fn test_keyed_layout_full_sportsbook_name() {
        let payload: Value = serde_json::from_str(
            r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{
                "sportsbooks":[{"id":12,"name":"DraftKings"},{"id":"fd","name":"FanDuel Sportsbook"}],
                "gameRows":[{
                    "awayTeam":{"name":"Arizona"},
                    "homeTeam":{"name":"Pittsburgh"},
                    "sportsbookData":{"fd":{"ml":{"opening":{"awayOdds":-136,"homeOdds":116}}}}
                }]
            }}]}}}"#,
        )
        .unwrap();
        let rows = extract_page(&payload, "fanduel", BetType::Moneyline);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.opening.away_odds, Some(-136.0));
        assert_eq!(rows[0].1.opening.home_odds, Some(116.0));
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("FanDuel Sportsbook", "fanduel"));
        assert!(names_match("fanduel", " FanDuel "));
        assert!(!names_match("DraftKings", "fanduel"));
        assert!(!names_match("FanDuel", "   "));
    }

    #[test]
    fn test_keyed_layout_numeric_id() {
        let payload: Value = serde_json::from_str(
            r#"{"props":{"pageProps":{"oddsTables":[{"oddsTableModel":{
                "sportsbooks":[{"id":12,"name":"DraftKings"}],"gameRows":[]
            }}]}}}"#,
        )
        .unwrap();
        let book = BookSelector::for_page("draftkings", &payload);
        assert_eq!(book.keyed_id(), Some("12"));
        assert_eq!(BookSelector::for_page("fanduel", &payload).keyed_id(), None);
    }

    #[test]
    fn test_game_info_from_game_view() {
        let payload = moneyline_payload();
        let info = game_info(&game_rows(&payload)[0]);
        assert_eq!(info.game_id.as_deref(), Some("291047"));
        assert_eq!(info.away_team, "Miami Marlins");
        assert_eq!(info.home_team, "Milwaukee Brewers");
        assert_eq!(info.away_abbr.as_deref(), Some("MIA"));
        assert_eq!(info.venue.as_deref(), Some("American Family Field"));
        assert_eq!(info.start_time.as_deref(), Some("2025-07-25T20:10:00+00:00"));
    }

    #[test]
    fn test_extract_page_empty_payload() {
        let payload = serde_json::json!({"props": null});
        assert!(extract_page(&payload, "fanduel", BetType::Moneyline).is_empty());
    }
}
