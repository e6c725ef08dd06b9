//! Locating the odds table inside a sportsbookreview page.
//!
//! The site is a Next.js app: every odds page ships its full props as JSON in
//! `<script id="__NEXT_DATA__" type="application/json">`. The odds table lives
//! at `props.pageProps.oddsTables[0].oddsTableModel`.

use anyhow::{Context, Result};
use scraper::{Html, Selector};
use serde_json::Value;

const NEXT_DATA_SELECTOR: &str = r#"script#__NEXT_DATA__"#;

/// Pull the `__NEXT_DATA__` JSON payload out of an HTML document.
pub fn extract_next_data(html: &str) -> Result<Value> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(NEXT_DATA_SELECTOR)
        .map_err(|e| anyhow::anyhow!("invalid selector {}: {:?}", NEXT_DATA_SELECTOR, e))?;

    let script = document
        .select(&selector)
        .next()
        .context("no __NEXT_DATA__ script in page")?;

    let body: String = script.text().collect();
    serde_json::from_str(body.trim()).context("failed to parse __NEXT_DATA__ JSON")
}

/// The first odds table model on the page, if the page has one.
pub fn odds_table_model(payload: &Value) -> Option<&Value> {
    payload
        .pointer("/props/pageProps/oddsTables/0/oddsTableModel")
        .filter(|v| v.is_object())
}

/// Game rows of the first odds table. Empty when the structure is missing.
pub fn game_rows(payload: &Value) -> &[Value] {
    odds_table_model(payload)
        .and_then(|model| model.get("gameRows"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Table-level sportsbook list (`{id, name}` entries) used by the keyed layout.
pub fn table_sportsbooks(payload: &Value) -> &[Value] {
    odds_table_model(payload)
        .and_then(|model| model.get("sportsbooks"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
