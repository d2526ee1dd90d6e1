//! # Security trading-data extraction
//!
//! The page lays its figures out as label/value table cells with no stable
//! ids or classes, so extraction is anchored on the Russian label texts: find
//! the cell carrying a known label, read the cell right after it. The
//! repeating "Итоги торгов" table is handled by fixed column offsets instead.
//!
//! Extraction is best-effort by design. A field that cannot be found keeps
//! its fixed default, and a failed fetch yields the whole default snapshot;
//! the run itself never dies here.

use std::time::Duration;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::{
    declare::{Extraction, TradingSnapshot},
    logging,
    util::{self, text},
};

/// Deadline for the rendered-page fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const DATE_LABEL: &str = "Дата последней сделки";
const PRICE_LABEL: &str = "Цена, BYN";
const CHANGE_LABEL: &str = "Изменение";
const RESULTS_LABEL: &str = "Итоги торгов";

/// Offsets of min/max/average inside an "Итоги торгов" row.
const RESULTS_MIN_CELL: usize = 4;
const RESULTS_MAX_CELL: usize = 5;
const RESULTS_AVG_CELL: usize = 6;

static TR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to parse tr selector"));

static TD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to parse td selector"));

/// Matches a percent figure such as "29.37%" inside the change cell.
static REG_PERCENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d.]+%").expect("Failed to compile percent regex"));

/// One label-anchored field: where the value sits and how it lands on the
/// snapshot. Adding a field means adding a row here, not touching traversal.
struct FieldRule {
    label: &'static str,
    normalize: bool,
    assign: fn(&mut TradingSnapshot, String),
}

static FIELD_RULES: [FieldRule; 3] = [
    FieldRule {
        label: DATE_LABEL,
        normalize: false,
        assign: |snapshot, value| snapshot.date = value,
    },
    FieldRule {
        label: PRICE_LABEL,
        normalize: true,
        assign: |snapshot, value| snapshot.price = value,
    },
    FieldRule {
        label: CHANGE_LABEL,
        normalize: true,
        assign: |snapshot, value| snapshot.change = value,
    },
];

/// Fetches the security page and extracts a snapshot. Never fails: any error
/// on the way is logged and masked with the static default snapshot, and the
/// outcome records which of the two happened.
pub async fn fetch() -> Extraction {
    fetch_from(&super::render_proxy_url(super::SECURITY_URL)).await
}

async fn fetch_from(url: &str) -> Extraction {
    match visit(url).await {
        Ok(extraction) => extraction,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to fetch trading data from {} because {:?}",
                url, why
            ));
            Extraction::Fallback(TradingSnapshot::fallback(), why.to_string())
        }
    }
}

async fn visit(url: &str) -> Result<Extraction> {
    let text = util::http::get(url, None, Some(FETCH_TIMEOUT)).await?;

    Ok(extract(&text))
}

/// Extracts a snapshot from the page markup. Fields start out at their
/// defaults and are overwritten only when a usable value is found.
pub fn extract(html: &str) -> Extraction {
    let document = Html::parse_document(html);
    let rows = table_rows(&document);
    let mut snapshot = TradingSnapshot::fallback();

    for rule in &FIELD_RULES {
        if let Some(value) = adjacent_cell(&rows, rule.label) {
            let value = if rule.normalize {
                text::normalize_decimal_comma(&value)
            } else {
                value
            };
            (rule.assign)(&mut snapshot, value);
        }
    }

    // The page exposes no dedicated percent cell; the percent is carved out
    // of the same raw "Изменение" text the plain change came from.
    if let Some(raw_change) = adjacent_cell(&rows, CHANGE_LABEL) {
        if let Some(percent) = REG_PERCENT.find(&raw_change) {
            snapshot.change_percent = percent.as_str().to_string();
        }
    }

    if let Some(row) = trading_results_row(&rows) {
        if let Some(min) = cell_value(row, RESULTS_MIN_CELL) {
            snapshot.secondary.min = min;
        }
        if let Some(max) = cell_value(row, RESULTS_MAX_CELL) {
            snapshot.secondary.max = max;
        }
        if let Some(avg) = cell_value(row, RESULTS_AVG_CELL) {
            snapshot.secondary.avg = avg;
        }
    }

    Extraction::Scraped(snapshot)
}

/// Collects the trimmed cell texts of every table row in the document.
fn table_rows(document: &Html) -> Vec<Vec<String>> {
    document
        .select(&TR_SELECTOR)
        .map(|row| {
            row.select(&TD_SELECTOR)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect()
        })
        .collect()
}

/// Finds the cell immediately following the first cell containing `label`.
/// Empty values count as missing.
fn adjacent_cell(rows: &[Vec<String>], label: &str) -> Option<String> {
    let row = rows.iter().find(|row| row.iter().any(|cell| cell.contains(label)))?;
    let position = row.iter().position(|cell| cell.contains(label))?;

    row.get(position + 1).filter(|value| !value.is_empty()).cloned()
}

/// The first "Итоги торгов" row wide enough to carry the session figures.
fn trading_results_row(rows: &[Vec<String>]) -> Option<&Vec<String>> {
    rows.iter().find(|row| {
        row.len() >= 6 && row.iter().any(|cell| cell.contains(RESULTS_LABEL))
    })
}

fn cell_value(row: &[String], index: usize) -> Option<String> {
    row.get(index).filter(|value| !value.is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_PAGE: &str = r#"
        <html><body>
        <table>
            <tr><td>Дата последней сделки</td><td>17.12.2025</td></tr>
            <tr><td>Цена, BYN</td><td>41,55</td></tr>
            <tr><td>Изменение</td><td>+0,15 (0.36%)</td></tr>
        </table>
        <table>
            <tr>
                <td>Итоги торгов</td><td>5-200-01-3593</td><td>10</td><td>415,50</td>
                <td>41,00</td><td>42,00</td><td>41,50</td>
            </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_extract_full_page() {
        let extraction = extract(FULL_PAGE);
        assert!(!extraction.is_fallback());

        let snapshot = extraction.snapshot();
        assert_eq!(snapshot.date, "17.12.2025");
        assert_eq!(snapshot.price, "41.55");
        assert_eq!(snapshot.change, "+0.15 (0.36%)");
        assert_eq!(snapshot.change_percent, "0.36%");
        assert_eq!(snapshot.secondary.min, "41,00");
        assert_eq!(snapshot.secondary.max, "42,00");
        assert_eq!(snapshot.secondary.avg, "41,50");
    }

    #[test]
    fn test_extract_without_labels_returns_default_snapshot() {
        let extraction = extract("<html><body><p>технические работы</p></body></html>");

        assert_eq!(extraction.snapshot(), &TradingSnapshot::fallback());
    }

    #[test]
    fn test_extract_normalizes_price_comma() {
        let html = "<table><tr><td>Цена, BYN</td><td>41,55</td></tr></table>";

        assert_eq!(extract(html).snapshot().price, "41.55");
    }

    #[test]
    fn test_extract_without_results_rows_falls_back_secondary() {
        let html = r#"
            <table>
                <tr><td>Дата последней сделки</td><td>17.12.2025</td></tr>
                <tr><td>Цена, BYN</td><td>41,55</td></tr>
            </table>
        "#;
        let extraction = extract(html);

        assert_eq!(
            extraction.snapshot().secondary,
            crate::declare::SecondaryResults::fallback()
        );
    }

    #[test]
    fn test_extract_percent_falls_back_without_match() {
        let html = "<table><tr><td>Изменение</td><td>+0,15</td></tr></table>";
        let snapshot = extract(html).snapshot().clone();

        assert_eq!(snapshot.change, "+0.15");
        assert_eq!(snapshot.change_percent, "29.37%");
    }

    #[test]
    fn test_extract_ignores_narrow_results_rows() {
        let html = r#"
            <table>
                <tr><td>Итоги торгов</td><td>5-200-01-3593</td><td>10</td></tr>
            </table>
        "#;

        assert_eq!(
            extract(html).snapshot().secondary,
            crate::declare::SecondaryResults::fallback()
        );
    }

    #[test]
    fn test_extract_empty_adjacent_cell_keeps_default() {
        let html = "<table><tr><td>Цена, BYN</td><td>  </td></tr></table>";

        assert_eq!(extract(html).snapshot().price, "41.40");
    }

    #[tokio::test]
    async fn test_fetch_from_unreachable_host_falls_back() {
        let extraction = fetch_from("http://127.0.0.1:9/unreachable").await;

        assert!(extraction.is_fallback());
        assert_eq!(extraction.snapshot(), &TradingSnapshot::fallback());
        assert!(extraction.reason().is_some());
    }

    #[tokio::test]
    #[ignore]
    async fn test_visit() {
        dotenv::dotenv().ok();
        logging::debug_file_async("begin visit".to_string());

        match visit(&super::super::render_proxy_url(super::super::SECURITY_URL)).await {
            Ok(extraction) => {
                dbg!(&extraction);
                logging::debug_file_async(format!("{:#?}", extraction));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to visit because {:?}", why));
            }
        }

        logging::debug_file_async("end visit".to_string());
    }
}
