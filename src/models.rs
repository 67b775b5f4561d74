//! Core data models for the currency agent

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//
// ================= Currency catalog =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Aud,
    Cad,
    Chf,
    Cny,
    Inr,
    Sgd,
    Nzd,
    Hkd,
    Krw,
    Mxn,
    Brl,
}

impl CurrencyCode {
    /// Catalog in display order
    pub const ALL: [CurrencyCode; 15] = [
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Jpy,
        CurrencyCode::Aud,
        CurrencyCode::Cad,
        CurrencyCode::Chf,
        CurrencyCode::Cny,
        CurrencyCode::Inr,
        CurrencyCode::Sgd,
        CurrencyCode::Nzd,
        CurrencyCode::Hkd,
        CurrencyCode::Krw,
        CurrencyCode::Mxn,
        CurrencyCode::Brl,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Jpy => "JPY",
            CurrencyCode::Aud => "AUD",
            CurrencyCode::Cad => "CAD",
            CurrencyCode::Chf => "CHF",
            CurrencyCode::Cny => "CNY",
            CurrencyCode::Inr => "INR",
            CurrencyCode::Sgd => "SGD",
            CurrencyCode::Nzd => "NZD",
            CurrencyCode::Hkd => "HKD",
            CurrencyCode::Krw => "KRW",
            CurrencyCode::Mxn => "MXN",
            CurrencyCode::Brl => "BRL",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "US Dollar",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Gbp => "British Pound",
            CurrencyCode::Jpy => "Japanese Yen",
            CurrencyCode::Aud => "Australian Dollar",
            CurrencyCode::Cad => "Canadian Dollar",
            CurrencyCode::Chf => "Swiss Franc",
            CurrencyCode::Cny => "Chinese Yuan",
            CurrencyCode::Inr => "Indian Rupee",
            CurrencyCode::Sgd => "Singapore Dollar",
            CurrencyCode::Nzd => "New Zealand Dollar",
            CurrencyCode::Hkd => "Hong Kong Dollar",
            CurrencyCode::Krw => "South Korean Won",
            CurrencyCode::Mxn => "Mexican Peso",
            CurrencyCode::Brl => "Brazilian Real",
        }
    }

    /// Select-box label, e.g. "USD - US Dollar"
    pub fn label(&self) -> String {
        format!("{} - {}", self.code(), self.name())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurrency(pub String);

impl fmt::Display for UnknownCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not in the currency catalog", self.0)
    }
}

impl std::error::Error for UnknownCurrency {}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        CurrencyCode::ALL
            .iter()
            .copied()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

/// Catalog entry as exposed to the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyOption {
    pub code: CurrencyCode,
    pub name: String,
    pub label: String,
}

pub fn currency_catalog() -> Vec<CurrencyOption> {
    CurrencyCode::ALL
        .iter()
        .map(|c| CurrencyOption {
            code: *c,
            name: c.name().to_string(),
            label: c.label(),
        })
        .collect()
}

//
// ================= Conversion request =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionRequest {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl ConversionRequest {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    pub fn swap(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }

    /// Task handed to the reasoning capability
    pub fn task(&self) -> String {
        format!("Convert {} to {}", self.from, self.to)
    }
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self::new(CurrencyCode::Usd, CurrencyCode::Inr)
    }
}

//
// ================= Tool I/O =================
//

/// A single web search hit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
}

/// Host of a result URL, without a leading `www.`
pub fn source_name(raw_url: &str) -> String {
    url::Url::parse(raw_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    WebSearch,
    PythonRepl,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::WebSearch => "web_search",
            ToolKind::PythonRepl => "python_repl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "web_search" => Some(ToolKind::WebSearch),
            "python_repl" => Some(ToolKind::PythonRepl),
            _ => None,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//
// ================= Agent loop =================
//

/// What the reasoning capability asks for next
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AgentStep {
    Search { query: String },
    Execute { code: String },
    Finish { output: String },
}

impl AgentStep {
    /// Tool this step dispatches to; `None` for `Finish`
    pub fn tool(&self) -> Option<ToolKind> {
        match self {
            AgentStep::Search { .. } => Some(ToolKind::WebSearch),
            AgentStep::Execute { .. } => Some(ToolKind::PythonRepl),
            AgentStep::Finish { .. } => None,
        }
    }
}

/// Scratch record replayed to the reasoning capability each round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum TranscriptEntry {
    Task { text: String },
    Thought { text: String },
    ToolCall { step: AgentStep },
    Observation {
        tool: ToolKind,
        output: serde_json::Value,
    },
}

/// Successful conversion with its reasoning trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub output: String,
    pub trace: Vec<String>,
    pub iterations: u32,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_fifteen_unique_codes() {
        let catalog = currency_catalog();
        assert_eq!(catalog.len(), 15);
        let mut codes: Vec<&str> = catalog.iter().map(|c| c.code.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 15);
        assert_eq!(catalog[0].label, "USD - US Dollar");
        assert_eq!(catalog[8].code, CurrencyCode::Inr);
    }

    #[test]
    fn test_parse_is_catalog_membership() {
        assert_eq!("eur".parse::<CurrencyCode>(), Ok(CurrencyCode::Eur));
        assert_eq!(" BRL ".parse::<CurrencyCode>(), Ok(CurrencyCode::Brl));
        assert!("XAU".parse::<CurrencyCode>().is_err());
        assert!("US".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_swap_twice_restores_pair() {
        for from in CurrencyCode::ALL {
            for to in CurrencyCode::ALL {
                let pair = ConversionRequest::new(from, to);
                assert_eq!(pair.swap().swap(), pair);
            }
        }
    }

    #[test]
    fn test_task_text() {
        let req = ConversionRequest::new(CurrencyCode::Usd, CurrencyCode::Eur);
        assert_eq!(req.task(), "Convert USD to EUR");
        assert_eq!(ConversionRequest::default().task(), "Convert USD to INR");
    }

    #[test]
    fn test_serde_uses_three_letter_codes() {
        let req = ConversionRequest::new(CurrencyCode::Gbp, CurrencyCode::Jpy);
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json, serde_json::json!({"from": "GBP", "to": "JPY"}));
    }

    #[test]
    fn test_source_name_strips_www() {
        assert_eq!(source_name("https://www.reuters.com/markets/x"), "reuters.com");
        assert_eq!(source_name("https://xe.com/currencyconverter"), "xe.com");
        assert_eq!(source_name("not a url"), "");
    }
}
