//! Advisory checks over the final markdown answer
//!
//! The answer is always rendered as-is. These rules only report whether it
//! has the shape the instruction template asks for, so drift in model output
//! shows up in the logs.

use crate::models::ConversionRequest;
use crate::prompt::DISPLAY_DATE;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Trait for report rules
pub trait ReportRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, request: &ConversionRequest, markdown: &str) -> RuleOutcome;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleOutcome {
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCheck {
    pub rule_name: String,
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    pub checks: Vec<ReportCheck>,
    pub issues: Vec<String>,
}

/// A news bullet in the shape `**[Headline](url)** - _Source_ - Summary`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub summary: String,
}

pub struct VerificationEngine {
    rules: Vec<Box<dyn ReportRule>>,
}

impl VerificationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: Box<dyn ReportRule>) {
        self.rules.push(rule);
    }

    pub fn verify(&self, request: &ConversionRequest, markdown: &str) -> VerificationResult {
        let mut checks = Vec::with_capacity(self.rules.len());
        let mut issues = Vec::new();

        for rule in &self.rules {
            let outcome = rule.check(request, markdown);
            if !outcome.passed {
                issues.push(format!("{}: {}", rule.name(), outcome.details));
            }
            checks.push(ReportCheck {
                rule_name: rule.name().to_string(),
                passed: outcome.passed,
                details: outcome.details,
            });
        }

        let verified = issues.is_empty();
        if verified {
            info!(rule_count = self.rules.len(), "Report checks passed");
        } else {
            warn!(?issues, "Report deviates from the requested format");
        }

        VerificationResult {
            verified,
            checks,
            issues,
        }
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new()
    }
}

//
// ================= Parsing helpers =================
//

fn first_heading(markdown: &str) -> Option<&str> {
    markdown
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim())
}

fn strip_bullet(line: &str) -> Option<&str> {
    let line = line.trim_start();
    ["* ", "- ", "+ "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
}

fn strip_emphasis(s: &str) -> &str {
    s.trim().trim_matches(|c: char| c == '_' || c == '*').trim()
}

fn parse_news_line(body: &str) -> Option<NewsItem> {
    let body = body.trim();
    let open = body.find('[')?;
    let close = body[open..].find("](")? + open;
    let url_end = body[close + 2..].find(')')? + close + 2;

    let title = body[open + 1..close].trim().to_string();
    let url = body[close + 2..url_end].trim().to_string();

    let rest = body[url_end + 1..].trim_start_matches('*').trim();
    let rest = rest.strip_prefix('-').unwrap_or(rest).trim();
    let (source, summary) = rest.split_once(" - ")?;

    Some(NewsItem {
        title,
        url,
        source: strip_emphasis(source).to_string(),
        summary: summary.trim().to_string(),
    })
}

/// All bullets that look like linked news items
pub fn parse_news_items(markdown: &str) -> Vec<NewsItem> {
    markdown
        .lines()
        .filter_map(strip_bullet)
        .filter_map(parse_news_line)
        .collect()
}

//
// ================= Rules =================
//

/// Rule: the first heading names both currencies
pub struct HeadingMentionsPairRule;

impl ReportRule for HeadingMentionsPairRule {
    fn name(&self) -> &'static str {
        "heading_mentions_pair"
    }

    fn check(&self, request: &ConversionRequest, markdown: &str) -> RuleOutcome {
        match first_heading(markdown) {
            Some(heading) => {
                let upper = heading.to_ascii_uppercase();
                let passed =
                    upper.contains(request.from.code()) && upper.contains(request.to.code());
                RuleOutcome {
                    passed,
                    details: format!("Heading: '{}'", heading),
                }
            }
            None => RuleOutcome {
                passed: false,
                details: "No markdown heading found".to_string(),
            },
        }
    }
}

/// Rule: three or four complete news bullets
pub struct NewsItemCountRule;

impl ReportRule for NewsItemCountRule {
    fn name(&self) -> &'static str {
        "news_item_count"
    }

    fn check(&self, _request: &ConversionRequest, markdown: &str) -> RuleOutcome {
        let items = parse_news_items(markdown);
        let complete = items
            .iter()
            .filter(|i| !i.title.is_empty() && !i.source.is_empty() && !i.summary.is_empty())
            .count();

        RuleOutcome {
            passed: (3..=4).contains(&items.len()) && complete == items.len(),
            details: format!("News items: {} ({} complete)", items.len(), complete),
        }
    }
}

/// Rule: the fixed display date is what the answer shows
pub struct FixedDateRule;

impl ReportRule for FixedDateRule {
    fn name(&self) -> &'static str {
        "fixed_display_date"
    }

    fn check(&self, _request: &ConversionRequest, markdown: &str) -> RuleOutcome {
        let passed = markdown.contains(DISPLAY_DATE);
        RuleOutcome {
            passed,
            details: if passed {
                format!("Shows {}", DISPLAY_DATE)
            } else {
                format!("Date label '{}' not found", DISPLAY_DATE)
            },
        }
    }
}

/// Create a verification engine with the standard report rules
pub fn create_default_verification_engine() -> VerificationEngine {
    let mut engine = VerificationEngine::new();
    engine.add_rule(Box::new(HeadingMentionsPairRule));
    engine.add_rule(Box::new(NewsItemCountRule));
    engine.add_rule(Box::new(FixedDateRule));
    engine
}
