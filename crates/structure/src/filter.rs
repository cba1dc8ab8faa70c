//! Dashboard record filter.
//!
//! A [`FilterSpec`] is a plain value: applying it never touches the source table,
//! and the result keeps the table's insertion order.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{DataError, Result};
use crate::types::{MarketRecord, MarketStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub categories: BTreeSet<String>,
    pub statuses: BTreeSet<MarketStatus>,
    pub include_lag: bool,
    /// Carried for the signal toggle; the record filter does not read it.
    pub include_path_collapse: bool,
    pub include_high_certainty: bool,
}

impl FilterSpec {
    /// Every category present in `records`, active markets only, all signals on.
    pub fn defaults_for(records: &[MarketRecord]) -> Self {
        Self {
            categories: category_options(records).into_iter().collect(),
            statuses: BTreeSet::from([MarketStatus::Active]),
            include_lag: true,
            include_path_collapse: true,
            include_high_certainty: true,
        }
    }

    pub fn matches(&self, record: &MarketRecord) -> bool {
        self.categories.contains(&record.category)
            && self.statuses.contains(&record.status)
            && (self.include_lag || !record.lag_detected())
            && (self.include_high_certainty || !record.high_certainty())
    }

    pub fn apply(&self, records: &[MarketRecord]) -> Vec<MarketRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    /// Same filter restricted to a single category (sidebar quick access).
    pub fn only_category(&self, category: &str) -> Self {
        Self {
            categories: BTreeSet::from([category.to_string()]),
            ..self.clone()
        }
    }
}

/// Distinct categories in first-appearance order.
pub fn category_options(records: &[MarketRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.contains(&record.category) {
            seen.push(record.category.clone());
        }
    }
    seen
}

/// Parse a comma-separated category list. Every entry must name a category in `known`.
/// An empty string is the empty set.
pub fn parse_categories(raw: &str, known: &[String]) -> Result<BTreeSet<String>> {
    split_list(raw)
        .map(|c| {
            if known.iter().any(|k| k == c) {
                Ok(c.to_string())
            } else {
                Err(DataError::InvalidFilter(format!("unknown category: {c}")))
            }
        })
        .collect()
}

pub fn parse_statuses(raw: &str) -> Result<BTreeSet<MarketStatus>> {
    split_list(raw)
        .map(|s| s.parse::<MarketStatus>().map_err(DataError::InvalidFilter))
        .collect()
}

pub fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        other => Err(DataError::InvalidFilter(format!(
            "{name} must be true or false, got {other:?}"
        ))),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Join a set back into the comma list accepted by the parsers above.
pub fn join_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    items.into_iter().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Certainty, LagStatus};
    use chrono::NaiveDate;

    fn record(ticker: &str, category: &str, status: MarketStatus) -> MarketRecord {
        MarketRecord {
            ticker: ticker.to_string(),
            title: ticker.to_string(),
            category: category.to_string(),
            subcategory: String::new(),
            yes_price: 0.5,
            volume: 1000,
            expiration: NaiveDate::from_ymd_opt(2024, 11, 6).unwrap(),
            status,
            lag_status: LagStatus::Clear,
            structural_certainty: Certainty::Medium,
            constraint_summary: String::new(),
        }
    }

    #[test]
    fn test_defaults_include_every_category_active_only() {
        let records = vec![
            record("A", "Elections", MarketStatus::Active),
            record("B", "Legal", MarketStatus::Resolved),
            record("C", "Elections", MarketStatus::Active),
        ];
        let spec = FilterSpec::defaults_for(&records);
        assert_eq!(spec.categories.len(), 2);
        let out = spec.apply(&records);
        let tickers: Vec<_> = out.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["A", "C"]);
    }

    #[test]
    fn test_signal_toggles_exclude_flagged_records() {
        let mut lagging = record("LAG", "Elections", MarketStatus::Active);
        lagging.lag_status = LagStatus::Detected;
        let mut certain = record("CERT", "Elections", MarketStatus::Active);
        certain.structural_certainty = Certainty::High;
        let plain = record("PLAIN", "Elections", MarketStatus::Active);
        let records = vec![lagging, certain, plain];

        let mut spec = FilterSpec::defaults_for(&records);
        assert_eq!(spec.apply(&records).len(), 3);

        spec.include_lag = false;
        spec.include_high_certainty = false;
        let out = spec.apply(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].ticker, "PLAIN");
    }

    #[test]
    fn test_path_collapse_toggle_does_not_filter() {
        let records = vec![record("A", "Elections", MarketStatus::Active)];
        let mut spec = FilterSpec::defaults_for(&records);
        spec.include_path_collapse = false;
        assert_eq!(spec.apply(&records).len(), 1);
    }

    #[test]
    fn test_empty_sets_yield_nothing() {
        let records = vec![record("A", "Elections", MarketStatus::Active)];
        let mut spec = FilterSpec::defaults_for(&records);
        spec.categories.clear();
        assert!(spec.apply(&records).is_empty());

        let mut spec = FilterSpec::defaults_for(&records);
        spec.statuses.clear();
        assert!(spec.apply(&records).is_empty());
    }

    #[test]
    fn test_only_category_keeps_other_settings() {
        let records = vec![
            record("A", "Elections", MarketStatus::Active),
            record("B", "Legal", MarketStatus::Active),
        ];
        let mut spec = FilterSpec::defaults_for(&records);
        spec.include_lag = false;
        let legal = spec.only_category("Legal");
        assert!(!legal.include_lag);
        assert_eq!(legal.apply(&records)[0].ticker, "B");
    }

    #[test]
    fn test_parse_lists() {
        let known = vec!["Elections".to_string(), "Legal".to_string()];
        let cats = parse_categories("Elections, Legal", &known).unwrap();
        assert_eq!(cats.len(), 2);
        assert!(parse_categories("", &known).unwrap().is_empty());
        assert_eq!(
            parse_categories("Sports", &known),
            Err(DataError::InvalidFilter("unknown category: Sports".to_string()))
        );

        let statuses = parse_statuses("active,resolved").unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(matches!(
            parse_statuses("pending"),
            Err(DataError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("lag", "true"), Ok(true));
        assert_eq!(parse_flag("lag", "0"), Ok(false));
        assert!(parse_flag("lag", "maybe").is_err());
    }

    #[test]
    fn test_category_options_first_appearance_order() {
        let records = vec![
            record("A", "Legal", MarketStatus::Active),
            record("B", "Elections", MarketStatus::Active),
            record("C", "Legal", MarketStatus::Active),
        ];
        assert_eq!(category_options(&records), vec!["Legal", "Elections"]);
    }
}
