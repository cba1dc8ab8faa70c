//! Query string <-> [`ViewState`].
//!
//! The whole view state lives in the URL, so every link on a page is a complete
//! interaction: select, back, tier switch and filter toggles are just rewritten
//! query strings.

use serde::Deserialize;
use structure::alerts::{AlertKind, AlertPreferences};
use structure::filter::{
    category_options, join_list, parse_categories, parse_flag, parse_statuses, FilterSpec,
};
use structure::types::{MarketRecord, MarketStatus, Tier};
use structure::{DataError, ViewState};

#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub tier: Option<String>,
    pub categories: Option<String>,
    pub statuses: Option<String>,
    pub lag: Option<String>,
    pub collapse: Option<String>,
    pub high: Option<String>,
    pub alerts: Option<String>,
    pub market: Option<String>,
}

impl ViewParams {
    /// Missing parameters take the dashboard defaults.
    pub fn into_state(
        self,
        records: &[MarketRecord],
        default_tier: Tier,
    ) -> structure::Result<ViewState> {
        let mut filter = FilterSpec::defaults_for(records);
        if let Some(raw) = &self.categories {
            filter.categories = parse_categories(raw, &category_options(records))?;
        }
        if let Some(raw) = &self.statuses {
            filter.statuses = parse_statuses(raw)?;
        }
        if let Some(raw) = &self.lag {
            filter.include_lag = parse_flag("lag", raw)?;
        }
        if let Some(raw) = &self.collapse {
            filter.include_path_collapse = parse_flag("collapse", raw)?;
        }
        if let Some(raw) = &self.high {
            filter.include_high_certainty = parse_flag("high", raw)?;
        }

        let tier = match self.tier.as_deref() {
            Some(raw) => raw.parse().map_err(DataError::InvalidFilter)?,
            None => default_tier,
        };
        let mut state = ViewState::new(tier, filter);
        if let Some(raw) = &self.alerts {
            state.alerts = AlertPreferences::parse(raw)?;
        }

        Ok(match self.market.as_deref().filter(|m| !m.is_empty()) {
            Some(ticker) => state.select(ticker),
            None => state,
        })
    }
}

/// Query string that reproduces `state`, without the leading `?`.
pub fn query(state: &ViewState) -> String {
    let f = &state.filter;
    let mut pairs = vec![
        ("tier", state.tier.as_str().to_string()),
        (
            "categories",
            join_list(f.categories.iter().map(String::as_str)),
        ),
        (
            "statuses",
            join_list(f.statuses.iter().map(MarketStatus::as_str)),
        ),
        ("lag", f.include_lag.to_string()),
        ("collapse", f.include_path_collapse.to_string()),
        ("high", f.include_high_certainty.to_string()),
        (
            "alerts",
            join_list(state.alerts.enabled_kinds().iter().map(AlertKind::as_str)),
        ),
    ];
    if let Some(ticker) = &state.selected_market {
        pairs.push(("market", ticker.clone()));
    }
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn href(state: &ViewState) -> String {
    format!("/?{}", query(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use structure::types::{Certainty, LagStatus};

    fn records() -> Vec<MarketRecord> {
        ["Elections", "Legal", "Congress"]
            .iter()
            .enumerate()
            .map(|(i, category)| MarketRecord {
                ticker: format!("T{i}"),
                title: format!("Market {i}"),
                category: (*category).to_string(),
                subcategory: String::new(),
                yes_price: 0.5,
                volume: 100,
                expiration: NaiveDate::from_ymd_opt(2024, 11, 6).unwrap(),
                status: MarketStatus::Active,
                lag_status: LagStatus::Clear,
                structural_certainty: Certainty::Low,
                constraint_summary: String::new(),
            })
            .collect()
    }

    fn parse(q: &str) -> structure::Result<ViewState> {
        let params: ViewParams = serde_json::from_value(serde_json::Value::Object(
            q.split('&')
                .filter(|kv| !kv.is_empty())
                .filter_map(|kv| kv.split_once('='))
                .map(|(k, v)| {
                    let v = urlencoding::decode(v).unwrap().into_owned();
                    (k.to_string(), serde_json::Value::String(v))
                })
                .collect(),
        ))
        .unwrap();
        params.into_state(&records(), Tier::Pro)
    }

    #[test]
    fn test_empty_query_is_default_state() {
        let state = parse("").unwrap();
        assert_eq!(state.tier, Tier::Pro);
        assert_eq!(state.filter, FilterSpec::defaults_for(&records()));
        assert_eq!(state.alerts, AlertPreferences::default());
        assert!(state.selected_market.is_none());
    }

    #[test]
    fn test_query_round_trips() {
        let mut filter = FilterSpec::defaults_for(&records()).only_category("Legal");
        filter.include_high_certainty = false;
        filter.statuses.insert(MarketStatus::Resolved);
        let mut state = ViewState::new(Tier::ProPlus, filter).select("T1");
        state.alerts.lag_detection = false;

        let back = parse(&query(&state)).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_empty_lists_survive_round_trip() {
        let mut filter = FilterSpec::defaults_for(&records());
        filter.categories.clear();
        let state = ViewState::new(Tier::Free, filter);
        let back = parse(&query(&state)).unwrap();
        assert!(back.filter.categories.is_empty());
    }

    #[test]
    fn test_bad_values_are_invalid_filter() {
        assert!(matches!(parse("tier=gold"), Err(DataError::InvalidFilter(_))));
        assert!(matches!(parse("statuses=open"), Err(DataError::InvalidFilter(_))));
        assert!(matches!(parse("lag=yes"), Err(DataError::InvalidFilter(_))));
        assert!(matches!(parse("categories=Sports"), Err(DataError::InvalidFilter(_))));
    }

    #[test]
    fn test_empty_market_means_dashboard() {
        assert!(parse("market=").unwrap().selected_market.is_none());
    }

    #[test]
    fn test_href_encodes_commas() {
        let state = ViewState::new(Tier::Pro, FilterSpec::defaults_for(&records()));
        let link = href(&state);
        assert!(link.starts_with("/?tier=pro&categories=Congress%2CElections%2CLegal"));
        assert!(!link.contains("market="));
    }
}
