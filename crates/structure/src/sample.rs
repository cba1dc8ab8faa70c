//! Built-in sample dataset.
//!
//! Loaded from `data/sample_markets.toml` and pushed through the same ingestion
//! calls a live feed would use, so the sample store obeys every store invariant.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::price_history::PriceHistoryGenerator;
use crate::store::RecordStore;
use crate::types::{
    CollapsedPath, Constraint, ConstraintStatus, Impact, MarketEvent, MarketRecord, OutcomePath,
    PathStatus, ProbabilityBand, Side,
};

const SAMPLE_TOML: &str = include_str!("../data/sample_markets.toml");

#[derive(Debug, Deserialize)]
struct SampleData {
    markets: Vec<MarketRecord>,
    #[serde(default)]
    constraints: Vec<SampleConstraint>,
    #[serde(default)]
    paths: Vec<SamplePath>,
    #[serde(default)]
    collapsed: Vec<SampleCollapsed>,
    #[serde(default)]
    events: Vec<SampleEvent>,
}

#[derive(Debug, Deserialize)]
struct SampleConstraint {
    ticker: String,
    name: String,
    status: ConstraintStatus,
    date: Option<NaiveDate>,
    notes: String,
}

#[derive(Debug, Deserialize)]
struct SamplePath {
    ticker: String,
    side: Side,
    description: String,
    status: PathStatus,
    probability_band: ProbabilityBand,
}

#[derive(Debug, Deserialize)]
struct SampleCollapsed {
    ticker: String,
    description: String,
    collapsed_date: NaiveDate,
    reason: String,
}

#[derive(Debug, Deserialize)]
struct SampleEvent {
    ticker: String,
    date: NaiveDate,
    description: String,
    impact: Impact,
}

pub fn sample_store(generator: PriceHistoryGenerator) -> Result<RecordStore> {
    store_from_toml(SAMPLE_TOML, generator)
}

pub fn store_from_toml(content: &str, generator: PriceHistoryGenerator) -> Result<RecordStore> {
    let data: SampleData = toml::from_str(content).context("failed to parse sample markets")?;
    let mut store = RecordStore::new(generator);

    for record in data.markets {
        store.insert_record(record)?;
    }
    for c in data.constraints {
        store.append_constraint(
            &c.ticker,
            Constraint {
                name: c.name,
                status: c.status,
                date: c.date,
                notes: c.notes,
            },
        )?;
    }
    for p in data.paths {
        store.append_path(
            &p.ticker,
            p.side,
            OutcomePath {
                description: p.description,
                status: p.status,
                probability_band: p.probability_band,
            },
        )?;
    }
    for c in data.collapsed {
        store.append_collapsed(
            &c.ticker,
            CollapsedPath {
                description: c.description,
                collapsed_date: c.collapsed_date,
                reason: c.reason,
            },
        )?;
    }
    for e in data.events {
        store.append_event(
            &e.ticker,
            MarketEvent {
                date: e.date,
                description: e.description,
                impact: e.impact,
            },
        )?;
    }

    tracing::debug!(markets = store.len(), "sample store loaded");
    Ok(store)
}
