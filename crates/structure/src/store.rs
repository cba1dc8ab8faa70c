//! In-memory record store.
//!
//! Holds the market table plus per-ticker constraint, path, event and price lists.
//! Writes go through the ingestion methods below, which enforce the table's
//! invariants (unique tickers, prices in [0, 1], events newest first) and return
//! the alerts a change implies. Reads go through [`MarketDataSource`].

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::alerts::{Alert, AlertKind};
use crate::error::{DataError, Result};
use crate::price_history::PriceHistoryGenerator;
use crate::source::MarketDataSource;
use crate::types::{
    CollapsedPath, Constraint, ConstraintStatus, MarketEvent, MarketRecord, MarketSnapshot,
    MarketStatus, OutcomePath, PathSet, PathStatus, PricePoint, Side,
};

pub struct RecordStore {
    records: Vec<MarketRecord>,
    index: HashMap<String, usize>,
    constraints: HashMap<String, Vec<Constraint>>,
    paths: HashMap<String, PathSet>,
    events: HashMap<String, Vec<MarketEvent>>,
    prices: HashMap<String, Vec<PricePoint>>,
    generator: PriceHistoryGenerator,
}

impl RecordStore {
    /// `generator` fills in price history for tickers with none recorded.
    pub fn new(generator: PriceHistoryGenerator) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            constraints: HashMap::new(),
            paths: HashMap::new(),
            events: HashMap::new(),
            prices: HashMap::new(),
            generator,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.index.contains_key(ticker)
    }

    pub fn insert_record(&mut self, record: MarketRecord) -> Result<()> {
        if self.contains(&record.ticker) {
            return Err(DataError::DuplicateTicker {
                ticker: record.ticker,
            });
        }
        check_price(&record.ticker, record.yes_price)?;
        self.index.insert(record.ticker.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Insert or replace a record from a feed snapshot.
    ///
    /// Reported path counts must agree with the viable paths already ingested.
    pub fn apply_snapshot(
        &mut self,
        snapshot: MarketSnapshot,
        today: NaiveDate,
    ) -> Result<Vec<Alert>> {
        let MarketSnapshot {
            record,
            reported_paths,
        } = snapshot;
        check_price(&record.ticker, record.yes_price)?;

        let derived = self
            .paths
            .get(&record.ticker)
            .map(PathSet::counts)
            .unwrap_or_default();
        if let Some(reported) = reported_paths {
            for (side, reported, derived) in [
                (Side::Yes, reported.yes, derived.yes),
                (Side::No, reported.no, derived.no),
            ] {
                if reported != derived {
                    return Err(DataError::DataInconsistency {
                        ticker: record.ticker,
                        side,
                        reported,
                        derived,
                    });
                }
            }
        }
        if record.status == MarketStatus::Resolved && (derived.yes > 0 || derived.no > 0) {
            tracing::warn!(
                ticker = %record.ticker,
                yes = derived.yes,
                no = derived.no,
                "resolved market still has viable paths"
            );
        }

        let was_lagging = self
            .index
            .get(&record.ticker)
            .is_some_and(|&i| self.records[i].lag_detected());
        let newly_lagging = record.lag_detected() && !was_lagging;
        let mut alerts = Vec::new();
        if newly_lagging {
            alerts.push(Alert {
                ticker: record.ticker.clone(),
                kind: AlertKind::LagDetection,
                date: today,
                message: format!(
                    "{}: price {:.2} lags structural state",
                    record.title, record.yes_price
                ),
            });
        }

        match self.index.get(&record.ticker) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.ticker.clone(), self.records.len());
                self.records.push(record);
            }
        }
        Ok(alerts)
    }

    pub fn append_constraint(&mut self, ticker: &str, constraint: Constraint) -> Result<()> {
        self.require(ticker)?;
        self.constraints
            .entry(ticker.to_string())
            .or_default()
            .push(constraint);
        Ok(())
    }

    /// Returns an alert when the status actually changed.
    pub fn set_constraint_status(
        &mut self,
        ticker: &str,
        name: &str,
        status: ConstraintStatus,
        today: NaiveDate,
    ) -> Result<Option<Alert>> {
        self.require(ticker)?;
        let constraint = self
            .constraints
            .get_mut(ticker)
            .and_then(|list| list.iter_mut().find(|c| c.name == name))
            .ok_or_else(|| DataError::UnknownConstraint {
                ticker: ticker.to_string(),
                name: name.to_string(),
            })?;

        if constraint.status == status {
            return Ok(None);
        }
        let previous = constraint.status;
        constraint.status = status;
        Ok(Some(Alert {
            ticker: ticker.to_string(),
            kind: AlertKind::ConstraintChange,
            date: today,
            message: format!("{name}: {} -> {}", previous.as_str(), status.as_str()),
        }))
    }

    pub fn append_path(&mut self, ticker: &str, side: Side, path: OutcomePath) -> Result<()> {
        self.require(ticker)?;
        self.paths
            .entry(ticker.to_string())
            .or_default()
            .side_mut(side)
            .push(path);
        Ok(())
    }

    /// Move a viable path to the recently-collapsed list.
    pub fn collapse_path(
        &mut self,
        ticker: &str,
        side: Side,
        description: &str,
        collapsed_date: NaiveDate,
        reason: &str,
    ) -> Result<Alert> {
        self.require(ticker)?;
        let unknown = || DataError::UnknownPath {
            ticker: ticker.to_string(),
            side,
            description: description.to_string(),
        };
        let set = self.paths.get_mut(ticker).ok_or_else(unknown)?;
        let list = set.side_mut(side);
        let pos = list
            .iter()
            .position(|p| p.description == description && p.status == PathStatus::Viable)
            .ok_or_else(unknown)?;
        list.remove(pos);
        set.recently_collapsed.push(CollapsedPath {
            description: description.to_string(),
            collapsed_date,
            reason: reason.to_string(),
        });

        Ok(Alert {
            ticker: ticker.to_string(),
            kind: AlertKind::PathCollapse,
            date: collapsed_date,
            message: format!("{side} path collapsed: {description} ({reason})"),
        })
    }

    /// Record a collapse that happened before the path was ingested.
    pub fn append_collapsed(&mut self, ticker: &str, collapsed: CollapsedPath) -> Result<()> {
        self.require(ticker)?;
        self.paths
            .entry(ticker.to_string())
            .or_default()
            .recently_collapsed
            .push(collapsed);
        Ok(())
    }

    /// Insert keeping the list newest first. Same-day events keep arrival order.
    pub fn append_event(&mut self, ticker: &str, event: MarketEvent) -> Result<()> {
        self.require(ticker)?;
        let list = self.events.entry(ticker.to_string()).or_default();
        let pos = list
            .iter()
            .position(|e| e.date < event.date)
            .unwrap_or(list.len());
        list.insert(pos, event);
        Ok(())
    }

    /// Replace the recorded price history for a ticker.
    pub fn record_prices(&mut self, ticker: &str, mut points: Vec<PricePoint>) -> Result<()> {
        self.require(ticker)?;
        for p in &points {
            check_price(ticker, p.price)?;
        }
        points.sort_by_key(|p| p.date);
        self.prices.insert(ticker.to_string(), points);
        Ok(())
    }

    /// Open constraints whose date is on or before `today`, in table order.
    pub fn deadline_alerts(&self, today: NaiveDate) -> Vec<Alert> {
        self.records
            .iter()
            .filter_map(|r| self.constraints.get(&r.ticker).map(|list| (r, list)))
            .flat_map(|(record, list)| {
                list.iter()
                    .filter(|c| c.status == ConstraintStatus::Open)
                    .filter_map(move |c| {
                        let date = c.date.filter(|d| *d <= today)?;
                        Some(Alert {
                            ticker: record.ticker.clone(),
                            kind: AlertKind::DeadlineCrossing,
                            date: today,
                            message: format!("{} still open past {date}", c.name),
                        })
                    })
            })
            .collect()
    }

    fn require(&self, ticker: &str) -> Result<usize> {
        self.index
            .get(ticker)
            .copied()
            .ok_or_else(|| DataError::not_found(ticker))
    }
}

fn check_price(ticker: &str, price: f64) -> Result<()> {
    if (0.0..=1.0).contains(&price) {
        Ok(())
    } else {
        Err(DataError::InvalidPrice {
            ticker: ticker.to_string(),
            price,
        })
    }
}

impl MarketDataSource for RecordStore {
    fn records(&self) -> Vec<MarketRecord> {
        self.records.clone()
    }

    fn record(&self, ticker: &str) -> Result<MarketRecord> {
        let i = self.require(ticker)?;
        Ok(self.records[i].clone())
    }

    fn constraints(&self, ticker: &str) -> Result<Vec<Constraint>> {
        self.require(ticker)?;
        Ok(self.constraints.get(ticker).cloned().unwrap_or_default())
    }

    fn paths(&self, ticker: &str) -> Result<PathSet> {
        self.require(ticker)?;
        Ok(self.paths.get(ticker).cloned().unwrap_or_default())
    }

    fn events(&self, ticker: &str) -> Result<Vec<MarketEvent>> {
        self.require(ticker)?;
        Ok(self.events.get(ticker).cloned().unwrap_or_default())
    }

    fn price_history(&self, ticker: &str, end: NaiveDate) -> Result<Vec<PricePoint>> {
        self.require(ticker)?;
        match self.prices.get(ticker) {
            Some(points) => Ok(points.iter().filter(|p| p.date <= end).copied().collect()),
            None => self.generator.generate(ticker, end),
        }
    }
}
