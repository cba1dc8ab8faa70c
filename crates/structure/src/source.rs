use chrono::NaiveDate;

use crate::error::Result;
use crate::types::{Constraint, MarketEvent, MarketRecord, PathSet, PricePoint};

/// Read side of the market data. The view layer only talks to this trait, so an
/// ingestion-backed adapter can replace the in-memory store without touching it.
///
/// Every per-ticker lookup fails with `DataError::NotFound` for a ticker the
/// source has never seen. A known ticker with nothing ingested yields an empty list.
pub trait MarketDataSource {
    /// All records in insertion order.
    fn records(&self) -> Vec<MarketRecord>;

    fn record(&self, ticker: &str) -> Result<MarketRecord>;

    /// Milestones in logical order.
    fn constraints(&self, ticker: &str) -> Result<Vec<Constraint>>;

    fn paths(&self, ticker: &str) -> Result<PathSet>;

    /// Newest first.
    fn events(&self, ticker: &str) -> Result<Vec<MarketEvent>>;

    /// Daily points ending at `end`, oldest first.
    fn price_history(&self, ticker: &str, end: NaiveDate) -> Result<Vec<PricePoint>>;
}
