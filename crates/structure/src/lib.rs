//! Structural model for political prediction markets: records, constraints,
//! outcome paths and event timelines, plus the tier-gated views built over them.

pub mod alerts;
pub mod config;
pub mod error;
pub mod filter;
pub mod observability;
pub mod price_history;
pub mod sample;
pub mod source;
pub mod store;
pub mod timeline;
pub mod types;
pub mod view;

pub use error::{DataError, Result};
pub use source::MarketDataSource;
pub use store::RecordStore;
pub use view::{View, ViewState};
