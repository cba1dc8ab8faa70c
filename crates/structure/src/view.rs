//! Tier-gated views over a [`MarketDataSource`].
//!
//! [`ViewState`] is the whole interactive state: tier, filter, alert preferences and
//! the selected market. Interactions take a state and return the next one; rendering
//! a state is a pure read of the source.

use chrono::NaiveDate;
use serde::Serialize;

use crate::alerts::AlertPreferences;
use crate::error::Result;
use crate::filter::FilterSpec;
use crate::source::MarketDataSource;
use crate::timeline::{attach_markers, EventMarker};
use crate::types::{
    Constraint, MarketEvent, MarketRecord, MarketStatus, PathCounts, PathSet, PricePoint, Tier,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub tier: Tier,
    pub filter: FilterSpec,
    pub alerts: AlertPreferences,
    pub selected_market: Option<String>,
}

impl ViewState {
    pub fn new(tier: Tier, filter: FilterSpec) -> Self {
        Self {
            tier,
            filter,
            alerts: AlertPreferences::default(),
            selected_market: None,
        }
    }

    /// Dashboard -> detail.
    pub fn select(self, ticker: &str) -> Self {
        Self {
            selected_market: Some(ticker.to_string()),
            ..self
        }
    }

    /// Detail -> dashboard. Filter and tier are untouched.
    pub fn back(self) -> Self {
        Self {
            selected_market: None,
            ..self
        }
    }

    /// Switching tier keeps the current selection.
    pub fn with_tier(self, tier: Tier) -> Self {
        Self { tier, ..self }
    }

    pub fn with_filter(self, filter: FilterSpec) -> Self {
        Self { filter, ..self }
    }

    pub fn render(&self, source: &dyn MarketDataSource, as_of: NaiveDate) -> Result<View> {
        match &self.selected_market {
            None => self.render_dashboard(source).map(View::Dashboard),
            Some(ticker) => self
                .render_detail(source, ticker, as_of)
                .map(|d| View::Detail(Box::new(d))),
        }
    }

    /// Dashboard for the current filter, whatever is selected.
    pub fn render_dashboard(&self, source: &dyn MarketDataSource) -> Result<DashboardView> {
        dashboard(self, source)
    }

    /// Detail panel for `ticker` under the current tier.
    pub fn render_detail(
        &self,
        source: &dyn MarketDataSource,
        ticker: &str,
        as_of: NaiveDate,
    ) -> Result<DetailView> {
        detail(self, source, ticker, as_of)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Dashboard(DashboardView),
    Detail(Box<DetailView>),
}

/// A record with its path counts derived from the path lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRow {
    #[serde(flatten)]
    pub record: MarketRecord,
    pub paths: PathCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub active: usize,
    pub lag_detected: usize,
    pub high_certainty: usize,
    pub total_volume: u64,
}

impl SummaryMetrics {
    pub fn from_rows(rows: &[MarketRow]) -> Self {
        rows.iter().fold(Self::default(), |mut m, row| {
            let r = &row.record;
            if r.status == MarketStatus::Active {
                m.active += 1;
            }
            if r.lag_detected() {
                m.lag_detected += 1;
            }
            if r.high_certainty() {
                m.high_certainty += 1;
            }
            m.total_volume += r.volume;
            m
        })
    }
}

/// Curated slices of the filtered set shown to pro_plus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritySignals {
    pub lag_detected: Vec<MarketRow>,
    pub high_certainty: Vec<MarketRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub tier: Tier,
    pub rows: Vec<MarketRow>,
    pub metrics: SummaryMetrics,
    pub priority: Option<PrioritySignals>,
    pub alerts: Option<AlertPreferences>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralNotice {
    LagDetected,
    StructurallyResolved,
}

impl StructuralNotice {
    pub fn for_record(record: &MarketRecord) -> Option<Self> {
        if record.lag_detected() {
            Some(Self::LagDetected)
        } else if record.high_certainty() {
            Some(Self::StructurallyResolved)
        } else {
            None
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::LagDetected => "Market Lag Detected",
            Self::StructurallyResolved => "Structurally Resolved",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Self::LagDetected => {
                "Structure suggests different certainty than current price implies. \
                 Review constraint status and path count below."
            }
            Self::StructurallyResolved => {
                "Procedural and legal constraints indicate high outcome certainty. \
                 Limited remaining paths for alternative outcomes."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceChart {
    pub series: Vec<PricePoint>,
    pub markers: Vec<EventMarker>,
}

/// Gated sections are `None` when the tier may not see them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub tier: Tier,
    pub market: MarketRow,
    pub notice: Option<StructuralNotice>,
    pub constraints: Option<Vec<Constraint>>,
    pub paths: Option<PathSet>,
    pub events: Option<Vec<MarketEvent>>,
    pub chart: PriceChart,
    pub alerts: Option<AlertPreferences>,
}

fn row(source: &dyn MarketDataSource, record: MarketRecord) -> Result<MarketRow> {
    let paths = source.paths(&record.ticker)?.counts();
    Ok(MarketRow { record, paths })
}

fn dashboard(state: &ViewState, source: &dyn MarketDataSource) -> Result<DashboardView> {
    let rows = state
        .filter
        .apply(&source.records())
        .into_iter()
        .map(|r| row(source, r))
        .collect::<Result<Vec<_>>>()?;
    let metrics = SummaryMetrics::from_rows(&rows);

    let priority = state.tier.sees_priority_signals().then(|| PrioritySignals {
        lag_detected: rows
            .iter()
            .filter(|r| r.record.lag_detected())
            .cloned()
            .collect(),
        high_certainty: rows
            .iter()
            .filter(|r| r.record.high_certainty())
            .cloned()
            .collect(),
    });

    Ok(DashboardView {
        tier: state.tier,
        rows,
        metrics,
        priority,
        alerts: state.tier.sees_events().then_some(state.alerts),
    })
}

fn detail(
    state: &ViewState,
    source: &dyn MarketDataSource,
    ticker: &str,
    as_of: NaiveDate,
) -> Result<DetailView> {
    let tier = state.tier;
    let market = row(source, source.record(ticker)?)?;
    let notice = StructuralNotice::for_record(&market.record);

    let constraints = if tier.sees_structure() {
        Some(source.constraints(ticker)?)
    } else {
        None
    };
    let paths = if tier.sees_structure() {
        Some(source.paths(ticker)?)
    } else {
        None
    };
    let events = if tier.sees_events() {
        Some(source.events(ticker)?)
    } else {
        None
    };

    let series = source.price_history(ticker, as_of)?;
    let markers = events
        .as_deref()
        .map(|events| attach_markers(events, &series))
        .unwrap_or_default();

    tracing::debug!(
        ticker,
        tier = tier.as_str(),
        points = series.len(),
        markers = markers.len(),
        "rendered detail view"
    );

    Ok(DetailView {
        tier,
        market,
        notice,
        constraints,
        paths,
        events,
        chart: PriceChart { series, markers },
        alerts: tier.sees_events().then_some(state.alerts),
    })
}
