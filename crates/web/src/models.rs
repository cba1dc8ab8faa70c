//! View models for dashboard templates.
//! Display strings and link targets only; the view itself comes from `structure::view`.

use structure::alerts::AlertKind;
use structure::filter::FilterSpec;
use structure::timeline::EventMarker;
use structure::types::{
    Constraint, MarketRecord, MarketStatus, OutcomePath, PathSet, PricePoint, Tier,
};
use structure::view::{DashboardView, DetailView, MarketRow, StructuralNotice, SummaryMetrics};
use structure::ViewState;

use crate::params::{href, query};

/// Quick access presets: (category, icon).
const QUICK_ACCESS: [(&str, &str); 3] = [
    ("Elections", "📊"),
    ("Legal", "⚖️"),
    ("Congress", "🏛️"),
];

pub const CHART_WIDTH: f64 = 800.0;
pub const CHART_HEIGHT: f64 = 320.0;
const CHART_PAD: f64 = 12.0;

/// `0.92` -> `$0.92`
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// `245000` -> `$245,000`
pub fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}

/// A sidebar entry: following `href` applies the entry.
pub struct Link {
    pub label: String,
    pub href: String,
    pub active: bool,
}

pub struct Sidebar {
    pub tier_label: &'static str,
    pub tiers: Vec<Link>,
    pub categories: Vec<Link>,
    pub statuses: Vec<Link>,
    pub signals: Vec<Link>,
    pub quick_access: Vec<Link>,
    /// `None` renders the upgrade prompt.
    pub alerts: Option<Vec<Link>>,
}

fn with_filter(state: &ViewState, edit: impl FnOnce(&mut FilterSpec)) -> String {
    let mut filter = state.filter.clone();
    edit(&mut filter);
    href(&state.clone().with_filter(filter))
}

impl Sidebar {
    pub fn build(state: &ViewState, known_categories: &[String]) -> Self {
        let tiers = Tier::ALL
            .iter()
            .map(|&tier| Link {
                label: tier.label().to_string(),
                href: href(&state.clone().with_tier(tier)),
                active: tier == state.tier,
            })
            .collect();

        let categories = known_categories
            .iter()
            .map(|category| Link {
                label: category.clone(),
                href: with_filter(state, |f| {
                    if !f.categories.remove(category) {
                        f.categories.insert(category.clone());
                    }
                }),
                active: state.filter.categories.contains(category),
            })
            .collect();

        let statuses = MarketStatus::ALL
            .iter()
            .map(|&status| Link {
                label: status.as_str().to_string(),
                href: with_filter(state, |f| {
                    if !f.statuses.remove(&status) {
                        f.statuses.insert(status);
                    }
                }),
                active: state.filter.statuses.contains(&status),
            })
            .collect();

        let f = &state.filter;
        let signals = vec![
            Link {
                label: "🔶 Lag Detected".to_string(),
                href: with_filter(state, |f| f.include_lag = !f.include_lag),
                active: f.include_lag,
            },
            Link {
                label: "🔴 Recent Path Collapse".to_string(),
                href: with_filter(state, |f| f.include_path_collapse = !f.include_path_collapse),
                active: f.include_path_collapse,
            },
            Link {
                label: "🟢 High Certainty".to_string(),
                href: with_filter(state, |f| f.include_high_certainty = !f.include_high_certainty),
                active: f.include_high_certainty,
            },
        ];

        let quick_access = QUICK_ACCESS
            .iter()
            .filter(|(category, _)| known_categories.iter().any(|c| c == category))
            .map(|(category, icon)| {
                let only = f.only_category(category);
                Link {
                    label: format!("{icon} {category}"),
                    active: f.categories == only.categories,
                    href: href(&state.clone().with_filter(only)),
                }
            })
            .collect();

        let alerts = state.tier.sees_events().then(|| {
            AlertKind::ALL
                .iter()
                .map(|&kind| {
                    let mut toggled = state.clone();
                    toggled.alerts.set(kind, !state.alerts.enabled(kind));
                    Link {
                        label: kind.label().to_string(),
                        href: href(&toggled),
                        active: state.alerts.enabled(kind),
                    }
                })
                .collect::<Vec<_>>()
        });

        Self {
            tier_label: state.tier.label(),
            tiers,
            categories,
            statuses,
            signals,
            quick_access,
            alerts,
        }
    }
}

pub struct MetricsModel {
    pub active: usize,
    pub lag_detected: usize,
    /// Shown under the lag count when there is something to look at.
    pub lag_delta: Option<&'static str>,
    pub high_certainty: usize,
    pub total_volume: String,
}

impl From<&SummaryMetrics> for MetricsModel {
    fn from(m: &SummaryMetrics) -> Self {
        Self {
            active: m.active,
            lag_detected: m.lag_detected,
            lag_delta: (m.lag_detected > 0).then_some("Review"),
            high_certainty: m.high_certainty,
            total_volume: format_usd(m.total_volume),
        }
    }
}

/// Row in the market list
pub struct RowModel {
    pub indicator: &'static str,
    pub title: String,
    pub ticker: String,
    pub category: String,
    pub subcategory: String,
    pub price: String,
    pub paths: String,
    pub certainty_badge: &'static str,
    pub certainty: &'static str,
    pub volume: String,
    pub summary: String,
    pub href: String,
}

impl RowModel {
    fn new(row: &MarketRow, state: &ViewState) -> Self {
        let r = &row.record;
        Self {
            indicator: r.indicator(),
            title: r.title.clone(),
            ticker: r.ticker.clone(),
            category: r.category.clone(),
            subcategory: r.subcategory.clone(),
            price: format_price(r.yes_price),
            paths: format!("{} / {}", row.paths.yes, row.paths.no),
            certainty_badge: r.structural_certainty.badge(),
            certainty: r.structural_certainty.title(),
            volume: format_usd(r.volume),
            summary: r.constraint_summary.clone(),
            href: href(&state.clone().select(&r.ticker)),
        }
    }
}

pub struct SignalCard {
    pub title: String,
    pub detail: String,
    pub href: String,
}

pub struct PriorityModel {
    pub lag_detected: Vec<SignalCard>,
    pub high_certainty: Vec<SignalCard>,
}

pub struct DashboardModel {
    pub metrics: MetricsModel,
    pub rows: Vec<RowModel>,
    pub priority: Option<PriorityModel>,
    /// htmx refresh target for the list fragment.
    pub partial_href: String,
}

impl DashboardModel {
    pub fn new(view: &DashboardView, state: &ViewState) -> Self {
        let card = |row: &MarketRow, detail: String| SignalCard {
            title: row.record.title.clone(),
            detail,
            href: href(&state.clone().select(&row.record.ticker)),
        };
        let priority = view.priority.as_ref().map(|p| PriorityModel {
            lag_detected: p
                .lag_detected
                .iter()
                .map(|row| {
                    let r = &row.record;
                    card(
                        row,
                        format!("Price: {} • {}", format_price(r.yes_price), r.constraint_summary),
                    )
                })
                .collect(),
            high_certainty: p
                .high_certainty
                .iter()
                .map(|row| {
                    card(
                        row,
                        format!(
                            "Price: {} • Paths: {}Y / {}N",
                            format_price(row.record.yes_price),
                            row.paths.yes,
                            row.paths.no
                        ),
                    )
                })
                .collect(),
        });

        Self {
            metrics: MetricsModel::from(&view.metrics),
            rows: view.rows.iter().map(|r| RowModel::new(r, state)).collect(),
            priority,
            partial_href: format!("/partials/markets?{}", query(&state.clone().back())),
        }
    }
}

pub struct NoticeModel {
    pub icon: &'static str,
    pub headline: &'static str,
    pub body: &'static str,
    pub css: &'static str,
}

impl From<StructuralNotice> for NoticeModel {
    fn from(notice: StructuralNotice) -> Self {
        let (icon, css) = match notice {
            StructuralNotice::LagDetected => ("⚠️", "border-orange-500 bg-orange-950/40"),
            StructuralNotice::StructurallyResolved => ("✅", "border-green-500 bg-green-950/40"),
        };
        Self {
            icon,
            headline: notice.headline(),
            body: notice.body(),
            css,
        }
    }
}

pub struct ConstraintModel {
    pub icon: &'static str,
    pub name: String,
    pub status: String,
    pub date: Option<String>,
    pub notes: String,
}

impl From<&Constraint> for ConstraintModel {
    fn from(c: &Constraint) -> Self {
        Self {
            icon: c.status.icon(),
            name: c.name.clone(),
            status: c.status.as_str().to_uppercase(),
            date: c.date.map(|d| d.to_string()),
            notes: c.notes.clone(),
        }
    }
}

pub struct PathModel {
    pub badge: &'static str,
    pub description: String,
}

pub struct CollapsedModel {
    pub description: String,
    pub date: String,
    pub reason: String,
}

pub struct PathsModel {
    pub yes: Vec<PathModel>,
    pub no: Vec<PathModel>,
    pub collapsed: Vec<CollapsedModel>,
}

impl From<&PathSet> for PathsModel {
    fn from(set: &PathSet) -> Self {
        let side = |paths: &[OutcomePath]| -> Vec<PathModel> {
            paths
                .iter()
                .map(|p| PathModel {
                    badge: p.probability_band.badge(),
                    description: p.description.clone(),
                })
                .collect()
        };
        Self {
            yes: side(&set.yes_paths),
            no: side(&set.no_paths),
            collapsed: set
                .recently_collapsed
                .iter()
                .map(|c| CollapsedModel {
                    description: c.description.clone(),
                    date: c.collapsed_date.to_string(),
                    reason: c.reason.clone(),
                })
                .collect(),
        }
    }
}

pub struct EventModel {
    pub date: String,
    pub icon: &'static str,
    pub description: String,
}

pub struct MarkerModel {
    pub x: String,
    pub y: String,
    pub color: &'static str,
    /// Hover text: date and truncated description.
    pub title: String,
}

/// Price history as an SVG polyline, YES price on a fixed 0..1 axis.
pub struct ChartModel {
    pub width: f64,
    pub height: f64,
    pub points: String,
    pub markers: Vec<MarkerModel>,
    pub first_date: String,
    pub last_date: String,
}

fn chart_x(index: usize, len: usize) -> f64 {
    if len < 2 {
        return CHART_WIDTH / 2.0;
    }
    index as f64 * CHART_WIDTH / (len - 1) as f64
}

fn chart_y(price: f64) -> f64 {
    CHART_PAD + (1.0 - price.clamp(0.0, 1.0)) * (CHART_HEIGHT - 2.0 * CHART_PAD)
}

impl ChartModel {
    pub fn new(series: &[PricePoint], markers: &[EventMarker]) -> Self {
        let points = series
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:.1},{:.1}", chart_x(i, series.len()), chart_y(p.price)))
            .collect::<Vec<_>>()
            .join(" ");
        let markers = markers
            .iter()
            .map(|m| MarkerModel {
                x: format!("{:.1}", chart_x(m.point_index, series.len())),
                y: format!("{:.1}", chart_y(m.price)),
                color: m.impact.color(),
                title: format!("{} • {}", m.date, m.label),
            })
            .collect();
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            points,
            markers,
            first_date: series.first().map(|p| p.date.to_string()).unwrap_or_default(),
            last_date: series.last().map(|p| p.date.to_string()).unwrap_or_default(),
        }
    }
}

pub struct DetailModel {
    pub title: String,
    pub ticker: String,
    pub expiration: String,
    pub price: String,
    pub notice: Option<NoticeModel>,
    pub constraints: Option<Vec<ConstraintModel>>,
    pub paths: Option<PathsModel>,
    pub events: Option<Vec<EventModel>>,
    pub chart: ChartModel,
    pub back_href: String,
}

impl DetailModel {
    pub fn new(view: &DetailView, state: &ViewState) -> Self {
        let record: &MarketRecord = &view.market.record;
        let constraints = view.constraints.as_ref().map(|list| {
            if list.is_empty() {
                vec![ConstraintModel::from(&Constraint::pending())]
            } else {
                list.iter().map(ConstraintModel::from).collect()
            }
        });
        let events = view.events.as_ref().map(|events| {
            events
                .iter()
                .map(|e| EventModel {
                    date: e.date.to_string(),
                    icon: e.impact.icon(),
                    description: e.description.clone(),
                })
                .collect::<Vec<_>>()
        });

        Self {
            title: record.title.clone(),
            ticker: record.ticker.clone(),
            expiration: record.expiration.to_string(),
            price: format_price(record.yes_price),
            notice: view.notice.map(NoticeModel::from),
            constraints,
            paths: view.paths.as_ref().map(PathsModel::from),
            events,
            chart: ChartModel::new(&view.chart.series, &view.chart.markers),
            back_href: href(&state.clone().back()),
        }
    }
}
