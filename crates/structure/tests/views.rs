use chrono::NaiveDate;
use std::collections::BTreeSet;

use structure::filter::FilterSpec;
use structure::price_history::PriceHistoryGenerator;
use structure::sample::sample_store;
use structure::types::{ConstraintStatus, MarketStatus, PricePoint, Tier};
use structure::view::{DashboardView, DetailView, StructuralNotice, View, ViewState};
use structure::{DataError, MarketDataSource, RecordStore};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 20).unwrap()
}

fn store() -> RecordStore {
    sample_store(PriceHistoryGenerator::new(90, Some(11)).unwrap()).unwrap()
}

fn initial_state(store: &RecordStore, tier: Tier) -> ViewState {
    ViewState::new(tier, FilterSpec::defaults_for(&store.records()))
}

fn dashboard(state: &ViewState, store: &RecordStore) -> DashboardView {
    match state.render(store, as_of()).unwrap() {
        View::Dashboard(d) => d,
        View::Detail(_) => panic!("expected dashboard"),
    }
}

fn detail(state: &ViewState, store: &RecordStore) -> DetailView {
    match state.render(store, as_of()).unwrap() {
        View::Detail(d) => *d,
        View::Dashboard(_) => panic!("expected detail"),
    }
}

#[test]
fn default_dashboard_metrics() {
    let store = store();
    let state = initial_state(&store, Tier::Pro);
    assert_eq!(
        state.filter.categories,
        BTreeSet::from(["Elections".into(), "Legal".into(), "Congress".into()])
    );

    let view = dashboard(&state, &store);
    assert_eq!(view.metrics.active, 7);
    assert_eq!(view.metrics.high_certainty, 3);
    assert_eq!(view.metrics.lag_detected, 3);
    let volume: u64 = view.rows.iter().map(|r| r.record.volume).sum();
    assert_eq!(view.metrics.total_volume, volume);
    assert_eq!(view.metrics.total_volume, 1_042_000);

    let high: Vec<_> = view
        .rows
        .iter()
        .filter(|r| r.record.high_certainty())
        .map(|r| r.record.ticker.as_str())
        .collect();
    assert_eq!(high, vec!["PRES-2024-DEM", "PRES-2024-GOP", "IMPEACH-2024"]);
}

#[test]
fn resolved_status_and_toggles_change_totals() {
    let store = store();
    let mut filter = FilterSpec::defaults_for(&store.records());
    filter.statuses = BTreeSet::from([MarketStatus::Resolved]);
    let view = dashboard(&initial_state(&store, Tier::Pro).with_filter(filter), &store);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.metrics.active, 0);
    assert_eq!(view.metrics.total_volume, 92_000);

    let mut filter = FilterSpec::defaults_for(&store.records());
    filter.include_lag = false;
    filter.include_high_certainty = false;
    let view = dashboard(&initial_state(&store, Tier::Pro).with_filter(filter), &store);
    let tickers: Vec<_> = view.rows.iter().map(|r| r.record.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["SCOTUS-2024-TERM"]);
    assert_eq!(view.metrics.total_volume, 28_000);
}

#[test]
fn dashboard_rows_carry_derived_path_counts() {
    let store = store();
    let view = dashboard(&initial_state(&store, Tier::Free), &store);
    let senate = view
        .rows
        .iter()
        .find(|r| r.record.ticker == "SENATE-2024-CONTROL")
        .unwrap();
    assert_eq!((senate.paths.yes, senate.paths.no), (3, 2));
}

#[test]
fn priority_signals_only_for_pro_plus() {
    let store = store();
    assert!(dashboard(&initial_state(&store, Tier::Free), &store).priority.is_none());
    assert!(dashboard(&initial_state(&store, Tier::Pro), &store).priority.is_none());

    let view = dashboard(&initial_state(&store, Tier::ProPlus), &store);
    let signals = view.priority.unwrap();
    let lag: Vec<_> = signals.lag_detected.iter().map(|r| r.record.ticker.as_str()).collect();
    assert_eq!(lag, vec!["SENATE-2024-CONTROL", "GOV-2024-NC", "TX-BORDER-2024"]);
    assert_eq!(signals.high_certainty.len(), 3);
}

#[test]
fn priority_signals_drawn_from_filtered_set() {
    let store = store();
    let filter = FilterSpec::defaults_for(&store.records()).only_category("Congress");
    let view = dashboard(&initial_state(&store, Tier::ProPlus).with_filter(filter), &store);
    let signals = view.priority.unwrap();
    assert!(signals.lag_detected.is_empty());
    assert_eq!(signals.high_certainty.len(), 1);
    assert_eq!(signals.high_certainty[0].record.ticker, "IMPEACH-2024");
}

#[test]
fn free_tier_sees_no_constraints_paths_or_events() {
    let store = store();
    let state = initial_state(&store, Tier::Free).select("SENATE-2024-CONTROL");
    let view = detail(&state, &store);
    assert!(view.constraints.is_none());
    assert!(view.paths.is_none());
    assert!(view.events.is_none());
    assert!(view.chart.markers.is_empty());
    assert_eq!(view.chart.series.len(), 90);
    assert!(view.alerts.is_none());
}

#[test]
fn pro_tier_sees_full_constraint_sequence() {
    let store = store();
    let state = initial_state(&store, Tier::Pro).select("SENATE-2024-CONTROL");
    let view = detail(&state, &store);
    let constraints = view.constraints.unwrap();
    assert_eq!(constraints.len(), 4);
    assert_eq!(constraints[0].status, ConstraintStatus::Passed);
    assert_eq!(view.paths.unwrap().yes_paths.len(), 3);
    assert_eq!(view.events.unwrap().len(), 5);
    assert_eq!(view.notice, Some(StructuralNotice::LagDetected));
    assert!(view.alerts.is_some());
}

#[test]
fn pro_chart_markers_track_events_inside_series() {
    let store = store();
    let view = detail(&initial_state(&store, Tier::Pro).select("GOV-2024-NC"), &store);
    // All four sample events fall inside the 90 days ending 2024-08-20.
    assert_eq!(view.chart.markers.len(), 4);
    for marker in &view.chart.markers {
        let point = &view.chart.series[marker.point_index];
        assert_eq!(point.date, marker.date);
        assert_eq!(point.price, marker.price);
    }
}

#[test]
fn marker_uses_recorded_price_on_event_date() {
    let mut store = store();
    let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let points: Vec<_> = (0..50)
        .map(|i| PricePoint {
            date: start + chrono::Duration::days(i),
            price: 0.40 + f64::from(i as u8) / 1000.0,
        })
        .collect();
    store.record_prices("TX-BORDER-2024", points).unwrap();

    let view = detail(&initial_state(&store, Tier::ProPlus).select("TX-BORDER-2024"), &store);
    let doj = view
        .chart
        .markers
        .iter()
        .find(|m| m.description == "DOJ brief filed")
        .unwrap();
    // 2024-08-18 is day 48 of the recorded series.
    assert_eq!(doj.price, 0.40 + 48.0 / 1000.0);
}

#[test]
fn high_certainty_market_gets_resolved_notice() {
    let store = store();
    let view = detail(&initial_state(&store, Tier::Free).select("PRES-2024-DEM"), &store);
    assert_eq!(view.notice, Some(StructuralNotice::StructurallyResolved));
    let view = detail(&initial_state(&store, Tier::Free).select("SCOTUS-2024-TERM"), &store);
    assert_eq!(view.notice, None);
}

#[test]
fn unknown_ticker_detail_is_not_found() {
    let store = store();
    let state = initial_state(&store, Tier::Pro).select("MARS-2030");
    assert_eq!(
        state.render(&store, as_of()),
        Err(DataError::not_found("MARS-2030"))
    );
}

#[test]
fn known_ticker_without_constraints_is_empty_not_placeholder() {
    let store = store();
    let view = detail(&initial_state(&store, Tier::Pro).select("SCOTUS-2024-TERM"), &store);
    assert_eq!(view.constraints, Some(vec![]));
}

#[test]
fn select_then_back_restores_state() {
    let store = store();
    let mut filter = FilterSpec::defaults_for(&store.records()).only_category("Legal");
    filter.include_lag = false;
    let before = initial_state(&store, Tier::ProPlus).with_filter(filter);

    let after = before.clone().select("SCOTUS-2024-TERM").back();
    assert_eq!(after, before);
    assert_eq!(dashboard(&after, &store), dashboard(&before, &store));
}

#[test]
fn tier_change_keeps_selection() {
    let store = store();
    let state = initial_state(&store, Tier::Free)
        .select("GOV-2024-NC")
        .with_tier(Tier::Pro);
    assert_eq!(state.selected_market.as_deref(), Some("GOV-2024-NC"));
    assert!(detail(&state, &store).constraints.is_some());
}
