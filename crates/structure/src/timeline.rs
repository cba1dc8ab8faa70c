use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Impact, MarketEvent, PricePoint};

const MARKER_LABEL_CHARS: usize = 30;

/// An event pinned to the price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    pub date: NaiveDate,
    pub price: f64,
    /// Index into the series the marker was attached to.
    pub point_index: usize,
    pub impact: Impact,
    pub label: String,
    pub description: String,
}

/// Attach each event to the nearest point of `series` by date.
///
/// Events dated before the first point are skipped. Ties go to the earliest point
/// in series order. Events after the last point attach to the last point.
pub fn attach_markers(events: &[MarketEvent], series: &[PricePoint]) -> Vec<EventMarker> {
    let Some(earliest) = series.iter().map(|p| p.date).min() else {
        return Vec::new();
    };

    events
        .iter()
        .filter(|e| e.date >= earliest)
        .filter_map(|e| {
            let (point_index, point) = nearest_point(series, e.date)?;
            Some(EventMarker {
                date: e.date,
                price: point.price,
                point_index,
                impact: e.impact,
                label: e.description.chars().take(MARKER_LABEL_CHARS).collect(),
                description: e.description.clone(),
            })
        })
        .collect()
}

fn nearest_point(series: &[PricePoint], date: NaiveDate) -> Option<(usize, &PricePoint)> {
    let mut best: Option<(usize, &PricePoint, i64)> = None;
    for (i, point) in series.iter().enumerate() {
        let distance = (point.date - date).num_days().abs();
        // strict < keeps the first point on ties
        let closer = match best {
            None => true,
            Some((_, _, d)) => distance < d,
        };
        if closer {
            best = Some((i, point, distance));
        }
    }
    best.map(|(i, p, _)| (i, p))
}
