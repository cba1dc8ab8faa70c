//! Structural alerts and their tier-gated delivery.
//!
//! Store mutations return the [`Alert`]s they imply; an [`AlertRouter`] decides
//! which of those reach a subscriber's [`AlertSink`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{DataError, Result};
use crate::types::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ConstraintChange,
    PathCollapse,
    LagDetection,
    DeadlineCrossing,
}

impl AlertKind {
    pub const ALL: [Self; 4] = [
        Self::ConstraintChange,
        Self::PathCollapse,
        Self::LagDetection,
        Self::DeadlineCrossing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConstraintChange => "constraint",
            Self::PathCollapse => "path",
            Self::LagDetection => "lag",
            Self::DeadlineCrossing => "deadline",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ConstraintChange => "Constraint Changes",
            Self::PathCollapse => "Path Collapses",
            Self::LagDetection => "Lag Detection",
            Self::DeadlineCrossing => "Deadline Crossings",
        }
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown alert kind: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub ticker: String,
    pub kind: AlertKind,
    pub date: NaiveDate,
    pub message: String,
}

/// Which alert kinds a subscriber wants. Everything is on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertPreferences {
    pub constraint_changes: bool,
    pub path_collapses: bool,
    pub lag_detection: bool,
    pub deadline_crossings: bool,
}

impl Default for AlertPreferences {
    fn default() -> Self {
        Self {
            constraint_changes: true,
            path_collapses: true,
            lag_detection: true,
            deadline_crossings: true,
        }
    }
}

impl AlertPreferences {
    pub fn none() -> Self {
        Self {
            constraint_changes: false,
            path_collapses: false,
            lag_detection: false,
            deadline_crossings: false,
        }
    }

    pub fn enabled(&self, kind: AlertKind) -> bool {
        match kind {
            AlertKind::ConstraintChange => self.constraint_changes,
            AlertKind::PathCollapse => self.path_collapses,
            AlertKind::LagDetection => self.lag_detection,
            AlertKind::DeadlineCrossing => self.deadline_crossings,
        }
    }

    pub fn set(&mut self, kind: AlertKind, on: bool) {
        match kind {
            AlertKind::ConstraintChange => self.constraint_changes = on,
            AlertKind::PathCollapse => self.path_collapses = on,
            AlertKind::LagDetection => self.lag_detection = on,
            AlertKind::DeadlineCrossing => self.deadline_crossings = on,
        }
    }

    /// Parse a comma list of enabled kinds, e.g. `constraint,lag`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut prefs = Self::none();
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind = part.parse::<AlertKind>().map_err(DataError::InvalidFilter)?;
            prefs.set(kind, true);
        }
        Ok(prefs)
    }

    pub fn enabled_kinds(&self) -> Vec<AlertKind> {
        AlertKind::ALL
            .into_iter()
            .filter(|k| self.enabled(*k))
            .collect()
    }
}

pub trait AlertSink {
    fn deliver(&self, alert: &Alert);
}

/// Writes alerts to the log. Stands in for email/push delivery.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn deliver(&self, alert: &Alert) {
        tracing::info!(
            ticker = %alert.ticker,
            kind = alert.kind.as_str(),
            date = %alert.date,
            "{}",
            alert.message
        );
    }
}

pub struct AlertRouter<S> {
    sink: S,
    tier: Tier,
    prefs: AlertPreferences,
}

impl<S: AlertSink> AlertRouter<S> {
    pub fn new(sink: S, tier: Tier, prefs: AlertPreferences) -> Self {
        Self { sink, tier, prefs }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Deliver what the subscriber's tier and preferences allow. Returns the number delivered.
    pub fn route(&self, alerts: &[Alert]) -> usize {
        if !self.tier.sees_events() {
            tracing::debug!(tier = self.tier.as_str(), dropped = alerts.len(), "alerts gated by tier");
            return 0;
        }
        let mut delivered = 0;
        for alert in alerts.iter().filter(|a| self.prefs.enabled(a.kind)) {
            self.sink.deliver(alert);
            delivered += 1;
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Collecting(RefCell<Vec<Alert>>);

    impl AlertSink for Collecting {
        fn deliver(&self, alert: &Alert) {
            self.0.borrow_mut().push(alert.clone());
        }
    }

    fn alert(kind: AlertKind) -> Alert {
        Alert {
            ticker: "GOV-2024-NC".to_string(),
            kind,
            date: NaiveDate::from_ymd_opt(2024, 8, 30).unwrap(),
            message: "Ballot Challenge: open -> blocked".to_string(),
        }
    }

    #[test]
    fn test_free_tier_receives_nothing() {
        let router = AlertRouter::new(Collecting::default(), Tier::Free, AlertPreferences::default());
        assert_eq!(router.route(&[alert(AlertKind::ConstraintChange)]), 0);
        assert!(router.sink().0.borrow().is_empty());
    }

    #[test]
    fn test_disabled_kinds_are_dropped() {
        let mut prefs = AlertPreferences::default();
        prefs.set(AlertKind::PathCollapse, false);
        let router = AlertRouter::new(Collecting::default(), Tier::Pro, prefs);
        let n = router.route(&[alert(AlertKind::PathCollapse), alert(AlertKind::LagDetection)]);
        assert_eq!(n, 1);
        assert_eq!(router.sink().0.borrow()[0].kind, AlertKind::LagDetection);
    }

    #[test]
    fn test_parse_preferences() {
        let prefs = AlertPreferences::parse("constraint, deadline").unwrap();
        assert_eq!(
            prefs.enabled_kinds(),
            vec![AlertKind::ConstraintChange, AlertKind::DeadlineCrossing]
        );
        assert_eq!(AlertPreferences::parse("").unwrap(), AlertPreferences::none());
        assert!(AlertPreferences::parse("sms").is_err());
    }
}
