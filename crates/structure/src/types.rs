use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Active,
    Resolved,
}

impl MarketStatus {
    pub const ALL: [Self; 2] = [Self::Active, Self::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }
}

impl FromStr for MarketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown market status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LagStatus {
    #[serde(rename = "none")]
    Clear,
    #[serde(rename = "detected")]
    Detected,
}

impl LagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "none",
            Self::Detected => "detected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Certainty {
    High,
    Medium,
    Low,
    Resolved,
}

impl Certainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Resolved => "resolved",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Resolved => "Resolved",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Self::High => "🟢",
            Self::Medium => "🟡",
            Self::Low => "🔴",
            Self::Resolved => "✅",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintStatus {
    Passed,
    Open,
    Blocked,
    Resolved,
}

impl ConstraintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Open => "open",
            Self::Blocked => "blocked",
            Self::Resolved => "resolved",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Passed | Self::Resolved => "✅",
            Self::Open => "🔶",
            Self::Blocked => "🔴",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathStatus {
    Viable,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityBand {
    High,
    Medium,
    Low,
}

impl ProbabilityBand {
    pub fn badge(&self) -> &'static str {
        match self {
            Self::High => "🟢",
            Self::Medium => "🟡",
            Self::Low => "🔴",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

impl Impact {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Positive => "📈",
            Self::Negative => "📉",
            Self::Neutral => "➡️",
        }
    }

    /// Chart marker colour.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Positive => "green",
            Self::Negative => "red",
            Self::Neutral => "gray",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription level. Controls which structural data a view exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    #[default]
    Pro,
    ProPlus,
}

impl Tier {
    pub const ALL: [Self; 3] = [Self::Free, Self::Pro, Self::ProPlus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::ProPlus => "pro_plus",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Free => "🆓 Free",
            Self::Pro => "⭐ Pro",
            Self::ProPlus => "💎 Pro+",
        }
    }

    /// Constraints and paths.
    pub fn sees_structure(&self) -> bool {
        *self != Self::Free
    }

    /// Event timeline, chart markers and alerts.
    pub fn sees_events(&self) -> bool {
        matches!(self, Self::Pro | Self::ProPlus)
    }

    pub fn sees_priority_signals(&self) -> bool {
        *self == Self::ProPlus
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "pro_plus" => Ok(Self::ProPlus),
            other => Err(format!("unknown tier: {other}")),
        }
    }
}

/// One tradable contract. Path counts are not stored here; see [`PathSet::counts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub ticker: String,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub yes_price: f64,
    pub volume: u64,
    pub expiration: NaiveDate,
    pub status: MarketStatus,
    pub lag_status: LagStatus,
    pub structural_certainty: Certainty,
    pub constraint_summary: String,
}

impl MarketRecord {
    pub fn lag_detected(&self) -> bool {
        self.lag_status == LagStatus::Detected
    }

    pub fn high_certainty(&self) -> bool {
        self.structural_certainty == Certainty::High
    }

    /// Row marker on the dashboard list. Lag wins over certainty.
    pub fn indicator(&self) -> &'static str {
        if self.lag_detected() {
            "🔶"
        } else if self.high_certainty() {
            "🟢"
        } else if self.structural_certainty == Certainty::Low {
            "⚪"
        } else {
            ""
        }
    }
}

/// A market record as delivered by a data feed. Feeds may report path counts
/// of their own; those are checked against the ingested path lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub record: MarketRecord,
    pub reported_paths: Option<PathCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub status: ConstraintStatus,
    pub date: Option<NaiveDate>,
    pub notes: String,
}

impl Constraint {
    /// Display placeholder for a known market with nothing ingested yet.
    pub fn pending() -> Self {
        Self {
            name: "Data Pending".to_string(),
            status: ConstraintStatus::Open,
            date: None,
            notes: "Structural analysis in progress".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomePath {
    pub description: String,
    pub status: PathStatus,
    pub probability_band: ProbabilityBand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedPath {
    pub description: String,
    pub collapsed_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCounts {
    pub yes: usize,
    pub no: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSet {
    pub yes_paths: Vec<OutcomePath>,
    pub no_paths: Vec<OutcomePath>,
    pub recently_collapsed: Vec<CollapsedPath>,
}

impl PathSet {
    pub fn side(&self, side: Side) -> &[OutcomePath] {
        match side {
            Side::Yes => &self.yes_paths,
            Side::No => &self.no_paths,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut Vec<OutcomePath> {
        match side {
            Side::Yes => &mut self.yes_paths,
            Side::No => &mut self.no_paths,
        }
    }

    /// Viable paths per side. This is the only source of a market's path counts.
    pub fn counts(&self) -> PathCounts {
        let viable = |paths: &[OutcomePath]| {
            paths
                .iter()
                .filter(|p| p.status == PathStatus::Viable)
                .count()
        };
        PathCounts {
            yes: viable(&self.yes_paths),
            no: viable(&self.no_paths),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub date: NaiveDate,
    pub description: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(status: PathStatus) -> OutcomePath {
        OutcomePath {
            description: "x".to_string(),
            status,
            probability_band: ProbabilityBand::Low,
        }
    }

    #[test]
    fn test_tier_round_trips_through_str() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
        assert!("gold".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_gates() {
        assert!(!Tier::Free.sees_structure());
        assert!(!Tier::Free.sees_events());
        assert!(Tier::Pro.sees_structure());
        assert!(Tier::Pro.sees_events());
        assert!(!Tier::Pro.sees_priority_signals());
        assert!(Tier::ProPlus.sees_priority_signals());
    }

    #[test]
    fn test_path_counts_only_viable() {
        let set = PathSet {
            yes_paths: vec![path(PathStatus::Viable), path(PathStatus::Collapsed)],
            no_paths: vec![path(PathStatus::Viable), path(PathStatus::Viable)],
            recently_collapsed: vec![],
        };
        assert_eq!(set.counts(), PathCounts { yes: 1, no: 2 });
        assert_eq!(PathSet::default().counts(), PathCounts::default());
    }

    #[test]
    fn test_lag_status_serializes_as_none() {
        assert_eq!(serde_json::to_string(&LagStatus::Clear).unwrap(), "\"none\"");
        assert_eq!(LagStatus::Detected.as_str(), "detected");
    }

    #[test]
    fn test_market_status_parse() {
        assert_eq!("active".parse::<MarketStatus>(), Ok(MarketStatus::Active));
        assert!("closed".parse::<MarketStatus>().is_err());
    }
}
