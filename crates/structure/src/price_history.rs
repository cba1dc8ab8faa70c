//! Synthetic daily price series for markets without recorded history.
//!
//! With a seed, each ticker gets its own reproducible series: the seed and the
//! ticker are hashed into a per-ticker sub-seed, so adding or reordering markets
//! never changes another market's chart. Without a seed every call draws fresh.

use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::Normal;

use crate::error::DataError;
use crate::types::PricePoint;

pub const DEFAULT_DAYS: usize = 90;
/// Ten years of daily points.
pub const MAX_DAYS: usize = 3650;
const DAILY_STEP_SIGMA: f64 = 0.02;
const START_RANGE: (f64, f64) = (0.3, 0.7);
const FLOOR: f64 = 0.01;
const CEILING: f64 = 0.99;

#[derive(Debug, Clone)]
pub struct PriceHistoryGenerator {
    days: usize,
    seed: Option<u64>,
    step: Normal,
}

impl PriceHistoryGenerator {
    pub fn new(days: usize, seed: Option<u64>) -> Result<Self> {
        if days == 0 {
            bail!("price history needs at least one day");
        }
        if days > MAX_DAYS {
            bail!("price history is limited to {MAX_DAYS} days, got {days}");
        }
        let step = Normal::new(0.0, DAILY_STEP_SIGMA)?;
        Ok(Self { days, seed, step })
    }

    pub fn days(&self) -> usize {
        self.days
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Derive the per-ticker seed. Independent of call order.
    pub fn sub_seed(seed: u64, ticker: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&seed.to_le_bytes());
        hasher.update(ticker.as_bytes());
        let hash = hasher.finalize();
        let mut first = [0u8; 8];
        first.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(first)
    }

    /// `days` consecutive daily points ending at `end`, oldest first.
    pub fn generate(&self, ticker: &str, end: NaiveDate) -> crate::Result<Vec<PricePoint>> {
        let start = i64::try_from(self.days - 1)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|span| end.checked_sub_signed(span))
            .ok_or_else(|| DataError::HistoryOutOfRange {
                ticker: ticker.to_string(),
                end,
            })?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(Self::sub_seed(seed, ticker)),
            None => StdRng::from_entropy(),
        };

        let mut current = rng.gen_range(START_RANGE.0..=START_RANGE.1);
        Ok((0..self.days)
            .map(|i| {
                current = (current + self.step.sample(&mut rng)).clamp(FLOOR, CEILING);
                PricePoint {
                    date: start + Duration::days(i as i64),
                    price: current,
                }
            })
            .collect())
    }
}
