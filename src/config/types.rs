//! Shared value types for the chart configuration surface.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub type Price = f64;

/// How the primary instrument is drawn. Candles and OHLC bars are only
/// legal while a single instrument is plotted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Candlestick,
    Ohlc,
}

impl ChartType {
    pub fn needs_ohlc(&self) -> bool {
        matches!(self, Self::Candlestick | Self::Ohlc)
    }
}

/// Absolute prices, or rebased to 100 at the window start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
pub enum DisplayMode {
    #[default]
    Absolute,
    PercentFromStart,
}

/// Rebasing factor applied to a series in percentage mode.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayFactor(f64);

impl DisplayFactor {
    pub const IDENTITY: Self = Self(1.0);

    /// `None` when the start value cannot be rebased on (zero or non-finite).
    pub fn from_start_value(start: Price, base: f64) -> Option<Self> {
        if start.is_finite() && start.abs() > f64::EPSILON {
            Some(Self(base / start))
        } else {
            None
        }
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn apply(self, price: Price) -> Price {
        price * self.0
    }
}

impl Default for DisplayFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::fmt::Display for DisplayFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{:.6}", self.0)
    }
}
