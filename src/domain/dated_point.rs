use serde::{Deserialize, Serialize};

use crate::config::Price;

/// Anything that carries a canonical date key. Series of these are kept
/// sorted ascending by `date()`.
pub trait Dated {
    fn date(&self) -> &str;
}

/// Anything that exposes a (possibly missing) close value.
/// Lets the interpolator and markers work the same on line and OHLC series.
pub trait PricePoint {
    fn close(&self) -> Option<Price>;
}

/// One sample of a price series. `close == None` marks a missing or
/// non-trading day placeholder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatedPoint {
    pub date: String,
    pub close: Option<Price>,
}

impl DatedPoint {
    pub fn new(date: impl Into<String>, close: Option<Price>) -> Self {
        Self {
            date: date.into(),
            close,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OhlcPoint {
    pub date: String,
    pub open: Option<Price>,
    pub high: Option<Price>,
    pub low: Option<Price>,
    pub close: Option<Price>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl OhlcPoint {
    /// Multiplies every price field by `ratio`. Volume is left alone.
    pub fn rescaled(&self, ratio: f64) -> Self {
        Self {
            date: self.date.clone(),
            open: self.open.map(|v| v * ratio),
            high: self.high.map(|v| v * ratio),
            low: self.low.map(|v| v * ratio),
            close: self.close.map(|v| v * ratio),
            volume: self.volume,
        }
    }
}

impl Dated for DatedPoint {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for OhlcPoint {
    fn date(&self) -> &str {
        &self.date
    }
}

impl PricePoint for DatedPoint {
    fn close(&self) -> Option<Price> {
        self.close
    }
}

impl PricePoint for OhlcPoint {
    fn close(&self) -> Option<Price> {
        self.close
    }
}

impl PricePoint for Option<Price> {
    fn close(&self) -> Option<Price> {
        *self
    }
}
