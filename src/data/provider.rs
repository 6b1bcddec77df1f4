use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DatedPoint, InstrumentInfo, OhlcPoint, Transaction};
use crate::models::CrossRateEdge;

/// Everything the chart needs about one instrument.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstrumentHistory {
    pub info: InstrumentInfo,
    /// Close series, ascending by date.
    pub prices: Vec<DatedPoint>,
    #[serde(default)]
    pub ohlc: Option<Vec<OhlcPoint>>,
    /// Full transaction list, not clipped to the requested range.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Main currency plus the edges around it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CrossRateSnapshot {
    pub main_currency: String,
    #[serde(default)]
    pub edges: Vec<CrossRateEdge>,
}

/// Abstract interface for instrument price and transaction history.
#[async_trait]
pub trait InstrumentDataSource: Send + Sync {
    /// History of `instrument_id` from `from` (inclusive) onwards, or all of it.
    async fn fetch_instrument(&self, instrument_id: &str, from: Option<&str>)
    -> Result<InstrumentHistory>;
}

/// Abstract interface for currency-pair quote series.
#[async_trait]
pub trait CrossRateDataSource: Send + Sync {
    /// The main currency and edges that reach each of `currencies` in at most two hops.
    async fn fetch_rates(&self, currencies: &[String], from: Option<&str>)
    -> Result<CrossRateSnapshot>;
}
