use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::provider::{
    CrossRateDataSource, CrossRateSnapshot, InstrumentDataSource, InstrumentHistory,
};
use crate::domain::{ChartError, Dated, DatedPoint};
use crate::models::{CrossRateEdge, ordered_series::window_start};
use crate::utils::TimeUtils;

/// On-disk layout of a fixture file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FixtureData {
    pub main_currency: String,
    #[serde(default)]
    pub instruments: Vec<InstrumentHistory>,
    #[serde(default)]
    pub cross_rates: Vec<CrossRateEdge>,
}

/// Serves instruments and cross rates out of one JSON document.
/// Also the in-memory source for tests.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    data: FixtureData,
}

impl FixtureProvider {
    /// Canonicalizes every date key and sorts every series.
    pub fn new(mut data: FixtureData) -> Result<Self> {
        for history in data.instruments.iter_mut() {
            canonicalize(&mut history.prices)?;
            if let Some(bars) = history.ohlc.as_mut() {
                for bar in bars.iter_mut() {
                    bar.date = TimeUtils::normalize_date_key(&bar.date)?;
                }
                bars.sort_by(|a, b| a.date.cmp(&b.date));
            }
            for tx in history.transactions.iter_mut() {
                tx.date = TimeUtils::normalize_date_key(&tx.date)?;
            }
            history.transactions.sort_by(|a, b| a.date.cmp(&b.date));
        }
        for edge in data.cross_rates.iter_mut() {
            edge.validate()?;
            canonicalize(&mut edge.series)?;
        }
        Ok(Self { data })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: FixtureData = serde_json::from_str(json).context("Malformed fixture JSON")?;
        Self::new(data)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let provider = Self::from_json_str(&json)
            .with_context(|| format!("Failed to load fixture {}", path.display()))?;
        log::info!(
            "Loaded fixture {}: {} instruments, {} cross rates",
            path.display(),
            provider.data.instruments.len(),
            provider.data.cross_rates.len()
        );
        Ok(provider)
    }

    pub fn main_currency(&self) -> &str {
        &self.data.main_currency
    }

    pub fn instrument_ids(&self) -> Vec<&str> {
        self.data.instruments.iter().map(|h| h.info.id.as_str()).collect()
    }
}

fn canonicalize(series: &mut [DatedPoint]) -> Result<()> {
    for point in series.iter_mut() {
        point.date = TimeUtils::normalize_date_key(&point.date)?;
    }
    series.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(())
}

fn clip<T: Dated + Clone>(series: &[T], from: Option<&str>) -> Vec<T> {
    let start = from.map_or(0, |date| window_start(series, date));
    series[start..].to_vec()
}

#[async_trait]
impl InstrumentDataSource for FixtureProvider {
    async fn fetch_instrument(
        &self,
        instrument_id: &str,
        from: Option<&str>,
    ) -> Result<InstrumentHistory> {
        let history = self
            .data
            .instruments
            .iter()
            .find(|h| h.info.id == instrument_id)
            .ok_or_else(|| ChartError::UnknownInstrument(instrument_id.to_string()))?;

        Ok(InstrumentHistory {
            info: history.info.clone(),
            prices: clip(&history.prices, from),
            ohlc: history.ohlc.as_ref().map(|bars| clip(bars, from)),
            transactions: history.transactions.clone(),
        })
    }
}

#[async_trait]
impl CrossRateDataSource for FixtureProvider {
    async fn fetch_rates(
        &self,
        currencies: &[String],
        from: Option<&str>,
    ) -> Result<CrossRateSnapshot> {
        let main = self.data.main_currency.as_str();
        let reachable = |ccy: &str| ccy == main || currencies.iter().any(|c| c == ccy);

        let edges = self
            .data
            .cross_rates
            .iter()
            .filter(|e| reachable(&e.from_currency) && reachable(&e.to_currency))
            .map(|e| CrossRateEdge {
                from_currency: e.from_currency.clone(),
                to_currency: e.to_currency.clone(),
                series: clip(&e.series, from),
            })
            .collect();

        Ok(CrossRateSnapshot {
            main_currency: main.to_string(),
            edges,
        })
    }
}
