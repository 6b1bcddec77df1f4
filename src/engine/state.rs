use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::config::{ChartType, DisplayMode};
use crate::models::{IndicatorKind, IndicatorOverlayRegistry, IndicatorParams};

/// What the user currently asked the chart to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSettings {
    /// `None` plots every instrument in its own currency.
    pub display_currency: Option<String>,
    /// Canonical date key; `None` for the full history.
    pub window_start: Option<String>,
    pub chart_type: ChartType,
    pub display_mode: DisplayMode,
}

/// Persisted per instrument through the settings store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InstrumentSettings {
    /// Keyed by the indicator's lowercase name.
    #[serde(default)]
    pub indicators: BTreeMap<String, IndicatorParams>,
    #[serde(default)]
    pub chart_type: Option<ChartType>,
    /// Annotations drawn on the chart, stored as the surface hands them over.
    #[serde(default)]
    pub shapes: Vec<Value>,
}

impl InstrumentSettings {
    pub fn capture(registry: &IndicatorOverlayRegistry, chart_type: ChartType, shapes: &[Value]) -> Self {
        Self {
            indicators: IndicatorKind::iter()
                .map(|kind| (kind.to_string(), registry.params(kind)))
                .collect(),
            chart_type: Some(chart_type),
            shapes: shapes.to_vec(),
        }
    }

    /// Pushes stored parameters into `registry`. Unknown indicator names are skipped.
    pub fn apply_to(&self, registry: &mut IndicatorOverlayRegistry) {
        for (name, params) in &self.indicators {
            match name.parse::<IndicatorKind>() {
                Ok(kind) => registry.set_params(kind, params.clone()),
                Err(_) => log::warn!("Ignoring settings for unknown indicator {:?}", name),
            }
        }
    }
}
