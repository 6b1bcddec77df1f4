use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::{constants::indicator, plot::CHART_CONFIG};
use crate::models::traces::Axis;
use crate::utils::{mean_and_stddev, rolling_mean};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Bollinger,
    Rsi,
}

impl IndicatorKind {
    /// Oscillators live on their own fixed-range subplot.
    pub fn is_oscillator(self) -> bool {
        matches!(self, Self::Rsi)
    }

    /// Number of traces one instance of this indicator renders.
    pub fn trace_count(self) -> usize {
        match self {
            Self::Bollinger => 3,
            Self::Sma | Self::Ema | Self::Rsi => 1,
        }
    }
}

/// User-tunable indicator parameters. Persisted per instrument as an opaque document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub period: usize,
    /// Band width in standard deviations (Bollinger only).
    #[serde(default)]
    pub std_devs: f64,
}

impl IndicatorParams {
    pub fn default_for(kind: IndicatorKind) -> Self {
        match kind {
            IndicatorKind::Sma => Self {
                period: indicator::SMA_PERIOD,
                std_devs: 0.0,
            },
            IndicatorKind::Ema => Self {
                period: indicator::EMA_PERIOD,
                std_devs: 0.0,
            },
            IndicatorKind::Bollinger => Self {
                period: indicator::BOLLINGER_PERIOD,
                std_devs: indicator::BOLLINGER_STD_DEVS,
            },
            IndicatorKind::Rsi => Self {
                period: indicator::RSI_PERIOD,
                std_devs: 0.0,
            },
        }
    }
}

/// One derived line, aligned index-for-index with the input closes.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorLine {
    pub name: String,
    pub values: Vec<Option<f64>>,
    pub axis: Axis,
    pub color: &'static str,
}

/// Derives every line of `kind` from a gap-free close series.
pub fn derive_lines(
    kind: IndicatorKind,
    params: &IndicatorParams,
    closes: &[f64],
) -> Vec<IndicatorLine> {
    let period = params.period.max(1);
    match kind {
        IndicatorKind::Sma => vec![IndicatorLine {
            name: format!("SMA({})", period),
            values: rolling_mean(closes, period),
            axis: Axis::Price,
            color: CHART_CONFIG.sma_color,
        }],
        IndicatorKind::Ema => vec![IndicatorLine {
            name: format!("EMA({})", period),
            values: ema(closes, period),
            axis: Axis::Price,
            color: CHART_CONFIG.ema_color,
        }],
        IndicatorKind::Bollinger => {
            let (upper, middle, lower) = bollinger(closes, period, params.std_devs);
            vec![
                IndicatorLine {
                    name: format!("BB upper({}, {})", period, params.std_devs),
                    values: upper,
                    axis: Axis::Price,
                    color: CHART_CONFIG.bollinger_band_color,
                },
                IndicatorLine {
                    name: format!("BB mid({})", period),
                    values: middle,
                    axis: Axis::Price,
                    color: CHART_CONFIG.bollinger_mid_color,
                },
                IndicatorLine {
                    name: format!("BB lower({}, {})", period, params.std_devs),
                    values: lower,
                    axis: Axis::Price,
                    color: CHART_CONFIG.bollinger_band_color,
                },
            ]
        }
        IndicatorKind::Rsi => vec![IndicatorLine {
            name: format!("RSI({})", period),
            values: rsi(closes, period),
            axis: Axis::Oscillator,
            color: CHART_CONFIG.rsi_color,
        }],
    }
}

/// Exponential moving average seeded with the first observation,
/// alpha = 2 / (period + 1). `None` until `period` bars have been seen.
pub fn ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut value = 0.0;

    closes
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            value = if i == 0 {
                price
            } else {
                alpha * price + (1.0 - alpha) * value
            };
            (i + 1 >= period).then_some(value)
        })
        .collect()
}

/// Bollinger Bands: SMA +/- `std_devs` population standard deviations.
pub fn bollinger(
    closes: &[f64],
    period: usize,
    std_devs: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let len = closes.len();
    let mut upper = Vec::with_capacity(len);
    let mut middle = Vec::with_capacity(len);
    let mut lower = Vec::with_capacity(len);

    for i in 0..len {
        if i + 1 < period {
            upper.push(None);
            middle.push(None);
            lower.push(None);
            continue;
        }
        let (mean, sd) = mean_and_stddev(&closes[i + 1 - period..=i]);
        upper.push(Some(mean + std_devs * sd));
        middle.push(Some(mean));
        lower.push(Some(mean - std_devs * sd));
    }
    (upper, middle, lower)
}

/// Relative Strength Index with Wilder smoothing of average gain/loss.
/// `None` until `period` price changes have been seen.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    let Some(&first) = closes.first() else {
        return out;
    };
    out.push(None);

    let w = period as f64;
    let mut prev = first;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (count, &close) in closes.iter().skip(1).enumerate().map(|(i, c)| (i + 1, c)) {
        let change = close - prev;
        prev = close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if count < period {
            gain_sum += gain;
            loss_sum += loss;
            out.push(None);
            continue;
        }
        if count == period {
            avg_gain = (gain_sum + gain) / w;
            avg_loss = (loss_sum + loss) / w;
        } else {
            avg_gain = (avg_gain * (w - 1.0) + gain) / w;
            avg_loss = (avg_loss * (w - 1.0) + loss) / w;
        }

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out.push(Some(value));
    }
    out
}
