// Top Level Constants

/// Value the window start is rebased to in percentage mode.
pub const PERCENT_BASE: f64 = 100.0;

/// At most this many instruments share one chart.
pub const MAX_INSTRUMENTS: usize = 2;

/// Returned by the interpolator when a series has no valid sample at all.
pub const ALL_NULL_FALLBACK: f64 = 0.0;

pub mod indicator {
    pub const SMA_PERIOD: usize = 20;
    pub const EMA_PERIOD: usize = 20;
    pub const BOLLINGER_PERIOD: usize = 20;
    pub const BOLLINGER_STD_DEVS: f64 = 2.0;
    pub const RSI_PERIOD: usize = 14;

    /// Fixed value range of the oscillator subplot.
    pub const OSCILLATOR_RANGE: (f64, f64) = (0.0, 100.0);
    /// Fraction of the chart height reserved for the oscillator subplot.
    pub const OSCILLATOR_DOMAIN_PCT: f64 = 0.25;
}
