//! Trace styling handed to the rendering surface.
//! Colours are CSS hex strings; the surface owns the actual painting.

pub struct ChartConfig {
    // --- PRICE ---
    /// Line colours per plotted instrument (primary, secondary)
    pub instrument_colors: [&'static str; 2],
    pub price_line_width: f32,

    // --- CANDLESTICKS ---
    pub candle_bullish_color: &'static str,
    pub candle_bearish_color: &'static str,

    // --- TRANSACTIONS ---
    pub buy_marker_color: &'static str,
    pub sell_marker_color: &'static str,
    pub dividend_marker_color: &'static str,
    pub marker_size: f32,

    pub holding_color: &'static str,
    pub holding_line_width: f32,

    // --- INDICATORS ---
    pub sma_color: &'static str,
    pub ema_color: &'static str,
    pub bollinger_band_color: &'static str,
    pub bollinger_mid_color: &'static str,
    pub rsi_color: &'static str,
    pub indicator_line_width: f32,
}

pub const CHART_CONFIG: ChartConfig = ChartConfig {
    instrument_colors: ["#1f77b4", "#ff7f0e"],
    price_line_width: 1.5,

    candle_bullish_color: "#26a69a", // TradingView Green
    candle_bearish_color: "#ef5350", // TradingView Red

    buy_marker_color: "#2e7d32",
    sell_marker_color: "#c62828",
    dividend_marker_color: "#f9a825",
    marker_size: 9.0,

    holding_color: "#7e57c2",
    holding_line_width: 1.0,

    sma_color: "#8d6e63",
    ema_color: "#00897b",
    bollinger_band_color: "#90a4ae",
    bollinger_mid_color: "#546e7a",
    rsi_color: "#ab47bc",
    indicator_line_width: 1.0,
};
