// Trace construction for the price chart
pub mod chart_series;
pub mod transactions;

pub use chart_series::{BuiltChart, ChartNotice, ChartSeriesBuilder};
