//! Configuration module for the chart engine.

// Can all be private now because we have a public re-export.
mod debug;
mod persistence;
mod types;

// Public
pub mod constants;

// Can't be private because we don't re-export it
pub mod plot;

// Re-export commonly used items
pub use debug::DF;
pub use persistence::{PERSISTENCE, settings_path};
pub use types::{ChartType, DisplayFactor, DisplayMode, Price};
