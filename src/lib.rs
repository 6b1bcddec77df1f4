#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod models;
pub mod utils;

// Re-export commonly used types outside of crate (for main.rs and tests)
pub use analysis::{BuiltChart, ChartNotice, ChartSeriesBuilder};
pub use config::{ChartType, DisplayMode, PERSISTENCE};
pub use data::{FixtureProvider, JsonFileSettingsStore, MemorySettingsStore, fulfil};
pub use domain::{ChartError, InstrumentSelection};
pub use engine::{ChartSession, FetchRequest, SessionUpdate};
pub use models::{IndicatorKind, RecordingSurface, RenderSurface, Trace};

use anyhow::{Context, Result};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON fixture holding instruments, transactions and cross rates
    #[arg(long)]
    pub fixture: std::path::PathBuf,

    /// Instrument id to plot (give twice to compare two instruments)
    #[arg(long = "instrument", required = true, num_args = 1)]
    pub instruments: Vec<String>,

    /// Display currency; each instrument's own currency when omitted
    #[arg(long)]
    pub currency: Option<String>,

    /// Window start, YYYY-MM-DD or YYYYMMDD
    #[arg(long)]
    pub from: Option<String>,

    /// line, candlestick or ohlc; the instrument's saved choice when omitted
    #[arg(long)]
    pub chart_type: Option<ChartType>,

    /// Indicator to overlay (sma, ema, bollinger, rsi); repeatable
    #[arg(long = "indicator")]
    pub indicators: Vec<IndicatorKind>,

    /// Rebase every instrument to 100 at the window start
    #[arg(long, default_value_t = false)]
    pub percent: bool,

    /// Keep indicator settings in memory only
    #[arg(long, default_value_t = false)]
    pub no_persist: bool,
}

/// Runs one chart session against the fixture and returns what was drawn.
pub async fn run_cli(args: &Cli) -> Result<ChartSession<RecordingSurface>> {
    let provider = FixtureProvider::load(&args.fixture).await?;
    let store: Box<dyn data::UserSettingsStore> = if args.no_persist {
        Box::new(MemorySettingsStore::new())
    } else {
        Box::new(JsonFileSettingsStore::at_default_location())
    };
    let mut session = ChartSession::new(RecordingSurface::new(), store);

    // Settings first: they shape the initial fetch
    if let Some(code) = &args.currency {
        session.set_display_currency(code);
    }
    session.set_window_start(args.from.as_deref())?;
    session.set_display_mode(if args.percent {
        DisplayMode::PercentFromStart
    } else {
        DisplayMode::Absolute
    });

    let selections = args
        .instruments
        .iter()
        .map(InstrumentSelection::new)
        .collect();
    let request = session.prepare_chart(selections)?;
    if let Some(chart_type) = args.chart_type {
        session.set_chart_type(chart_type);
    }

    let response = fulfil(&request, &provider, &provider)
        .await
        .with_context(|| format!("Fetch {} failed", request.ticket))?;
    session.apply_response(request.ticket, response)?;

    for kind in &args.indicators {
        session.toggle_indicator(*kind);
    }
    Ok(session)
}
