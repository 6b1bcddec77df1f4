use std::panic;

use anyhow::Result;
use clap::Parser;
use tabled::{Table, Tabled, settings::Style};

use instrument_chart::{ChartNotice, Cli, Trace, run_cli};

#[derive(Tabled)]
struct TraceRow {
    #[tabled(rename = "#")]
    position: usize,
    name: String,
    kind: &'static str,
    axis: String,
    points: usize,
}

fn describe(notice: &ChartNotice) -> String {
    match notice {
        ChartNotice::NoData { instrument_id } => format!("{}: no data", instrument_id),
        ChartNotice::Unconverted {
            instrument_id,
            requested,
            shown_currency,
        } => format!(
            "{}: no rate to {}, prices shown in {}",
            instrument_id, requested, shown_currency
        ),
        ChartNotice::OhlcUnavailable { instrument_id } => {
            format!("{}: no OHLC data, drawn as a line", instrument_id)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));

    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Error)
    };

    env_logger::Builder::new()
        .filter(None, global_level)
        .filter(Some("instrument_chart"), my_code_level)
        .init();

    let args = Cli::parse();
    let session = run_cli(&args).await?;

    let rows: Vec<TraceRow> = session
        .surface()
        .traces
        .iter()
        .enumerate()
        .map(|(position, trace): (usize, &Trace)| TraceRow {
            position,
            name: trace.name().to_string(),
            kind: trace.kind_label(),
            axis: format!("{:?}", trace.axis()),
            points: trace.point_count(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));

    for notice in session.notices() {
        println!("! {}", describe(notice));
    }
    if session.layout().oscillator_subplot {
        println!("(oscillator subplot reserved)");
    }
    Ok(())
}
