use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::data::provider::{CrossRateDataSource, InstrumentDataSource};
use crate::engine::{FetchRequest, FetchResponse};
use crate::utils::format_duration;

/// Runs one fetch cycle: every instrument concurrently, then the cross rates
/// covering the requested currencies plus each instrument's own.
pub async fn fulfil<I, R>(request: &FetchRequest, instruments: &I, rates: &R) -> Result<FetchResponse>
where
    I: InstrumentDataSource + ?Sized,
    R: CrossRateDataSource + ?Sized,
{
    let started = std::time::Instant::now();
    let from = request.from.as_deref();

    let histories = try_join_all(
        request
            .instrument_ids
            .iter()
            .map(|id| instruments.fetch_instrument(id, from)),
    )
    .await
    .with_context(|| format!("Fetch {} ({}) failed loading instruments", request.ticket, request.reason))?;

    let mut currencies = request.currencies.clone();
    for history in &histories {
        if !currencies.contains(&history.info.currency) {
            currencies.push(history.info.currency.clone());
        }
    }

    let rates = rates
        .fetch_rates(&currencies, from)
        .await
        .with_context(|| format!("Fetch {} ({}) failed loading cross rates", request.ticket, request.reason))?;

    log::info!(
        "Fetch {} ({}): {} instruments, {} cross rate edges in {}",
        request.ticket,
        request.reason,
        histories.len(),
        rates.edges.len(),
        format_duration(started.elapsed().as_millis() as i64)
    );

    Ok(FetchResponse {
        instruments: histories,
        rates,
    })
}
