use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::config::{Price, plot::CHART_CONFIG};
use crate::domain::{Dated, PricePoint, Transaction, TransactionKind};
use crate::models::{
    Axis, LineShape, LineTrace, MarkerTrace, Trace, gap_interpolator::interpolate,
    ordered_series::window_start,
};

fn marker_color(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Buy => CHART_CONFIG.buy_marker_color,
        TransactionKind::Sell => CHART_CONFIG.sell_marker_color,
        TransactionKind::Dividend => CHART_CONFIG.dividend_marker_color,
    }
}

/// One marker trace per transaction kind present in the window.
///
/// Each marker sits on the plotted price at or after its date, gaps filled
/// by interpolation. Transactions outside the plotted range are dropped.
pub fn marker_traces<P: Dated + PricePoint>(
    label: &str,
    points: &[P],
    scale: f64,
    transactions: &[Transaction],
) -> Vec<Trace> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };

    let visible = transactions
        .iter()
        .filter(|tx| tx.date.as_str() >= first.date() && tx.date.as_str() <= last.date())
        .collect_vec();

    TransactionKind::iter()
        .filter_map(|kind| {
            let of_kind = visible.iter().filter(|tx| tx.kind == kind).collect_vec();
            if of_kind.is_empty() {
                return None;
            }

            let mut dates = Vec::with_capacity(of_kind.len());
            let mut values = Vec::with_capacity(of_kind.len());
            let mut labels = Vec::with_capacity(of_kind.len());
            for tx in of_kind {
                let idx = window_start(points, &tx.date);
                dates.push(points[idx].date().to_string());
                values.push(interpolate(points, idx) * scale);
                labels.push(format!("{} {} @ {:.4}", kind, tx.quantity, tx.unit_price));
            }

            Some(Trace::Marker(MarkerTrace {
                name: format!("{} {}", label, kind),
                kind,
                dates,
                values,
                labels,
                color: marker_color(kind),
                size: CHART_CONFIG.marker_size,
            }))
        })
        .collect()
}

/// Held quantity as a step curve over `window_dates`.
/// Starts with whatever was accumulated before the window.
pub fn holding_trace(label: &str, window_dates: &[&str], transactions: &[Transaction]) -> Option<Trace> {
    let (&first, &last) = (window_dates.first()?, window_dates.last()?);
    if transactions.is_empty() {
        return None;
    }

    let sorted = transactions
        .iter()
        .sorted_by(|a, b| a.date.cmp(&b.date))
        .collect_vec();

    let opening: Price = sorted
        .iter()
        .take_while(|tx| tx.date.as_str() < first)
        .map(|tx| tx.holding_delta())
        .sum();

    let mut dates = vec![first.to_string()];
    let mut values = vec![Some(opening)];
    let mut held = opening;

    for (date, group) in &sorted
        .iter()
        .filter(|tx| tx.date.as_str() >= first && tx.date.as_str() <= last)
        .chunk_by(|tx| tx.date.clone())
    {
        held += group.map(|tx| tx.holding_delta()).sum::<f64>();
        if dates.last().is_some_and(|d| *d == date) {
            values.pop();
        } else {
            dates.push(date);
        }
        values.push(Some(held));
    }

    if dates.last().is_some_and(|d| d != last) {
        dates.push(last.to_string());
        values.push(Some(held));
    }

    Some(Trace::Line(LineTrace {
        name: format!("{} holding", label),
        dates,
        values,
        axis: Axis::Holding,
        shape: LineShape::Step,
        color: CHART_CONFIG.holding_color,
        width: CHART_CONFIG.holding_line_width,
    }))
}
