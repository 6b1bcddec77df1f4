use strum_macros::Display;

use crate::config::{DF, Price};
use crate::domain::DatedPoint;
use crate::models::cross_rate_graph::{CrossRateGraph, OrientedEdge};

/// How a series reached its display currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConversionPath {
    /// Display currency equals the instrument currency (or is unset).
    Identity,
    /// Display currency is the main currency: one `main <-> instrument` edge.
    MainEdge,
    /// A direct `display <-> instrument` edge, instrument priced in main.
    DirectEdge,
    /// `instrument -> main -> display`, two edges joined on date.
    ViaMain,
    /// A required edge was missing; the raw series is shown unscaled.
    Unconverted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub points: Vec<DatedPoint>,
    /// Currency `points` are actually expressed in. Equals the instrument
    /// currency when the conversion fell back to raw values.
    pub currency: String,
    pub path: ConversionPath,
}

impl NormalizedSeries {
    /// True when the requested display currency could not be honoured.
    pub fn is_degraded(&self) -> bool {
        self.path == ConversionPath::Unconverted
    }
}

/// One leg of a conversion: the edge and the currency the amount is in before the leg.
struct Hop<'a> {
    edge: OrientedEdge<'a>,
    source: &'a str,
}

/// Rescales price series into a display currency through a `CrossRateGraph`
/// anchored at `main_currency`.
pub struct CurrencyNormalizer<'a> {
    graph: &'a CrossRateGraph,
    main_currency: &'a str,
}

impl<'a> CurrencyNormalizer<'a> {
    pub fn new(graph: &'a CrossRateGraph, main_currency: &'a str) -> Self {
        Self {
            graph,
            main_currency,
        }
    }

    pub fn main_currency(&self) -> &str {
        self.main_currency
    }

    /// Picks the conversion path for a currency pair without touching any series.
    pub fn plan(&self, instrument_ccy: &str, display_ccy: &str) -> ConversionPath {
        self.hops(instrument_ccy, display_ccy).0
    }

    pub fn normalize(
        &self,
        raw: &[DatedPoint],
        instrument_ccy: &str,
        display_ccy: &str,
    ) -> NormalizedSeries {
        let (path, hops) = self.hops(instrument_ccy, display_ccy);

        if DF.log_normalization {
            log::debug!(
                "normalize {} -> {} (main {}): {}",
                instrument_ccy,
                display_ccy,
                self.main_currency,
                path
            );
        }

        match path {
            ConversionPath::Identity | ConversionPath::Unconverted => {
                if path == ConversionPath::Unconverted {
                    log::warn!(
                        "No cross rate path from {} to {} via {}; showing unscaled prices",
                        instrument_ccy,
                        display_ccy,
                        self.main_currency
                    );
                }
                NormalizedSeries {
                    points: raw.to_vec(),
                    currency: instrument_ccy.to_string(),
                    path,
                }
            }
            _ => NormalizedSeries {
                points: apply_hops(raw, &hops),
                currency: display_ccy.to_string(),
                path,
            },
        }
    }

    fn hops<'b>(
        &'b self,
        instrument_ccy: &'b str,
        display_ccy: &'b str,
    ) -> (ConversionPath, Vec<Hop<'b>>) {
        let main = self.main_currency;

        if display_ccy.is_empty() || display_ccy == instrument_ccy {
            return (ConversionPath::Identity, Vec::new());
        }

        if display_ccy == main {
            return match self.graph.get_edge(main, instrument_ccy) {
                Some(edge) => (
                    ConversionPath::MainEdge,
                    vec![Hop {
                        edge,
                        source: instrument_ccy,
                    }],
                ),
                None => (ConversionPath::Unconverted, Vec::new()),
            };
        }

        // A direct edge only counts when it also touches main, which past the
        // check above means the instrument is priced in main.
        if instrument_ccy == main {
            return match self.graph.get_edge(display_ccy, instrument_ccy) {
                Some(edge) => (
                    ConversionPath::DirectEdge,
                    vec![Hop {
                        edge,
                        source: instrument_ccy,
                    }],
                ),
                None => (ConversionPath::Unconverted, Vec::new()),
            };
        }

        match (
            self.graph.get_edge(main, instrument_ccy),
            self.graph.get_edge(main, display_ccy),
        ) {
            (Some(to_main), Some(to_display)) => (
                ConversionPath::ViaMain,
                vec![
                    Hop {
                        edge: to_main,
                        source: instrument_ccy,
                    },
                    Hop {
                        edge: to_display,
                        source: main,
                    },
                ],
            ),
            _ => (ConversionPath::Unconverted, Vec::new()),
        }
    }
}

/// One-shot form of `CurrencyNormalizer::normalize`.
pub fn normalize(
    raw: &[DatedPoint],
    instrument_ccy: &str,
    display_ccy: &str,
    main_ccy: &str,
    graph: &CrossRateGraph,
) -> NormalizedSeries {
    CurrencyNormalizer::new(graph, main_ccy).normalize(raw, instrument_ccy, display_ccy)
}

/// Emits a point only for dates every hop has a usable rate for.
/// Missing closes stay missing but keep their date.
fn apply_hops(raw: &[DatedPoint], hops: &[Hop<'_>]) -> Vec<DatedPoint> {
    raw.iter()
        .filter_map(|point| {
            let close = convert_close(point.close, &point.date, hops)?;
            Some(DatedPoint::new(point.date.clone(), close))
        })
        .collect()
}

fn convert_close(close: Option<Price>, date: &str, hops: &[Hop<'_>]) -> Option<Option<Price>> {
    let mut value = close;
    for hop in hops {
        value = match value {
            Some(amount) => Some(hop.edge.convert(amount, hop.source, date)?),
            None => {
                hop.edge.edge.rate_on(date)?;
                None
            }
        };
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cross_rate_graph::CrossRateEdge;

    fn edge(from: &str, to: &str, samples: &[(&str, f64)]) -> CrossRateEdge {
        CrossRateEdge::new(
            from,
            to,
            samples
                .iter()
                .map(|(d, c)| DatedPoint::new(*d, Some(*c)))
                .collect(),
        )
        .unwrap()
    }

    fn prices(samples: &[(&str, Option<f64>)]) -> Vec<DatedPoint> {
        samples.iter().map(|(d, c)| DatedPoint::new(*d, *c)).collect()
    }

    #[test]
    fn same_currency_is_identity() {
        let graph = CrossRateGraph::new();
        let raw = prices(&[("2024-01-01", Some(10.0)), ("2024-01-02", None)]);
        let out = normalize(&raw, "USD", "USD", "CHF", &graph);
        assert_eq!(out.points, raw);
        assert_eq!(out.path, ConversionPath::Identity);

        let unset = normalize(&raw, "USD", "", "CHF", &graph);
        assert_eq!(unset.points, raw);
    }

    #[test]
    fn main_currency_multiplies_when_edge_starts_at_main() {
        let graph = CrossRateGraph::from_edges([edge("CHF", "USD", &[("2024-01-02", 0.9)])]).unwrap();
        let raw = prices(&[("2024-01-02", Some(100.0))]);
        let out = normalize(&raw, "USD", "CHF", "CHF", &graph);
        assert_eq!(out.path, ConversionPath::MainEdge);
        assert!((out.points[0].close.unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn main_currency_divides_when_edge_ends_at_main() {
        let graph = CrossRateGraph::from_edges([edge("USD", "CHF", &[("2024-01-02", 1.25)])]).unwrap();
        let raw = prices(&[("2024-01-02", Some(100.0))]);
        let out = normalize(&raw, "USD", "CHF", "CHF", &graph);
        assert!((out.points[0].close.unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn instrument_in_main_currency_uses_direct_edge() {
        let graph = CrossRateGraph::from_edges([edge("CHF", "EUR", &[("2024-01-02", 0.95)])]).unwrap();
        let raw = prices(&[("2024-01-02", Some(95.0))]);
        let out = normalize(&raw, "CHF", "EUR", "CHF", &graph);
        assert_eq!(out.path, ConversionPath::DirectEdge);
        assert!((out.points[0].close.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn two_hops_through_main() {
        let graph = CrossRateGraph::from_edges([
            edge("CHF", "USD", &[("2024-01-02", 1.1)]),
            edge("CHF", "EUR", &[("2024-01-02", 0.95)]),
        ])
        .unwrap();
        let raw = prices(&[("2024-01-02", Some(100.0))]);
        let out = normalize(&raw, "USD", "EUR", "CHF", &graph);
        assert_eq!(out.path, ConversionPath::ViaMain);
        assert_eq!(out.currency, "EUR");
        let expected = 100.0 * 1.1 * (1.0 / 0.95);
        assert!((out.points[0].close.unwrap() - expected).abs() < 1e-9);
        assert!((out.points[0].close.unwrap() - 115.79).abs() < 0.005);
    }

    #[test]
    fn two_hops_emit_date_intersection_only() {
        let graph = CrossRateGraph::from_edges([
            edge("CHF", "USD", &[("2024-01-01", 1.0), ("2024-01-02", 1.1), ("2024-01-03", 1.2)]),
            edge("CHF", "EUR", &[("2024-01-02", 0.95), ("2024-01-03", 0.96), ("2024-01-04", 0.97)]),
        ])
        .unwrap();
        let raw = prices(&[
            ("2024-01-01", Some(100.0)),
            ("2024-01-02", Some(100.0)),
            ("2024-01-03", None),
            ("2024-01-04", Some(100.0)),
        ]);
        let out = normalize(&raw, "USD", "EUR", "CHF", &graph);
        let dates: Vec<&str> = out.points.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(out.points[1].close, None);
    }

    #[test]
    fn two_hops_do_not_depend_on_edge_insertion_order() {
        let usd = edge("CHF", "USD", &[("2024-01-02", 1.1), ("2024-01-03", 1.12)]);
        let eur = edge("EUR", "CHF", &[("2024-01-02", 1.05), ("2024-01-03", 1.04)]);
        let raw = prices(&[("2024-01-02", Some(50.0)), ("2024-01-03", Some(-20.0))]);

        let a = CrossRateGraph::from_edges([usd.clone(), eur.clone()]).unwrap();
        let b = CrossRateGraph::from_edges([eur, usd]).unwrap();
        let out_a = normalize(&raw, "USD", "EUR", "CHF", &a);
        let out_b = normalize(&raw, "USD", "EUR", "CHF", &b);
        assert_eq!(out_a, out_b);
        // sign survives conversion
        assert!(out_a.points[1].close.unwrap() < 0.0);
    }

    #[test]
    fn edge_that_skips_main_does_not_shortcut_two_hops() {
        let graph = CrossRateGraph::from_edges([
            edge("CHF", "USD", &[("2024-01-02", 1.1), ("2024-01-03", 1.1)]),
            edge("CHF", "EUR", &[("2024-01-02", 0.95), ("2024-01-03", 0.95)]),
            edge("EUR", "USD", &[("2024-01-02", 2.0)]),
        ])
        .unwrap();
        let raw = prices(&[("2024-01-02", Some(100.0)), ("2024-01-03", Some(100.0))]);
        let out = normalize(&raw, "USD", "EUR", "CHF", &graph);
        assert_eq!(out.path, ConversionPath::ViaMain);
        assert_eq!(out.points.len(), 2);
        for point in &out.points {
            assert!((point.close.unwrap() - 100.0 * 1.1 / 0.95).abs() < 1e-9);
        }
    }

    #[test]
    fn missing_edge_falls_back_to_raw_prices() {
        let graph = CrossRateGraph::from_edges([edge("CHF", "USD", &[("2024-01-02", 1.1)])]).unwrap();
        let raw = prices(&[("2024-01-02", Some(100.0))]);
        let out = normalize(&raw, "USD", "GBP", "CHF", &graph);
        assert!(out.is_degraded());
        assert_eq!(out.currency, "USD");
        assert_eq!(out.points, raw);
    }

    #[test]
    fn plan_matches_normalize() {
        let graph = CrossRateGraph::from_edges([edge("CHF", "USD", &[("2024-01-02", 1.1)])]).unwrap();
        let normalizer = CurrencyNormalizer::new(&graph, "CHF");
        assert_eq!(normalizer.plan("USD", "CHF"), ConversionPath::MainEdge);
        assert_eq!(normalizer.plan("USD", "EUR"), ConversionPath::Unconverted);
        assert_eq!(normalizer.plan("USD", "USD"), ConversionPath::Identity);
    }
}
