use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::Price;
use crate::domain::{ChartError, DatedPoint};
use crate::models::ordered_series::find_exact;

/// Quote series for one currency pair.
/// A close of `c` on `from/to` means one unit of `to` is worth `c` units of `from`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CrossRateEdge {
    pub from_currency: String,
    pub to_currency: String,
    pub series: Vec<DatedPoint>,
}

impl CrossRateEdge {
    pub fn new(
        from_currency: impl Into<String>,
        to_currency: impl Into<String>,
        series: Vec<DatedPoint>,
    ) -> Result<Self> {
        let edge = Self {
            from_currency: from_currency.into(),
            to_currency: to_currency.into(),
            series,
        };
        edge.validate()?;
        Ok(edge)
    }

    pub fn validate(&self) -> Result<()> {
        if self.from_currency == self.to_currency {
            return Err(ChartError::SelfPairEdge(self.from_currency.clone()).into());
        }
        Ok(())
    }

    pub fn touches(&self, currency: &str) -> bool {
        self.from_currency == currency || self.to_currency == currency
    }

    /// Usable rate on `date`: present, finite and non-zero.
    pub fn rate_on(&self, date: &str) -> Option<Price> {
        let idx = find_exact(&self.series, date)?;
        self.series[idx]
            .close
            .filter(|rate| rate.is_finite() && *rate != 0.0)
    }
}

/// Which way round a looked-up edge was stored relative to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Stored as `(a, b)` for a query `(a, b)`.
    AsQueried,
    /// Stored as `(b, a)`.
    Reversed,
}

#[derive(Debug, Clone, Copy)]
pub struct OrientedEdge<'a> {
    pub edge: &'a CrossRateEdge,
    pub direction: EdgeDirection,
}

impl OrientedEdge<'_> {
    /// Converts an amount held in `source` into the other currency of the edge
    /// using the rate on `date`. `None` when the edge has no usable sample.
    pub fn convert(&self, amount: Price, source: &str, date: &str) -> Option<Price> {
        let rate = self.edge.rate_on(date)?;
        if self.edge.to_currency == source {
            Some(amount * rate)
        } else {
            Some(amount / rate)
        }
    }
}

/// Known currency-pair rates, keyed `from -> to -> edge`.
/// Owned by one chart session; rebuilt on every chart-load response and
/// extended by rate-only fetches.
#[derive(Debug, Clone, Default)]
pub struct CrossRateGraph {
    edges: HashMap<String, HashMap<String, CrossRateEdge>>,
}

impl CrossRateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges(edges: impl IntoIterator<Item = CrossRateEdge>) -> Result<Self> {
        let mut graph = Self::new();
        for edge in edges {
            graph.upsert(edge)?;
        }
        Ok(graph)
    }

    /// Stores the edge for its pair, whichever way round the pair was stored
    /// before. Dates already held for the pair are merged with the new
    /// series; the new samples win where both have a date.
    pub fn upsert(&mut self, edge: CrossRateEdge) -> Result<()> {
        edge.validate()?;

        let CrossRateEdge {
            from_currency,
            to_currency,
            series: incoming,
        } = edge;

        let mut merged: BTreeMap<String, Option<Price>> = BTreeMap::new();
        if let Some(held) = self.remove_pair(&from_currency, &to_currency) {
            let reversed = held.from_currency != from_currency;
            for point in held.series {
                let close = if reversed {
                    point.close.map(|rate| 1.0 / rate)
                } else {
                    point.close
                };
                merged.insert(point.date, close);
            }
        }
        for point in incoming {
            merged.insert(point.date, point.close);
        }

        let series = merged
            .into_iter()
            .map(|(date, close)| DatedPoint::new(date, close))
            .collect();
        self.edges.entry(from_currency.clone()).or_default().insert(
            to_currency.clone(),
            CrossRateEdge {
                from_currency,
                to_currency,
                series,
            },
        );
        Ok(())
    }

    /// Takes the pair out in whichever orientation it is stored.
    fn remove_pair(&mut self, a: &str, b: &str) -> Option<CrossRateEdge> {
        for (from, to) in [(a, b), (b, a)] {
            let Some(inner) = self.edges.get_mut(from) else {
                continue;
            };
            let removed = inner.remove(to);
            if inner.is_empty() {
                self.edges.remove(from);
            }
            if removed.is_some() {
                return removed;
            }
        }
        None
    }

    /// Tries `(a, b)` first, then `(b, a)`.
    pub fn get_edge(&self, a: &str, b: &str) -> Option<OrientedEdge<'_>> {
        if let Some(edge) = self.edges.get(a).and_then(|inner| inner.get(b)) {
            return Some(OrientedEdge {
                edge,
                direction: EdgeDirection::AsQueried,
            });
        }
        self.edges
            .get(b)
            .and_then(|inner| inner.get(a))
            .map(|edge| OrientedEdge {
                edge,
                direction: EdgeDirection::Reversed,
            })
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.get_edge(a, b).is_some()
    }

    pub fn len(&self) -> usize {
        self.edges.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.edges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str, close: f64) -> CrossRateEdge {
        CrossRateEdge::new(from, to, vec![DatedPoint::new("2024-01-02", Some(close))]).unwrap()
    }

    #[test]
    fn lookup_reports_orientation() {
        let graph = CrossRateGraph::from_edges([edge("CHF", "USD", 1.1)]).unwrap();
        assert_eq!(graph.get_edge("CHF", "USD").unwrap().direction, EdgeDirection::AsQueried);
        assert_eq!(graph.get_edge("USD", "CHF").unwrap().direction, EdgeDirection::Reversed);
        assert!(graph.get_edge("CHF", "EUR").is_none());
    }

    #[test]
    fn self_pair_is_rejected() {
        let err = CrossRateEdge::new("CHF", "CHF", Vec::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChartError>(),
            Some(ChartError::SelfPairEdge(_))
        ));
    }

    #[test]
    fn upsert_replaces_reverse_orientation() {
        let mut graph = CrossRateGraph::from_edges([edge("CHF", "USD", 1.1)]).unwrap();
        graph.upsert(edge("USD", "CHF", 0.9)).unwrap();
        assert_eq!(graph.len(), 1);
        let found = graph.get_edge("CHF", "USD").unwrap();
        assert_eq!(found.direction, EdgeDirection::Reversed);
        assert_eq!(found.edge.rate_on("2024-01-02"), Some(0.9));
    }

    #[test]
    fn upsert_keeps_dates_the_new_series_lacks() {
        let full = CrossRateEdge::new(
            "CHF",
            "USD",
            vec![
                DatedPoint::new("2024-01-01", Some(1.0)),
                DatedPoint::new("2024-01-02", Some(1.1)),
                DatedPoint::new("2024-01-03", Some(1.2)),
            ],
        )
        .unwrap();
        let mut graph = CrossRateGraph::from_edges([full]).unwrap();

        let clipped = CrossRateEdge::new(
            "CHF",
            "USD",
            vec![
                DatedPoint::new("2024-01-03", Some(1.25)),
                DatedPoint::new("2024-01-04", Some(1.3)),
            ],
        )
        .unwrap();
        graph.upsert(clipped).unwrap();

        let e = graph.get_edge("CHF", "USD").unwrap().edge;
        let dates: Vec<&str> = e.series.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"]);
        assert_eq!(e.rate_on("2024-01-01"), Some(1.0));
        assert_eq!(e.rate_on("2024-01-03"), Some(1.25));
    }

    #[test]
    fn upsert_in_reverse_orientation_inverts_held_rates() {
        let mut graph = CrossRateGraph::from_edges([CrossRateEdge::new(
            "CHF",
            "USD",
            vec![
                DatedPoint::new("2024-01-01", Some(0.8)),
                DatedPoint::new("2024-01-02", Some(1.1)),
            ],
        )
        .unwrap()])
        .unwrap();
        graph.upsert(edge("USD", "CHF", 0.9)).unwrap();

        let found = graph.get_edge("USD", "CHF").unwrap();
        assert_eq!(found.direction, EdgeDirection::AsQueried);
        assert!((found.edge.rate_on("2024-01-01").unwrap() - 1.25).abs() < 1e-12);
        assert_eq!(found.edge.rate_on("2024-01-02"), Some(0.9));
    }

    #[test]
    fn convert_multiplies_into_quote_side_and_divides_out_of_it() {
        let graph = CrossRateGraph::from_edges([edge("CHF", "USD", 1.1)]).unwrap();
        let e = graph.get_edge("CHF", "USD").unwrap();
        assert!((e.convert(100.0, "USD", "2024-01-02").unwrap() - 110.0).abs() < 1e-9);
        assert!((e.convert(110.0, "CHF", "2024-01-02").unwrap() - 100.0).abs() < 1e-9);
        assert!(e.convert(100.0, "USD", "2024-01-03").is_none());
    }

    #[test]
    fn zero_rate_is_not_usable() {
        let zero = edge("CHF", "USD", 0.0);
        assert!(zero.rate_on("2024-01-02").is_none());
    }
}
