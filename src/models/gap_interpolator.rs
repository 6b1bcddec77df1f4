use crate::config::{Price, constants::ALL_NULL_FALLBACK};
use crate::domain::PricePoint;

/// Value at `index`, filling a missing sample from its nearest valid neighbours.
///
/// - sample present: returned as-is
/// - valid neighbours on both sides: their arithmetic mean
/// - valid neighbour on one side only: that neighbour
/// - no valid sample anywhere: `ALL_NULL_FALLBACK` (0.0)
///
/// An `index` past the end is treated as a missing sample after the last element.
pub fn interpolate<P: PricePoint>(series: &[P], index: usize) -> Price {
    if let Some(value) = series.get(index).and_then(PricePoint::close) {
        return value;
    }

    let left_end = index.min(series.len());
    let left = series[..left_end].iter().rev().find_map(PricePoint::close);
    let right = series
        .get(index + 1..)
        .and_then(|tail| tail.iter().find_map(PricePoint::close));

    match (left, right) {
        (Some(l), Some(r)) => (l + r) / 2.0,
        (Some(v), None) | (None, Some(v)) => v,
        (None, None) => ALL_NULL_FALLBACK,
    }
}

/// Gap-filled copy of a whole series. Same values as `interpolate` at every
/// index, in two passes: nearest valid value to the left, then to the right.
pub fn fill_gaps<P: PricePoint>(series: &[P]) -> Vec<Price> {
    let mut left: Vec<Option<Price>> = Vec::with_capacity(series.len());
    let mut last = None;
    for point in series {
        last = point.close().or(last);
        left.push(last);
    }

    let mut filled = vec![ALL_NULL_FALLBACK; series.len()];
    let mut next = None;
    for (i, point) in series.iter().enumerate().rev() {
        filled[i] = match point.close() {
            Some(value) => value,
            None => match (left[i], next) {
                (Some(l), Some(r)) => (l + r) / 2.0,
                (Some(v), None) | (None, Some(v)) => v,
                (None, None) => ALL_NULL_FALLBACK,
            },
        };
        next = point.close().or(next);
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatedPoint, OhlcPoint};

    #[test]
    fn present_sample_is_returned() {
        let s = vec![Some(3.0), None, Some(5.0)];
        assert_eq!(interpolate(&s, 0), 3.0);
    }

    #[test]
    fn gap_between_neighbours_is_their_mean() {
        let s = vec![
            DatedPoint::new("2024-01-01", Some(10.0)),
            DatedPoint::new("2024-01-02", None),
            DatedPoint::new("2024-01-03", Some(12.0)),
        ];
        assert!((interpolate(&s, 1) - 11.0).abs() < 1e-9);
    }

    #[test]
    fn nearest_neighbours_skip_longer_gaps() {
        let s = vec![Some(2.0), None, None, None, Some(8.0)];
        assert!((interpolate(&s, 2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn leading_gap_takes_right_neighbour() {
        let s = vec![None, None, Some(7.0), Some(9.0)];
        assert_eq!(interpolate(&s, 0), 7.0);
    }

    #[test]
    fn trailing_gap_takes_left_neighbour() {
        let s = vec![Some(4.0), Some(6.0), None];
        assert_eq!(interpolate(&s, 2), 6.0);
        assert_eq!(interpolate(&s, 10), 6.0);
    }

    #[test]
    fn all_null_series_falls_back_to_zero() {
        let s: Vec<Option<f64>> = vec![None, None, None];
        assert_eq!(interpolate(&s, 1), 0.0);
        let empty: Vec<Option<f64>> = Vec::new();
        assert_eq!(interpolate(&empty, 0), 0.0);
    }

    #[test]
    fn works_on_ohlc_close_column() {
        let bar = |date: &str, close: Option<f64>| OhlcPoint {
            date: date.into(),
            open: Some(1.0),
            high: Some(1.0),
            low: Some(1.0),
            close,
            volume: None,
        };
        let s = vec![bar("2024-01-01", Some(1.0)), bar("2024-01-02", None), bar("2024-01-03", Some(2.0))];
        assert!((interpolate(&s, 1) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn fill_gaps_resolves_every_sample() {
        let s = vec![None, Some(2.0), None, Some(4.0)];
        assert_eq!(fill_gaps(&s), vec![2.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn fill_gaps_agrees_with_interpolate_on_long_gaps() {
        let mut s: Vec<Option<f64>> = vec![None; 500];
        s[3] = Some(10.0);
        s[250] = Some(30.0);
        s[251] = Some(-4.0);
        s[420] = Some(6.0);

        let filled = fill_gaps(&s);
        for (i, value) in filled.iter().enumerate() {
            assert_eq!(*value, interpolate(&s, i), "index {}", i);
        }
        assert_eq!(filled[0], 10.0);
        assert_eq!(filled[100], 20.0);
        assert_eq!(filled[499], 6.0);

        let empty: Vec<Option<f64>> = vec![None; 4];
        assert_eq!(fill_gaps(&empty), vec![0.0; 4]);
    }
}
