/// Population mean and standard deviation. `(0.0, 0.0)` for an empty slice.
#[inline]
pub fn mean_and_stddev(data: &[f64]) -> (f64, f64) {
    let count = data.len();
    if count == 0 {
        return (0.0, 0.0);
    }

    let sum: f64 = data.iter().sum();
    let mean = sum / count as f64;

    let variance: f64 = data
        .iter()
        .map(|value| {
            let diff = mean - *value;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    (mean, variance.sqrt())
}

/// Trailing simple moving average. `None` until `period` samples are available.
pub fn rolling_mean(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let period = period.max(1);
    let mut out = Vec::with_capacity(data.len());
    let mut rolling_sum = 0.0;

    for (i, value) in data.iter().enumerate() {
        rolling_sum += value;
        if i >= period {
            // Subtract the element that fell out of the window
            rolling_sum -= data[i - period];
        }
        if i + 1 >= period {
            out.push(Some(rolling_sum / period as f64));
        } else {
            out.push(None);
        }
    }
    out
}
