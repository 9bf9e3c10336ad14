/// Centered moving average over a series with gaps.
///
/// A point only gets a value when its whole window lies inside the series and
/// holds no missing values. For an even window the extra sample is taken from
/// before the point.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window <= 1 {
        return values.to_vec();
    }

    let len = values.len();
    let offset = (window - 1) / 2;

    (0..len)
        .map(|i| {
            let end = i + offset + 1;
            if end > len || end < window {
                return None;
            }
            let start = end - window;
            values[start..end]
                .iter()
                .copied()
                .try_fold(0.0, |acc, v| v.map(|v| acc + v))
                .map(|sum| sum / window as f64)
        })
        .collect()
}
