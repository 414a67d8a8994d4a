//! Basic descriptive statistics shared by the diagnostic steps.

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance (divides by n), the normalization the ACF uses.
pub fn variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (divides by n − 1), matching the rolling-window
/// convention of the original diagnostics.
pub fn sample_std(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return f64::NAN;
    }
    let m = mean(data);
    let ss: f64 = data.iter().map(|x| (x - m).powi(2)).sum();
    (ss / (data.len() - 1) as f64).sqrt()
}

/// Trailing rolling mean. Position i looks at data[i+1−window ..= i] only, so
/// the first window−1 positions are gaps and there is no look-ahead.
pub fn rolling_mean(data: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(data, window, mean)
}

/// Trailing rolling sample standard deviation, same alignment as
/// [`rolling_mean`].
pub fn rolling_std(data: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(data, window, sample_std)
}

fn rolling(data: &[f64], window: usize, stat: fn(&[f64]) -> f64) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; data.len()];
    }
    data.iter()
        .enumerate()
        .map(|(i, _)| {
            if i + 1 < window {
                None
            } else {
                Some(stat(&data[i + 1 - window..=i]))
            }
        })
        .collect()
}
