//! Simple moving average over a trailing window.

/// Trailing arithmetic mean of `values` over `window` observations.
///
/// The output is aligned with the input: index `i` holds the mean of
/// `values[i + 1 - window..=i]`, and the first `window - 1` entries are `None`.
/// A zero window or one longer than the input yields all `None`.
pub fn simple_moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }

    // Each window is summed afresh; a running sum cancels badly across magnitudes.
    let width = window as f64;
    for (slot, chunk) in out[window - 1..].iter_mut().zip(values.windows(window)) {
        *slot = Some(chunk.iter().sum::<f64>() / width);
    }
    out
}
