//! Ordinary-least-squares trend line over an evenly spaced sequence.

use serde::Serialize;

/// `y = slope * x + intercept`, with `x` the bar index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// The line evaluated at `x = 0..len`.
    pub fn evaluate(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.at(i as f64)).collect()
    }
}

/// Fits `values[i]` against `i`. Needs at least two points.
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n_f;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    // sxx > 0 whenever n >= 2
    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn needs_two_points() {
        assert!(linear_fit(&[]).is_none());
        assert!(linear_fit(&[42.0]).is_none());
        let fit = linear_fit(&[1.0, 3.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fits_noisy_points() {
        // y = 2x + 1 with symmetric noise
        let fit = linear_fit(&[1.5, 2.5, 5.5, 6.5]).unwrap();
        assert!((fit.slope - 1.8).abs() < 1e-12);
        assert!((fit.intercept - 1.3).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn reproduces_linear_sequences(
            start in 0.0f64..500.0,
            step in -5.0f64..5.0,
            len in 2usize..200,
        ) {
            let ys: Vec<f64> = (0..len).map(|i| start + step * i as f64).collect();
            let line = linear_fit(&ys).unwrap().evaluate(len);
            for (got, want) in line.iter().zip(&ys) {
                prop_assert!((got - want).abs() < 1e-6, "{} vs {}", got, want);
            }
        }

        #[test]
        fn constant_sequence_is_flat(value in 0.0f64..10_000.0, len in 2usize..200) {
            let fit = linear_fit(&vec![value; len]).unwrap();
            prop_assert!(fit.slope.abs() < 1e-9);
            for y in fit.evaluate(len) {
                prop_assert!((y - value).abs() < 1e-6);
            }
        }
    }
}
