//! Brute-force power-law fit of mean outflow rate against door width.

use crate::error::{Error, Result};
use crate::stats::KahanAdder;

/// Exponent of the rate law `Q = B * d^1.5`.
pub const DOOR_EXPONENT: f64 = 1.5;

/// Full result of a grid search: every candidate coefficient with its
/// mean-squared residual.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerLawFit {
    pub coefficients: Vec<f64>,
    pub residuals: Vec<f64>,
}

impl PowerLawFit {
    /// Index of the candidate with the smallest residual (first on ties).
    pub fn best_index(&self) -> usize {
        let mut best = 0;
        for (i, residual) in self.residuals.iter().enumerate() {
            if *residual < self.residuals[best] {
                best = i;
            }
        }
        best
    }

    /// Best coefficient and its residual.
    pub fn best(&self) -> (f64, f64) {
        let i = self.best_index();
        (self.coefficients[i], self.residuals[i])
    }
}

/// Fit `rate = B * width^1.5` by exhaustive search over a uniform grid
/// of `count` coefficients spanning `[start, end]` inclusive.
///
/// An exhaustive scan is deliberate here: the objective is convex in the
/// coefficient, the grid bounds the numeric behavior, and the data sets
/// are a handful of points.
pub fn fit_power_law(
    widths: &[f64],
    rates: &[f64],
    start: f64,
    end: f64,
    count: usize,
) -> Result<PowerLawFit> {
    if widths.is_empty() {
        return Err(Error::InvalidFitInput("no observations".into()));
    }
    if widths.len() != rates.len() {
        return Err(Error::InvalidFitInput(format!(
            "{} widths vs {} rates",
            widths.len(),
            rates.len()
        )));
    }
    if !(start < end) {
        return Err(Error::InvalidFitInput(format!(
            "search range [{}, {}] is empty",
            start, end
        )));
    }
    if count == 0 {
        return Err(Error::InvalidFitInput("coefficient grid is empty".into()));
    }

    let powered: Vec<f64> = widths.iter().map(|d| d.powf(DOOR_EXPONENT)).collect();
    let inv = 1.0 / widths.len() as f64;

    let coefficients: Vec<f64> = itertools_num::linspace(start, end, count).collect();
    let residuals: Vec<f64> = coefficients
        .iter()
        .map(|b| {
            let mut acc = KahanAdder::new();
            for (p, q) in powered.iter().zip(rates) {
                let r = b * p - q;
                acc += r * r;
            }
            acc.result() * inv
        })
        .collect();

    Ok(PowerLawFit {
        coefficients,
        residuals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_synthetic_coefficient() {
        let widths = [1.0f64, 1.5, 2.0, 3.0];
        let rates: Vec<f64> = widths.iter().map(|d| 2.5 * d.powf(1.5)).collect();
        let fit = fit_power_law(&widths, &rates, 1.0, 4.0, 100_000).unwrap();
        let (b, residual) = fit.best();
        assert!((b - 2.5).abs() < 1e-3, "b = {}", b);
        assert!(residual < 1e-6, "residual = {}", residual);
    }

    #[test]
    fn grid_length_equals_count() {
        let fit = fit_power_law(&[1.0, 2.0], &[1.0, 3.0], 1.0, 2.0, 57).unwrap();
        assert_eq!(fit.coefficients.len(), 57);
        assert_eq!(fit.residuals.len(), 57);
    }

    #[test]
    fn grid_is_inclusive_of_both_bounds() {
        let fit = fit_power_law(&[1.0], &[1.0], 1.0, 2.0, 11).unwrap();
        assert!((fit.coefficients[0] - 1.0).abs() < 1e-12);
        assert!((fit.coefficients[10] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn best_index_is_the_grid_minimum() {
        let widths = [0.5f64, 1.0, 1.5, 2.5];
        let rates: Vec<f64> = widths.iter().map(|d| 1.37 * d.powf(1.5) + 0.01).collect();
        let fit = fit_power_law(&widths, &rates, 1.0, 2.0, 5_000).unwrap();
        let best = fit.best_index();
        for residual in &fit.residuals {
            assert!(fit.residuals[best] <= *residual);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            fit_power_law(&[], &[], 1.0, 2.0, 10),
            Err(Error::InvalidFitInput(_))
        ));
        assert!(matches!(
            fit_power_law(&[1.0], &[1.0, 2.0], 1.0, 2.0, 10),
            Err(Error::InvalidFitInput(_))
        ));
        assert!(matches!(
            fit_power_law(&[1.0], &[1.0], 2.0, 1.0, 10),
            Err(Error::InvalidFitInput(_))
        ));
        assert!(matches!(
            fit_power_law(&[1.0], &[1.0], 1.0, 1.0, 10),
            Err(Error::InvalidFitInput(_))
        ));
        assert!(matches!(
            fit_power_law(&[1.0], &[1.0], 1.0, 2.0, 0),
            Err(Error::InvalidFitInput(_))
        ));
    }
}
