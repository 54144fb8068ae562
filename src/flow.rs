//! Windowed outflow-rate estimation from cumulative escape counts.

use crate::error::{Error, Result};
use crate::models::Round;

/// Estimate the instantaneous outflow rate of one round.
///
/// The per-tick escape counts are first averaged across trials, then the
/// mean series is differenced over a trailing window of `window` ticks
/// and scaled by `1/dt`, giving one rate sample (1/s) per valid start
/// index. Output length is `series length - window`.
///
/// The window must satisfy `1 <= window <= series length`, and all trial
/// series must have equal length.
pub fn caudal(runs: &[Vec<u64>], dt: f64, window: usize) -> Result<Vec<f64>> {
    let len = runs.first().map(|r| r.len()).unwrap_or(0);
    if window == 0 || window > len {
        return Err(Error::InvalidWindow { window, len });
    }
    for run in runs {
        if run.len() != len {
            return Err(Error::RaggedSeries {
                expected: len,
                found: run.len(),
            });
        }
    }

    let inv_trials = 1.0 / runs.len() as f64;
    let mean: Vec<f64> = (0..len)
        .map(|i| runs.iter().map(|run| run[i] as f64).sum::<f64>() * inv_trials)
        .collect();

    let scale = 1.0 / (window as f64 * dt);
    Ok((0..len - window)
        .map(|i| (mean[i + window] - mean[i]) * scale)
        .collect())
}

/// Time step shared by every round of a summary.
///
/// The estimator reads a single `dt` for all rounds; a summary whose
/// rounds disagree is rejected rather than silently averaged over a
/// wrong step.
pub fn uniform_dt(rounds: &[Round]) -> Result<f64> {
    let first = rounds
        .first()
        .ok_or_else(|| Error::Decode("round summary holds no rounds".into()))?;
    for round in rounds {
        if round.dt != first.dt {
            return Err(Error::NonUniformDt {
                expected: first.dt,
                found: round.dt,
            });
        }
    }
    Ok(first.dt)
}

/// Slice the stable sub-window of a rate series, clamping both bounds to
/// the series length. An inverted range is empty.
pub fn stable_window(series: &[f64], start: usize, end: usize) -> &[f64] {
    let start = start.min(series.len());
    let end = end.min(series.len()).max(start);
    &series[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DoorSpec;

    fn round_with_dt(dt: f64) -> Round {
        Round {
            dt,
            door: DoorSpec {
                door_distance: 1.2,
                particle_count: 200,
            },
            escapes_by_run: vec![vec![0, 1, 2]],
        }
    }

    #[test]
    fn output_length_is_series_minus_window() {
        let counts: Vec<u64> = (0..50).collect();
        let q = caudal(&[counts], 0.1, 7).unwrap();
        assert_eq!(q.len(), 43);
    }

    #[test]
    fn constant_rate_input_gives_constant_output() {
        // count grows by exactly 3 per tick, so every sample is 3/dt
        let dt = 0.25;
        let counts: Vec<u64> = (0..40).map(|i| 3 * i).collect();
        let q = caudal(&[counts], dt, 8).unwrap();
        assert_eq!(q.len(), 32);
        for sample in q {
            assert!((sample - 3.0 / dt).abs() < 1e-12, "sample = {}", sample);
        }
    }

    #[test]
    fn trials_are_averaged_elementwise() {
        let slow: Vec<u64> = (0..20).collect();
        let fast: Vec<u64> = (0..20).map(|i| 3 * i).collect();
        let q = caudal(&[slow, fast], 1.0, 5).unwrap();
        // mean count grows by 2 per tick
        for sample in q {
            assert!((sample - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_window_is_invalid() {
        let err = caudal(&[vec![0, 1, 2]], 0.1, 0).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { window: 0, len: 3 }));
    }

    #[test]
    fn window_longer_than_series_is_invalid() {
        let err = caudal(&[vec![0, 1, 2]], 0.1, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { window: 4, len: 3 }));
    }

    #[test]
    fn window_equal_to_series_yields_empty_output() {
        let q = caudal(&[vec![0, 1, 2]], 0.1, 3).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn no_trials_means_zero_length_series() {
        let err = caudal(&[], 0.1, 1).unwrap_err();
        assert!(matches!(err, Error::InvalidWindow { window: 1, len: 0 }));
    }

    #[test]
    fn ragged_trials_are_rejected() {
        let err = caudal(&[vec![0, 1, 2], vec![0, 1]], 0.1, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::RaggedSeries {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn uniform_dt_reads_the_shared_step() {
        let rounds = vec![round_with_dt(0.1), round_with_dt(0.1)];
        assert_eq!(uniform_dt(&rounds).unwrap(), 0.1);
    }

    #[test]
    fn uniform_dt_rejects_disagreeing_rounds() {
        let rounds = vec![round_with_dt(0.1), round_with_dt(0.2)];
        assert!(matches!(
            uniform_dt(&rounds).unwrap_err(),
            Error::NonUniformDt { .. }
        ));
    }

    #[test]
    fn stable_window_clamps_and_handles_inversion() {
        let series = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(stable_window(&series, 1, 3), &[2.0, 3.0]);
        assert_eq!(stable_window(&series, 2, 100), &[3.0, 4.0]);
        assert_eq!(stable_window(&series, 10, 20), &[] as &[f64]);
        assert_eq!(stable_window(&series, 3, 1), &[] as &[f64]);
    }
}
