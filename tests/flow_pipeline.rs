use caudal::fit::fit_power_law;
use caudal::flow::{caudal, stable_window, uniform_dt};
use caudal::models::decode_round_summary;
use caudal::stats::mean_and_std;
use serde_json::Value;

/// Two rounds at dt = 0.1 with 20 ticks each: counts grow by 1 and by 2
/// per tick, so the windowed rate must be flat at 10.0 and 20.0.
fn two_round_summary() -> String {
    let slow: Vec<u64> = (0..20).collect();
    let fast: Vec<u64> = (0..20).map(|i| 2 * i).collect();
    format!(
        r#"{{
            "rounds": [
                {{
                    "dt": 0.1,
                    "distanceParticle": {{ "doorDistance": 1.0, "particleCount": 200 }},
                    "escapesByRun": [{:?}]
                }},
                {{
                    "dt": 0.1,
                    "distanceParticle": {{ "doorDistance": 2.0, "particleCount": 200 }},
                    "escapesByRun": [{:?}]
                }}
            ]
        }}"#,
        slow, fast
    )
}

#[test]
fn estimator_is_flat_for_linear_escape_counts() {
    let value: Value = serde_json::from_str(&two_round_summary()).expect("JSON parses");
    let summary = decode_round_summary(&value).expect("summary decodes");
    let dt = uniform_dt(&summary.rounds).expect("shared dt");
    let window = 5;

    let expected = [10.0, 20.0];
    for (round, want) in summary.rounds.iter().zip(&expected) {
        let q = caudal(&round.escapes_by_run, dt, window).expect("estimator runs");
        assert_eq!(q.len(), 15, "20 ticks minus a 5-tick window");
        for sample in &q {
            assert!(
                (sample - want).abs() < 1e-9,
                "sample = {}, want = {}",
                sample,
                want
            );
        }
    }
}

#[test]
fn stable_window_summary_feeds_the_fitter() {
    let value: Value = serde_json::from_str(&two_round_summary()).expect("JSON parses");
    let summary = decode_round_summary(&value).expect("summary decodes");
    let dt = uniform_dt(&summary.rounds).expect("shared dt");

    let mut widths = Vec::new();
    let mut rates = Vec::new();
    for round in &summary.rounds {
        let q = caudal(&round.escapes_by_run, dt, 5).expect("estimator runs");
        let stable = stable_window(&q, 2, 12);
        assert_eq!(stable.len(), 10);
        let (mean, std) = mean_and_std(stable);
        assert!(std.abs() < 1e-9, "flat series has zero spread");
        widths.push(round.door.door_distance);
        rates.push(mean);
    }
    assert!((rates[0] - 10.0).abs() < 1e-9);
    assert!((rates[1] - 20.0).abs() < 1e-9);

    let fit = fit_power_law(&widths, &rates, 1.0, 12.0, 20_000).expect("fit runs");
    assert_eq!(fit.coefficients.len(), 20_000);

    // best residual must be the grid minimum, checked directly
    let best = fit.best_index();
    for residual in &fit.residuals {
        assert!(fit.residuals[best] <= *residual);
    }
    let (b, _) = fit.best();
    assert!(b > 1.0 && b < 12.0);
}

#[test]
fn mixed_time_steps_are_rejected() {
    let text = r#"{
        "rounds": [
            {
                "dt": 0.1,
                "distanceParticle": { "doorDistance": 1.0, "particleCount": 200 },
                "escapesByRun": [[0, 1, 2]]
            },
            {
                "dt": 0.2,
                "distanceParticle": { "doorDistance": 2.0, "particleCount": 200 },
                "escapesByRun": [[0, 1, 2]]
            }
        ]
    }"#;
    let value: Value = serde_json::from_str(text).expect("JSON parses");
    let summary = decode_round_summary(&value).expect("summary decodes");
    assert!(uniform_dt(&summary.rounds).is_err());
}
