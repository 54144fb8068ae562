mod config;

use std::fs;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use caudal::error::Error;
use caudal::{fit, flow, models, plot, stats};

use crate::config::{Config, FlowParams, ProgramMode, SchemeParams, TrajectoryParams};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    // a user interrupt mid-render is a normal way to stop the run
    ctrlc::set_handler(|| std::process::exit(0))?;

    // parse command line options
    let config = Config::new()?;

    match &config.mode {
        ProgramMode::Flow(params) => run_flow(params),
        ProgramMode::Schemes(params) => run_schemes(params),
        ProgramMode::Trajectory(params) => run_trajectory(params),
    }
}

#[derive(Serialize)]
struct FitSummary {
    dt: f64,
    window: usize,
    best_coefficient: f64,
    best_residual: f64,
    rounds: Vec<RoundReport>,
}

#[derive(Serialize)]
struct RoundReport {
    door_distance: f64,
    mean_rate: f64,
    std_rate: f64,
}

fn run_flow(params: &FlowParams) -> anyhow::Result<()> {
    let text = fs::read_to_string(&params.data)
        .with_context(|| format!("failed to read {}", params.data.display()))?;
    let value: Value = serde_json::from_str(&text)?;
    let summary = models::decode_round_summary(&value)?;
    let dt = flow::uniform_dt(&summary.rounds)?;
    info!("decoded {} rounds (dt = {} s)", summary.rounds.len(), dt);

    let mut widths = Vec::with_capacity(summary.rounds.len());
    let mut series = Vec::with_capacity(summary.rounds.len());
    let mut round_stats = Vec::with_capacity(summary.rounds.len());
    for round in &summary.rounds {
        let q = flow::caudal(&round.escapes_by_run, dt, params.window)?;
        let stable = flow::stable_window(&q, params.stable_start, params.stable_end);
        if stable.is_empty() {
            return Err(Error::InvalidFitInput(format!(
                "stable window {}..{} holds no samples for door width {}",
                params.stable_start, params.stable_end, round.door.door_distance
            ))
            .into());
        }
        round_stats.push(stats::mean_and_std(stable));
        widths.push(round.door.door_distance);
        series.push(q);
    }

    let mean_rates: Vec<f64> = round_stats.iter().map(|(mean, _)| *mean).collect();
    let fit = fit::fit_power_law(
        &widths,
        &mean_rates,
        params.fit_start,
        params.fit_end,
        params.fit_count,
    )?;
    let (best_b, best_residual) = fit.best();

    fs::create_dir_all(&params.outdir)?;

    let figure = params.outdir.join("flow_rate_series.png");
    plot::flow_rate_series(&figure, dt, &series, &widths)?;
    info!("wrote {}", figure.display());

    let figure = params.outdir.join("rate_vs_width.png");
    plot::rate_vs_width(&figure, &widths, &round_stats, best_b)?;
    info!("wrote {}", figure.display());

    let figure = params.outdir.join("fit_residuals.png");
    plot::fit_residuals(&figure, &fit)?;
    info!("wrote {}", figure.display());

    let report = FitSummary {
        dt,
        window: params.window,
        best_coefficient: best_b,
        best_residual,
        rounds: widths
            .iter()
            .zip(&round_stats)
            .map(|(d, (mean, std))| RoundReport {
                door_distance: *d,
                mean_rate: *mean,
                std_rate: *std,
            })
            .collect(),
    };
    let summary_path = params.outdir.join("fit_summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&report)?)?;
    info!("wrote {}", summary_path.display());

    println!("B = {:.4} 1/(s m^1.5), mse = {:.6e}", best_b, best_residual);
    Ok(())
}

fn run_schemes(params: &SchemeParams) -> anyhow::Result<()> {
    let text = fs::read_to_string(&params.data)
        .with_context(|| format!("failed to read {}", params.data.display()))?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&text)?;
    info!("decoded {} scheme error rows", rows.len());

    fs::create_dir_all(&params.outdir)?;
    let figure = params.outdir.join("scheme_errors.png");
    plot::scheme_errors(&figure, &rows)?;
    info!("wrote {}", figure.display());
    Ok(())
}

fn run_trajectory(params: &TrajectoryParams) -> anyhow::Result<()> {
    let text = fs::read_to_string(&params.config)
        .with_context(|| format!("failed to read {}", params.config.display()))?;
    let config = models::decode_trajectory_config(&serde_json::from_str(&text)?)?;

    let states_text = fs::read_to_string(&config.output_file)
        .with_context(|| format!("failed to read {}", config.output_file))?;
    let states = models::decode_trajectory(&serde_json::from_str(&states_text)?)?;
    info!("decoded {} ticks from {}", states.len(), config.output_file);

    fs::create_dir_all(&params.outdir)?;
    let mut written = 0usize;
    for (tick, frame) in states.iter().enumerate().step_by(params.stride) {
        let figure = params.outdir.join(format!("frame_{:05}.png", tick));
        plot::trajectory_frame(&figure, tick, frame, &config)?;
        written += 1;
    }
    info!("wrote {} frames to {}", written, params.outdir.display());
    Ok(())
}
