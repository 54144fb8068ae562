//! Figure rendering. Consumes fully-computed arrays; nothing here feeds
//! back into the numeric core.

use std::path::Path;

use plotters::element::ErrorBar;
use plotters::prelude::*;

use crate::error::Result;
use crate::fit::{PowerLawFit, DOOR_EXPONENT};
use crate::models::{Particle, TrajectoryConfig};

/// Fixed label order of the integration-scheme error rows.
pub const SCHEME_LABELS: [&str; 3] = ["Verlet", "Beemam", "Gear"];

/// Time-step ladder the scheme errors were sampled on.
pub const SCHEME_TIMESTEPS: [f64; 8] = [1e-1, 1e-2, 1e-3, 1e-4, 1e-5, 1e-6, 1e-7, 1e-8];

/// Q(t) scatter, one series per door width.
pub fn flow_rate_series(
    path: &Path,
    dt: f64,
    series: &[Vec<f64>],
    widths: &[f64],
) -> Result<()> {
    let t_max = series.iter().map(|q| q.len()).max().unwrap_or(0) as f64 * dt;
    let q_max = series.iter().flatten().cloned().fold(0.0f64, f64::max);
    let q_min = series.iter().flatten().cloned().fold(0.0f64, f64::min);
    if t_max <= 0.0 {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (1400, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Outflow rate over time", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(42)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..t_max, q_min..q_max * 1.05 + 1e-9)?;
    chart
        .configure_mesh()
        .x_desc("t (s)")
        .y_desc("Q(t) (1/s)")
        .draw()?;

    for (i, (q, d)) in series.iter().zip(widths).enumerate() {
        let color = Palette99::pick(i);
        chart
            .draw_series(
                q.iter()
                    .enumerate()
                    .map(|(j, v)| Circle::new((j as f64 * dt, *v), 2, color.filled())),
            )?
            .label(format!("d={}m", d))
            .legend(move |(x, y)| Circle::new((x + 9, y), 4, color.filled()));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Mean rate vs door width with ±σ error bars and the fitted curve.
pub fn rate_vs_width(
    path: &Path,
    widths: &[f64],
    summary: &[(f64, f64)],
    best_b: f64,
) -> Result<()> {
    if widths.is_empty() {
        return Ok(());
    }
    let d_max = widths.iter().cloned().fold(0.0f64, f64::max) * 1.1;
    let q_max = summary
        .iter()
        .map(|(mean, std)| mean + std)
        .fold(0.0f64, f64::max)
        .max(best_b * d_max.powf(DOOR_EXPONENT));

    let root = BitMapBackend::new(path, (1400, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Mean outflow rate vs door width", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(42)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..d_max, 0f64..q_max * 1.05 + 1e-9)?;
    chart
        .configure_mesh()
        .x_desc("d: door width (m)")
        .y_desc("<Q_d>: mean rate (1/s)")
        .draw()?;

    chart.draw_series(widths.iter().zip(summary).map(|(d, (mean, std))| {
        ErrorBar::new_vertical(*d, mean - std, *mean, mean + std, BLUE.filled(), 10)
    }))?;

    let curve: Vec<(f64, f64)> = itertools_num::linspace(0.0, d_max, 200)
        .map(|d| (d, best_b * d.powf(DOOR_EXPONENT)))
        .collect();
    chart
        .draw_series(LineSeries::new(curve, RED.stroke_width(2)))?
        .label(format!("B={:.3}", best_b))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()?;
    root.present()?;
    Ok(())
}

/// Mean-squared residual against candidate coefficient, log-y.
pub fn fit_residuals(path: &Path, fit: &PowerLawFit) -> Result<()> {
    let positive: Vec<(f64, f64)> = fit
        .coefficients
        .iter()
        .zip(&fit.residuals)
        .filter(|(_, r)| r.is_finite() && **r > 0.0)
        .map(|(b, r)| (*b, *r))
        .collect();
    if positive.is_empty() {
        return Ok(());
    }
    let y_min = positive.iter().map(|(_, r)| *r).fold(f64::MAX, f64::min);
    let y_max = positive.iter().map(|(_, r)| *r).fold(0.0f64, f64::max);
    let x_min = fit.coefficients[0];
    let x_max = fit.coefficients[fit.coefficients.len() - 1];
    if x_max <= x_min {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (1400, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Fit residual by coefficient", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(42)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, (y_min..y_max * 1.1).log_scale())?;
    chart
        .configure_mesh()
        .x_desc("B (1/(s m^1.5))")
        .y_desc("mean squared residual (1/s^2)")
        .draw()?;

    chart.draw_series(LineSeries::new(positive, BLUE.stroke_width(2)))?;
    root.present()?;
    Ok(())
}

/// Per-scheme integration error vs time step, log-log. The first sample
/// of each row (the 1e-1 column) is skipped. Rows map onto the fixed
/// label order, so more rows than labels is malformed input.
pub fn scheme_errors(path: &Path, rows: &[Vec<f64>]) -> Result<()> {
    if rows.len() > SCHEME_LABELS.len() {
        return Err(crate::error::Error::Decode(format!(
            "{} scheme rows, but only {} labels are known",
            rows.len(),
            SCHEME_LABELS.len()
        )));
    }
    let mut curves: Vec<Vec<(f64, f64)>> = Vec::with_capacity(rows.len());
    for row in rows {
        curves.push(
            SCHEME_TIMESTEPS
                .iter()
                .zip(row)
                .skip(1)
                .filter(|(_, e)| e.is_finite() && **e > 0.0)
                .map(|(t, e)| (*t, *e))
                .collect(),
        );
    }
    let samples: Vec<f64> = curves.iter().flatten().map(|(_, e)| *e).collect();
    if samples.is_empty() {
        return Ok(());
    }
    let y_min = samples.iter().cloned().fold(f64::MAX, f64::min);
    let y_max = samples.iter().cloned().fold(0.0f64, f64::max);

    let root = BitMapBackend::new(path, (1000, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Integration error by time step", ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(42)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (1e-8f64..1e-1f64).log_scale(),
            (y_min * 0.5..y_max * 2.0).log_scale(),
        )?;
    chart
        .configure_mesh()
        .x_desc("dt (s)")
        .y_desc("mean squared error (m^2)")
        .draw()?;

    for (i, curve) in curves.iter().enumerate() {
        if curve.is_empty() {
            continue;
        }
        let color = Palette99::pick(i);
        let legend_color = Palette99::pick(i);
        chart
            .draw_series(LineSeries::new(curve.clone(), color.stroke_width(2)))?
            .label(SCHEME_LABELS[i])
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], legend_color.stroke_width(2))
            });
        chart.draw_series(
            curve
                .iter()
                .map(|(t, e)| Circle::new((*t, *e), 4, color.filled())),
        )?;
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()?;
    root.present()?;
    Ok(())
}

/// One tick of a trajectory: particles as filled circles at physical
/// radius, with a velocity segment along the travel direction.
pub fn trajectory_frame(
    path: &Path,
    tick: usize,
    frame: &[Particle],
    config: &TrajectoryConfig,
) -> Result<()> {
    let w = config.space_width;
    if w <= 0.0 {
        return Ok(());
    }

    let root = BitMapBackend::new(path, (1000, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("tick {} (action radius {} m)", tick, config.action_radius),
            ("sans-serif", 24),
        )
        .margin(20)
        .x_label_area_size(42)
        .y_label_area_size(56)
        .build_cartesian_2d(0f64..w, 0f64..w)?;
    chart.configure_mesh().x_desc("x (m)").y_desc("y (m)").draw()?;

    // data-to-pixel scale, so each circle is drawn at physical radius
    let (px, _) = chart.plotting_area().get_pixel_range();
    let scale = (px.end - px.start) as f64 / w;

    let wrap = |v: f64| {
        if config.periodic_border {
            v.rem_euclid(w)
        } else {
            v
        }
    };

    chart.draw_series(frame.iter().map(|p| {
        let r = ((p.radius * scale).round() as i32).max(1);
        Circle::new((wrap(p.x), wrap(p.y)), r, BLUE.mix(0.6).filled())
    }))?;
    chart.draw_series(frame.iter().map(|p| {
        let (x, y) = (wrap(p.x), wrap(p.y));
        let tip = (
            x + p.velocity_mod * p.velocity_dir.cos(),
            y + p.velocity_mod * p.velocity_dir.sin(),
        );
        PathElement::new(vec![(x, y), tip], BLACK.stroke_width(1))
    }))?;
    root.present()?;
    Ok(())
}
