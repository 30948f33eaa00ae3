//! Phase-space rendering: each trajectory is drawn as prey `x` against
//! predator `y`, one legend entry per series, in input order.

use std::error::Error;
use std::fs::create_dir_all;
use std::path::Path;

use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{LvError, Result};
use crate::sweep::LabeledTrajectory;

/// Rendering options, passed explicitly to every render call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotStyle {
    #[serde(default = "PlotStyle::default_width")]
    pub width: u32,
    #[serde(default = "PlotStyle::default_height")]
    pub height: u32,
    #[serde(default = "PlotStyle::default_font_family")]
    pub font_family: String,
    #[serde(default = "PlotStyle::default_caption_size")]
    pub caption_size: u32,
    #[serde(default = "PlotStyle::default_stroke_width")]
    pub stroke_width: u32,
    /// Series longer than this are thinned before drawing.
    #[serde(default = "PlotStyle::default_max_points")]
    pub max_points: usize,
    #[serde(default = "PlotStyle::default_x_label")]
    pub x_label: String,
    #[serde(default = "PlotStyle::default_y_label")]
    pub y_label: String,
}

impl PlotStyle {
    fn default_width() -> u32 {
        1200
    }
    fn default_height() -> u32 {
        900
    }
    fn default_font_family() -> String {
        "sans-serif".to_string()
    }
    fn default_caption_size() -> u32 {
        22
    }
    fn default_stroke_width() -> u32 {
        2
    }
    fn default_max_points() -> usize {
        50_000
    }
    fn default_x_label() -> String {
        "x".to_string()
    }
    fn default_y_label() -> String {
        "y".to_string()
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            font_family: Self::default_font_family(),
            caption_size: Self::default_caption_size(),
            stroke_width: Self::default_stroke_width(),
            max_points: Self::default_max_points(),
            x_label: Self::default_x_label(),
            y_label: Self::default_y_label(),
        }
    }
}

/// A series reduced to what can actually be drawn.
struct PlotSeries<'a> {
    label: String,
    points: Vec<(f64, f64)>,
    source: &'a LabeledTrajectory,
}

/// Finite points of `entry`, thinned to at most `max_points` with the last
/// finite point always kept.
fn plottable_points(entry: &LabeledTrajectory, max_points: usize) -> Vec<(f64, f64)> {
    let finite: Vec<(f64, f64)> = entry
        .trajectory
        .points()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let max_points = max_points.max(2);
    if finite.len() <= max_points {
        return finite;
    }
    let stride = finite.len().div_ceil(max_points - 1);
    let mut thinned: Vec<(f64, f64)> = finite.iter().step_by(stride).copied().collect();
    if let Some(&last) = finite.last() {
        if thinned.last() != Some(&last) {
            thinned.push(last);
        }
    }
    thinned
}

fn axis_bounds(series: &[PlotSeries<'_>]) -> ((f64, f64), (f64, f64)) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for (px, py) in series.iter().flat_map(|s| s.points.iter()) {
        x = (x.0.min(*px), x.1.max(*px));
        y = (y.0.min(*py), y.1.max(*py));
    }
    (pad_range(x), pad_range(y))
}

fn pad_range((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * lo.abs().max(1.0) {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = span * 0.05;
    (lo - pad, hi + pad)
}

/// Series that can be drawn, in input order. Diverged series get a legend tag;
/// series with fewer than two finite points are dropped.
fn prepare_series(series: &[LabeledTrajectory], max_points: usize) -> Vec<PlotSeries<'_>> {
    let mut drawable = Vec::with_capacity(series.len());
    for entry in series {
        let points = plottable_points(entry, max_points);
        if points.len() < 2 {
            warn!(label = %entry.label, "skipping series with no plottable points");
            continue;
        }
        let label = if entry.trajectory.is_finite() {
            entry.label.clone()
        } else {
            format!("{} (diverged)", entry.label)
        };
        drawable.push(PlotSeries {
            label,
            points,
            source: entry,
        });
    }
    drawable
}

/// Draw `series` into a PNG at `path`, creating its directory if needed.
///
/// Series without two finite points are skipped with a warning; diverged
/// series keep their finite prefix and are marked in the legend.
pub fn render_phase_plot(
    series: &[LabeledTrajectory],
    title: &str,
    path: &Path,
    style: &PlotStyle,
) -> Result<()> {
    let write_err = |message: String| LvError::OutputWrite {
        path: path.to_path_buf(),
        message,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir).map_err(|e| write_err(e.to_string()))?;
    }

    let drawable = prepare_series(series, style.max_points);
    draw_phase_plot(&drawable, title, path, style).map_err(|e| write_err(e.to_string()))?;
    info!(
        path = %path.display(),
        series = drawable.len(),
        skipped = series.len() - drawable.len(),
        "wrote phase plot"
    );
    Ok(())
}

fn draw_phase_plot(
    series: &[PlotSeries<'_>],
    title: &str,
    path: &Path,
    style: &PlotStyle,
) -> std::result::Result<(), Box<dyn Error>> {
    let ((x_min, x_max), (y_min, y_max)) = axis_bounds(series);
    let family = style.font_family.as_str();

    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (family, style.caption_size))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .label_style((family, 14))
        .draw()?;

    let stroke = style.stroke_width;
    for (idx, s) in series.iter().enumerate() {
        let color = Palette99::pick(idx).mix(0.9);
        chart
            .draw_series(LineSeries::new(
                s.points.iter().copied(),
                color.stroke_width(stroke),
            ))?
            .label(s.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(stroke))
            });
        if s.source.trajectory.divergence_step().is_some() {
            if let Some(&end) = s.points.last() {
                chart.draw_series(std::iter::once(Circle::new(end, 5, color.filled())))?;
            }
        }
    }

    if !series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((family, 14))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Coefficients, SimulationSettings, State, run_with};

    fn entry(step_count: usize) -> LabeledTrajectory {
        LabeledTrajectory {
            label: "test".to_string(),
            trajectory: run_with(
                State::new(1.0, 0.5),
                &Coefficients::new(0.9, 0.6, 0.4, 0.3),
                &SimulationSettings::full(step_count, 1e-3),
                None,
            )
            .unwrap(),
        }
    }

    #[test]
    fn thinning_keeps_endpoints_and_limit() {
        let e = entry(10_000);
        let pts = plottable_points(&e, 500);
        assert!(pts.len() <= 501, "len={}", pts.len());
        let first = e.trajectory.first();
        let last = e.trajectory.last();
        assert_eq!(pts[0], (first.x, first.y));
        assert_eq!(*pts.last().unwrap(), (last.x, last.y));
    }

    #[test]
    fn short_series_are_untouched() {
        let e = entry(10);
        assert_eq!(plottable_points(&e, 500).len(), 11);
    }

    fn diverged(label: &str, alpha: f64) -> LabeledTrajectory {
        LabeledTrajectory {
            label: label.to_string(),
            trajectory: run_with(
                State::new(5.0, 5.0),
                &Coefficients::new(alpha, 1e3, 1e3, 1e3),
                &SimulationSettings::full(2_000, 1.0),
                None,
            )
            .unwrap(),
        }
    }

    #[test]
    fn diverged_series_are_tagged_and_empty_ones_dropped() {
        let instant = LabeledTrajectory {
            label: "instant".to_string(),
            trajectory: run_with(
                State::new(5.0, 5.0),
                &Coefficients::new(1e300, 1e300, 1e300, 1e300),
                &SimulationSettings::full(10, 1e10),
                None,
            )
            .unwrap(),
        };
        assert_eq!(instant.trajectory.divergence_step(), Some(1));

        let batch = vec![entry(50), diverged("blowup", 0.5), instant];
        let prepared = prepare_series(&batch, 500);
        let labels: Vec<&str> = prepared.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["test", "blowup (diverged)"]);
        assert!(
            prepared[1]
                .points
                .iter()
                .all(|(x, y)| x.is_finite() && y.is_finite())
        );
    }

    #[test]
    fn degenerate_bounds_get_padding() {
        assert_eq!(pad_range((1.0, 1.0)), (0.5, 1.5));
        assert_eq!(pad_range((f64::INFINITY, f64::NEG_INFINITY)), (0.0, 1.0));
        let (lo, hi) = pad_range((0.0, 10.0));
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }
}
