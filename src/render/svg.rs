//! Writes a [`Figure`] to an SVG file.

use std::path::Path;

use anyhow::Result;
use plotters::{
    coord::Shift,
    prelude::*,
    style::{FontDesc, FontFamily, FontStyle},
};
use tracing::debug;

use super::{Figure, Layer, Panel, Rgb};

fn font(size: f64) -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

fn rgb(Rgb(r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

fn radius(area: f64) -> i32 {
    (area.max(0.0).sqrt() / 2.0).round().max(1.0) as i32
}

/// Pixel offsets splitting `total` proportionally to `weights`.
fn breakpoints(total: u32, weights: &[u32]) -> Vec<i32> {
    let sum: u32 = weights.iter().sum();
    if sum == 0 {
        return Vec::new();
    }

    let mut acc = 0;
    weights
        .iter()
        .take(weights.len().saturating_sub(1))
        .map(|w| {
            acc += w;
            (total as u64 * acc as u64 / sum as u64) as i32
        })
        .collect()
}

pub fn save_svg(figure: &Figure, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (figure.width, figure.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let heights: Vec<u32> = figure.rows.iter().map(|r| r.height).collect();
    let rows = root.split_by_breakpoints(Vec::<i32>::new(), breakpoints(figure.height, &heights));

    for (row, area) in figure.rows.iter().zip(rows) {
        let (width, _) = area.dim_in_pixel();
        let widths: Vec<u32> = row.panels.iter().map(|(w, _)| *w).collect();
        let cells = area.split_by_breakpoints(breakpoints(width, &widths), Vec::<i32>::new());

        for ((_, panel), cell) in row.panels.iter().zip(cells) {
            draw_panel(&cell, panel)?;
        }
    }

    root.present()?;
    debug!(path = %path.display(), panels = figure.panels().count(), "wrote figure");

    Ok(())
}

fn draw_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, panel: &Panel) -> Result<()> {
    let ((x0, x1), (y0, y1)) = panel.bounds();
    let (x_area, y_area) = if panel.axes { (30, 50) } else { (0, 0) };

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .caption(&panel.title, font(16.0))
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    if panel.axes {
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(12)
            .y_labels(12)
            .x_label_formatter(&|v| panel.x_ticks.format(*v))
            .y_label_formatter(&|v| panel.y_ticks.format(*v))
            .label_style(font(12.0))
            .draw()?;
    }

    for layer in &panel.layers {
        match layer {
            Layer::Mesh(mesh) => {
                chart.draw_series(
                    mesh.cells()
                        .map(|(corners, c)| Rectangle::new(corners, rgb(c).filled())),
                )?;
            }
            Layer::Scatter {
                points,
                sizes,
                color,
            } => {
                let style = rgb(*color).mix(0.6).filled();
                chart.draw_series(
                    points
                        .iter()
                        .zip(sizes)
                        .map(|(&p, &s)| Circle::new(p, radius(s), style)),
                )?;
            }
            Layer::Line { points, color } => {
                chart.draw_series(LineSeries::new(points.iter().copied(), &rgb(*color)))?;
            }
            Layer::HLine { y, color } => {
                chart.draw_series(LineSeries::new([(x0, *y), (x1, *y)], &rgb(*color)))?;
            }
            Layer::VLine { x, color } => {
                chart.draw_series(LineSeries::new([(*x, y0), (*x, y1)], &rgb(*color)))?;
            }
            Layer::Text { at, label } => {
                chart.draw_series(std::iter::once(Text::new(
                    label.clone(),
                    *at,
                    font(11.0).color(&BLACK),
                )))?;
            }
        }
    }

    Ok(())
}

// -- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMesh, ColorScale, Surface, Ticks, BLUE, RED};

    #[test]
    fn should_split_proportionally() {
        assert_eq!(breakpoints(100, &[1, 1]), vec![50]);
        assert_eq!(breakpoints(900, &[4, 4, 1]), vec![400, 800]);
        assert_eq!(breakpoints(100, &[3]), Vec::<i32>::new());
        assert_eq!(breakpoints(100, &[]), Vec::<i32>::new());
    }

    #[test]
    fn should_size_markers_by_area() {
        assert_eq!(radius(1.0), 1);
        assert_eq!(radius(36.0), 3);
        assert_eq!(radius(-4.0), 1);
    }

    #[test]
    fn should_write_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.svg");

        let mut map = Panel::map("map");
        map.color_mesh(ColorMesh {
            x_edges: vec![0.0, 1.0, 2.0],
            y_edges: vec![0.0, 1.0],
            values: vec![Some(1.0), None],
            scale: ColorScale::months(),
        });
        map.scatter(vec![(0.5, 0.5)], vec![3.0], RED);
        map.text((0.5, 0.5), "Somewhere".to_string());

        let mut series = Panel::new("series");
        series.x_ticks = Ticks::Months;
        series.line(vec![(0.0, 1.0), (11.0, 2.0)], BLUE);
        series.hline(1.5, RED);
        series.vline(6.0, RED);

        let figure = Figure::new(600, 400).with_row(1, vec![(1, map), (1, series)]);
        save_svg(&figure, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Somewhere"));
    }
}
