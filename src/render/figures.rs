//! The figures the commands save.

use chrono::Datelike;

use super::{
    ColorMap, ColorMesh, ColorScale, Figure, Panel, Surface, Ticks, BLACK, BLUE, GRAY, GREEN, RED,
};
use crate::{
    analysis::{QueryResult, RainSeasonMap, MONTHS},
    config::LABEL_POPULATION,
    grid::{mean_defined, GridDataset},
    reading::{City, Shape},
};

/// Marker area for a city of the given population.
pub fn marker_size(population: f64) -> f64 {
    1.0 + population * 0.5e-5
}

fn extent(edges: &[f64]) -> Option<(f64, f64)> {
    let lo = edges.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = edges.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo < hi).then_some((lo, hi))
}

fn outlines(panel: &mut impl Surface, shapes: &[Shape]) {
    for part in shapes.iter().flat_map(|s| &s.parts) {
        panel.line(part.clone(), BLACK);
    }
}

fn grid_map(title: &str, dataset: &GridDataset, values: Vec<Option<f32>>, scale: ColorScale) -> Panel {
    let mut panel = Panel::map(title);
    panel.x_range = extent(&dataset.lon);
    panel.y_range = extent(&dataset.lat);
    panel.color_mesh(ColorMesh {
        x_edges: dataset.lon.clone(),
        y_edges: dataset.lat.clone(),
        values,
        scale,
    });
    panel
}

/// A vertical colour bar with `steps` classes between the scale limits.
fn color_bar(scale: ColorScale, steps: usize, ticks: Ticks) -> Panel {
    let step = (scale.vmax - scale.vmin) / steps as f64;
    let mut panel = Panel::new("");
    panel.x_ticks = Ticks::Hidden;
    panel.y_ticks = ticks;
    panel.color_mesh(ColorMesh {
        x_edges: vec![0.0, 1.0],
        y_edges: (0..=steps).map(|k| scale.vmin + k as f64 * step).collect(),
        values: (0..steps)
            .map(|k| Some((scale.vmin + (k as f64 + 0.5) * step) as f32))
            .collect(),
        scale,
    });
    panel
}

/// Onset and offset maps with a month colour bar.
pub fn rainseason_figure(map: &RainSeasonMap, shapes: &[Shape], cities: &[City]) -> Figure {
    let scale = ColorScale::months();
    let mut onset = grid_map("Onset of rain season", &map.dataset, map.onsets(), scale);
    let mut offset = grid_map("Offset of rain season", &map.dataset, map.offsets(), scale);

    for panel in [&mut onset, &mut offset] {
        outlines(panel, shapes);
        if !cities.is_empty() {
            panel.scatter(
                cities.iter().map(|c| (c.lon, c.lat)).collect(),
                vec![9.0; cities.len()],
                GRAY,
            );
        }
    }

    Figure::new(1100, 600).with_row(
        1,
        vec![
            (10, onset),
            (10, offset),
            (2, color_bar(scale, MONTHS, Ticks::Months)),
        ],
    )
}

/// Climatology of one inspected cell with its threshold and season bounds.
pub fn point_figure(query: &QueryResult) -> Figure {
    let mut panel = Panel::new(query.title());
    panel.x_ticks = Ticks::Months;
    panel.x_range = Some((-0.5, MONTHS as f64 - 0.5));

    let points: Vec<(f64, f64)> = query
        .climatology
        .iter()
        .enumerate()
        .filter_map(|(m, v)| v.map(|v| (m as f64, v as f64)))
        .collect();
    panel.line(points.clone(), BLUE);
    panel.scatter(points.clone(), vec![36.0; points.len()], BLUE);

    if let Some(threshold) = query.threshold {
        panel.hline(threshold as f64, BLACK);
    }
    if let Some(season) = query.season {
        panel.vline(season.onset as f64, GREEN);
        panel.vline(season.offset as f64, RED);
    }

    Figure::new(640, 400).with_row(1, vec![(1, panel)])
}

/// Spatial mean of every time slice.
pub fn annual_means(dataset: &GridDataset) -> Vec<Option<f32>> {
    let [nt, _, _] = dataset.cube.shape();
    (0..nt)
        .map(|t| mean_defined(dataset.cube.time_slice(t)))
        .collect()
}

/// First and last year maps, colour bar and the annual mean series.
pub fn germany_figure(dataset: &GridDataset, scale: ColorScale) -> Figure {
    let [nt, _, _] = dataset.cube.shape();
    let year_map = |t: usize| {
        let title = dataset
            .dates
            .get(t)
            .map(|d| d.year().to_string())
            .unwrap_or_default();
        let values = if nt > 0 {
            dataset.cube.time_slice(t).to_vec()
        } else {
            Vec::new()
        };
        grid_map(&title, dataset, values, scale)
    };

    let mut series = Panel::new("");
    series.y_ticks = Ticks::Suffix("°C".to_string());
    let points: Vec<(f64, f64)> = dataset
        .dates
        .iter()
        .zip(annual_means(dataset))
        .filter_map(|(d, m)| m.map(|m| (d.year() as f64, m as f64)))
        .collect();
    series.line(points.clone(), GRAY);
    for p in points {
        series.scatter(vec![p], vec![16.0], scale.color(p.1));
    }

    Figure::new(600, 500)
        .with_row(
            5,
            vec![
                (1, color_bar(scale, 24, Ticks::Suffix("°C".to_string()))),
                (8, year_map(0)),
                (8, year_map(nt.saturating_sub(1))),
            ],
        )
        .with_row(3, vec![(1, series)])
}

/// Default scale of the temperature maps.
pub fn temperature_scale(vmin: f64, vmax: f64) -> ColorScale {
    ColorScale::new(vmin, vmax, ColorMap::Plasma)
}

/// Cities sized by population; big ones are labelled.
pub fn cities_figure(cities: &[City]) -> Figure {
    let mut panel = Panel::map("Cities");
    panel.scatter(
        cities.iter().map(|c| (c.lon, c.lat)).collect(),
        cities.iter().map(|c| marker_size(c.population)).collect(),
        BLUE,
    );
    for city in cities.iter().filter(|c| c.population > LABEL_POPULATION) {
        panel.text((city.lon, city.lat), city.name.clone());
    }

    Figure::new(1200, 600).with_row(1, vec![(1, panel)])
}

/// Outlines of all shape parts.
pub fn world_figure(shapes: &[Shape]) -> Figure {
    let mut panel = Panel::map("");
    outlines(&mut panel, shapes);

    Figure::new(1200, 600).with_row(1, vec![(1, panel)])
}

// -- Tests ---
