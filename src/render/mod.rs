//! Figures as plain data.
//!
//! Plot code draws onto a [`Surface`]; [`Panel`] records the calls so the
//! figure can be inspected in tests and written out by [`svg::save_svg`].

pub mod colormap;
pub mod figures;
pub mod svg;

pub use colormap::{ColorMap, ColorScale};

use crate::analysis::MONTH_NAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const GRAY: Rgb = Rgb(128, 128, 128);
pub const GREEN: Rgb = Rgb(0, 128, 0);
pub const RED: Rgb = Rgb(214, 39, 40);
pub const BLUE: Rgb = Rgb(31, 119, 180);

/// A pixel grid: `values` is row-major with one row per `y` cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMesh {
    pub x_edges: Vec<f64>,
    pub y_edges: Vec<f64>,
    pub values: Vec<Option<f32>>,
    pub scale: ColorScale,
}

impl ColorMesh {
    /// Rectangles of all defined cells with their colour.
    pub fn cells(&self) -> impl Iterator<Item = ([(f64, f64); 2], Rgb)> + '_ {
        let nx = self.x_edges.len().saturating_sub(1);
        self.values.iter().enumerate().filter_map(move |(k, v)| {
            let v = (*v)?;
            let (y, x) = (k / nx.max(1), k % nx.max(1));
            let corners = [
                (self.x_edges[x], self.y_edges[y]),
                (self.x_edges[x + 1], self.y_edges[y + 1]),
            ];
            Some((corners, self.scale.color(v as f64)))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Mesh(ColorMesh),
    Scatter {
        points: Vec<(f64, f64)>,
        sizes: Vec<f64>,
        color: Rgb,
    },
    Line {
        points: Vec<(f64, f64)>,
        color: Rgb,
    },
    HLine {
        y: f64,
        color: Rgb,
    },
    VLine {
        x: f64,
        color: Rgb,
    },
    Text {
        at: (f64, f64),
        label: String,
    },
}

/// Draw calls the figures are built from.
pub trait Surface {
    fn color_mesh(&mut self, mesh: ColorMesh);
    /// `sizes` are marker areas in square pixels, one per point.
    fn scatter(&mut self, points: Vec<(f64, f64)>, sizes: Vec<f64>, color: Rgb);
    fn line(&mut self, points: Vec<(f64, f64)>, color: Rgb);
    fn hline(&mut self, y: f64, color: Rgb);
    fn vline(&mut self, x: f64, color: Rgb);
    fn text(&mut self, at: (f64, f64), label: String);
}

/// How axis values are labelled.
#[derive(Debug, Clone, PartialEq)]
pub enum Ticks {
    Plain,
    Hidden,
    /// Integer positions as month names.
    Months,
    /// Value with a unit suffix, e.g. `°C`.
    Suffix(String),
}

impl Ticks {
    pub fn format(&self, v: f64) -> String {
        match self {
            Ticks::Plain if v.fract() == 0.0 => format!("{v:.0}"),
            Ticks::Plain => format!("{v:.2}"),
            Ticks::Hidden => String::new(),
            Ticks::Months => {
                let m = v.round();
                if (m - v).abs() < 1e-6 && (0.0..12.0).contains(&m) {
                    MONTH_NAMES[m as usize].to_string()
                } else {
                    String::new()
                }
            }
            Ticks::Suffix(unit) => format!("{v:.0}{unit}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub axes: bool,
    pub x_ticks: Ticks,
    pub y_ticks: Ticks,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub layers: Vec<Layer>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Panel {
            title: title.into(),
            axes: true,
            x_ticks: Ticks::Plain,
            y_ticks: Ticks::Plain,
            x_range: None,
            y_range: None,
            layers: Vec::new(),
        }
    }

    /// A panel without axes, as used for maps.
    pub fn map(title: impl Into<String>) -> Self {
        Panel {
            axes: false,
            ..Panel::new(title)
        }
    }

    /// Data extent of the layers, or the fixed ranges when set.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let mut xs = Extent::default();
        let mut ys = Extent::default();

        for layer in &self.layers {
            match layer {
                Layer::Mesh(mesh) => {
                    xs.extend(mesh.x_edges.iter().copied());
                    ys.extend(mesh.y_edges.iter().copied());
                }
                Layer::Scatter { points, .. } | Layer::Line { points, .. } => {
                    xs.extend(points.iter().map(|p| p.0));
                    ys.extend(points.iter().map(|p| p.1));
                }
                Layer::HLine { y, .. } => ys.extend([*y]),
                Layer::VLine { x, .. } => xs.extend([*x]),
                Layer::Text { at, .. } => {
                    xs.extend([at.0]);
                    ys.extend([at.1]);
                }
            }
        }

        (
            self.x_range.unwrap_or_else(|| xs.range()),
            self.y_range.unwrap_or_else(|| ys.range()),
        )
    }
}

impl Surface for Panel {
    fn color_mesh(&mut self, mesh: ColorMesh) {
        self.layers.push(Layer::Mesh(mesh));
    }

    fn scatter(&mut self, points: Vec<(f64, f64)>, sizes: Vec<f64>, color: Rgb) {
        self.layers.push(Layer::Scatter {
            points,
            sizes,
            color,
        });
    }

    fn line(&mut self, points: Vec<(f64, f64)>, color: Rgb) {
        self.layers.push(Layer::Line { points, color });
    }

    fn hline(&mut self, y: f64, color: Rgb) {
        self.layers.push(Layer::HLine { y, color });
    }

    fn vline(&mut self, x: f64, color: Rgb) {
        self.layers.push(Layer::VLine { x, color });
    }

    fn text(&mut self, at: (f64, f64), label: String) {
        self.layers.push(Layer::Text { at, label });
    }
}

#[derive(Debug, Default)]
struct Extent(Option<(f64, f64)>);

impl Extent {
    fn extend(&mut self, values: impl IntoIterator<Item = f64>) {
        for v in values.into_iter().filter(|v| v.is_finite()) {
            self.0 = match self.0 {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            };
        }
    }

    /// Never degenerate, plotters needs a non-empty range.
    fn range(&self) -> (f64, f64) {
        match self.0 {
            None => (0.0, 1.0),
            Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
            Some(r) => r,
        }
    }
}

/// A row of panels with relative widths.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub height: u32,
    pub panels: Vec<(u32, Panel)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub rows: Vec<Row>,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Figure {
            width,
            height,
            rows: Vec::new(),
        }
    }

    /// Appends a row; `panels` pairs relative widths with panels.
    pub fn with_row(mut self, height: u32, panels: Vec<(u32, Panel)>) -> Self {
        self.rows.push(Row { height, panels });
        self
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.rows.iter().flat_map(|r| r.panels.iter().map(|(_, p)| p))
    }
}
