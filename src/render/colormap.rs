use super::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMap {
    /// Cyclic hue wheel, for month maps.
    Hsv,
    /// Perceptually uniform dark blue to yellow, for temperatures.
    Plasma,
}

const PLASMA: [(f64, Rgb); 5] = [
    (0.0, Rgb(13, 8, 135)),
    (0.25, Rgb(126, 3, 168)),
    (0.5, Rgb(204, 71, 120)),
    (0.75, Rgb(248, 149, 64)),
    (1.0, Rgb(240, 249, 33)),
];

impl ColorMap {
    /// Colour at `t` in `[0, 1]`; values outside are clamped.
    pub fn at(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            ColorMap::Hsv => hue(t),
            ColorMap::Plasma => interpolate(&PLASMA, t),
        }
    }
}

fn hue(t: f64) -> Rgb {
    let h = (t * 6.0) % 6.0;
    let f = h - h.floor();
    let up = (f * 255.0).round() as u8;
    let down = 255 - up;

    match h as u8 {
        0 => Rgb(255, up, 0),
        1 => Rgb(down, 255, 0),
        2 => Rgb(0, 255, up),
        3 => Rgb(0, down, 255),
        4 => Rgb(up, 0, 255),
        _ => Rgb(255, 0, down),
    }
}

fn interpolate(anchors: &[(f64, Rgb)], t: f64) -> Rgb {
    for pair in anchors.windows(2) {
        let (t0, Rgb(r0, g0, b0)) = pair[0];
        let (t1, Rgb(r1, g1, b1)) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return Rgb(mix(r0, r1), mix(g0, g1), mix(b0, b1));
        }
    }
    anchors.last().map(|&(_, c)| c).unwrap_or(Rgb(0, 0, 0))
}

/// Maps data values onto a colour map between `vmin` and `vmax`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
    pub map: ColorMap,
}

impl ColorScale {
    pub fn new(vmin: f64, vmax: f64, map: ColorMap) -> Self {
        ColorScale { vmin, vmax, map }
    }

    /// Twelve month classes centred on the month indices.
    pub fn months() -> Self {
        ColorScale::new(-0.5, 11.5, ColorMap::Hsv)
    }

    pub fn color(&self, value: f64) -> Rgb {
        let span = self.vmax - self.vmin;
        let t = if span > 0.0 {
            (value - self.vmin) / span
        } else {
            0.0
        };
        self.map.at(t)
    }
}
