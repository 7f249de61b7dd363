//! Point queries against a rain season map.
//!
//! This replaces a click handler: the caller passes the data coordinates of
//! the query and draws whatever it likes from the [`QueryResult`].

use chrono::NaiveDate;
use tracing::debug;

use super::{climatology::MONTHS, BoundingBox, RainSeasonMap, Season};
use crate::{error::GridError, reading::City};

/// Cities farther away than this (in degrees) are not attached to a query.
pub const DEFAULT_CITY_RADIUS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub lon_index: usize,
    pub lat_index: usize,
    /// Centre of the selected cell.
    pub lon: f64,
    pub lat: f64,
    pub city: Option<City>,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<Option<f32>>,
    pub climatology: [Option<f32>; MONTHS],
    pub threshold: Option<f32>,
    pub season: Option<Season>,
    pub unit: String,
}

impl QueryResult {
    pub fn title(&self) -> String {
        match &self.city {
            Some(city) => format!("{} ({:.2}, {:.2})", city.name, self.lon, self.lat),
            None => format!("({:.2}, {:.2})", self.lon, self.lat),
        }
    }
}

pub struct Inspector<'a> {
    map: &'a RainSeasonMap,
    cities: &'a [City],
    bbox: BoundingBox,
    city_radius: f64,
}

impl<'a> Inspector<'a> {
    /// `cities` should already be filtered to the region of interest.
    pub fn new(map: &'a RainSeasonMap, cities: &'a [City], bbox: BoundingBox) -> Self {
        Inspector {
            map,
            cities,
            bbox,
            city_radius: DEFAULT_CITY_RADIUS,
        }
    }

    pub fn with_city_radius(mut self, radius: f64) -> Self {
        self.city_radius = radius;
        self
    }

    /// Looks up the cell nearest to (`lon`, `lat`). Queries outside the box
    /// or on an empty grid are ignored.
    pub fn inspect_point(&self, lon: f64, lat: f64) -> Option<QueryResult> {
        match self.try_inspect(lon, lat) {
            Ok(result) => Some(result),
            Err(e) => {
                debug!("query ignored: {e}");
                None
            }
        }
    }

    pub fn try_inspect(&self, lon: f64, lat: f64) -> Result<QueryResult, GridError> {
        let dataset = &self.map.dataset;
        if !self.bbox.contains(lon, lat) {
            return Err(GridError::OutOfRange { lon, lat });
        }

        let lon_centers = dataset.lon_centers();
        let lat_centers = dataset.lat_centers();
        let (Some(xi), Some(yi)) = (nearest_index(lon_centers, lon), nearest_index(lat_centers, lat)) else {
            return Err(GridError::OutOfRange { lon, lat });
        };

        let (_, nx) = self.map.climatology.shape();
        Ok(QueryResult {
            lon_index: xi,
            lat_index: yi,
            lon: lon_centers[xi],
            lat: lat_centers[yi],
            city: nearest_city(self.cities, lon, lat, self.city_radius).cloned(),
            dates: dataset.dates.clone(),
            series: dataset.cube.cell_series(yi, xi),
            climatology: self.map.climatology.series(yi, xi),
            threshold: self.map.thresholds[yi * nx + xi],
            season: self.map.season(yi, xi),
            unit: dataset.unit.clone(),
        })
    }
}

/// Index of the coordinate closest to `v`; the first one on ties.
pub fn nearest_index(coords: &[f64], v: f64) -> Option<usize> {
    coords
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (k, &c)| {
            let d = (c - v).abs();
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((k, d)),
            }
        })
        .map(|(k, _)| k)
}

/// Closest city within `radius`, by plain Euclidean distance in degrees.
pub fn nearest_city(cities: &[City], lon: f64, lat: f64, radius: f64) -> Option<&City> {
    cities
        .iter()
        .map(|c| (c, (c.lon - lon).hypot(c.lat - lat)))
        .fold(None, |best: Option<(&City, f64)>, (c, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((c, d)),
        })
        .filter(|&(_, d)| d < radius)
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::SeasonWindow,
        grid::{Cube, GridDataset},
    };

    fn city(name: &str, lon: f64, lat: f64) -> City {
        City {
            name: name.to_string(),
            lon,
            lat,
            population: 1e6,
        }
    }

    /// One year on a 2 x 3 grid with lon centres -60, -59, -58 and lat
    /// centres -10, -9. Cell (1, 2) is no-data.
    fn map() -> RainSeasonMap {
        let mut values = Vec::new();
        for m in 0..MONTHS {
            for cell in 0..6 {
                let wet = if m >= 6 { 10.0 } else { 0.0 };
                values.push((cell != 5).then_some(wet + cell as f32));
            }
        }
        let dates = (1..=12)
            .map(|m| NaiveDate::from_ymd_opt(2012, m, 16).unwrap())
            .collect();
        let ds = GridDataset::new(
            dates,
            vec![-60.0, -59.0, -58.0, -57.0],
            vec![-10.0, -9.0, -8.0],
            Cube::new([12, 2, 3], values).unwrap(),
            "mm/month",
        )
        .unwrap();

        RainSeasonMap::build(ds, SeasonWindow::default()).unwrap()
    }

    fn bbox() -> BoundingBox {
        BoundingBox::new(-85.0, -33.0, -56.0, 16.0)
    }

    #[test]
    fn should_pick_nearest_cell_centre() {
        let map = map();
        let inspector = Inspector::new(&map, &[], bbox());

        let q = inspector.inspect_point(-58.9, -9.4).unwrap();
        assert_eq!((q.lon_index, q.lat_index), (1, 1));
        assert_eq!((q.lon, q.lat), (-59.0, -9.0));
        assert_eq!(q.series.len(), 12);
        assert_eq!(q.climatology[0], Some(4.0));
        assert_eq!(q.threshold, Some(9.0));
        assert_eq!(q.season.map(|s| s.onset), Some(6));
        assert_eq!(q.unit, "mm/month");
    }

    #[test]
    fn should_report_masked_cell_without_season() {
        let map = map();
        let inspector = Inspector::new(&map, &[], bbox());

        let q = inspector.inspect_point(-58.0, -9.0).unwrap();
        assert_eq!(q.threshold, None);
        assert_eq!(q.season, None);
    }

    #[test]
    fn should_ignore_queries_outside_box() {
        let map = map();
        let inspector = Inspector::new(&map, &[], bbox());

        assert!(inspector.inspect_point(10.0, 50.0).is_none());
        assert!(matches!(
            inspector.try_inspect(10.0, 50.0),
            Err(GridError::OutOfRange { .. })
        ));
    }

    #[test]
    fn should_ignore_queries_on_empty_grid() {
        let empty = RainSeasonMap::build(GridDataset::empty(), SeasonWindow::default()).unwrap();
        let inspector = Inspector::new(&empty, &[], bbox());
        assert!(inspector.inspect_point(-60.0, -10.0).is_none());
    }

    #[test]
    fn should_attach_city_at_exact_location() {
        let map = map();
        let cities = vec![city("Porto Velho", -63.9, -8.76), city("Vilhena", -60.1, -9.9)];
        let inspector = Inspector::new(&map, &cities, bbox());

        let q = inspector.inspect_point(-60.1, -9.9).unwrap();
        assert_eq!(q.city.as_ref().map(|c| c.name.as_str()), Some("Vilhena"));
        assert!(q.title().starts_with("Vilhena"));
    }

    #[test]
    fn should_not_attach_distant_city() {
        let map = map();
        let cities = vec![city("Vilhena", -60.1, -9.9)];
        let inspector = Inspector::new(&map, &cities, bbox());

        let q = inspector.inspect_point(-59.0, -9.0).unwrap();
        assert_eq!(q.city, None);

        let wide = Inspector::new(&map, &cities, bbox()).with_city_radius(2.0);
        assert!(wide.inspect_point(-59.0, -9.0).unwrap().city.is_some());
    }

    #[test]
    fn should_prefer_first_on_ties() {
        assert_eq!(nearest_index(&[0.0, 1.0, 2.0], 0.5), Some(0));
        assert_eq!(nearest_index(&[3.0, 2.0, 1.0], 1.2), Some(2));
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn should_find_nearest_city_by_euclidean_distance() {
        let cities = vec![city("A", 0.0, 0.0), city("B", 0.3, 0.3), city("C", 0.1, 0.0)];
        assert_eq!(nearest_city(&cities, 0.12, 0.0, 0.5).map(|c| c.name.as_str()), Some("C"));
        assert!(nearest_city(&cities, 5.0, 5.0, 0.5).is_none());
        assert!(nearest_city(&[], 0.0, 0.0, 0.5).is_none());
    }
}
