//! City coordinates, names and population from the simplemaps
//! [World Cities Database](https://simplemaps.com/data/world-cities)
//! (`worldcities.csv`).

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::{
    analysis::BoundingBox,
    error::{open_file, GridError},
};

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub population: f64,
}

#[derive(Debug, Deserialize)]
struct CityRecord {
    city: String,
    lat: f64,
    lng: f64,
    #[serde(default)]
    population: Option<f64>,
}

impl From<CityRecord> for City {
    fn from(r: CityRecord) -> Self {
        City {
            name: r.city,
            lon: r.lng,
            lat: r.lat,
            population: r.population.unwrap_or(0.0).max(0.0),
        }
    }
}

pub fn load_cities(path: &Path) -> Result<Vec<City>, GridError> {
    let file = open_file(path)?;
    let cities = read_cities(file, path)?;
    info!(count = cities.len(), path = %path.display(), "loaded cities");

    Ok(cities)
}

/// Reads the `city`, `lat`, `lng` and `population` columns; others are ignored.
pub fn read_cities<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<City>, GridError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut cities = Vec::new();

    for (k, record) in rdr.deserialize::<CityRecord>().enumerate() {
        let record = record.map_err(|e| GridError::Parse {
            path: path.to_path_buf(),
            line: k + 2,
            reason: e.to_string(),
        })?;
        cities.push(City::from(record));
    }

    Ok(cities)
}

/// Cities inside `bbox` with at least `min_population` inhabitants.
pub fn filter_cities(cities: &[City], bbox: &BoundingBox, min_population: f64) -> Vec<City> {
    cities
        .iter()
        .filter(|c| bbox.contains(c.lon, c.lat) && c.population >= min_population)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\"city\",\"city_ascii\",\"lat\",\"lng\",\"country\",\"population\"
\"Tokyo\",\"Tokyo\",\"35.6897\",\"139.6922\",\"Japan\",\"37732000\"
\"São Paulo\",\"Sao Paulo\",\"-23.5504\",\"-46.6339\",\"Brazil\",\"23086000\"
\"Lima\",\"Lima\",\"-12.06\",\"-77.0375\",\"Peru\",\"11044607\"
\"Tiny\",\"Tiny\",\"-10.0\",\"-60.0\",\"Brazil\",\"\"
";

    fn south_america() -> BoundingBox {
        BoundingBox::new(-85.0, -33.0, -56.0, 16.0)
    }

    #[test]
    fn should_read_named_columns() {
        let cities = read_cities(CSV.as_bytes(), Path::new("worldcities.csv")).unwrap();

        assert_eq!(cities.len(), 4);
        assert_eq!(cities[1].name, "São Paulo");
        assert_eq!(cities[1].lon, -46.6339);
        assert_eq!(cities[1].lat, -23.5504);
        assert_eq!(cities[0].population, 37732000.0);
    }

    #[test]
    fn should_treat_empty_population_as_zero() {
        let cities = read_cities(CSV.as_bytes(), Path::new("worldcities.csv")).unwrap();
        assert_eq!(cities[3].population, 0.0);
    }

    #[test]
    fn should_filter_by_box_and_population() {
        let cities = read_cities(CSV.as_bytes(), Path::new("worldcities.csv")).unwrap();

        let kept = filter_cities(&cities, &south_america(), 1e6);
        let names: Vec<_> = kept.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["São Paulo", "Lima"]);

        let all = filter_cities(&cities, &south_america(), 0.0);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn should_report_bad_row() {
        let text = "city,lat,lng,population\nNowhere,abc,1.0,5\n";
        let err = read_cities(text.as_bytes(), Path::new("c.csv")).unwrap_err();
        assert!(matches!(err, GridError::Parse { line: 2, .. }));
    }

    #[test]
    fn should_report_missing_table() {
        let err = load_cities(Path::new("/nonexistent/worldcities.csv")).unwrap_err();
        assert!(err.is_not_found());
    }
}
