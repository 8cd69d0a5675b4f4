//! Country boundary loading: GeoJSON features keyed by a `name` property.
//!
//! The map joins these shapes against the CSV by country name, so the only
//! thing required of a feature is a name and one or more polygon rings.
//! Holes are dropped; at world scale they are invisible.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Countries GeoJSON commonly paired with the dataset. Each feature carries
/// the display name under `properties.name`.
pub const DEFAULT_BOUNDARIES_URL: &str =
    "https://raw.githubusercontent.com/johan/world.geo.json/master/countries.geo.json";

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("unsupported geometry type `{0}`")]
    UnsupportedGeometry(String),
    #[error("malformed coordinates in feature `{0}`")]
    BadCoordinates(String),
}

/// One country's drawable outline: outer rings in (lon, lat) degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Value,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

/// Parse a GeoJSON FeatureCollection into country shapes.
///
/// Features without a usable name or geometry are skipped with a warning;
/// an unsupported geometry type on a named feature is skipped too, so one
/// odd feature never sinks the whole map.
pub fn parse_features(json: &str) -> Result<Vec<CountryShape>> {
    let fc: FeatureCollection = serde_json::from_str(json).context("parse geojson")?;
    let mut out = Vec::with_capacity(fc.features.len());
    for feature in fc.features {
        let name = match feature_name(&feature.properties) {
            Some(n) => n,
            None => {
                log::warn!("skipping boundary feature without a name property");
                continue;
            }
        };
        let Some(geom) = feature.geometry else {
            log::warn!("skipping boundary feature `{}`: no geometry", name);
            continue;
        };
        match rings_of(&name, &geom) {
            Ok(rings) if !rings.is_empty() => out.push(CountryShape { name, rings }),
            Ok(_) => log::warn!("skipping boundary feature `{}`: empty geometry", name),
            Err(e) => log::warn!("skipping boundary feature `{}`: {}", name, e),
        }
    }
    Ok(out)
}

/// Read country shapes from a local GeoJSON file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<CountryShape>> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_features(&text)
}

/// Fetch country shapes from a URL, retrying transient failures.
pub fn fetch_boundaries(url: &str) -> Result<Vec<CountryShape>> {
    let http = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(concat!("renewatlas/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")?;

    // Small retry for transient failures (5xx / network errors)
    let mut last_err: Option<anyhow::Error> = None;
    for backoff_ms in [100u64, 300, 700] {
        match http.get(url).send() {
            Ok(r) if r.status().is_success() => {
                let body = r.text().context("read boundary body")?;
                return parse_features(&body);
            }
            Ok(r) if r.status().is_server_error() => { /* retry */ }
            Ok(r) => bail!("request failed with HTTP {}", r.status()),
            Err(e) => last_err = Some(e.into()),
        }
        std::thread::sleep(Duration::from_millis(backoff_ms));
    }
    bail!("network error fetching {}: {:?}", url, last_err);
}

/// Is the point inside any ring of the shape? Even-odd ray cast in
/// (lon, lat) space; used for click hit-testing.
pub fn point_in_shape(shape: &CountryShape, lon: f64, lat: f64) -> bool {
    shape.rings.iter().any(|ring| point_in_ring(ring, lon, lat))
}

fn point_in_ring(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn feature_name(properties: &Value) -> Option<String> {
    for key in ["name", "NAME", "ADMIN", "admin"] {
        if let Some(n) = properties.get(key).and_then(|v| v.as_str()) {
            if !n.is_empty() {
                return Some(n.to_string());
            }
        }
    }
    None
}

fn rings_of(name: &str, geom: &Geometry) -> Result<Vec<Vec<(f64, f64)>>, GeoError> {
    match geom.kind.as_str() {
        // Outer ring is position 0 in both cases; interior rings are holes.
        "Polygon" => Ok(polygon_outer(name, &geom.coordinates)?.into_iter().collect()),
        "MultiPolygon" => {
            let polys = geom
                .coordinates
                .as_array()
                .ok_or_else(|| GeoError::BadCoordinates(name.to_string()))?;
            let mut rings = Vec::with_capacity(polys.len());
            for poly in polys {
                rings.extend(polygon_outer(name, poly)?);
            }
            Ok(rings)
        }
        other => Err(GeoError::UnsupportedGeometry(other.to_string())),
    }
}

fn polygon_outer(name: &str, coords: &Value) -> Result<Option<Vec<(f64, f64)>>, GeoError> {
    let rings = coords
        .as_array()
        .ok_or_else(|| GeoError::BadCoordinates(name.to_string()))?;
    let Some(outer) = rings.first() else {
        return Ok(None);
    };
    let pts = outer
        .as_array()
        .ok_or_else(|| GeoError::BadCoordinates(name.to_string()))?;
    let mut ring = Vec::with_capacity(pts.len());
    for p in pts {
        let pair = p
            .as_array()
            .filter(|a| a.len() >= 2)
            .ok_or_else(|| GeoError::BadCoordinates(name.to_string()))?;
        let lon = pair[0]
            .as_f64()
            .ok_or_else(|| GeoError::BadCoordinates(name.to_string()))?;
        let lat = pair[1]
            .as_f64()
            .ok_or_else(|| GeoError::BadCoordinates(name.to_string()))?;
        ring.push((lon, lat));
    }
    Ok(Some(ring))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Squareland" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Twin Isles" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20,0],[25,0],[25,5],[20,5],[20,0]]],
                        [[[30,0],[35,0],[35,5],[30,5],[30,0]]]
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_polygon_and_multipolygon() {
        let shapes = parse_features(SQUARE).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].name, "Squareland");
        assert_eq!(shapes[0].rings.len(), 1);
        assert_eq!(shapes[1].rings.len(), 2);
    }

    #[test]
    fn unnamed_or_odd_features_are_skipped() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type":"Feature","properties":{"name":"Pointy"},"geometry":{"type":"Point","coordinates":[1,2]}}
        ]}"#;
        let shapes = parse_features(json).unwrap();
        assert!(shapes.is_empty());
    }

    #[test]
    fn hit_test_even_odd() {
        let shapes = parse_features(SQUARE).unwrap();
        assert!(point_in_shape(&shapes[0], 5.0, 5.0));
        assert!(!point_in_shape(&shapes[0], 15.0, 5.0));
        assert!(point_in_shape(&shapes[1], 32.0, 2.0));
        assert!(!point_in_shape(&shapes[1], 27.0, 2.0));
    }
}
