//! Region boundaries from a GeoJSON `FeatureCollection`.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::config::is_url;

/// A closed ring of (longitude, latitude) vertices.
pub type Ring = Vec<(f64, f64)>;

/// A named region: one or more polygons, each an outer ring plus holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub polygons: Vec<Vec<Ring>>,
}

impl Region {
    /// Even-odd test over every ring of every polygon.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons
            .iter()
            .any(|rings| rings.iter().filter(|ring| ring_crosses(ring, lon, lat)).count() % 2 == 1)
    }
}

/// Whether a ray from the point towards +lon crosses the ring an odd number of times.
fn ring_crosses(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    pub regions: Vec<Region>,
}

impl RegionMap {
    pub fn region_at(&self, lon: f64, lat: f64) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(lon, lat))
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GeoJSON parsing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// Parse a FeatureCollection, naming each region by `name_key` in its
/// properties. Features without a name or an areal geometry are skipped.
pub fn parse_regions(text: &str, name_key: &str) -> Result<RegionMap> {
    let collection: FeatureCollection = serde_json::from_str(text).context("parsing GeoJSON FeatureCollection")?;

    let mut regions = Vec::with_capacity(collection.features.len());
    for (i, feature) in collection.features.into_iter().enumerate() {
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get(name_key))
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        let Some(name) = name else {
            log::warn!("GeoJSON feature {i} has no '{name_key}' property, skipped");
            continue;
        };

        let polygons = match feature.geometry {
            Some(Geometry::Polygon { coordinates }) => vec![to_rings(coordinates)?],
            Some(Geometry::MultiPolygon { coordinates }) => {
                coordinates.into_iter().map(to_rings).collect::<Result<Vec<_>>>()?
            }
            Some(Geometry::Unsupported) | None => {
                log::warn!("GeoJSON feature '{name}' has no polygon geometry, skipped");
                continue;
            }
        };
        regions.push(Region { name, polygons });
    }

    if regions.is_empty() {
        bail!("GeoJSON contains no named polygon features");
    }
    Ok(RegionMap { regions })
}

fn to_rings(rings: Vec<Vec<Vec<f64>>>) -> Result<Vec<Ring>> {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|pos| match pos.as_slice() {
                    [lon, lat, ..] => Ok((*lon, *lat)),
                    _ => bail!("GeoJSON position with fewer than two coordinates"),
                })
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Load boundaries from an http(s) URL or a local file.
pub fn fetch_regions(source: &str, name_key: &str, timeout: Duration) -> Result<RegionMap> {
    let text = if is_url(source) {
        let client = Client::builder().timeout(timeout).build().context("building HTTP client")?;
        client
            .get(source)
            .send()
            .with_context(|| format!("requesting {source}"))?
            .error_for_status()
            .with_context(|| format!("requesting {source}"))?
            .text()
            .context("reading GeoJSON body")?
    } else {
        std::fs::read_to_string(Path::new(source)).with_context(|| format!("reading {source}"))?
    };
    let map = parse_regions(&text, name_key)?;
    log::info!("Loaded {} region boundaries from {source}", map.len());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "code": "53", "nom": "Bretagne" },
              "geometry": { "type": "Polygon", "coordinates": [
                  [[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]],
                  [[0.5, 0.5], [1.5, 0.5], [1.5, 1.5], [0.5, 1.5], [0.5, 0.5]] ] } },
            { "type": "Feature", "properties": { "nom": "Corse" },
              "geometry": { "type": "MultiPolygon", "coordinates": [
                  [[[10, 0, 12.5], [11, 0, 3.0], [11, 1, 0.0], [10, 1, 0.0], [10, 0, 0.0]]],
                  [[[20, 0], [21, 0], [21, 1], [20, 0]]] ] } },
            { "type": "Feature", "properties": { "nom": "Point" },
              "geometry": { "type": "Point", "coordinates": [1, 1] } },
            { "type": "Feature", "properties": {},
              "geometry": { "type": "Polygon", "coordinates": [[[5, 5], [6, 5], [6, 6], [5, 5]]] } }
        ]
    }"#;

    #[test]
    fn parses_polygons_and_skips_the_rest() {
        let map = parse_regions(SQUARES, "nom").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.regions[0].name, "Bretagne");
        assert_eq!(map.regions[1].polygons.len(), 2);
        assert!(map.get("Corse").unwrap().contains(20.8, 0.2));
    }

    #[test]
    fn holes_are_excluded() {
        let map = parse_regions(SQUARES, "nom").unwrap();
        let bzh = map.get("Bretagne").unwrap();
        assert!(bzh.contains(0.25, 0.25));
        assert!(!bzh.contains(1.0, 1.0));
        assert!(!bzh.contains(3.0, 1.0));
        assert_eq!(map.region_at(10.5, 0.5).map(|r| r.name.as_str()), Some("Corse"));
        assert!(map.region_at(50.0, 50.0).is_none());
    }

    #[test]
    fn name_key_is_configurable() {
        let map = parse_regions(SQUARES, "code").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.regions[0].name, "53");
    }

    #[test]
    fn empty_collection_is_an_error() {
        assert!(parse_regions(r#"{ "type": "FeatureCollection", "features": [] }"#, "nom").is_err());
        assert!(parse_regions("not json", "nom").is_err());
    }

    #[test]
    fn local_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.geojson");
        std::fs::write(&path, SQUARES).unwrap();
        let map = fetch_regions(path.to_str().unwrap(), "nom", Duration::from_secs(1)).unwrap();
        assert_eq!(map.len(), 2);
        assert!(fetch_regions("/no/such/file.geojson", "nom", Duration::from_secs(1)).is_err());
    }
}
