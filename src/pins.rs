//! Point pins from CSV to a GeoJSON FeatureCollection.
//!
//! The CSV needs a header with at least `longitude`, `latitude`, `name` and
//! `description`; other columns are ignored. Every row becomes one Point
//! feature, in input order.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Pin {
    pub longitude: f64,
    pub latitude: f64,
    pub name: String,
    pub description: String,
}

impl Pin {
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), self.name.clone().into());
        properties.insert("description".to_string(), self.description.clone().into());

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                self.longitude,
                self.latitude,
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

pub fn read_pins<R: Read>(reader: R) -> Result<Vec<Pin>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut pins = Vec::new();
    for record in csv_reader.deserialize() {
        let pin: Pin = record?;
        pins.push(pin);
    }
    Ok(pins)
}

pub fn to_feature_collection(pins: &[Pin]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: pins.iter().map(Pin::to_feature).collect(),
        foreign_members: None,
    }
}

/// Pretty-printed GeoJSON (two-space indent).
pub fn write_geojson<W: Write>(collection: &FeatureCollection, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writer.flush()?;
    Ok(())
}

/// Converts `csv_path` into a GeoJSON file at `geojson_path`, returning the
/// number of features written.
pub fn csv_to_geojson(csv_path: &Path, geojson_path: &Path) -> Result<usize> {
    let pins = read_pins(File::open(csv_path)?)?;
    let collection = to_feature_collection(&pins);
    write_geojson(&collection, File::create(geojson_path)?)?;

    info!(
        "Wrote {} features from {:?} to {:?}",
        pins.len(),
        csv_path,
        geojson_path
    );
    Ok(pins.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DtmError;
    use serde_json::json;
    use tempfile::TempDir;

    const CSV: &str = "\
name,latitude,longitude,description,grade
Le Bloc,46.0271,-74.1915,Big roof,V4
Petit Mur,46.0302,-74.1887,,V1
";

    #[test]
    fn test_rows_map_to_features_in_order() {
        let pins = read_pins(CSV.as_bytes()).unwrap();
        assert_eq!(pins.len(), 2);
        assert_eq!(pins[1].name, "Petit Mur");
        assert_eq!(pins[1].description, "");

        let collection = to_feature_collection(&pins);
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 2);
        assert_eq!(
            value["features"][0],
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-74.1915, 46.0271]},
                "properties": {"name": "Le Bloc", "description": "Big roof"}
            })
        );
        assert_eq!(value["features"][1]["properties"]["name"], "Petit Mur");
    }

    #[test]
    fn test_bad_coordinate_is_an_error() {
        let csv = "longitude,latitude,name,description\nabc,46.0,x,y\n";
        assert!(matches!(read_pins(csv.as_bytes()), Err(DtmError::Csv(_))));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "longitude,latitude,name\n-74.0,46.0,x\n";
        assert!(matches!(read_pins(csv.as_bytes()), Err(DtmError::Csv(_))));
    }

    #[test]
    fn test_csv_to_geojson_file() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("all_boulders.csv");
        let geojson_path = temp_dir.path().join("all_boulders.geojson");
        std::fs::write(&csv_path, CSV).unwrap();

        let count = csv_to_geojson(&csv_path, &geojson_path).unwrap();
        assert_eq!(count, 2);

        let text = std::fs::read_to_string(&geojson_path).unwrap();
        assert!(text.starts_with("{\n  \""), "two-space indent expected");
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["features"][0]["geometry"]["coordinates"][1], 46.0271);
    }

    #[test]
    fn test_empty_csv_gives_empty_collection() {
        let pins = read_pins("longitude,latitude,name,description\n".as_bytes()).unwrap();
        let value = serde_json::to_value(to_feature_collection(&pins)).unwrap();
        assert_eq!(value["features"], json!([]));
    }
}
