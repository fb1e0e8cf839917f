use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ExtractError;

pub const DEFAULT_SOURCE: &str = "data/processed/gi-surface-queens.geojson";
pub const DEFAULT_DEST: &str = "data/processed/rain_gardens_core.geojson";

/// Asset types counted as rain gardens, including in-street (ROW) variants.
const ALLOWED_TYPES: [&str; 2] = ["Rain Garden", "ROWRG"];

const DEFAULT_BASE_CAPACITY_GAL: u64 = 2500;
const DEFAULT_MAINT_HOURS_PER_MONTH: f64 = 3.5;

const COLLECTION_NAME: &str = "rain_gardens_core";

/// Lenient view of the source collection: a missing `features` key reads as
/// an empty collection, and features are not required to carry a `type` tag.
#[derive(Debug, Deserialize)]
struct SourceCollection {
    #[serde(default)]
    features: Vec<SourceFeature>,
}

#[derive(Debug, Deserialize)]
struct SourceFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    // Raw JSON, never a typed geometry: output must reproduce the source
    // geometry byte-for-byte in structure, nulls included.
    #[serde(default)]
    geometry: Value,
}

/// The fixed five-key output schema. Serializing the struct (rather than a
/// map) guarantees every key is always emitted, null-valued or not.
#[derive(Debug, Serialize)]
struct CoreProperties {
    asset_id: Value,
    council_dist: Value,
    community_dist: Value,
    base_capacity_gal: Value,
    maintenance_hours_per_month: Value,
}

#[derive(Debug, Serialize)]
struct CoreFeature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    properties: CoreProperties,
    geometry: Value,
}

#[derive(Debug, Serialize)]
struct CoreCollection {
    #[serde(rename = "type")]
    collection_type: &'static str,
    name: &'static str,
    features: Vec<CoreFeature>,
}

/// Projects one source properties map to the core schema, or `None` when the
/// asset is not a rain garden. Defaults apply only when the key is absent;
/// an explicit null passes through.
fn core_properties(props: &Map<String, Value>) -> Option<CoreProperties> {
    let asset_type = props
        .get("asset_type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    if !ALLOWED_TYPES.contains(&asset_type) {
        return None;
    }

    Some(CoreProperties {
        asset_id: props.get("asset_id").cloned().unwrap_or(Value::Null),
        council_dist: props.get("city_counc").cloned().unwrap_or(Value::Null),
        community_dist: props.get("community_").cloned().unwrap_or(Value::Null),
        base_capacity_gal: props
            .get("base_capacity_gal")
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_BASE_CAPACITY_GAL)),
        maintenance_hours_per_month: props
            .get("maintenance_hours_per_month")
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_MAINT_HOURS_PER_MONTH)),
    })
}

fn load_collection(source: &Path) -> Result<SourceCollection, ExtractError> {
    if !source.exists() {
        return Err(ExtractError::SourceNotFound(source.to_path_buf()));
    }

    info!("Loading file: {}", source.display());
    let file = File::open(source)?;
    let reader = BufReader::new(file);
    let collection: SourceCollection = serde_json::from_reader(reader)?;
    info!("Found {} features in file", collection.features.len());

    Ok(collection)
}

/// Filters the source collection down to rain garden assets, reshapes each
/// kept feature to the core schema, and writes the result to `dest`,
/// creating parent directories as needed. Input order is preserved.
pub fn extract_core_features(source: &Path, dest: &Path) -> Result<usize, ExtractError> {
    let collection = load_collection(source)?;

    let features: Vec<CoreFeature> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties.unwrap_or_default();
            core_properties(&props).map(|properties| CoreFeature {
                feature_type: "Feature",
                properties,
                geometry: feature.geometry,
            })
        })
        .collect();

    let count = features.len();
    let out = CoreCollection {
        collection_type: "FeatureCollection",
        name: COLLECTION_NAME,
        features,
    };

    if let Some(parent) = dest.parent() {
        create_dir_all(parent)?;
    }
    let file = File::create(dest)?;
    serde_json::to_writer(BufWriter::new(file), &out)?;

    println!("Wrote {} features to {}", count, dest.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn keeps_rain_garden_and_rowrg() {
        assert!(core_properties(&props(json!({"asset_type": "Rain Garden"}))).is_some());
        assert!(core_properties(&props(json!({"asset_type": "ROWRG"}))).is_some());
    }

    #[test]
    fn discards_other_asset_types() {
        assert!(core_properties(&props(json!({"asset_type": "Bioswale"}))).is_none());
        assert!(core_properties(&props(json!({"asset_type": "rain garden"}))).is_none());
    }

    #[test]
    fn trims_asset_type_whitespace() {
        assert!(core_properties(&props(json!({"asset_type": "  Rain Garden \n"}))).is_some());
    }

    #[test]
    fn missing_or_non_string_asset_type_is_discarded() {
        assert!(core_properties(&props(json!({}))).is_none());
        assert!(core_properties(&props(json!({"asset_type": null}))).is_none());
        assert!(core_properties(&props(json!({"asset_type": 7}))).is_none());
    }

    #[test]
    fn fills_defaults_when_keys_absent() {
        let core = core_properties(&props(json!({"asset_type": "Rain Garden"}))).unwrap();
        assert_eq!(core.base_capacity_gal, json!(2500));
        assert_eq!(core.maintenance_hours_per_month, json!(3.5));
        assert_eq!(core.asset_id, Value::Null);
        assert_eq!(core.council_dist, Value::Null);
        assert_eq!(core.community_dist, Value::Null);
    }

    #[test]
    fn explicit_null_capacity_passes_through() {
        let core = core_properties(&props(json!({
            "asset_type": "Rain Garden",
            "base_capacity_gal": null,
        })))
        .unwrap();
        assert_eq!(core.base_capacity_gal, Value::Null);
    }

    #[test]
    fn explicit_values_pass_through_unchanged() {
        let core = core_properties(&props(json!({
            "asset_type": "ROWRG",
            "asset_id": "RG-0042",
            "city_counc": 26,
            "community_": "Q07",
            "base_capacity_gal": 9000,
            "maintenance_hours_per_month": 12.25,
        })))
        .unwrap();
        assert_eq!(core.asset_id, json!("RG-0042"));
        assert_eq!(core.council_dist, json!(26));
        assert_eq!(core.community_dist, json!("Q07"));
        assert_eq!(core.base_capacity_gal, json!(9000));
        assert_eq!(core.maintenance_hours_per_month, json!(12.25));
    }

    #[test]
    fn serialized_properties_have_exactly_five_keys() {
        let core = core_properties(&props(json!({
            "asset_type": "Rain Garden",
            "borough": "Queens",
        })))
        .unwrap();
        let value = serde_json::to_value(&core).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 5);
        for key in [
            "asset_id",
            "council_dist",
            "community_dist",
            "base_capacity_gal",
            "maintenance_hours_per_month",
        ] {
            assert!(map.contains_key(key), "missing key {key}");
        }
        assert!(!map.contains_key("borough"));
    }
}
