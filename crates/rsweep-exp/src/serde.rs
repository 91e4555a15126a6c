use std::fmt::Display;

use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

fn codec_error(code: &str, err: impl Display) -> LaunchError {
    LaunchError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Sorts object keys at every depth, in place.
fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|left, right| left.0.cmp(&right.0));
            for (key, mut nested) in entries {
                sort_keys(&mut nested);
                map.insert(key, nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Pretty-printed JSON with keys sorted recursively, so equal values give equal bytes.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, LaunchError> {
    let mut tree = serde_json::to_value(value).map_err(|err| codec_error("json_encode", err))?;
    sort_keys(&mut tree);
    let mut bytes = serde_json::to_vec_pretty(&tree).map_err(|err| codec_error("json_write", err))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, LaunchError> {
    serde_json::from_slice(data).map_err(|err| codec_error("json_decode", err))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, LaunchError> {
    serde_yaml::to_string(value).map_err(|err| codec_error("yaml_encode", err))
}

/// Parses YAML, reporting the failing line and column when known.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, LaunchError> {
    serde_yaml::from_slice(data).map_err(|err| {
        let mut info = ErrorInfo::new("yaml_decode", err.to_string());
        if let Some(location) = err.location() {
            info = info
                .with_context("line", location.line().to_string())
                .with_context("column", location.column().to_string());
        }
        LaunchError::Serde(info)
    })
}
