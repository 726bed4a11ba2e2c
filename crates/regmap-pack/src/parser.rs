//! Shared YAML/JSON loading.
//!
//! Every configuration and artifact read in the pack goes through these
//! functions so that missing files and parse failures are reported with the
//! path that caused them. YAML is parsed straight into a `serde_json::Value`
//! so both formats feed the same resolution code.

use std::path::Path;

use serde_json::Value;

use crate::error::{PackError, PackResult};

fn read_to_string(path: &Path) -> PackResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PackError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PackError::Io(e)
        }
    })
}

/// Load a JSON file and return it as a `serde_json::Value`.
pub fn load_json_value(path: &Path) -> PackResult<Value> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| PackError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a JSON file into a strongly-typed struct.
pub fn load_json_typed<T: serde::de::DeserializeOwned>(path: &Path) -> PackResult<T> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| PackError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a YAML file and return it as a `serde_json::Value`.
pub fn load_yaml_as_value(path: &Path) -> PackResult<Value> {
    let content = read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| PackError::YamlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a YAML file into a strongly-typed struct.
pub fn load_yaml_typed<T: serde::de::DeserializeOwned>(path: &Path) -> PackResult<T> {
    let content = read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| PackError::YamlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Whether the extension names a YAML file.
fn is_yaml(path: &Path) -> Option<bool> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "yaml" | "yml" => Some(true),
        "json" => Some(false),
        _ => None,
    }
}

/// Load a `.json`, `.yaml` or `.yml` file as a `serde_json::Value`.
pub fn load_config_value(path: &Path) -> PackResult<Value> {
    match is_yaml(path) {
        Some(true) => load_yaml_as_value(path),
        Some(false) => load_json_value(path),
        None => Err(PackError::UnsupportedConfigFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Load a `.json`, `.yaml` or `.yml` file into a strongly-typed struct.
pub fn load_config_typed<T: serde::de::DeserializeOwned>(path: &Path) -> PackResult<T> {
    match is_yaml(path) {
        Some(true) => load_yaml_typed(path),
        Some(false) => load_json_typed(path),
        None => Err(PackError::UnsupportedConfigFormat {
            path: path.to_path_buf(),
        }),
    }
}
