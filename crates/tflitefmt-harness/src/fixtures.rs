//! Fixture loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Operation under test: `format` or `arg_plan`.
    pub function: String,
    /// Where the expected behavior comes from (C standard clause, plugin contract).
    pub reference: String,
    /// Inputs; see [`crate::exec::FormatInputs`].
    pub inputs: serde_json::Value,
    /// Expected rendering, or `error:<name>` when the call must fail.
    pub expected_output: String,
    /// Expected last-error code (0 on success).
    #[serde(default)]
    pub expected_error: i32,
    /// `strict`, `hardened` or `both`.
    pub mode: String,
}

/// A collection of fixture cases for one feature area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Feature area (e.g. `format/integers`).
    pub family: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|source| HarnessError::Fixture {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `*.json` files in `dir`, sorted by name.
pub fn fixture_paths(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every fixture set in `dir`. An empty directory is an error.
pub fn load_dir(dir: &Path) -> Result<Vec<FixtureSet>, HarnessError> {
    let sets = fixture_paths(dir)?
        .iter()
        .map(|path| FixtureSet::from_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    if sets.is_empty() {
        return Err(HarnessError::NoFixtures {
            dir: dir.to_path_buf(),
        });
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_error_defaults_to_zero() {
        let set = FixtureSet::from_json(
            r#"{"version":"v1","family":"format/smoke","cases":[
                {"name":"plain","function":"format","reference":"C11 7.21.6.1",
                 "inputs":{"format":"hi"},"expected_output":"hi","mode":"both"}
            ]}"#,
        )
        .expect("valid fixture json");
        assert_eq!(set.cases[0].expected_error, 0);
    }

    #[test]
    fn from_file_names_the_broken_file() {
        let dir = std::env::temp_dir().join(format!("tflitefmt-fixture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FixtureSet::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"), "{err}");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
