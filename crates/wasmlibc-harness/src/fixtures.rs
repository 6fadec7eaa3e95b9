//! Fixture loading and management.
//!
//! A fixture file is one [`FixtureSet`]: a family of cases that each name a
//! libc function, its inputs, and the output and errno C would produce.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// One typed `sprintf` argument, written `{"int": 42}`, `{"float": 0.5}`,
/// `{"str": "x"}` (or `{"str": null}`) and `{"ptr": 4096}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureArg {
    Int(i64),
    Float(f64),
    Str(Option<String>),
    Ptr(u64),
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Unprefixed C name of the function under test.
    pub function: String,
    /// Input parameters; the shape depends on `function`.
    pub inputs: serde_json::Value,
    /// Expected output, rendered as the runner renders results.
    pub expected_output: String,
    /// Expected errno by name (`"EDOM"`), or `"0"` for untouched.
    #[serde(default = "no_errno")]
    pub expected_errno: String,
}

fn no_errno() -> String {
    String::from("0")
}

/// A collection of fixture cases for a function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        Self::from_json(&content).map_err(|e| HarnessError::Fixture {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Load one fixture file, or every `*.json` file in a directory (sorted by name).
pub fn load_fixtures(path: &Path) -> Result<Vec<FixtureSet>, HarnessError> {
    if path.is_file() {
        return Ok(vec![FixtureSet::from_file(path)?]);
    }

    let entries = std::fs::read_dir(path).map_err(|e| HarnessError::io(path, e))?;
    let mut fixture_paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    fixture_paths.sort();

    if fixture_paths.is_empty() {
        return Err(HarnessError::Fixture {
            path: path.to_path_buf(),
            message: String::from("no fixture JSON files found"),
        });
    }
    fixture_paths.iter().map(|p| FixtureSet::from_file(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_args_and_default_errno() {
        let set = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"stdio",
                "cases":[
                    {"name":"basic","function":"sprintf",
                     "inputs":{"format":"%d-%s","args":[{"int":42},{"str":"x"},{"str":null}]},
                     "expected_output":"42-x"}
                ]
            }"#,
        )
        .expect("valid fixture json");
        let case = &set.cases[0];
        assert_eq!(case.expected_errno, "0");
        let args: Vec<FixtureArg> =
            serde_json::from_value(case.inputs["args"].clone()).expect("typed args");
        assert_eq!(
            args,
            vec![
                FixtureArg::Int(42),
                FixtureArg::Str(Some("x".into())),
                FixtureArg::Str(None)
            ]
        );
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = load_fixtures(Path::new("/nonexistent/wasmlibc/fixtures"))
            .expect_err("missing directory");
        assert!(matches!(err, HarnessError::Io { .. }));
    }
}
