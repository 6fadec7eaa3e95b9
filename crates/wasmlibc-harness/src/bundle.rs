//! Build bundle: everything an embedding build needs, in one directory.
//!
//! - `wasmlibc_shim.h`: the forced-include header
//! - `flags.txt`: compile flags, one per line
//! - `symbols.json`: the redirection table
//! - `artifact_index.json`: SHA-256 digests of the three files above

use std::path::Path;

use serde::Serialize;
use wasmlibc_core::redirect::{
    self, BuildPlan, RedirectEntry, SymbolFamily, redirects, render_flags, render_header,
};

use crate::artifacts::ArtifactIndex;
use crate::error::HarnessError;

pub const HEADER_FILE: &str = "wasmlibc_shim.h";
pub const FLAGS_FILE: &str = "flags.txt";
pub const SYMBOLS_FILE: &str = "symbols.json";
pub const INDEX_FILE: &str = "artifact_index.json";

/// JSON view of one redirect entry.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolRecord {
    pub original: &'static str,
    pub replacement: &'static str,
    pub family: &'static str,
    pub prototype: &'static str,
}

impl From<&RedirectEntry> for SymbolRecord {
    fn from(entry: &RedirectEntry) -> Self {
        Self {
            original: entry.original,
            replacement: entry.replacement,
            family: entry.family.as_str(),
            prototype: entry.prototype,
        }
    }
}

/// Parse a family name as printed by [`SymbolFamily::as_str`].
pub fn parse_family(name: &str) -> Result<SymbolFamily, HarnessError> {
    SymbolFamily::ALL
        .into_iter()
        .find(|f| f.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| HarnessError::UnknownFamily(name.to_string()))
}

/// The validated table, optionally restricted to one family.
pub fn symbol_records(family: Option<SymbolFamily>) -> Result<Vec<SymbolRecord>, HarnessError> {
    redirect::validate(redirects())?;
    Ok(redirects()
        .iter()
        .filter(|e| family.is_none_or(|f| e.family == f))
        .map(SymbolRecord::from)
        .collect())
}

/// Validate the table and render the header.
pub fn checked_header() -> Result<String, HarnessError> {
    redirect::validate(redirects())?;
    Ok(render_header(redirects()))
}

fn write(path: &Path, data: &[u8]) -> Result<(), HarnessError> {
    std::fs::write(path, data).map_err(|e| HarnessError::io(path, e))
}

/// Write the bundle into `out_dir`. The plan's header path, when unset, points
/// at the bundled header.
pub fn write_bundle(
    out_dir: &Path,
    plan: &BuildPlan,
    run_id: &str,
) -> Result<ArtifactIndex, HarnessError> {
    std::fs::create_dir_all(out_dir).map_err(|e| HarnessError::io(out_dir, e))?;
    let mut index = ArtifactIndex::new(run_id);

    let header = checked_header()?;
    write(&out_dir.join(HEADER_FILE), header.as_bytes())?;
    index.add_bytes(HEADER_FILE, "header", header.as_bytes());

    let mut plan = plan.clone();
    if plan.shim_header.is_none() {
        plan.shim_header = Some(out_dir.join(HEADER_FILE).display().to_string());
    }
    let mut flags = render_flags(&plan).join("\n");
    flags.push('\n');
    write(&out_dir.join(FLAGS_FILE), flags.as_bytes())?;
    index.add_bytes(FLAGS_FILE, "flags", flags.as_bytes());

    let symbols = serde_json::to_string_pretty(&symbol_records(None)?)?;
    write(&out_dir.join(SYMBOLS_FILE), symbols.as_bytes())?;
    index.add_bytes(SYMBOLS_FILE, "symbols", symbols.as_bytes());

    write(&out_dir.join(INDEX_FILE), index.to_json()?.as_bytes())?;
    Ok(index)
}
