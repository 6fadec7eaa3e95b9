//! Forced-include header generation.

use std::fmt::Write as _;

use super::{RedirectEntry, SymbolFamily};

const GUARD: &str = "WASMLIBC_SHIM_H";

/// Render the C header that redirects `table` when force-included into the
/// foreign translation unit (`-include`).
///
/// Output is deterministic: entries appear grouped by family in table order.
#[must_use]
pub fn render_header(table: &[RedirectEntry]) -> String {
    let mut out = String::with_capacity(4096);
    let _ = writeln!(out, "/* Generated by wasmlibc. Do not edit. */");
    let _ = writeln!(out, "#ifndef {GUARD}");
    let _ = writeln!(out, "#define {GUARD}");
    out.push('\n');
    out.push_str("#include <stddef.h>\n#include <stdint.h>\n#include <time.h>\n");

    let mut families: Vec<SymbolFamily> = Vec::new();
    for entry in table {
        if !families.contains(&entry.family) {
            families.push(entry.family);
        }
    }

    for family in families {
        out.push('\n');
        let _ = writeln!(out, "/* {family} */");
        let entries = table.iter().filter(|e| e.family == family);
        for entry in entries.clone() {
            let _ = writeln!(out, "#define {} {}", entry.original, entry.replacement);
        }
        if family == SymbolFamily::Errno {
            out.push_str("#undef errno\n#define errno (*__errno_location())\n");
        }
        for entry in entries {
            let _ = writeln!(out, "{}", entry.prototype);
        }
    }

    out.push('\n');
    let _ = writeln!(out, "#endif /* {GUARD} */");
    out
}
