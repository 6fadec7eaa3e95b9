use std::fmt::Write as _;
use std::path::PathBuf;

use wasmlibc_core::redirect::redirects;

/// Export only the shim symbols from the host cdylib.
///
/// wasm linkers take no version script; there the export set is whatever
/// `#[no_mangle]` declares.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("linux") {
        return;
    }
    let Some(out_dir) = std::env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };

    let mut script = String::from("{\n  global:\n");
    for entry in redirects() {
        let _ = writeln!(script, "    {};", entry.replacement);
    }
    script.push_str("  local: *;\n};\n");

    let path = out_dir.join("wasmlibc.map");
    if std::fs::write(&path, script).is_ok() {
        println!(
            "cargo:rustc-cdylib-link-arg=-Wl,--version-script={}",
            path.display()
        );
    }
}
