//! Build bundle written to disk and checked back against its index.

use std::path::PathBuf;

use wasmlibc_core::redirect::{AmalgamationVariant, BuildPlan, redirects};
use wasmlibc_harness::artifacts::{ArtifactIndex, sha256_hex};
use wasmlibc_harness::bundle::{FLAGS_FILE, HEADER_FILE, INDEX_FILE, SYMBOLS_FILE, write_bundle};
use wasmlibc_harness::structured_log::{LogEmitter, LogLevel, Outcome, validate_log_file};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wasmlibc-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn bundle_files_match_index() {
    let dir = scratch_dir("bundle");
    let index = write_bundle(&dir, &BuildPlan::default(), "bundle-test").expect("bundle written");

    let paths: Vec<&str> = index.artifacts.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(paths, [HEADER_FILE, FLAGS_FILE, SYMBOLS_FILE]);
    assert!(index.stale_entries(&dir).is_empty());

    let on_disk = std::fs::read_to_string(dir.join(INDEX_FILE)).expect("index file");
    let parsed: ArtifactIndex = serde_json::from_str(&on_disk).expect("index json");
    assert_eq!(parsed.artifacts, index.artifacts);
    assert_eq!(parsed.run_id, "bundle-test");

    let header = std::fs::read(dir.join(HEADER_FILE)).expect("header file");
    assert_eq!(index.artifacts[0].sha256, sha256_hex(&header));
    let header = String::from_utf8(header).expect("ascii header");
    assert!(header.contains("#define malloc wasmlibc_malloc\n"));
    assert!(header.contains("#define errno (*__errno_location())\n"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn flags_include_bundled_header_and_variant() {
    let dir = scratch_dir("flags");
    let plan = BuildPlan {
        variant: AmalgamationVariant::MultipleCiphers,
        threads: true,
        ..BuildPlan::default()
    };
    write_bundle(&dir, &plan, "flags-test").expect("bundle written");

    let flags = std::fs::read_to_string(dir.join(FLAGS_FILE)).expect("flags file");
    let lines: Vec<&str> = flags.lines().collect();
    let include = lines
        .iter()
        .position(|l| *l == "-include")
        .expect("-include flag");
    assert!(lines[include + 1].ends_with(HEADER_FILE));
    assert_eq!(lines.last(), Some(&"-pthread"));

    let symbols: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join(SYMBOLS_FILE)).expect("symbols"))
            .expect("symbols json");
    assert_eq!(symbols.as_array().map(Vec::len), Some(redirects().len()));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn tampered_artifact_is_stale() {
    let dir = scratch_dir("stale");
    let index = write_bundle(&dir, &BuildPlan::default(), "stale-test").expect("bundle written");
    std::fs::write(dir.join(FLAGS_FILE), "--target=x86_64\n").expect("overwrite flags");
    assert_eq!(index.stale_entries(&dir), [FLAGS_FILE]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn emitted_log_file_validates() {
    let dir = scratch_dir("log");
    std::fs::create_dir_all(&dir).expect("scratch dir");
    let path = dir.join("run.jsonl");

    let mut emitter = LogEmitter::to_file(&path, "log-test").expect("log file");
    emitter.emit(LogLevel::Info, "run_start").expect("emit");
    let entry = wasmlibc_harness::structured_log::LogEntry::new("", LogLevel::Warn, "heap_limit")
        .with_api("allocator", "malloc")
        .with_outcome(Outcome::Fail)
        .with_errno(48)
        .with_artifacts(vec![String::from(HEADER_FILE)]);
    emitter.emit_entry(entry).expect("emit");
    emitter.flush().expect("flush");

    let (lines, errors) = validate_log_file(&path).expect("readable log");
    assert_eq!(lines, 2);
    assert!(errors.is_empty(), "{errors:?}");
    let _ = std::fs::remove_dir_all(&dir);
}
