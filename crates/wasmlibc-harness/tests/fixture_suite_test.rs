//! Runs every checked-in fixture through the runner.

use std::path::PathBuf;

use wasmlibc_harness::fixtures::load_fixtures;
use wasmlibc_harness::runner::log_results;
use wasmlibc_harness::structured_log::{LogEmitter, validate_log_line};
use wasmlibc_harness::{ConformanceReport, TestRunner, VerificationSummary};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

#[test]
fn all_fixture_families_load() {
    let sets = load_fixtures(&fixture_dir()).expect("fixtures load");
    let mut families: Vec<&str> = sets.iter().map(|s| s.family.as_str()).collect();
    families.sort_unstable();
    assert_eq!(families, ["math", "redirect", "stdio", "string", "time"]);
    assert!(sets.iter().all(|s| s.version == "v1" && !s.cases.is_empty()));
}

#[test]
fn every_fixture_case_passes() {
    let runner = TestRunner::new("fixtures");
    let results: Vec<_> = load_fixtures(&fixture_dir())
        .expect("fixtures load")
        .iter()
        .flat_map(|set| runner.run(set))
        .collect();
    let summary = VerificationSummary::from_results(results);

    let failures: Vec<String> = summary
        .failures()
        .map(|r| {
            format!(
                "{}/{}: {}",
                r.family,
                r.case_name,
                r.diff.as_deref().unwrap_or("")
            )
        })
        .collect();
    assert!(failures.is_empty(), "failing cases:\n{}", failures.join("\n"));
    assert!(summary.total > 50);
}

#[test]
fn results_log_as_valid_jsonl() {
    let sets = load_fixtures(&fixture_dir().join("redirect.json")).expect("fixture loads");
    let results = TestRunner::new("log").run(&sets[0]);

    let mut emitter = LogEmitter::to_buffer("suite");
    log_results(&mut emitter, &results).expect("buffer write");
    let text = String::from_utf8(emitter.buffered().to_vec()).expect("utf-8 log");

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), results.len());
    for (i, line) in lines.iter().enumerate() {
        let entry = validate_log_line(line, i + 1).expect("schema-valid line");
        assert_eq!(entry.event, "fixture_case");
        assert_eq!(entry.trace_id, format!("suite::{:03}", i + 1));
    }
}

#[test]
fn report_lists_every_case() {
    let sets = load_fixtures(&fixture_dir().join("time.json")).expect("fixture loads");
    let summary = VerificationSummary::from_results(TestRunner::new("report").run(&sets[0]));
    let report = ConformanceReport {
        title: String::from("time"),
        timestamp: String::from("2026-01-01T00:00:00.000Z"),
        summary,
    };
    let md = report.to_markdown();
    for case in &sets[0].cases {
        assert!(md.contains(&case.name), "missing {}", case.name);
    }
    assert!(!md.contains("## Failures"));
}
