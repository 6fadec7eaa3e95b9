//! CLI entrypoint for the wasmlibc build tooling and conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use wasmlibc_core::redirect::{AmalgamationVariant, BuildPlan, DEFAULT_TARGET, render_flags};
use wasmlibc_harness::structured_log::{
    LogEmitter, LogEntry, LogLevel, Outcome, now_utc, validate_log_file,
};
use wasmlibc_harness::{
    ConformanceReport, TestRunner, VerificationSummary, bundle, fixtures, runner, stats,
};

/// Build tooling and conformance harness for wasmlibc.
#[derive(Debug, Parser)]
#[command(name = "harness")]
#[command(about = "Build tooling and conformance harness for wasmlibc")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    Sqlite,
    MultipleCiphers,
}

impl From<Variant> for AmalgamationVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Sqlite => Self::Sqlite,
            Variant::MultipleCiphers => Self::MultipleCiphers,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the redirection table and write the forced-include header.
    EmitHeader {
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the compile flags for the amalgamation.
    Flags {
        #[arg(long, value_enum, default_value = "sqlite")]
        variant: Variant,
        /// Forced-include header path; omit for a custom-libc build.
        #[arg(long)]
        header: Option<String>,
        /// Target supports atomics (adds -pthread).
        #[arg(long)]
        threads: bool,
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,
        /// Print a JSON array instead of one flag per line.
        #[arg(long)]
        json: bool,
    },
    /// Print the redirection table as JSON.
    Symbols {
        /// Restrict to one family (allocator, string, math, ...).
        #[arg(long)]
        family: Option<String>,
    },
    /// Run fixture cases against wasmlibc-core.
    Verify {
        /// Fixture JSON file or directory of fixture files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; a .json twin is written next to it).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Write header, flags, symbols and an artifact index into one directory.
    Bundle {
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value = "sqlite")]
        variant: Variant,
        #[arg(long)]
        threads: bool,
    },
    /// Print heap metrics after a small allocation smoke run.
    Stats,
    /// Validate a structured JSONL log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn run_id() -> String {
    format!("harness-{}", std::process::id())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::EmitHeader { output } => {
            let header = bundle::checked_header()?;
            std::fs::write(&output, header)?;
            eprintln!("Wrote shim header to {}", output.display());
        }
        Command::Flags {
            variant,
            header,
            threads,
            target,
            json,
        } => {
            let plan = BuildPlan {
                target,
                variant: variant.into(),
                shim_header: header,
                threads,
            };
            let flags = render_flags(&plan);
            if json {
                println!("{}", serde_json::to_string_pretty(&flags)?);
            } else {
                for flag in flags {
                    println!("{flag}");
                }
            }
        }
        Command::Symbols { family } => {
            let family = family.as_deref().map(bundle::parse_family).transpose()?;
            let records = bundle::symbol_records(family)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Verify {
            fixture,
            report,
            log,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let fixture_sets = fixtures::load_fixtures(&fixture)?;
            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, &run_id())?),
                None => None,
            };
            if let Some(emitter) = emitter.as_mut() {
                emitter.emit(LogLevel::Info, "verify_start")?;
            }

            let test_runner = TestRunner::new("fixture-verify");
            let mut results = Vec::new();
            for set in &fixture_sets {
                let set_results = test_runner.run(set);
                if let Some(emitter) = emitter.as_mut() {
                    runner::log_results(emitter, &set_results)?;
                }
                results.extend(set_results);
            }

            let summary = VerificationSummary::from_results(results);
            let report_doc = ConformanceReport {
                title: String::from("wasmlibc Conformance Report"),
                timestamp: now_utc(),
                summary,
            };

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
            );
            for failure in report_doc.summary.failures() {
                eprintln!("FAIL {} ({})", failure.case_name, failure.symbol);
            }

            let mut artifact_refs = Vec::new();
            if let Some(report_path) = report {
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
                artifact_refs.push(report_path.display().to_string());
                artifact_refs.push(json_path.display().to_string());
            }

            if let Some(emitter) = emitter.as_mut() {
                let outcome = if report_doc.summary.all_passed() {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                };
                let entry = LogEntry::new("", LogLevel::Info, "verify_complete")
                    .with_outcome(outcome)
                    .with_artifacts(artifact_refs)
                    .with_details(serde_json::json!({
                        "total": report_doc.summary.total,
                        "passed": report_doc.summary.passed,
                        "failed": report_doc.summary.failed,
                    }));
                emitter.emit_entry(entry)?;
                emitter.flush()?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::Bundle {
            out_dir,
            variant,
            threads,
        } => {
            let plan = BuildPlan {
                variant: variant.into(),
                threads,
                ..BuildPlan::default()
            };
            let index = bundle::write_bundle(&out_dir, &plan, &run_id())?;
            for entry in &index.artifacts {
                eprintln!("{}  {}", entry.sha256, entry.path);
            }
            eprintln!("Wrote bundle to {}", out_dir.display());
        }
        Command::Stats => {
            let snapshot = stats::smoke_snapshot();
            println!(
                "{}",
                serde_json::to_string_pretty(&stats::snapshot_json(&snapshot))?
            );
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!("{lines} lines, {} errors", errors.len());
            if !errors.is_empty() {
                return Err(format!("{} invalid log line(s)", errors.len()).into());
            }
        }
    }

    Ok(())
}
