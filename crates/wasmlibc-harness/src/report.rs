//! Report generation for conformance results.

use serde::{Deserialize, Serialize};

use crate::verify::VerificationSummary;

/// A conformance report over one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Case | Family | Symbol | errno | Status |\n");
        out.push_str("|------|--------|--------|-------|--------|\n");
        for r in &self.summary.results {
            let status = if r.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                r.case_name, r.family, r.symbol, r.actual_errno, status
            ));
        }

        let mut failures = self.summary.failures().peekable();
        if failures.peek().is_some() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n```\n", r.case_name));
                out.push_str(r.diff.as_deref().unwrap_or("(no diff)"));
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str("```\n");
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::VerificationResult;

    fn result(name: &str, passed: bool) -> VerificationResult {
        VerificationResult {
            case_name: name.to_string(),
            family: String::from("string"),
            symbol: String::from("strcmp"),
            passed,
            expected: String::from("0"),
            actual: String::from(if passed { "0" } else { "1" }),
            expected_errno: String::from("0"),
            actual_errno: String::from("0"),
            diff: (!passed).then(|| String::from("--- expected\n+++ actual\n-0\n+1\n")),
        }
    }

    #[test]
    fn markdown_lists_cases_and_failures() {
        let report = ConformanceReport {
            title: String::from("wasmlibc Conformance Report"),
            timestamp: String::from("2026-01-01T00:00:00.000Z"),
            summary: VerificationSummary::from_results(vec![
                result("equal", true),
                result("differs", false),
            ]),
        };
        let md = report.to_markdown();
        assert!(md.starts_with("# wasmlibc Conformance Report\n"));
        assert!(md.contains("- Failed: 1\n"));
        assert!(md.contains("| equal | string | strcmp | 0 | PASS |\n"));
        assert!(md.contains("### differs\n\n```\n--- expected\n"));
        assert!(!md.contains("### equal"));
    }

    #[test]
    fn json_round_trips_summary_counts() {
        let report = ConformanceReport {
            title: String::from("t"),
            timestamp: String::from("now"),
            summary: VerificationSummary::from_results(vec![result("a", true)]),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&report.to_json()).expect("report json");
        assert_eq!(parsed["summary"]["total"], 1);
        assert_eq!(parsed["summary"]["passed"], 1);
    }
}
