//! Diff rendering for fixture comparison.

/// Render a text diff between expected and actual output.
///
/// Single-line outputs (the common case for libc results) also get a caret
/// under the first differing byte.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::new();
    out.push_str("--- expected\n");
    out.push_str("+++ actual\n");

    let exp_lines: Vec<&str> = expected.lines().collect();
    let act_lines: Vec<&str> = actual.lines().collect();
    if exp_lines.len() <= 1 && act_lines.len() <= 1 {
        let column = first_difference(expected, actual);
        out.push_str(&format!("-{expected}\n"));
        out.push_str(&format!("+{actual}\n"));
        out.push_str(&format!(" {}^ byte {column}\n", " ".repeat(column)));
        return out;
    }

    for i in 0..exp_lines.len().max(act_lines.len()) {
        match (exp_lines.get(i), act_lines.get(i)) {
            (Some(e), Some(a)) if e == a => {}
            (e, a) => {
                out.push_str(&format!("@@ line {} @@\n", i + 1));
                if let Some(e) = e {
                    out.push_str(&format!("-{e}\n"));
                }
                if let Some(a) = a {
                    out.push_str(&format!("+{a}\n"));
                }
            }
        }
    }
    out
}

fn first_difference(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| a.len().min(b.len()))
}
