//! Diff rendering for fixture comparison.
//!
//! Rendered strings are mostly single-line, so besides the per-line view the
//! diff points at the first differing byte.

/// Render a text diff between expected and actual output.
#[must_use]
pub fn render_diff(expected: &str, actual: &str) -> String {
    if expected == actual {
        return String::from("[identical]");
    }

    let mut out = String::from("--- expected\n+++ actual\n");
    let at = expected
        .bytes()
        .zip(actual.bytes())
        .position(|(e, a)| e != a)
        .unwrap_or_else(|| expected.len().min(actual.len()));
    out.push_str(&format!(
        "@@ first difference at byte {at} (expected {} bytes, got {}) @@\n",
        expected.len(),
        actual.len()
    ));

    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    for i in 0..expected_lines.len().max(actual_lines.len()) {
        let e = expected_lines.get(i).copied();
        let a = actual_lines.get(i).copied();
        if e != a {
            out.push_str(&format!("@@ line {} @@\n", i + 1));
            if let Some(e) = e {
                out.push_str(&format!("-{e:?}\n"));
            }
            if let Some(a) = a {
                out.push_str(&format!("+{a:?}\n"));
            }
        }
    }
    out
}
