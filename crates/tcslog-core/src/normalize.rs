use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::LogLine;

// Syslog-style prefix: month/day/time, unit tag, process name, pid, colon.
// Continuation lines and dispatcher lines without a pid keep their text.
static PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z]{3}\s[0-9]{2}\s[0-9]{2}:[0-9]{2}:[0-9]{2}?)\swt[1-4]tcs\s(.+)(\[[0-9]+\]):\s")
        .expect("prefix pattern compiles")
});

/// Strips the process prefix when present and collapses each pair of
/// consecutive spaces to one. Never drops a line.
pub fn normalize_line(line: &str) -> String {
    let stripped = PREFIX_RE.replace_all(line, "");
    stripped.replace("  ", " ")
}

pub fn normalize_lines(raw: &str) -> Vec<LogLine> {
    raw.lines()
        .enumerate()
        .map(|(offset, line)| LogLine {
            index: offset + 1,
            text: normalize_line(line),
        })
        .collect()
}
