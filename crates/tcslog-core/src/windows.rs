use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::config::PipelineConfig;
use crate::model::{InstrumentLines, InstrumentWindows, LogLine, ObsRow, TimeWindow};
use crate::report::RunTelemetry;

// Month/day/time stamp embedded in a normalized line, optionally fractional.
static STAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z]{3} [0-9]+ [0-2][0-9]:[0-5][0-9]:[0-5][0-9](\.[0-9]+)?)")
        .expect("stamp pattern compiles")
});

const STAMP_FORMAT: &str = "%Y %b %d %H:%M:%S";

/// Builds one candidate window per observation row, grouped by instrument in
/// first-seen order, then sorts and merges each instrument's windows.
pub fn build_windows(rows: &[ObsRow], config: &PipelineConfig) -> Vec<InstrumentWindows> {
    let mut groups: Vec<InstrumentWindows> = Vec::new();

    for row in rows {
        let exposure = Duration::milliseconds((row.exptime_seconds * 1000.0).round() as i64);
        let window = TimeWindow {
            start: row.tpl_start - config.lower_margin,
            end: row.tpl_start + exposure + config.upper_margin,
        };
        match groups
            .iter_mut()
            .find(|group| group.instrument == row.instrument)
        {
            Some(group) => group.windows.push(window),
            None => groups.push(InstrumentWindows {
                instrument: row.instrument.clone(),
                windows: vec![window],
            }),
        }
    }

    for group in &mut groups {
        group.windows.sort_by_key(|window| (window.start, window.end));
        merge_windows(&mut group.windows, config.join_threshold);
        info!(
            instrument = %group.instrument,
            windows = group.windows.len(),
            "observation windows merged"
        );
    }

    groups
}

/// Single merge pass over a start-sorted window list. Joining keeps the later
/// of the two ends, so merging never shrinks coverage; the pass is idempotent.
pub fn merge_windows(windows: &mut Vec<TimeWindow>, join_threshold: Duration) {
    let mut index = 0;
    while index + 1 < windows.len() {
        let next = windows[index + 1];
        if windows[index].end >= next.start - join_threshold {
            windows[index].end = windows[index].end.max(next.end);
            windows.remove(index + 1);
        } else {
            index += 1;
        }
    }
}

/// Keeps, per instrument, the lines whose embedded stamp falls inside one of
/// that instrument's merged windows. A line may be retained under several
/// instruments; lines without a parseable stamp are excluded.
pub fn filter_lines(
    lines: &[LogLine],
    windows: &[InstrumentWindows],
    night: NaiveDate,
    telemetry: &mut RunTelemetry,
) -> Vec<InstrumentLines> {
    let year = night.year();
    let mut sections = Vec::with_capacity(windows.len());

    for group in windows {
        let mut kept = Vec::new();
        for line in lines {
            let Some(stamp) = line_datetime(year, &line.text) else {
                continue;
            };
            for window in &group.windows {
                // Windows are sorted; later ones start even further past the line.
                if window.start > stamp {
                    break;
                }
                if stamp <= window.end {
                    kept.push(line.clone());
                    break;
                }
            }
        }
        telemetry.lines_retained += kept.len();
        info!(
            instrument = %group.instrument,
            lines = kept.len(),
            "window filter applied"
        );
        sections.push(InstrumentLines {
            instrument: group.instrument.clone(),
            lines: kept,
        });
    }

    sections
}

/// Extracts a line's month/day/time stamp and resolves it against the
/// externally supplied year. Any fractional seconds are discarded.
pub fn line_datetime(year: i32, text: &str) -> Option<NaiveDateTime> {
    let captures = STAMP_RE.captures(text)?;
    let stamp = captures.get(1)?.as_str();
    let stamp = stamp.split('.').next().unwrap_or(stamp);
    NaiveDateTime::parse_from_str(&format!("{year} {stamp}"), STAMP_FORMAT).ok()
}
