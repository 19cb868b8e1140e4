use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::model::{Event, InstrumentLines};
use crate::report::RunTelemetry;
use crate::templates::TemplateSet;

// "Expected but lost" marker shapes: lines that should have produced an
// event but failed their template. Reported at elevated visibility.
static LOST_FORCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Executed cmd #([0-9.-]+)").expect("lost-force pattern compiles"));
static LOST_EXPOSURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"EXP NO = ([0-9]+)").expect("lost-exposure pattern compiles"));
static LOST_INTTIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-2][0-9]:[0-5][0-9]:[0-5][0-9](\.[0-9]+)*)> TEL ACTO (INTTIME)")
        .expect("lost-inttime pattern compiles")
});

/// Classifies each retained line into an event using an ordered keyword
/// ladder, then the matching category's capture template. Sections are
/// consumed in instrument order, lines in original file order.
pub fn extract_events(
    sections: &[InstrumentLines],
    templates: &TemplateSet,
    telemetry: &mut RunTelemetry,
) -> Vec<Event> {
    let mut events = Vec::new();

    for section in sections {
        for line in &section.lines {
            match extract_line(&line.text, templates) {
                Some(event) => {
                    count_event(&event, telemetry);
                    telemetry.lines_parsed += 1;
                    events.push(event);
                }
                None => report_lost(&line.text, telemetry),
            }
        }
    }

    events
}

/// Applies the keyword ladder and the selected template to one line.
pub fn extract_line(text: &str, templates: &TemplateSet) -> Option<Event> {
    if text.contains("SetGlbAbs") || text.contains("SetGlbRel") {
        if text.contains("Forces") {
            let caps = templates.force_distribution.captures(text)?;
            return force_distribution_event(&caps);
        } else if text.contains("Executed") {
            let caps = templates.force_id.captures(text)?;
            return Some(Event::ForceId {
                date: group(&caps, 2)?.to_string(),
                time: parse_time(group(&caps, 3)?)?,
                id: group(&caps, 5)?.parse().ok()?,
            });
        } else if text.contains("Received") {
            let caps = templates.force_init.captures(text)?;
            return Some(Event::ForceInit {
                time: parse_time(group(&caps, 3)?)?,
                id: group(&caps, 5)?.parse().ok()?,
            });
        }
        None
    } else if text.contains("EXP NO") {
        let caps = templates.exposure_count.captures(text)?;
        Some(Event::ImageExposed {
            time: parse_time(group(&caps, 2)?)?,
            id: group(&caps, 4)?.parse().ok()?,
            label: group(&caps, 5)?.to_string(),
        })
    } else if text.contains("INTTIME") {
        let caps = templates.integration_time.captures(text)?;
        // Group 4 carries the INTTIME marker itself; group 5 the seconds.
        let _marker = group(&caps, 4)?;
        Some(Event::ImageIntTime {
            time: parse_time(group(&caps, 2)?)?,
            seconds: group(&caps, 5)?.parse().ok()?,
        })
    } else if text.contains("TEL") {
        for template in &templates.telemetry {
            if let Some(caps) = template.captures(text) {
                return Some(Event::Telemetry {
                    time: parse_time(group(&caps, 2)?)?,
                    group: group(&caps, 4)?.to_string(),
                    label: group(&caps, 5)?.to_string(),
                    value: group(&caps, 6)?.trim().to_string(),
                });
            }
        }
        None
    } else {
        None
    }
}

fn force_distribution_event(caps: &Captures<'_>) -> Option<Event> {
    let block = group(caps, 6)?;
    let values: Vec<f64> = block
        .split_whitespace()
        .map(|token| token.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    Some(Event::ForceDistribution {
        date: group(caps, 2)?.to_string(),
        time: parse_time(group(caps, 3)?)?,
        values,
    })
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
    caps.get(index).map(|m| m.as_str())
}

/// Parses a `HH:MM:SS[.fff]` capture, discarding any fractional part.
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let whole = raw.split('.').next().unwrap_or(raw);
    NaiveTime::parse_from_str(whole, "%H:%M:%S").ok()
}

fn count_event(event: &Event, telemetry: &mut RunTelemetry) {
    match event {
        Event::ForceId { .. } => telemetry.force_id_events += 1,
        Event::ForceDistribution { .. } => telemetry.force_distribution_events += 1,
        Event::ForceInit { .. } => telemetry.force_init_events += 1,
        Event::ImageExposed { .. } => telemetry.image_exposed_events += 1,
        Event::ImageIntTime { .. } => telemetry.image_inttime_events += 1,
        Event::Telemetry { .. } => telemetry.telemetry_events += 1,
    }
}

/// Distinguishes the three recognized lost-line shapes from plain noise.
fn report_lost(text: &str, telemetry: &mut RunTelemetry) {
    if let Some(found) = LOST_FORCE_RE.find(text) {
        telemetry.lost_force_markers += 1;
        warn!(marker = found.as_str(), "force line dropped by extraction");
    } else if let Some(found) = LOST_EXPOSURE_RE.find(text) {
        telemetry.lost_exposure_markers += 1;
        warn!(marker = found.as_str(), "exposure line dropped by extraction");
    } else if let Some(found) = LOST_INTTIME_RE.find(text) {
        telemetry.lost_inttime_markers += 1;
        warn!(
            marker = found.as_str(),
            "integration-time line dropped by extraction"
        );
    } else {
        debug!("unmatched line discarded");
    }
}
