use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Per-run counters and stage timings, passed by parameter through the
/// pipeline stages and rendered into the plain-text run report.
#[derive(Debug, Clone, Default)]
pub struct RunTelemetry {
    pub lines_read: usize,
    pub lines_retained: usize,
    pub lines_parsed: usize,

    pub force_id_events: usize,
    pub force_distribution_events: usize,
    pub force_init_events: usize,
    pub image_exposed_events: usize,
    pub image_inttime_events: usize,
    pub telemetry_events: usize,

    /// Lines matching an "expected but lost" marker shape (force command,
    /// raw exposure, raw integration time), dropped by the extractor.
    pub lost_force_markers: usize,
    pub lost_exposure_markers: usize,
    pub lost_inttime_markers: usize,

    /// Force slices arriving with no open force record.
    pub orphan_force_slices: usize,
    /// Exposure markers outside the completion tolerance of the open image.
    pub exposed_out_of_tolerance: usize,

    pub images_dropped: usize,
    pub forces_dropped: usize,
    pub corrections_dropped: usize,

    stages: Vec<(&'static str, Duration)>,
}

impl RunTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the elapsed time of one finished stage.
    pub fn finish_stage(&mut self, name: &'static str, started: Instant) {
        self.stages.push((name, started.elapsed()));
    }

    pub fn stages(&self) -> &[(&'static str, Duration)] {
        &self.stages
    }

    pub fn lines_removed(&self) -> usize {
        self.lines_read.saturating_sub(self.lines_parsed)
    }

    pub fn force_lines(&self) -> usize {
        self.force_id_events + self.force_distribution_events
    }

    pub fn image_lines(&self) -> usize {
        self.image_exposed_events + self.image_inttime_events
    }

    /// Renders the plain-text run report.
    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Number of log lines read: {}", self.lines_read);
        let _ = writeln!(out, "Number of log lines removed: {}", self.lines_removed());
        let _ = writeln!(out, "Number of log lines parsed: {}", self.lines_parsed);
        let _ = writeln!(
            out,
            "Number of AO correction instance log lines parsed: {}",
            self.force_init_events
        );
        let _ = writeln!(
            out,
            "Number of force re-distribution instance log lines parsed: {}",
            self.force_lines()
        );
        let _ = writeln!(
            out,
            "Number of image obtention instance log lines parsed: {}",
            self.image_lines()
        );
        let _ = writeln!(
            out,
            "Number of telemetry log lines parsed: {}",
            self.telemetry_events
        );
        let _ = writeln!(
            out,
            "Expected lines lost (force/exposure/inttime): {}/{}/{}",
            self.lost_force_markers, self.lost_exposure_markers, self.lost_inttime_markers
        );
        let _ = writeln!(
            out,
            "Records dropped by validation (images/forces/corrections): {}/{}/{}",
            self.images_dropped, self.forces_dropped, self.corrections_dropped
        );
        for (name, elapsed) in &self.stages {
            let _ = writeln!(out, "Stage {}: {:.3}s", name, elapsed.as_secs_f64());
        }
        out
    }
}
