use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::{PipelineConfig, FLOAT_SENTINEL, INT_SENTINEL};
use crate::model::{
    AdditionalDataRecord, CorrectionRecord, Event, ForceDistributionRecord, ImageRecord,
    NightEntities, ValueKind,
};
use crate::report::RunTelemetry;

// Lexical shape of a numeric telemetry value.
static NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-*[0-9]+[.0-9]*$").expect("numeric pattern compiles"));

/// Builds the four entity collections from the flat event sequence.
///
/// The builder keeps one explicit cursor per stateful category: the currently
/// open force record and the currently open (incomplete) image record. All
/// transitions are by event; collection lengths are never used to infer state.
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entities: NightEntities,
    open_force: Option<usize>,
    open_image: Option<usize>,
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &Event, config: &PipelineConfig, telemetry: &mut RunTelemetry) {
        match event {
            Event::ForceId { time, id, .. } => self.open_force(*id, *time, config),
            Event::ForceDistribution { values, .. } => {
                self.append_forces(values, config, telemetry)
            }
            Event::ForceInit { time, id } => self.emit_correction(*time, *id),
            Event::ImageIntTime { time, seconds } => self.open_image(*time, *seconds),
            Event::ImageExposed { time, label, id } => {
                self.resolve_exposure(*time, label, *id, config, telemetry)
            }
            Event::Telemetry {
                time,
                group,
                label,
                value,
            } => self.append_additional(*time, group, label, value),
        }
    }

    pub fn finish(self) -> NightEntities {
        self.entities
    }

    /// A force-id header always opens a fresh record and repoints the cursor;
    /// the previous record, complete or not, is closed as-is.
    fn open_force(&mut self, id: i64, time: chrono::NaiveTime, config: &PipelineConfig) {
        self.entities
            .force_distributions
            .push(ForceDistributionRecord {
                id,
                timestamp: time,
                forces: Vec::with_capacity(config.force_vector_len),
            });
        self.open_force = Some(self.entities.force_distributions.len() - 1);
    }

    /// Appends one 25-value slice at the offset implied by the values already
    /// present. A slice with no open record, or one that would overflow the
    /// vector, is dropped and counted.
    fn append_forces(
        &mut self,
        values: &[f64],
        config: &PipelineConfig,
        telemetry: &mut RunTelemetry,
    ) {
        let Some(index) = self.open_force else {
            telemetry.orphan_force_slices += 1;
            debug!("force slice with no open record dropped");
            return;
        };
        let record = &mut self.entities.force_distributions[index];
        if record.forces.len() + values.len() > config.force_vector_len {
            telemetry.orphan_force_slices += 1;
            debug!(
                id = record.id,
                have = record.forces.len(),
                "force slice overflowing record dropped"
            );
            return;
        }
        record.forces.extend_from_slice(values);
    }

    fn emit_correction(&mut self, time: chrono::NaiveTime, id: i64) {
        let ordinal = self.entities.corrections.len() as i64;
        self.entities.corrections.push(CorrectionRecord {
            ordinal,
            timestamp: time,
            id_f_dist_old: None,
            id_f_dist_new: Some(id),
            id_img_old: None,
            id_img_new: None,
        });
    }

    /// An integration-time marker opens an image with its identifier still
    /// unknown; the readout interval spans the announced integration time.
    fn open_image(&mut self, time: chrono::NaiveTime, seconds: i64) {
        let ordinal = self.entities.images.len() as i64;
        self.entities.images.push(ImageRecord {
            ordinal,
            id: None,
            exposition_start: time,
            integration_time: Some(seconds),
            readout_start: time,
            readout_stop: time + Duration::seconds(seconds),
            ccd: None,
            img_path: None,
        });
        self.open_image = Some(self.entities.images.len() - 1);
    }

    /// An exposure marker completes the open image when it lands within the
    /// completion tolerance of its exposition start; otherwise it is dropped.
    /// With no open image it creates a standalone record at its own time.
    fn resolve_exposure(
        &mut self,
        time: chrono::NaiveTime,
        label: &str,
        id: i64,
        config: &PipelineConfig,
        telemetry: &mut RunTelemetry,
    ) {
        if let Some(index) = self.open_image {
            let record = &mut self.entities.images[index];
            let start = record.exposition_start;
            if start <= time && time <= start + config.completion_tolerance {
                record.id = Some(id);
                record.ccd = Some(label.to_string());
                self.open_image = None;
            } else {
                telemetry.exposed_out_of_tolerance += 1;
                debug!(
                    id,
                    label, "exposure marker outside completion tolerance dropped"
                );
            }
            return;
        }

        let ordinal = self.entities.images.len() as i64;
        self.entities.images.push(ImageRecord {
            ordinal,
            id: Some(id),
            exposition_start: time,
            integration_time: None,
            readout_start: time,
            readout_stop: time,
            ccd: Some(label.to_string()),
            img_path: None,
        });
    }

    fn append_additional(
        &mut self,
        time: chrono::NaiveTime,
        group: &str,
        label: &str,
        value: &str,
    ) {
        let kind = if NUMERIC_RE.is_match(value) {
            if value.contains('.') {
                ValueKind::Float
            } else {
                ValueKind::Int
            }
        } else {
            ValueKind::Str
        };

        let parsed = value.parse::<f64>();
        let value_float = *parsed.as_ref().unwrap_or(&FLOAT_SENTINEL);
        let value_int = parsed.map(|v| v.floor() as i64).unwrap_or(INT_SENTINEL);

        let ordinal = self.entities.additional.len() as i64;
        self.entities.additional.push(AdditionalDataRecord {
            ordinal,
            timestamp: time,
            group: group.to_string(),
            label: label.to_string(),
            kind,
            value_str: value.to_string(),
            value_float,
            value_int,
        });
    }
}

/// Runs the builder over a complete event sequence. Processing is
/// deterministic: the same sequence always yields the same collections.
pub fn reconstruct_entities(
    events: &[Event],
    config: &PipelineConfig,
    telemetry: &mut RunTelemetry,
) -> NightEntities {
    let mut builder = EntityBuilder::new();
    for event in events {
        builder.apply(event, config, telemetry);
    }
    builder.finish()
}
