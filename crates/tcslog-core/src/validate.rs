use std::collections::HashSet;

use chrono::NaiveTime;
use tracing::info;

use crate::config::PipelineConfig;
use crate::model::{CorrectionRecord, ForceDistributionRecord, ImageRecord};
use crate::report::RunTelemetry;

/// Drops images whose identifier was never resolved, then sorts by
/// exposition start.
pub fn validate_images(
    images: Vec<ImageRecord>,
    telemetry: &mut RunTelemetry,
) -> Vec<ImageRecord> {
    let before = images.len();
    let mut kept: Vec<ImageRecord> = images.into_iter().filter(|img| img.id.is_some()).collect();
    telemetry.images_dropped += before - kept.len();
    kept.sort_by_key(|img| (img.exposition_start, img.ordinal));
    info!(kept = kept.len(), dropped = before - kept.len(), "images validated");
    kept
}

/// Keeps force records that are complete (a full force vector) and bracketed
/// by an adjacent pair of validated image times. Each image time brackets at
/// most one record: both times of a consumed pair leave the candidate pool.
pub fn validate_forces(
    forces: Vec<ForceDistributionRecord>,
    images: &[ImageRecord],
    config: &PipelineConfig,
    telemetry: &mut RunTelemetry,
) -> Vec<ForceDistributionRecord> {
    let before = forces.len();
    let mut pool: Vec<NaiveTime> = images.iter().map(|img| img.exposition_start).collect();
    let mut kept = Vec::new();

    for record in forces {
        if record.forces.len() != config.force_vector_len {
            telemetry.forces_dropped += 1;
            continue;
        }
        match bracketing_pair(&pool, record.timestamp) {
            Some(index) => {
                pool.remove(index + 1);
                pool.remove(index);
                kept.push(record);
            }
            None => telemetry.forces_dropped += 1,
        }
    }

    kept.sort_by_key(|record| record.timestamp);
    info!(kept = kept.len(), dropped = before - kept.len(), "force distributions validated");
    kept
}

/// Drops corrections whose announced force id never materialized as a
/// validated force record, then sorts by timestamp.
pub fn validate_corrections(
    corrections: Vec<CorrectionRecord>,
    forces: &[ForceDistributionRecord],
    telemetry: &mut RunTelemetry,
) -> Vec<CorrectionRecord> {
    let before = corrections.len();
    let force_ids: HashSet<i64> = forces.iter().map(|record| record.id).collect();
    let mut kept: Vec<CorrectionRecord> = corrections
        .into_iter()
        .filter(|corr| corr.id_f_dist_new.is_some_and(|id| force_ids.contains(&id)))
        .collect();
    telemetry.corrections_dropped += before - kept.len();
    kept.sort_by_key(|corr| (corr.timestamp, corr.ordinal));
    info!(kept = kept.len(), dropped = before - kept.len(), "corrections validated");
    kept
}

/// First adjacent pool pair strictly straddling the timestamp.
fn bracketing_pair(pool: &[NaiveTime], timestamp: NaiveTime) -> Option<usize> {
    (0..pool.len().saturating_sub(1))
        .find(|&index| pool[index] < timestamp && timestamp < pool[index + 1])
}
