use std::time::Instant;

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::extract::extract_events;
use crate::link::{link_corrections, LinkAttr};
use crate::model::{ImageHeader, ImageRecord, NightEntities};
use crate::normalize::normalize_lines;
use crate::obs::parse_observation_table;
use crate::reconstruct::reconstruct_entities;
use crate::report::RunTelemetry;
use crate::templates::TemplateSet;
use crate::validate::{validate_corrections, validate_forces, validate_images};
use crate::windows::{build_windows, filter_lines};

/// The validated, linked entity collections plus the run's telemetry.
#[derive(Debug)]
pub struct PipelineRun {
    pub entities: NightEntities,
    pub telemetry: RunTelemetry,
}

/// Runs the whole reconstruction pipeline over one night: normalization,
/// window building and filtering, event extraction, entity reconstruction,
/// validation, and temporal linking.
pub fn run_night(
    log_content: &str,
    obs_content: &str,
    night: NaiveDate,
    templates: &TemplateSet,
    config: &PipelineConfig,
) -> Result<PipelineRun> {
    let mut telemetry = RunTelemetry::new();

    let started = Instant::now();
    let lines = normalize_lines(log_content);
    telemetry.lines_read = lines.len();
    telemetry.finish_stage("normalize", started);
    info!(lines = lines.len(), "log lines normalized");

    let started = Instant::now();
    let obs_rows = parse_observation_table(obs_content)?;
    let windows = build_windows(&obs_rows, config);
    telemetry.finish_stage("windows", started);
    info!(
        observations = obs_rows.len(),
        instruments = windows.len(),
        "observation windows built"
    );

    let started = Instant::now();
    let sections = filter_lines(&lines, &windows, night, &mut telemetry);
    telemetry.finish_stage("filter", started);

    let started = Instant::now();
    let events = extract_events(&sections, templates, &mut telemetry);
    telemetry.finish_stage("extract", started);
    info!(events = events.len(), "events extracted");

    let started = Instant::now();
    let raw = reconstruct_entities(&events, config, &mut telemetry);
    telemetry.finish_stage("reconstruct", started);

    let started = Instant::now();
    let images = validate_images(raw.images, &mut telemetry);
    let force_distributions =
        validate_forces(raw.force_distributions, &images, config, &mut telemetry);
    let corrections = validate_corrections(raw.corrections, &force_distributions, &mut telemetry);
    telemetry.finish_stage("validate", started);

    let mut entities = NightEntities {
        corrections,
        force_distributions,
        images,
        additional: raw.additional,
    };

    let started = Instant::now();
    let force_targets: Vec<(NaiveTime, i64)> = entities
        .force_distributions
        .iter()
        .map(|record| (record.timestamp, record.id))
        .collect();
    link_corrections(
        &mut entities.corrections,
        &force_targets,
        LinkAttr::ForceDistribution,
    );

    let image_targets: Vec<(NaiveTime, i64)> = entities
        .images
        .iter()
        .filter_map(|img| img.id.map(|id| (img.exposition_start, id)))
        .collect();
    link_corrections(&mut entities.corrections, &image_targets, LinkAttr::Image);
    telemetry.finish_stage("link", started);

    Ok(PipelineRun {
        entities,
        telemetry,
    })
}

/// Resolves `img_path` on validated images from image-file header summaries.
/// A header matches the image with the same exposure number, but only when
/// the announced integration time agrees.
pub fn attach_image_paths(images: &mut [ImageRecord], headers: &[ImageHeader]) {
    for header in headers {
        let Some(image) = images
            .iter_mut()
            .find(|img| img.id == Some(header.exposure_number))
        else {
            continue;
        };
        if image.integration_time == Some(header.exposure_time) {
            image.img_path = Some(header.file_name.clone());
        } else {
            warn!(
                file = %header.file_name,
                exposure_number = header.exposure_number,
                "image file integration time disagrees with log, not linked"
            );
        }
    }
}
