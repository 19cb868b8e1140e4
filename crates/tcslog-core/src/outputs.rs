use std::fs::File;
use std::path::Path;

use chrono::NaiveTime;
use polars::prelude::*;

use crate::errors::Result;
use crate::model::NightEntities;

pub const CORRECTIONS_FILE: &str = "df_corrections.csv";
pub const FORCE_DIST_FILE: &str = "df_f_dist.csv";
pub const IMAGES_FILE: &str = "df_images.csv";
pub const ADDITIONAL_DATA_FILE: &str = "df_additional_data.csv";

/// The four exportable entity tables of one night.
#[derive(Debug, Clone)]
pub struct NightFrames {
    pub corrections: DataFrame,
    pub force_distributions: DataFrame,
    pub images: DataFrame,
    pub additional: DataFrame,
}

/// Converts the validated entity collections into DataFrames. Times
/// serialize as `HH:MM:SS` strings; the force vector as one space-separated
/// string column.
pub fn build_frames(entities: &NightEntities) -> Result<NightFrames> {
    Ok(NightFrames {
        corrections: corrections_frame(entities)?,
        force_distributions: force_distributions_frame(entities)?,
        images: images_frame(entities)?,
        additional: additional_frame(entities)?,
    })
}

/// Writes the four tables as CSV files into `dir`.
pub fn save_frames(frames: &NightFrames, dir: &Path) -> Result<()> {
    write_csv(&frames.corrections, &dir.join(CORRECTIONS_FILE))?;
    write_csv(&frames.force_distributions, &dir.join(FORCE_DIST_FILE))?;
    write_csv(&frames.images, &dir.join(IMAGES_FILE))?;
    write_csv(&frames.additional, &dir.join(ADDITIONAL_DATA_FILE))?;
    Ok(())
}

pub fn print_frames(frames: &NightFrames) {
    println!("{}", frames.force_distributions);
    println!("{}", frames.additional);
    println!("{}", frames.corrections);
    println!("{}", frames.images);
}

fn write_csv(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut frame = frame.clone();
    CsvWriter::new(&mut file).finish(&mut frame)?;
    Ok(())
}

fn corrections_frame(entities: &NightEntities) -> Result<DataFrame> {
    let rows = &entities.corrections;
    let frame = DataFrame::new(vec![
        Series::new(
            "id_corr".into(),
            rows.iter().map(|c| c.ordinal).collect::<Vec<i64>>(),
        )
        .into(),
        time_column("timestamp", rows.iter().map(|c| c.timestamp)),
        Series::new(
            "id_f_dist_old".into(),
            rows.iter().map(|c| c.id_f_dist_old).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "id_f_dist_new".into(),
            rows.iter().map(|c| c.id_f_dist_new).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "id_img_old".into(),
            rows.iter().map(|c| c.id_img_old).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            "id_img_new".into(),
            rows.iter().map(|c| c.id_img_new).collect::<Vec<_>>(),
        )
        .into(),
    ])?;
    Ok(frame)
}

fn force_distributions_frame(entities: &NightEntities) -> Result<DataFrame> {
    let rows = &entities.force_distributions;
    let forces: Vec<String> = rows
        .iter()
        .map(|record| {
            record
                .forces
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    let frame = DataFrame::new(vec![
        Series::new(
            "id_f_dist".into(),
            rows.iter().map(|record| record.id).collect::<Vec<i64>>(),
        )
        .into(),
        Series::new("forces".into(), forces).into(),
        time_column("timestamp", rows.iter().map(|record| record.timestamp)),
    ])?;
    Ok(frame)
}

fn images_frame(entities: &NightEntities) -> Result<DataFrame> {
    let rows = &entities.images;
    let ccd: Vec<Option<&str>> = rows.iter().map(|img| img.ccd.as_deref()).collect();
    let img_path: Vec<Option<&str>> = rows.iter().map(|img| img.img_path.as_deref()).collect();
    let frame = DataFrame::new(vec![
        Series::new(
            "id_image".into(),
            rows.iter().map(|img| img.ordinal).collect::<Vec<i64>>(),
        )
        .into(),
        Series::new(
            "id_img".into(),
            rows.iter().map(|img| img.id).collect::<Vec<_>>(),
        )
        .into(),
        time_column(
            "exposition_start",
            rows.iter().map(|img| img.exposition_start),
        ),
        Series::new(
            "integration_time".into(),
            rows.iter().map(|img| img.integration_time).collect::<Vec<_>>(),
        )
        .into(),
        time_column("readout_start", rows.iter().map(|img| img.readout_start)),
        time_column("readout_stop", rows.iter().map(|img| img.readout_stop)),
        Series::new("ccd".into(), ccd).into(),
        Series::new("img_path".into(), img_path).into(),
    ])?;
    Ok(frame)
}

fn additional_frame(entities: &NightEntities) -> Result<DataFrame> {
    let rows = &entities.additional;
    let groups: Vec<&str> = rows.iter().map(|row| row.group.as_str()).collect();
    let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
    let kinds: Vec<&str> = rows.iter().map(|row| row.kind.as_str()).collect();
    let values: Vec<&str> = rows.iter().map(|row| row.value_str.as_str()).collect();
    let frame = DataFrame::new(vec![
        Series::new(
            "id_addt_data".into(),
            rows.iter().map(|row| row.ordinal).collect::<Vec<i64>>(),
        )
        .into(),
        time_column("timestamp", rows.iter().map(|row| row.timestamp)),
        Series::new("group".into(), groups).into(),
        Series::new("label".into(), labels).into(),
        Series::new("type".into(), kinds).into(),
        Series::new("value_str".into(), values).into(),
        Series::new(
            "value_float".into(),
            rows.iter().map(|row| row.value_float).collect::<Vec<f64>>(),
        )
        .into(),
        Series::new(
            "value_int".into(),
            rows.iter().map(|row| row.value_int).collect::<Vec<i64>>(),
        )
        .into(),
    ])?;
    Ok(frame)
}

fn time_column(name: &str, times: impl Iterator<Item = NaiveTime>) -> Column {
    let rendered: Vec<String> = times.map(|t| t.format("%H:%M:%S").to_string()).collect();
    Series::new(name.into(), rendered).into()
}
