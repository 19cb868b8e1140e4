use chrono::NaiveDateTime;

use crate::errors::{PipelineError, Result};
use crate::model::ObsRow;

const INSTRUMENT_COLUMN: &str = "Instrument";
const TPL_START_COLUMN: &str = "TPL START";
const EXPTIME_COLUMN: &str = "EXPTIME";

const TPL_START_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Reads the observation metadata table, keeping the three consumed columns.
///
/// Rows with an empty start timestamp are scheduling placeholders and are
/// skipped; the instrument code is truncated at its first underscore.
pub fn parse_observation_table(content: &str) -> Result<Vec<ObsRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let instrument_index = find_column(&headers, INSTRUMENT_COLUMN)?;
    let tpl_start_index = find_column(&headers, TPL_START_COLUMN)?;
    let exptime_index = find_column(&headers, EXPTIME_COLUMN)?;

    let mut rows = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let record = record?;
        // 1-based, counting the header row.
        let row_index = offset + 2;

        let tpl_start_raw = match record.get(tpl_start_index).map(str::trim) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };
        let tpl_start =
            NaiveDateTime::parse_from_str(tpl_start_raw, TPL_START_FORMAT).map_err(|err| {
                PipelineError::ObsRow {
                    row_index,
                    message: format!("invalid {TPL_START_COLUMN} '{tpl_start_raw}': {err}"),
                }
            })?;

        let instrument_raw = record.get(instrument_index).unwrap_or_default().trim();
        let instrument = instrument_raw
            .split('_')
            .next()
            .unwrap_or(instrument_raw)
            .to_string();

        let exptime_raw = record.get(exptime_index).unwrap_or_default().trim();
        let exptime_seconds = exptime_raw
            .parse::<f64>()
            .map_err(|err| PipelineError::ObsRow {
                row_index,
                message: format!("invalid {EXPTIME_COLUMN} '{exptime_raw}': {err}"),
            })?;

        rows.push(ObsRow {
            instrument,
            tpl_start,
            exptime_seconds,
        });
    }

    Ok(rows)
}

fn find_column(headers: &csv::StringRecord, column: &'static str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == column)
        .ok_or(PipelineError::ObsColumnMissing { column })
}
