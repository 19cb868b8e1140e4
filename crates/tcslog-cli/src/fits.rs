use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use tcslog_core::ImageHeader;

const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;
// Primary headers of these files fit in a handful of blocks.
const MAX_HEADER_BLOCKS: usize = 64;

const EXPTIME_KEY: &str = "EXPTIME";
const EXP_NO_KEY: &str = "HIERARCH ESO DET EXP NO";

/// Reads the exposure-time and exposure-number cards from the primary header
/// of every FITS file in `dir`. Unreadable or non-FITS files are skipped.
pub fn scan_image_folder(dir: &Path) -> Result<Vec<ImageHeader>> {
    let mut headers = Vec::new();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read image folder {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        match read_primary_header(&path) {
            Ok(Some((exposure_time, exposure_number))) => headers.push(ImageHeader {
                file_name: file_name.to_string(),
                exposure_number,
                exposure_time,
            }),
            Ok(None) => debug!(file = file_name, "not a usable FITS header, skipped"),
            Err(err) => warn!(file = file_name, error = %err, "image file unreadable, skipped"),
        }
    }

    Ok(headers)
}

/// Scans 80-byte ASCII cards of the primary header up to the END card.
/// Returns the (EXPTIME, EXP NO) pair, or None when either card is absent.
fn read_primary_header(path: &Path) -> Result<Option<(i64, i64)>> {
    let mut file = File::open(path)?;

    let mut exposure_time = None;
    let mut exposure_number = None;
    let mut block = [0u8; BLOCK_SIZE];
    let mut first = true;

    'blocks: for _ in 0..MAX_HEADER_BLOCKS {
        if file.read_exact(&mut block).is_err() {
            break;
        }
        if first {
            if !block.starts_with(b"SIMPLE") {
                return Ok(None);
            }
            first = false;
        }
        for raw_card in block.chunks(CARD_SIZE) {
            let card = String::from_utf8_lossy(raw_card);
            if card.starts_with("END") {
                break 'blocks;
            }
            if let Some(value) = card_value(&card, EXPTIME_KEY) {
                exposure_time = value.parse::<f64>().ok().map(|v| v.round() as i64);
            } else if let Some(value) = card_value(&card, EXP_NO_KEY) {
                exposure_number = value.parse::<f64>().ok().map(|v| v as i64);
            }
        }
    }

    Ok(exposure_time.zip(exposure_number))
}

/// The value text of a card carrying `keyword`, with any trailing comment
/// stripped.
fn card_value<'a>(card: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = card.strip_prefix(keyword)?;
    if !rest.starts_with(' ') && !rest.starts_with('=') {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('=')?;
    let value = rest.split('/').next().unwrap_or(rest);
    Some(value.trim().trim_matches('\''))
}
