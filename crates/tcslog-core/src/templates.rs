use regex::Regex;
use serde::Deserialize;

use crate::errors::TemplateError;

// Highest capture index each category's consumer reads.
const FORCE_DISTRIBUTION_CAPTURES: usize = 6;
const FORCE_ID_CAPTURES: usize = 5;
const FORCE_INIT_CAPTURES: usize = 5;
const EXPOSURE_COUNT_CAPTURES: usize = 5;
const INTEGRATION_TIME_CAPTURES: usize = 5;
const TELEMETRY_CAPTURES: usize = 6;

const DEFAULT_FORCE_DISTRIBUTION: &str = r"(([A-Za-z]{3} \d+) (\d{2}:\d{2}:\d{2}(?:\.\d+)?))> (\S+) SetGlb(Abs|Rel) Forces: ((?:-?\d+(?:\.\d+)? ?){25})";
const DEFAULT_FORCE_ID: &str = r"(([A-Za-z]{3} \d+) (\d{2}:\d{2}:\d{2}(?:\.\d+)?))> (\S+) SetGlb(?:Abs|Rel) Executed cmd #(-?\d+)";
const DEFAULT_FORCE_INIT: &str = r"(([A-Za-z]{3} \d+) (\d{2}:\d{2}:\d{2}(?:\.\d+)?))> (\S+) SetGlb(?:Abs|Rel) Received cmd #(-?\d+)";
const DEFAULT_EXPOSURE_COUNT: &str =
    r"[A-Za-z]{3} \d+ ((\d{2}:\d{2}:\d{2})(?:\.\d+)?)> \S+ (DET )?EXP NO = (\d+) \((\w+)\)";
const DEFAULT_INTEGRATION_TIME: &str =
    r"[A-Za-z]{3} \d+ ((\d{2}:\d{2}:\d{2})(?:\.\d+)?)> TEL (ACTO) (INTTIME) = (\d+)";
const DEFAULT_TELEMETRY: &[&str] = &[
    r"[A-Za-z]{3} \d+ ((\d{2}:\d{2}:\d{2})(?:\.\d+)?)> TEL( |\.)(\w+) (\w+) = (\S+)",
    r"[A-Za-z]{3} \d+ ((\d{2}:\d{2}:\d{2})(?:\.\d+)?)> TEL( |\.)(\w+) ([\w.]+) (\S+)$",
    r"[A-Za-z]{3} \d+ ((\d{2}:\d{2}:\d{2})(?:\.\d+)?)> TEL( |\.)(\w+) ([\w.]+) (.+)$",
];

/// Raw template patterns as they appear in a template TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTemplates {
    pub force_distribution: String,
    pub force_id: String,
    pub force_init: String,
    pub exposure_count: String,
    pub integration_time: String,
    pub telemetry: Vec<String>,
}

impl RawTemplates {
    pub fn builtin() -> Self {
        Self {
            force_distribution: DEFAULT_FORCE_DISTRIBUTION.to_string(),
            force_id: DEFAULT_FORCE_ID.to_string(),
            force_init: DEFAULT_FORCE_INIT.to_string(),
            exposure_count: DEFAULT_EXPOSURE_COUNT.to_string(),
            integration_time: DEFAULT_INTEGRATION_TIME.to_string(),
            telemetry: DEFAULT_TELEMETRY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Compiled extraction templates, one per event category plus the ordered
/// generic telemetry list. Capture-group counts are validated at load time
/// against the indices each category consumer reads.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub(crate) force_distribution: Regex,
    pub(crate) force_id: Regex,
    pub(crate) force_init: Regex,
    pub(crate) exposure_count: Regex,
    pub(crate) integration_time: Regex,
    pub(crate) telemetry: Vec<Regex>,
}

impl TemplateSet {
    /// The compiled-in default templates.
    pub fn builtin() -> Self {
        // The defaults are fixed strings validated by tests.
        Self::from_raw(&RawTemplates::builtin()).expect("built-in templates are valid")
    }

    /// Loads a template set from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, TemplateError> {
        let raw: RawTemplates = toml::from_str(content)?;
        Self::from_raw(&raw)
    }

    pub fn from_raw(raw: &RawTemplates) -> Result<Self, TemplateError> {
        if raw.telemetry.is_empty() {
            return Err(TemplateError::EmptyList {
                category: "telemetry",
            });
        }

        let telemetry = raw
            .telemetry
            .iter()
            .map(|pattern| compile("telemetry", pattern, TELEMETRY_CAPTURES))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            force_distribution: compile(
                "force_distribution",
                &raw.force_distribution,
                FORCE_DISTRIBUTION_CAPTURES,
            )?,
            force_id: compile("force_id", &raw.force_id, FORCE_ID_CAPTURES)?,
            force_init: compile("force_init", &raw.force_init, FORCE_INIT_CAPTURES)?,
            exposure_count: compile(
                "exposure_count",
                &raw.exposure_count,
                EXPOSURE_COUNT_CAPTURES,
            )?,
            integration_time: compile(
                "integration_time",
                &raw.integration_time,
                INTEGRATION_TIME_CAPTURES,
            )?,
            telemetry,
        })
    }
}

fn compile(
    category: &'static str,
    pattern: &str,
    required: usize,
) -> Result<Regex, TemplateError> {
    let regex = Regex::new(pattern).map_err(|source| TemplateError::Compile { category, source })?;
    // captures_len counts group 0.
    let found = regex.captures_len() - 1;
    if found < required {
        return Err(TemplateError::CaptureCount {
            category,
            found,
            required,
        });
    }
    Ok(regex)
}
