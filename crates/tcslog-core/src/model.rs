use chrono::{NaiveDateTime, NaiveTime};

/// A log line with its 1-based position in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub index: usize,
    pub text: String,
}

/// One consumed row of the observation metadata table.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsRow {
    pub instrument: String,
    pub tpl_start: NaiveDateTime,
    pub exptime_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn contains(&self, stamp: NaiveDateTime) -> bool {
        self.start <= stamp && stamp <= self.end
    }
}

/// Merged observation windows of one instrument, sorted ascending by start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentWindows {
    pub instrument: String,
    pub windows: Vec<TimeWindow>,
}

/// Lines retained for one instrument, in original file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentLines {
    pub instrument: String,
    pub lines: Vec<LogLine>,
}

/// A typed event extracted from a single retained line.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ForceId {
        date: String,
        time: NaiveTime,
        id: i64,
    },
    ForceDistribution {
        date: String,
        time: NaiveTime,
        values: Vec<f64>,
    },
    ForceInit {
        time: NaiveTime,
        id: i64,
    },
    ImageIntTime {
        time: NaiveTime,
        seconds: i64,
    },
    ImageExposed {
        time: NaiveTime,
        label: String,
        id: i64,
    },
    Telemetry {
        time: NaiveTime,
        group: String,
        label: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForceDistributionRecord {
    pub id: i64,
    pub timestamp: NaiveTime,
    pub forces: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Creation index, stable through validation.
    pub ordinal: i64,
    pub id: Option<i64>,
    pub exposition_start: NaiveTime,
    pub integration_time: Option<i64>,
    pub readout_start: NaiveTime,
    pub readout_stop: NaiveTime,
    pub ccd: Option<String>,
    pub img_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectionRecord {
    /// Creation index, stable through validation.
    pub ordinal: i64,
    pub timestamp: NaiveTime,
    pub id_f_dist_old: Option<i64>,
    pub id_f_dist_new: Option<i64>,
    pub id_img_old: Option<i64>,
    pub id_img_new: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Float,
    Str,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdditionalDataRecord {
    pub ordinal: i64,
    pub timestamp: NaiveTime,
    pub group: String,
    pub label: String,
    pub kind: ValueKind,
    pub value_str: String,
    pub value_float: f64,
    pub value_int: i64,
}

/// The four entity collections reconstructed from one night.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NightEntities {
    pub corrections: Vec<CorrectionRecord>,
    pub force_distributions: Vec<ForceDistributionRecord>,
    pub images: Vec<ImageRecord>,
    pub additional: Vec<AdditionalDataRecord>,
}

/// Exposure keywords read from one image file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    pub file_name: String,
    pub exposure_number: i64,
    pub exposure_time: i64,
}
