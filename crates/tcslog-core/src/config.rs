use chrono::Duration;

/// Written to `value_int` when a telemetry value has no integer form.
pub const INT_SENTINEL: i64 = -9999999;
/// Written to `value_float` when a telemetry value has no float form.
pub const FLOAT_SENTINEL: f64 = -9999999.0;
/// Placeholder identifier for a correction with no earlier neighbor.
pub const NO_EARLIER_ID: i64 = -1;

/// Tunable constants of the reconstruction pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Seconds subtracted from an observation start when opening its window.
    pub lower_margin: Duration,
    /// Seconds added past an observation's end when closing its window.
    pub upper_margin: Duration,
    /// Windows closer than this are merged into one.
    pub join_threshold: Duration,
    /// How long after exposition start an exposure marker may still
    /// complete the open image record.
    pub completion_tolerance: Duration,
    /// Actuator count of a complete force vector.
    pub force_vector_len: usize,
    /// Values contributed by a single force distribution line.
    pub force_slice_len: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lower_margin: Duration::seconds(10),
            upper_margin: Duration::seconds(10),
            join_threshold: Duration::seconds(30),
            completion_tolerance: Duration::seconds(2),
            force_vector_len: 150,
            force_slice_len: 25,
        }
    }
}
