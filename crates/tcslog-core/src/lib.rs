pub mod config;
pub mod errors;
pub mod extract;
pub mod link;
pub mod model;
pub mod normalize;
pub mod obs;
pub mod outputs;
pub mod pipeline;
pub mod reconstruct;
pub mod report;
pub mod templates;
pub mod validate;
pub mod windows;

pub use config::PipelineConfig;
pub use errors::{PipelineError, Result, TemplateError};
pub use model::{
    AdditionalDataRecord, CorrectionRecord, Event, ForceDistributionRecord, ImageHeader,
    ImageRecord, NightEntities, ValueKind,
};
pub use outputs::{build_frames, print_frames, save_frames, NightFrames};
pub use pipeline::{attach_image_paths, run_night, PipelineRun};
pub use report::RunTelemetry;
pub use templates::{RawTemplates, TemplateSet};
