// crates/tcslog-core/src/errors.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("observation table is missing required column '{column}'")]
    ObsColumnMissing { column: &'static str },

    #[error("observation table row {row_index} invalid: {message}")]
    ObsRow { row_index: usize, message: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("{category} template failed to compile: {source}")]
    Compile {
        category: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("{category} template exposes {found} capture groups, needs at least {required}")]
    CaptureCount {
        category: &'static str,
        found: usize,
        required: usize,
    },

    #[error("{category} template list must not be empty")]
    EmptyList { category: &'static str },

    #[error("template file parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
