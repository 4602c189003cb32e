// crates/ecommerce-analytics-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input file {} does not exist", path.display())]
    MissingInput { path: PathBuf },

    #[error("no order file found for month {month} of year {year}")]
    NoData { year: i32, month: u32 },

    #[error("{entity}: column '{column}' could not be coerced to its declared type: {source}")]
    Coercion {
        entity: &'static str,
        column: &'static str,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("{entity}: expected column '{column}' is missing from the input header")]
    MissingColumn {
        entity: &'static str,
        column: &'static str,
    },

    #[error("{entity}: header '{column}' appears more than once after lower-casing")]
    DuplicateColumn {
        entity: &'static str,
        column: String,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Config parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
