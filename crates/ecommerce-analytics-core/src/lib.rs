pub mod cleaning;
pub mod config;
pub mod context;
pub mod enrichment;
pub mod error;
pub mod schema;
pub mod store;

pub use context::JobContext;
pub use error::{PipelineError, Result};
