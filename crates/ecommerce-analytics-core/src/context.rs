use crate::config::PipelineConfig;
use crate::store::PartitionedStore;

/// Everything a job needs besides its date; built once per invocation.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub store: PartitionedStore,
    pub missing_text: String,
}

impl JobContext {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            store: PartitionedStore::from_config(config),
            missing_text: config.missing_text.clone(),
        }
    }
}

impl Default for JobContext {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}
