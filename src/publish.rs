use async_trait::async_trait;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::ports::Publisher;

/// Publication stub. The hub dataset upload is not wired up yet; the port is
/// kept so the pipeline already drives the full harvest → persist → publish
/// sequence.
pub struct DatasetPublisher {
    dataset_id: String,
}

impl DatasetPublisher {
    pub fn new(dataset_id: &str) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
        }
    }
}

#[async_trait]
impl Publisher for DatasetPublisher {
    async fn publish(&self, path: &Path) -> Result<()> {
        info!(
            path = %path.display(),
            dataset = %self.dataset_id,
            "dataset upload not implemented yet, leaving file in place"
        );
        Ok(())
    }
}
