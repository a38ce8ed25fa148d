use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;
use crate::models::{SpaceDetail, SpacePage};
use crate::normalize::SpaceRecord;

/// Paginated upstream enumeration of space ids. Lazy (one page per call) and
/// restartable by passing `None` again; no upper bound is enforced here, the
/// orchestrator decides how many items to pull.
#[async_trait]
pub trait SpaceDirectory: Send + Sync {
    async fn page(&self, cursor: Option<&str>) -> Result<SpacePage>;
}

/// Detail lookup for a single space id. Fails when the id does not resolve.
#[async_trait]
pub trait SpaceDetailSource: Send + Sync {
    async fn space_info(&self, id: &str) -> Result<SpaceDetail>;
}

/// Persists one full run of normalized records as a columnar file. Called
/// exactly once per run, over the whole accumulated collection.
pub trait RecordSink: Send + Sync {
    fn persist(&self, records: &[SpaceRecord], path: &Path) -> Result<()>;
}

/// Uploads a finished output file to a remote dataset store.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, path: &Path) -> Result<()>;
}
