use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::models::SpaceSummary;
use crate::normalize::normalize;
use crate::ports::{Publisher, RecordSink, SpaceDetailSource, SpaceDirectory};

/// Result of a complete harvest run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub listed: usize,
    pub harvested: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    pub output_file: String,
}

/// Sequential orchestration loop: enumerate ids, fetch each detail record,
/// normalize, accumulate, then persist the whole run once. Strictly one item
/// at a time, no overlap between fetch and normalization.
pub struct HarvestPipeline {
    directory: Arc<dyn SpaceDirectory>,
    details: Arc<dyn SpaceDetailSource>,
    sink: Box<dyn RecordSink>,
    publisher: Option<Box<dyn Publisher>>,
    config: Config,
}

impl HarvestPipeline {
    pub fn new(
        directory: Arc<dyn SpaceDirectory>,
        details: Arc<dyn SpaceDetailSource>,
        sink: Box<dyn RecordSink>,
        publisher: Option<Box<dyn Publisher>>,
        config: Config,
    ) -> Self {
        Self {
            directory,
            details,
            sink,
            publisher,
            config,
        }
    }

    /// Pull directory pages until `max_items` ids are collected or the listing
    /// is exhausted.
    async fn enumerate(&self, max_items: usize) -> Result<Vec<SpaceSummary>> {
        let mut spaces = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.directory.page(cursor.as_deref()).await?;
            let page_len = page.spaces.len();
            spaces.extend(page.spaces);
            if spaces.len() >= max_items {
                spaces.truncate(max_items);
                break;
            }
            match page.next {
                Some(next) if page_len > 0 => cursor = Some(next),
                _ => break,
            }
        }
        Ok(spaces)
    }

    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();

        let summaries = self.enumerate(self.config.max_items).await?;
        info!(listed = summaries.len(), "directory enumeration complete");

        let mut records = Vec::with_capacity(summaries.len());
        let mut skipped = 0usize;
        let mut errors = Vec::new();
        for (index, space) in summaries.iter().enumerate() {
            if self.config.delay_ms > 0 && index > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }
            match self.details.space_info(&space.id).await {
                Ok(detail) => records.push(normalize(&detail)),
                Err(e) if self.config.skip_failed_lookups => {
                    warn!(space = %space.id, error = %e, "detail lookup failed, skipping");
                    errors.push(format!("{}: {}", space.id, e));
                    skipped += 1;
                }
                Err(e) => {
                    error!(space = %space.id, error = %e, "detail lookup failed, aborting run");
                    return Err(e);
                }
            }
        }

        let path = Path::new(&self.config.output_path);
        self.sink.persist(&records, path)?;

        if let Some(publisher) = &self.publisher {
            publisher.publish(path).await?;
        }

        info!(
            harvested = records.len(),
            skipped,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "harvest run complete"
        );

        Ok(RunSummary {
            listed: summaries.len(),
            harvested: records.len(),
            skipped,
            errors,
            output_file: self.config.output_path.clone(),
        })
    }
}
