use anyhow::Result;
use arrow_array::cast::AsArray;
use arrow_array::types::Int64Type;
use arrow_array::Array;
use async_trait::async_trait;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use std::fs::File;
use std::sync::Arc;
use tempfile::tempdir;

use spaces_scraper::config::Config;
use spaces_scraper::models::{SpaceDetail, SpacePage, SpaceSummary};
use spaces_scraper::pipeline::HarvestPipeline;
use spaces_scraper::ports::{SpaceDetailSource, SpaceDirectory};
use spaces_scraper::sink::ParquetSink;

/// Single-page directory with three spaces.
struct FixtureDirectory;

#[async_trait]
impl SpaceDirectory for FixtureDirectory {
    async fn page(&self, _cursor: Option<&str>) -> spaces_scraper::Result<SpacePage> {
        Ok(SpacePage {
            spaces: ["someone/full", "someone/bare", "someone/custom"]
                .iter()
                .map(|id| SpaceSummary { id: id.to_string() })
                .collect(),
            next: None,
        })
    }
}

/// Detail records exercising the three interesting shapes: fully populated,
/// bare (no runtime, no card data, no siblings), and custom-domain carrying.
struct FixtureDetails;

#[async_trait]
impl SpaceDetailSource for FixtureDetails {
    async fn space_info(&self, id: &str) -> spaces_scraper::Result<SpaceDetail> {
        let value = match id {
            "someone/full" => json!({
                "id": id,
                "author": "someone",
                "createdAt": "2023-04-01T10:00:00Z",
                "lastModified": "2023-05-01T12:30:00Z",
                "subdomain": "someone-full",
                "host": "someone-full.hf.space",
                "likes": 12,
                "sdk": "gradio",
                "tags": ["gradio"],
                "runtime": {
                    "stage": "RUNNING",
                    "hardware": {"current": "cpu-basic"},
                    "devMode": false
                },
                "siblings": [
                    {"rfilename": "README.md", "size": 512},
                    {"rfilename": "app.py", "size": 100}
                ],
                "cardData": {
                    "license": "mit",
                    "emoji": "🚀",
                    "colorFrom": "red",
                    "colorTo": "blue",
                    "pinned": true
                }
            }),
            "someone/custom" => json!({
                "id": id,
                "likes": 1,
                "runtime": {
                    "stage": "RUNNING",
                    "hardware": "cpu-basic",
                    "domains": [
                        {"domain": "a.com", "isCustom": true},
                        {"domain": "b.hf.space", "isCustom": false}
                    ]
                }
            }),
            _ => json!({ "id": id }),
        };
        Ok(serde_json::from_value(value)?)
    }
}

#[tokio::test]
async fn full_run_writes_normalized_parquet() -> Result<()> {
    let dir = tempdir()?;
    let output = dir.path().join("spaces.parquet");

    let mut config = Config::default();
    config.max_items = 10;
    config.output_path = output.to_str().unwrap().to_string();

    let pipeline = HarvestPipeline::new(
        Arc::new(FixtureDirectory),
        Arc::new(FixtureDetails),
        Box::new(ParquetSink),
        None,
        config,
    );

    let summary = pipeline.run().await?;
    assert_eq!(summary.listed, 3);
    assert_eq!(summary.harvested, 3);
    assert_eq!(summary.skipped, 0);

    let file = File::open(&output)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Vec<_> = reader.collect::<std::result::Result<_, _>>()?;
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 23);

    // rows come out in listing order
    let ids = batch.column(0).as_string::<i32>();
    assert_eq!(ids.value(0), "someone/full");
    assert_eq!(ids.value(1), "someone/bare");
    assert_eq!(ids.value(2), "someone/custom");

    // readme_size only where a README.md sibling exists
    let readme_sizes = batch.column(9).as_primitive::<Int64Type>();
    assert_eq!(readme_sizes.value(0), 512);
    assert!(readme_sizes.is_null(1));
    assert!(readme_sizes.is_null(2));

    // card group: populated for the full record, all-null for the bare one
    let licenses = batch.column(11).as_string::<i32>();
    assert_eq!(licenses.value(0), "mit");
    assert!(licenses.is_null(1));
    let pinned = batch.column(18).as_boolean();
    assert!(pinned.value(0));
    assert!(pinned.is_null(1));

    // custom_domains: null without a domains structure, filtered otherwise
    let custom_domains = batch.column(22).as_list::<i32>();
    assert!(custom_domains.is_null(0));
    assert!(custom_domains.is_null(1));
    let row = custom_domains.value(2);
    let row = row.as_string::<i32>();
    assert_eq!(row.len(), 1);
    assert_eq!(row.value(0), "a.com");

    // runtime passthroughs
    let stages = batch.column(19).as_string::<i32>();
    assert_eq!(stages.value(0), "RUNNING");
    assert!(stages.is_null(1));
    let hardware = batch.column(20).as_string::<i32>();
    assert_eq!(hardware.value(0), "cpu-basic");

    Ok(())
}
