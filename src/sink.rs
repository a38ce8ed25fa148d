use arrow_array::builder::{ListBuilder, StringBuilder};
use arrow_array::{
    ArrayRef, BooleanArray, Int64Array, RecordBatch, StringArray, TimestampMillisecondArray,
};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::normalize::SpaceRecord;
use crate::ports::RecordSink;

fn utc_timestamp() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, Some("UTC".into()))
}

fn string_list() -> DataType {
    DataType::List(Arc::new(Field::new("item", DataType::Utf8, true)))
}

/// The fixed 23-column output schema. Column names keep the upstream spelling
/// (`colorFrom`, `colorTo`, `devMode`) so downstream consumers of the original
/// dataset keep working.
pub fn schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("author", DataType::Utf8, true),
        Field::new("created_at", utc_timestamp(), true),
        Field::new("last_modified", utc_timestamp(), true),
        Field::new("subdomain", DataType::Utf8, true),
        Field::new("host", DataType::Utf8, true),
        Field::new("likes", DataType::Int64, true),
        Field::new("sdk", DataType::Utf8, true),
        Field::new("tags", string_list(), true),
        Field::new("readme_size", DataType::Int64, true),
        Field::new("python_version", DataType::Utf8, true),
        Field::new("license", DataType::Utf8, true),
        Field::new("duplicated_from", DataType::Utf8, true),
        Field::new("models", string_list(), true),
        Field::new("datasets", string_list(), true),
        Field::new("emoji", DataType::Utf8, true),
        Field::new("colorFrom", DataType::Utf8, true),
        Field::new("colorTo", DataType::Utf8, true),
        Field::new("pinned", DataType::Boolean, true),
        Field::new("stage", DataType::Utf8, true),
        Field::new("hardware", DataType::Utf8, true),
        Field::new("devMode", DataType::Boolean, true),
        Field::new("custom_domains", string_list(), true),
    ])
}

fn string_column<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>()))
}

fn int_column(values: impl Iterator<Item = Option<i64>>) -> ArrayRef {
    Arc::new(Int64Array::from(values.collect::<Vec<_>>()))
}

fn bool_column(values: impl Iterator<Item = Option<bool>>) -> ArrayRef {
    Arc::new(BooleanArray::from(values.collect::<Vec<_>>()))
}

fn timestamp_column(values: impl Iterator<Item = Option<DateTime<Utc>>>) -> ArrayRef {
    let millis: Vec<Option<i64>> = values.map(|v| v.map(|t| t.timestamp_millis())).collect();
    Arc::new(TimestampMillisecondArray::from(millis).with_timezone("UTC"))
}

/// Null and empty list are distinct: an absent `domains` structure stays null
/// while a present-but-all-default one becomes an empty list.
fn string_list_column<'a>(values: impl Iterator<Item = Option<&'a [String]>>) -> ArrayRef {
    let mut builder = ListBuilder::new(StringBuilder::new());
    for value in values {
        match value {
            Some(items) => {
                for item in items {
                    builder.values().append_value(item);
                }
                builder.append(true);
            }
            None => builder.append(false),
        }
    }
    Arc::new(builder.finish())
}

/// Lays the accumulated records out as one arrow batch in schema order.
pub fn to_record_batch(records: &[SpaceRecord]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        string_column(records.iter().map(|r| Some(r.id.as_str()))),
        string_column(records.iter().map(|r| r.author.as_deref())),
        timestamp_column(records.iter().map(|r| r.created_at)),
        timestamp_column(records.iter().map(|r| r.last_modified)),
        string_column(records.iter().map(|r| r.subdomain.as_deref())),
        string_column(records.iter().map(|r| r.host.as_deref())),
        int_column(records.iter().map(|r| r.likes)),
        string_column(records.iter().map(|r| r.sdk.as_deref())),
        string_list_column(records.iter().map(|r| r.tags.as_deref())),
        int_column(records.iter().map(|r| r.readme_size)),
        string_column(records.iter().map(|r| r.python_version.as_deref())),
        string_column(records.iter().map(|r| r.license.as_deref())),
        string_column(records.iter().map(|r| r.duplicated_from.as_deref())),
        string_list_column(records.iter().map(|r| r.models.as_deref())),
        string_list_column(records.iter().map(|r| r.datasets.as_deref())),
        string_column(records.iter().map(|r| r.emoji.as_deref())),
        string_column(records.iter().map(|r| r.color_from.as_deref())),
        string_column(records.iter().map(|r| r.color_to.as_deref())),
        bool_column(records.iter().map(|r| r.pinned)),
        string_column(records.iter().map(|r| r.stage.as_deref())),
        string_column(records.iter().map(|r| r.hardware.as_deref())),
        bool_column(records.iter().map(|r| r.dev_mode)),
        string_list_column(records.iter().map(|r| r.custom_domains.as_deref())),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema()), columns)?)
}

/// Writes one full run of records to a single parquet file.
pub struct ParquetSink;

impl RecordSink for ParquetSink {
    fn persist(&self, records: &[SpaceRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let batch = to_record_batch(records)?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(ZstdLevel::default()))
            .build();
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        let _ = writer.close()?;
        info!(rows = records.len(), path = %path.display(), "wrote parquet output");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::cast::AsArray;
    use arrow_array::types::Int64Type;
    use arrow_array::Array;
    use chrono::TimeZone;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use tempfile::tempdir;

    fn sample_record(id: &str) -> SpaceRecord {
        SpaceRecord {
            id: id.to_string(),
            author: Some("someone".to_string()),
            created_at: Some(Utc.with_ymd_and_hms(2023, 4, 1, 10, 0, 0).unwrap()),
            last_modified: None,
            subdomain: Some("someone-demo".to_string()),
            host: None,
            likes: Some(5),
            sdk: Some("gradio".to_string()),
            tags: Some(vec!["gradio".to_string()]),
            readme_size: Some(512),
            python_version: None,
            license: Some("mit".to_string()),
            duplicated_from: None,
            models: None,
            datasets: None,
            emoji: Some("🚀".to_string()),
            color_from: Some("red".to_string()),
            color_to: Some("blue".to_string()),
            pinned: Some(false),
            stage: Some("RUNNING".to_string()),
            hardware: Some("cpu-basic".to_string()),
            dev_mode: Some(false),
            custom_domains: Some(vec!["a.com".to_string()]),
        }
    }

    fn null_heavy_record(id: &str) -> SpaceRecord {
        SpaceRecord {
            id: id.to_string(),
            author: None,
            created_at: None,
            last_modified: None,
            subdomain: None,
            host: None,
            likes: None,
            sdk: None,
            tags: None,
            readme_size: None,
            python_version: None,
            license: None,
            duplicated_from: None,
            models: None,
            datasets: None,
            emoji: None,
            color_from: None,
            color_to: None,
            pinned: None,
            stage: None,
            hardware: None,
            dev_mode: None,
            custom_domains: Some(vec![]),
        }
    }

    #[test]
    fn schema_has_all_columns_in_fixed_order() {
        let schema = schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "author",
                "created_at",
                "last_modified",
                "subdomain",
                "host",
                "likes",
                "sdk",
                "tags",
                "readme_size",
                "python_version",
                "license",
                "duplicated_from",
                "models",
                "datasets",
                "emoji",
                "colorFrom",
                "colorTo",
                "pinned",
                "stage",
                "hardware",
                "devMode",
                "custom_domains",
            ]
        );
    }

    #[test]
    fn roundtrip_preserves_rows_and_null_markers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spaces.parquet");
        let records = vec![sample_record("someone/demo"), null_heavy_record("someone/bare")];

        ParquetSink.persist(&records, &path).unwrap();

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 23);

        let ids = batch.column(0).as_string::<i32>();
        assert_eq!(ids.value(0), "someone/demo");
        assert_eq!(ids.value(1), "someone/bare");

        let readme_sizes = batch.column(9).as_primitive::<Int64Type>();
        assert_eq!(readme_sizes.value(0), 512);
        assert!(readme_sizes.is_null(1));

        // null list (tags of bare record) vs empty list (custom_domains)
        let tags = batch.column(8).as_list::<i32>();
        assert!(!tags.is_null(0));
        assert!(tags.is_null(1));
        let custom_domains = batch.column(22).as_list::<i32>();
        assert!(!custom_domains.is_null(1));
        assert_eq!(custom_domains.value(1).len(), 0);

        let pinned = batch.column(18).as_boolean();
        assert!(!pinned.value(0));
        assert!(pinned.is_null(1));
    }

    #[test]
    fn empty_run_still_writes_full_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.parquet");

        ParquetSink.persist(&[], &path).unwrap();

        let file = File::open(&path).unwrap();
        let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
        assert_eq!(builder.schema().fields().len(), 23);
    }
}
