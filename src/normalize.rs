use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::models::SpaceDetail;

/// The sibling whose size we report as `readme_size`.
pub const README_FILENAME: &str = "README.md";

/// Flat output row for one space. Field order here is the column order of the
/// parquet output; every field except `id` is independently nullable.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceRecord {
    pub id: String,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_modified: Option<DateTime<Utc>>,
    pub subdomain: Option<String>,
    pub host: Option<String>,
    pub likes: Option<i64>,
    pub sdk: Option<String>,
    pub tags: Option<Vec<String>>,
    pub readme_size: Option<i64>,
    pub python_version: Option<String>,
    pub license: Option<String>,
    pub duplicated_from: Option<String>,
    pub models: Option<Vec<String>>,
    pub datasets: Option<Vec<String>>,
    pub emoji: Option<String>,
    pub color_from: Option<String>,
    pub color_to: Option<String>,
    pub pinned: Option<bool>,
    pub stage: Option<String>,
    pub hardware: Option<String>,
    pub dev_mode: Option<bool>,
    pub custom_domains: Option<Vec<String>>,
}

/// The nine author-declared card fields, extracted together: when `cardData`
/// is absent or not a mapping, the whole group defaults to null at once.
/// When it is present, each key falls back to null on its own.
#[derive(Debug, Clone, Default, PartialEq)]
struct CardFields {
    python_version: Option<String>,
    license: Option<String>,
    duplicated_from: Option<String>,
    models: Option<Vec<String>>,
    datasets: Option<Vec<String>>,
    emoji: Option<String>,
    color_from: Option<String>,
    color_to: Option<String>,
    pinned: Option<bool>,
}

impl CardFields {
    fn from_map(card: &Map<String, Value>) -> Self {
        Self {
            python_version: card_string(card, "python_version"),
            license: card_string(card, "license"),
            duplicated_from: card_string(card, "duplicated_from"),
            models: card_string_list(card, "models"),
            datasets: card_string_list(card, "datasets"),
            emoji: card_string(card, "emoji"),
            color_from: card_string(card, "colorFrom"),
            color_to: card_string(card, "colorTo"),
            pinned: card_bool(card, "pinned"),
        }
    }
}

/// Card values are author-declared, so a "string" key sometimes arrives as a
/// number (e.g. `python_version = 3.9`). Stringify those rather than drop them.
fn card_string(card: &Map<String, Value>, key: &str) -> Option<String> {
    match card.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `models` and `datasets` are declared either as a list or as a bare string;
/// a bare string becomes a one-element list.
fn card_string_list(card: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match card.get(key)? {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

fn card_bool(card: &Map<String, Value>, key: &str) -> Option<bool> {
    match card.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Maps one raw detail record to one flat output row.
///
/// Total by construction: every extraction that depends on an optional
/// substructure is guarded on its own, so a missing `runtime` cannot affect
/// `readme_size`, a missing `cardData` cannot affect `tags`, and so on. Only
/// `id` is required.
pub fn normalize(detail: &SpaceDetail) -> SpaceRecord {
    let custom_domains = detail
        .runtime
        .as_ref()
        .and_then(|runtime| runtime.raw.get("domains"))
        .and_then(Value::as_array)
        .map(|domains| {
            domains
                .iter()
                .filter(|entry| {
                    entry
                        .get("isCustom")
                        .and_then(Value::as_bool)
                        .unwrap_or(false)
                })
                .filter_map(|entry| entry.get("domain").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        });

    // First match wins if the listing abnormally carries duplicates.
    let readme_size = detail
        .siblings
        .as_ref()
        .and_then(|files| files.iter().find(|f| f.rfilename == README_FILENAME))
        .and_then(|f| f.size);

    let card = detail
        .card_data
        .as_ref()
        .and_then(Value::as_object)
        .map(CardFields::from_map)
        .unwrap_or_default();

    let (stage, hardware) = match &detail.runtime {
        Some(runtime) => (runtime.stage.clone(), runtime.hardware.clone()),
        None => (None, None),
    };

    let dev_mode = detail
        .runtime
        .as_ref()
        .and_then(|runtime| runtime.raw.get("devMode"))
        .and_then(Value::as_bool);

    SpaceRecord {
        id: detail.id.clone(),
        author: detail.author.clone(),
        created_at: detail.created_at,
        last_modified: detail.last_modified,
        subdomain: detail.subdomain.clone(),
        host: detail.host.clone(),
        likes: detail.likes,
        sdk: detail.sdk.clone(),
        tags: detail.tags.clone(),
        readme_size,
        python_version: card.python_version,
        license: card.license,
        duplicated_from: card.duplicated_from,
        models: card.models,
        datasets: card.datasets,
        emoji: card.emoji,
        color_from: card.color_from,
        color_to: card.color_to,
        pinned: card.pinned,
        stage,
        hardware,
        dev_mode,
        custom_domains,
    }
}
