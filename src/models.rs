use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Lightweight space handle returned by the directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceSummary {
    pub id: String,
}

/// One page of the paginated directory listing, with the cursor (a full URL
/// taken from the `Link` response header) needed to fetch the next one.
#[derive(Debug, Clone)]
pub struct SpacePage {
    pub spaces: Vec<SpaceSummary>,
    pub next: Option<String>,
}

/// Upstream-reported execution state of a space. `stage` and `hardware` are
/// pulled out as typed fields; everything else the hub reports (including the
/// `domains` list and the `devMode` flag) stays in the free-form `raw` map.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceRuntime {
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "deserialize_hardware")]
    pub hardware: Option<String>,
    #[serde(flatten)]
    pub raw: Map<String, Value>,
}

/// The hub reports hardware either as a plain string or as an object carrying
/// the currently assigned flavor under `current`.
fn deserialize_hardware<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Object(map) => map
            .get("current")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }))
}

/// A file in the space's listing. `size` is only populated when the lookup
/// requested file metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct SiblingFile {
    pub rfilename: String,
    pub size: Option<i64>,
}

/// Detailed space record as returned by the hub API. Every substructure may be
/// absent; normalization guards each extraction independently.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceDetail {
    pub id: String,
    pub author: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "lastModified")]
    pub last_modified: Option<DateTime<Utc>>,
    pub subdomain: Option<String>,
    pub host: Option<String>,
    pub likes: Option<i64>,
    pub sdk: Option<String>,
    pub tags: Option<Vec<String>>,
    pub runtime: Option<SpaceRuntime>,
    pub siblings: Option<Vec<SiblingFile>>,
    #[serde(rename = "cardData")]
    pub card_data: Option<Value>,
}
