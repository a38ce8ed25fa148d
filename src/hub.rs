use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ScraperError};
use crate::models::{SpaceDetail, SpacePage, SpaceSummary};
use crate::ports::{SpaceDetailSource, SpaceDirectory};

/// HTTP client for the hub API, backing both the directory listing and the
/// per-space detail lookup.
pub struct HubClient {
    client: reqwest::Client,
    api_base: String,
    page_size: usize,
}

impl HubClient {
    pub fn new(api_base: &str, page_size: usize, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("spaces_scraper/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            page_size,
        })
    }

    fn listing_url(&self) -> String {
        format!(
            "{}/api/spaces?limit={}&full=true",
            self.api_base, self.page_size
        )
    }

    fn detail_url(&self, id: &str) -> String {
        format!("{}/api/spaces/{}?files_metadata=true", self.api_base, id)
    }
}

/// Pulls the `rel="next"` URL out of a `Link` response header, if any.
fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    let re = regex::Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).ok()?;
    Some(re.captures(link)?.get(1)?.as_str().to_string())
}

#[async_trait]
impl SpaceDirectory for HubClient {
    async fn page(&self, cursor: Option<&str>) -> Result<SpacePage> {
        let url = cursor.map_or_else(|| self.listing_url(), str::to_string);
        debug!(%url, "fetching directory page");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Api {
                status: status.as_u16(),
                message: format!("directory listing request to {} failed", url),
            });
        }
        let next = next_link(response.headers());
        let spaces: Vec<SpaceSummary> = response.json().await?;
        debug!(count = spaces.len(), has_next = next.is_some(), "directory page fetched");
        Ok(SpacePage { spaces, next })
    }
}

#[async_trait]
impl SpaceDetailSource for HubClient {
    async fn space_info(&self, id: &str) -> Result<SpaceDetail> {
        let url = self.detail_url(id);
        debug!(space = %id, "fetching space detail");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Api {
                status: status.as_u16(),
                message: format!("space '{}' did not resolve", id),
            });
        }
        let detail: SpaceDetail = response.json().await?;
        Ok(detail)
    }
}
