pub mod error;
pub mod types;

pub use error::{Result, VkError};
pub use types::{Counter, GroupInfo, WallPage, WallPost};

use serde::de::DeserializeOwned;
use types::{ApiEnvelope, GroupsPayload};

pub const DEFAULT_BASE_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_API_VERSION: &str = "5.131";

/// `wall.get` never returns more than this many posts per call.
pub const MAX_WALL_COUNT: u32 = 100;

pub struct VkClient {
    client: reqwest::Client,
    token: String,
    api_version: String,
    base_url: String,
}

impl VkClient {
    pub fn new(token: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_version: api_version.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Resolve a screen-name (or `club123` / numeric id) into the group's identity.
    pub async fn lookup_group(&self, screen_name: &str) -> Result<GroupInfo> {
        tracing::debug!(screen_name, "vk: looking up group");

        let payload: GroupsPayload = self
            .call(
                "groups.getById",
                &[
                    ("group_ids", screen_name.to_string()),
                    ("fields", "members_count".to_string()),
                ],
            )
            .await?;

        first_group(payload, screen_name)
    }

    /// List the most recent wall posts of a community, in API order.
    /// `count` is clamped with [`clamp_count`].
    pub async fn wall_posts(&self, domain: &str, count: u32) -> Result<Vec<WallPost>> {
        let count = clamp_count(count);
        tracing::info!(domain, count, "vk: fetching wall posts");

        let page: WallPage = self
            .call(
                "wall.get",
                &[("domain", domain.to_string()), ("count", count.to_string())],
            )
            .await?;

        tracing::info!(domain, fetched = page.items.len(), total = page.count, "vk: wall fetched");
        Ok(page.items)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        if self.token.is_empty() {
            return Err(VkError::MissingToken);
        }

        let url = format!("{}/{}", self.base_url, method);
        let resp = self
            .client
            .get(&url)
            .query(params)
            .query(&[("v", self.api_version.as_str()), ("access_token", self.token.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VkError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        decode_envelope(&body)
    }
}

/// Out-of-range counts fall back to the API maximum instead of failing.
pub fn clamp_count(count: u32) -> u32 {
    if count == 0 || count > MAX_WALL_COUNT {
        MAX_WALL_COUNT
    } else {
        count
    }
}

/// Decode a VK response body, surfacing the embedded error object when present.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;

    if let Some(err) = envelope.error {
        if err.error_code != 0 {
            return Err(VkError::Api {
                code: err.error_code,
                message: err.error_msg,
            });
        }
    }

    envelope
        .response
        .ok_or_else(|| VkError::Parse("response body has no `response` field".to_string()))
}

fn first_group(payload: GroupsPayload, screen_name: &str) -> Result<GroupInfo> {
    payload
        .into_groups()
        .into_iter()
        .next()
        .ok_or_else(|| VkError::NotFound(screen_name.to_string()))
}
