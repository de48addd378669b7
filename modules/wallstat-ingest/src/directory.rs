// Trait boundaries over the two VK endpoints the pipeline needs.
//
// VkClient implements both; tests use MockDirectory and MockWall from
// `crate::testing`.

use async_trait::async_trait;
use vk_client::{GroupInfo, VkClient, WallPost};

#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Resolve a screen-name into the group's identity facts.
    async fn lookup(&self, screen_name: &str) -> vk_client::Result<GroupInfo>;
}

#[async_trait]
pub trait WallSource: Send + Sync {
    /// Most recent posts of a group, at most `limit` (clamped to 1..=100).
    async fn list_posts(&self, domain: &str, limit: u32) -> vk_client::Result<Vec<WallPost>>;
}

#[async_trait]
impl GroupDirectory for VkClient {
    async fn lookup(&self, screen_name: &str) -> vk_client::Result<GroupInfo> {
        self.lookup_group(screen_name).await
    }
}

#[async_trait]
impl WallSource for VkClient {
    async fn list_posts(&self, domain: &str, limit: u32) -> vk_client::Result<Vec<WallPost>> {
        self.wall_posts(domain, limit).await
    }
}
