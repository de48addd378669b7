// The persistence contract the ingestion and analytics pipelines run against.
//
// PgStore is the production implementation; MemoryStore backs tests and
// enforces the same uniqueness and foreign-key rules.

use async_trait::async_trait;

use wallstat_common::{Group, GroupId, NewGroup, NewPost, Post, PostId, PostKey};

use crate::error::Result;

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn find_group_by_domain(&self, domain: &str) -> Result<Option<Group>>;

    /// Insert the group, or refresh `name`, `subscribers` and `parsed_at` of the
    /// existing row with the same domain. Returns the row's id either way.
    async fn upsert_group(&self, group: &NewGroup) -> Result<GroupId>;

    /// All groups, ordered by id.
    async fn list_groups(&self) -> Result<Vec<Group>>;

    async fn find_posts_by_group(&self, group_id: GroupId) -> Result<Vec<Post>>;

    async fn find_post_by_key(&self, key: PostKey<'_>) -> Result<Option<Post>>;

    /// Insert a post unless one with the same dedup key already exists.
    /// Returns `None` when the key was taken, including by a concurrent writer.
    async fn insert_post(&self, post: &NewPost) -> Result<Option<PostId>>;
}
