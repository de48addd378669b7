// In-process GroupStore with the same uniqueness and foreign-key rules as the
// Postgres schema. Used by tests across the workspace; supports failure
// injection for post reads, post inserts and group listing.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use wallstat_common::{Group, GroupId, NewGroup, NewPost, Post, PostId, PostKey};

use crate::error::{Result, StoreError};
use crate::store::GroupStore;

#[derive(Default)]
struct Inner {
    groups: Vec<Group>,
    posts: Vec<Post>,
    next_group_id: GroupId,
    next_post_id: PostId,
    failing_post_reads: HashSet<GroupId>,
    failing_insert_texts: HashSet<String>,
    failing_group_listing: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `find_posts_by_group` fail for this group.
    pub fn fail_post_reads_for(&self, group_id: GroupId) {
        self.inner.lock().unwrap().failing_post_reads.insert(group_id);
    }

    /// Make `insert_post` fail for posts with this text.
    pub fn fail_inserts_for(&self, text: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_insert_texts
            .insert(text.to_string());
    }

    /// Make `list_groups` fail.
    pub fn fail_group_listing(&self) {
        self.inner.lock().unwrap().failing_group_listing = true;
    }

    pub fn groups(&self) -> Vec<Group> {
        self.inner.lock().unwrap().groups.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.inner.lock().unwrap().posts.clone()
    }

    pub fn post_count(&self, group_id: GroupId) -> usize {
        self.inner
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|p| p.group_id == group_id)
            .count()
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn find_group_by_domain(&self, domain: &str) -> Result<Option<Group>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.groups.iter().find(|g| g.domain == domain).cloned())
    }

    async fn upsert_group(&self, group: &NewGroup) -> Result<GroupId> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(existing) = inner.groups.iter_mut().find(|g| g.domain == group.domain) {
            if group.name.is_some() {
                existing.name = group.name.clone();
            }
            existing.subscribers = group.subscribers;
            if group.parsed_at.is_some() {
                existing.parsed_at = group.parsed_at;
            }
            return Ok(existing.id);
        }

        inner.next_group_id += 1;
        let id = inner.next_group_id;
        inner.groups.push(Group {
            id,
            domain: group.domain.clone(),
            name: group.name.clone(),
            subscribers: group.subscribers,
            parsed_at: group.parsed_at,
        });
        Ok(id)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let inner = self.inner.lock().unwrap();
        if inner.failing_group_listing {
            return Err(StoreError::Unavailable("group listing disabled".to_string()));
        }
        let mut groups = inner.groups.clone();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    async fn find_posts_by_group(&self, group_id: GroupId) -> Result<Vec<Post>> {
        let inner = self.inner.lock().unwrap();
        if inner.failing_post_reads.contains(&group_id) {
            return Err(StoreError::Unavailable(format!(
                "post reads disabled for group {group_id}"
            )));
        }
        Ok(inner
            .posts
            .iter()
            .filter(|p| p.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn find_post_by_key(&self, key: PostKey<'_>) -> Result<Option<Post>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.posts.iter().find(|p| p.key() == key).cloned())
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Option<PostId>> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.groups.iter().any(|g| g.id == post.group_id) {
            return Err(StoreError::UnknownGroup(post.group_id));
        }
        if inner.failing_insert_texts.contains(&post.text) {
            return Err(StoreError::Unavailable(format!("inserts disabled for {:?}", post.text)));
        }
        if inner.posts.iter().any(|p| p.key() == post.key()) {
            return Ok(None);
        }

        inner.next_post_id += 1;
        let id = inner.next_post_id;
        inner.posts.push(post.clone().into_post(id));
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    fn post(group_id: GroupId, date: NaiveDate, text: &str, likes: i64) -> NewPost {
        NewPost::builder()
            .group_id(group_id)
            .date(date)
            .text(text)
            .likes(likes)
            .build()
    }

    #[tokio::test]
    async fn upsert_same_domain_reuses_the_row() {
        let store = MemoryStore::new();
        let first = store
            .upsert_group(&NewGroup::builder().domain("example").subscribers(10).build())
            .await
            .unwrap();
        let second = store
            .upsert_group(&NewGroup::builder().domain("example").subscribers(25).build())
            .await
            .unwrap();

        assert_eq!(first, second);
        let groups = store.list_groups().await.unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].subscribers, 25);
    }

    #[tokio::test]
    async fn upsert_without_name_keeps_the_stored_one() {
        let store = MemoryStore::new();
        store
            .upsert_group(&NewGroup::builder().domain("example").name("Example").build())
            .await
            .unwrap();
        store
            .upsert_group(&NewGroup::builder().domain("example").build())
            .await
            .unwrap();

        let group = store.find_group_by_domain("example").await.unwrap().unwrap();
        assert_eq!(group.name.as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn duplicate_key_is_not_inserted() {
        let store = MemoryStore::new();
        let gid = store
            .upsert_group(&NewGroup::builder().domain("g").build())
            .await
            .unwrap();

        assert!(store.insert_post(&post(gid, day(4), "hello", 1)).await.unwrap().is_some());
        // Same key, different counters: still a duplicate.
        assert!(store.insert_post(&post(gid, day(4), "hello", 99)).await.unwrap().is_none());
        assert!(store.insert_post(&post(gid, day(5), "hello", 1)).await.unwrap().is_some());

        assert_eq!(store.post_count(gid), 2);
        assert_eq!(store.posts()[0].likes, 1);
    }

    #[tokio::test]
    async fn post_for_unknown_group_is_rejected() {
        let store = MemoryStore::new();
        let err = store.insert_post(&post(42, day(4), "orphan", 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownGroup(42)));
    }

    #[tokio::test]
    async fn find_post_by_key_matches_exact_text() {
        let store = MemoryStore::new();
        let gid = store
            .upsert_group(&NewGroup::builder().domain("g").build())
            .await
            .unwrap();
        let draft = post(gid, day(4), "hello", 3);
        store.insert_post(&draft).await.unwrap();

        let found = store.find_post_by_key(draft.key()).await.unwrap().unwrap();
        assert_eq!(found.likes, 3);

        let other = post(gid, day(4), "hello!", 3);
        assert!(store.find_post_by_key(other.key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_failures_surface_as_errors() {
        let store = MemoryStore::new();
        let gid = store
            .upsert_group(&NewGroup::builder().domain("g").build())
            .await
            .unwrap();

        store.fail_post_reads_for(gid);
        assert!(store.find_posts_by_group(gid).await.is_err());

        store.fail_group_listing();
        assert!(store.list_groups().await.is_err());
    }

    #[tokio::test]
    async fn failing_insert_only_affects_matching_text() {
        let store = MemoryStore::new();
        let gid = store
            .upsert_group(&NewGroup::builder().domain("g").build())
            .await
            .unwrap();
        store.fail_inserts_for("bad");

        assert!(matches!(
            store.insert_post(&post(gid, day(4), "bad", 1)).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.insert_post(&post(gid, day(4), "good", 1)).await.unwrap().is_some());
        assert_eq!(store.post_count(gid), 1);
    }
}
