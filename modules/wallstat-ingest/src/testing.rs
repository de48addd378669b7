// Test doubles for the two VK trait boundaries.
//
// - MockDirectory (GroupDirectory): HashMap-based screen-name → GroupInfo
// - MockWall (WallSource): HashMap-based domain → posts, with a call counter
// - StalledWall (WallSource): never answers, for in-flight/shutdown tests
//
// Unregistered keys fail like the real API does. Pair with
// wallstat_store::MemoryStore for database-free pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use vk_client::{Counter, GroupInfo, VkError, WallPost};

use crate::directory::{GroupDirectory, WallSource};

// ---------------------------------------------------------------------------
// MockDirectory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockDirectory {
    groups: HashMap<String, GroupInfo>,
    calls: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group reachable under `screen_name`.
    pub fn on_lookup(mut self, screen_name: &str, info: GroupInfo) -> Self {
        self.groups.insert(screen_name.to_string(), info);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GroupDirectory for MockDirectory {
    async fn lookup(&self, screen_name: &str) -> vk_client::Result<GroupInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.groups
            .get(screen_name)
            .cloned()
            .ok_or_else(|| VkError::NotFound(screen_name.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MockWall
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockWall {
    walls: HashMap<String, Vec<WallPost>>,
    calls: AtomicUsize,
}

impl MockWall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_posts(mut self, domain: &str, posts: Vec<WallPost>) -> Self {
        self.walls.insert(domain.to_string(), posts);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WallSource for MockWall {
    async fn list_posts(&self, domain: &str, limit: u32) -> vk_client::Result<Vec<WallPost>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Give concurrent reconciliations a chance to interleave.
        tokio::task::yield_now().await;

        let posts = self.walls.get(domain).ok_or_else(|| VkError::Api {
            code: 15,
            message: format!("Access denied: wall of {domain} is disabled"),
        })?;
        Ok(posts
            .iter()
            .take(vk_client::clamp_count(limit) as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// StalledWall
// ---------------------------------------------------------------------------

/// A wall listing that never completes.
#[derive(Default)]
pub struct StalledWall;

#[async_trait]
impl WallSource for StalledWall {
    async fn list_posts(&self, _domain: &str, _limit: u32) -> vk_client::Result<Vec<WallPost>> {
        std::future::pending().await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn group_info(domain: &str, name: &str, members: i64) -> GroupInfo {
    GroupInfo {
        id: 1,
        name: name.to_string(),
        domain: domain.to_string(),
        members_count: Some(members),
    }
}

/// A wall post published at noon UTC on `date` (YYYY-MM-DD).
pub fn wall_post(date: &str, text: &str, likes: i64, comments: i64, views: i64) -> WallPost {
    let published = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .expect("fixture date must be YYYY-MM-DD")
        .and_hms_opt(12, 0, 0)
        .expect("noon is a valid time")
        .and_utc();

    WallPost {
        id: 0,
        owner_id: 0,
        date: published.timestamp(),
        text: text.to_string(),
        likes: Counter { count: likes },
        comments: Counter { count: comments },
        reposts: Counter::default(),
        views: Counter { count: views },
        reactions: None,
    }
}
