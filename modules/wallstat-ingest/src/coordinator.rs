// Add-group pipeline: resolve link → look up group → upsert by domain →
// reconcile wall posts in the background.
//
// Reconciliation runs as a detached task per add_group call. Tasks are tracked
// only so a caller can drain them before shutdown; anything still running when
// the runtime stops is abandoned. Every post insert is atomic and keyed, so an
// abandoned run leaves no partial rows and the next add_group finishes the job.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use vk_client::WallPost;
use wallstat_common::{Group, GroupId, NewGroup, NewPost, Result, WallstatError};
use wallstat_store::GroupStore;

use crate::directory::{GroupDirectory, WallSource};
use crate::links;

/// One page of wall posts per reconciliation.
pub const WALL_FETCH_LIMIT: u32 = 100;

/// Outcome counters of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub fetched: usize,
    pub inserted: usize,
    /// Already stored under the same (group, date, text) key.
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct IngestionCoordinator {
    directory: Arc<dyn GroupDirectory>,
    wall: Arc<dyn WallSource>,
    store: Arc<dyn GroupStore>,
    tracker: TaskTracker,
}

impl IngestionCoordinator {
    pub fn new(
        directory: Arc<dyn GroupDirectory>,
        wall: Arc<dyn WallSource>,
        store: Arc<dyn GroupStore>,
    ) -> Self {
        Self {
            directory,
            wall,
            store,
            tracker: TaskTracker::new(),
        }
    }

    /// Resolve and upsert a group, then schedule its wall reconciliation.
    ///
    /// Returns as soon as the group row exists; reconciliation failures are
    /// logged and never reach the caller.
    pub async fn add_group(&self, link: &str) -> Result<GroupId> {
        let screen_name = links::resolve(link)?;

        let info = self.directory.lookup(&screen_name).await.map_err(|e| {
            warn!(screen_name = screen_name.as_str(), error = %e, "Group lookup failed");
            WallstatError::Upstream(e.to_string())
        })?;

        let existing = self.store.find_group_by_domain(&info.domain).await?;

        let draft = NewGroup {
            domain: info.domain.clone(),
            name: Some(info.name.clone()).filter(|n| !n.is_empty()),
            subscribers: info.members_count.unwrap_or(0).max(0),
            parsed_at: Some(Utc::now()),
        };
        let id = self.store.upsert_group(&draft).await?;

        info!(
            group_id = id,
            domain = draft.domain.as_str(),
            subscribers = draft.subscribers,
            created = existing.is_none(),
            "Group upserted"
        );

        self.spawn_reconcile(Group {
            id,
            domain: draft.domain,
            name: draft.name,
            subscribers: draft.subscribers,
            parsed_at: draft.parsed_at,
        });

        Ok(id)
    }

    /// Run `reconcile` as a detached task. The handle may be dropped.
    pub fn spawn_reconcile(&self, group: Group) -> JoinHandle<()> {
        let this = self.clone();
        self.tracker.spawn(async move {
            match this.reconcile(&group).await {
                Ok(stats) if stats.failed > 0 => warn!(
                    group_id = group.id,
                    domain = group.domain.as_str(),
                    ?stats,
                    "Reconciliation finished with failed posts"
                ),
                Ok(stats) => info!(
                    group_id = group.id,
                    domain = group.domain.as_str(),
                    ?stats,
                    "Reconciliation finished"
                ),
                Err(e) => error!(
                    group_id = group.id,
                    domain = group.domain.as_str(),
                    error = %e,
                    "Reconciliation failed"
                ),
            }
        })
    }

    /// Fetch the group's latest wall page and insert the posts not stored yet.
    ///
    /// A failed fetch aborts before any write. Stored posts are never touched.
    pub async fn reconcile(&self, group: &Group) -> Result<ReconcileStats> {
        let items = self
            .wall
            .list_posts(&group.domain, WALL_FETCH_LIMIT)
            .await
            .map_err(|e| {
                WallstatError::Reconciliation(format!("wall fetch for {}: {e}", group.domain))
            })?;

        let mut stats = ReconcileStats {
            fetched: items.len(),
            ..Default::default()
        };

        for item in &items {
            let Some(post) = to_new_post(group.id, item) else {
                warn!(group_id = group.id, post_id = item.id, date = item.date, "Post date out of range");
                stats.failed += 1;
                continue;
            };

            match self.store.find_post_by_key(post.key()).await {
                Ok(Some(_)) => {
                    stats.skipped += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(group_id = group.id, post_id = item.id, error = %e, "Post lookup failed");
                    stats.failed += 1;
                    continue;
                }
            }

            // Conditional at the storage level: a concurrent run may have
            // inserted the same key since the lookup above.
            match self.store.insert_post(&post).await {
                Ok(Some(_)) => stats.inserted += 1,
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    warn!(group_id = group.id, post_id = item.id, error = %e, "Failed to save post");
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Wait up to `timeout` for in-flight reconciliations. Returns false if
    /// some were still running; those are left to finish or be abandoned.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();

        if !drained {
            warn!(in_flight = self.tracker.len(), "Reconciliations still running at drain timeout");
        }
        drained
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }
}

/// Map a wall item to a post draft. `None` if its timestamp is unrepresentable.
fn to_new_post(group_id: GroupId, item: &WallPost) -> Option<NewPost> {
    let date = item.published_at()?.date_naive();
    Some(
        NewPost::builder()
            .group_id(group_id)
            .date(date)
            .text(item.text.clone())
            .views(item.view_count())
            .reactions(item.reaction_count())
            .likes(item.like_count())
            .comments(item.comment_count())
            .build(),
    )
}
