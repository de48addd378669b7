// Read-side analytics over every tracked group.
//
// Groups are listed once; each group's posts are loaded concurrently, at most
// MAX_CONCURRENT_POST_READS at a time, and folded into a StatSnapshot. A failed
// post read degrades that group to a zero snapshot, a failed listing fails the
// whole call.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use wallstat_common::{Group, GroupId, Result};
use wallstat_store::GroupStore;

use crate::snapshot::StatSnapshot;

/// Shown in place of `parsed_at` for groups that were never parsed.
pub const PARSED_AT_PLACEHOLDER: &str = "-";

const PARSED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Stays below the CLI's connection pool size.
pub const MAX_CONCURRENT_POST_READS: usize = 8;

/// One report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub id: GroupId,
    pub domain: String,
    pub name: Option<String>,
    pub subscribers: i64,
    pub parsed_at: String,
    #[serde(flatten)]
    pub snapshot: StatSnapshot,
}

/// Parallel arrays, one element per group in report order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub subscribers: Vec<i64>,
    pub avg_likes: Vec<f64>,
    pub avg_comments: Vec<f64>,
}

impl ChartSeries {
    fn from_rows(rows: &[GroupStats]) -> Self {
        Self {
            subscribers: rows.iter().map(|r| r.subscribers).collect(),
            avg_likes: rows.iter().map(|r| r.snapshot.avg_likes_per_post).collect(),
            avg_comments: rows.iter().map(|r| r.snapshot.avg_comments_per_post).collect(),
        }
    }
}

/// Table rows and chart series built from the same listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub groups: Vec<GroupStats>,
    pub chart: ChartSeries,
}

pub fn format_parsed_at(parsed_at: Option<DateTime<Utc>>) -> String {
    match parsed_at {
        Some(at) => at.format(PARSED_AT_FORMAT).to_string(),
        None => PARSED_AT_PLACEHOLDER.to_string(),
    }
}

#[derive(Clone)]
pub struct GroupAnalyticsReport {
    store: Arc<dyn GroupStore>,
}

impl GroupAnalyticsReport {
    pub fn new(store: Arc<dyn GroupStore>) -> Self {
        Self { store }
    }

    pub async fn build_report(&self) -> Result<Vec<GroupStats>> {
        self.build_report_at(Utc::now().date_naive()).await
    }

    /// Same as `build_report`, with "last week" anchored at `today`.
    pub async fn build_report_at(&self, today: NaiveDate) -> Result<Vec<GroupStats>> {
        let groups = self.store.list_groups().await?;
        let rows: Vec<GroupStats> = stream::iter(groups)
            .map(|g| self.group_stats(g, today))
            .buffered(MAX_CONCURRENT_POST_READS)
            .collect()
            .await;

        info!(groups = rows.len(), "Built group report");
        Ok(rows)
    }

    pub async fn build_chart_series(&self) -> Result<ChartSeries> {
        let rows = self.build_report().await?;
        Ok(ChartSeries::from_rows(&rows))
    }

    pub async fn build_dashboard(&self) -> Result<Dashboard> {
        let groups = self.build_report().await?;
        let chart = ChartSeries::from_rows(&groups);
        Ok(Dashboard { groups, chart })
    }

    async fn group_stats(&self, group: Group, today: NaiveDate) -> GroupStats {
        let snapshot = match self.store.find_posts_by_group(group.id).await {
            Ok(posts) => StatSnapshot::from_posts(&posts, today),
            Err(e) => {
                warn!(group_id = group.id, domain = %group.domain, error = %e, "Failed to load posts, reporting zeros");
                StatSnapshot::default()
            }
        };

        GroupStats {
            id: group.id,
            parsed_at: format_parsed_at(group.parsed_at),
            domain: group.domain,
            name: group.name,
            subscribers: group.subscribers,
            snapshot,
        }
    }
}
