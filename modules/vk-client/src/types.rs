use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Every VK method answers with either `response` or `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: Option<T>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

/// `groups.getById` returned a bare array up to API 5.139 and wraps it in
/// `{"groups": [...]}` since. Both shapes are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GroupsPayload {
    List(Vec<GroupInfo>),
    Wrapped { groups: Vec<GroupInfo> },
}

impl GroupsPayload {
    pub fn into_groups(self) -> Vec<GroupInfo> {
        match self {
            GroupsPayload::List(groups) => groups,
            GroupsPayload::Wrapped { groups } => groups,
        }
    }
}

/// Identity facts for one community.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupInfo {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// The canonical domain. VK calls it `screen_name`.
    #[serde(rename = "screen_name")]
    pub domain: String,
    #[serde(default)]
    pub members_count: Option<i64>,
}

/// Response body of `wall.get`.
#[derive(Debug, Clone, Deserialize)]
pub struct WallPage {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub items: Vec<WallPost>,
}

/// `{ "count": N }` counters attached to a wall post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Counter {
    #[serde(default)]
    pub count: i64,
}

/// A single wall post with its engagement counters.
#[derive(Debug, Clone, Deserialize)]
pub struct WallPost {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub owner_id: i64,
    /// Unix epoch seconds.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub likes: Counter,
    #[serde(default)]
    pub comments: Counter,
    #[serde(default)]
    pub reposts: Counter,
    #[serde(default)]
    pub views: Counter,
    #[serde(default)]
    pub reactions: Option<Counter>,
}

impl WallPost {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.date, 0)
    }

    pub fn like_count(&self) -> i64 {
        self.likes.count.max(0)
    }

    pub fn comment_count(&self) -> i64 {
        self.comments.count.max(0)
    }

    pub fn view_count(&self) -> i64 {
        self.views.count.max(0)
    }

    /// Falls back to the like count for posts without a reactions block.
    pub fn reaction_count(&self) -> i64 {
        match self.reactions {
            Some(r) => r.count.max(0),
            None => self.like_count(),
        }
    }
}
