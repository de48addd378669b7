use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

pub type GroupId = i64;
pub type PostId = i64;

// --- Groups ---

/// A tracked community. `domain` is unique across all groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub domain: String,
    pub name: Option<String>,
    pub subscribers: i64,
    /// `None` until the group has been resolved at least once.
    pub parsed_at: Option<DateTime<Utc>>,
}

/// Write-side shape of a group, keyed by `domain` for upserts.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct NewGroup {
    #[builder(setter(into))]
    pub domain: String,
    #[builder(default, setter(strip_option, into))]
    pub name: Option<String>,
    #[builder(default)]
    pub subscribers: i64,
    #[builder(default, setter(strip_option))]
    pub parsed_at: Option<DateTime<Utc>>,
}

// --- Posts ---

/// An engagement snapshot of one wall post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub group_id: GroupId,
    pub date: NaiveDate,
    pub text: String,
    pub views: i64,
    pub reactions: i64,
    pub likes: i64,
    pub comments: i64,
}

impl Post {
    pub fn key(&self) -> PostKey<'_> {
        PostKey {
            group_id: self.group_id,
            date: self.date,
            text: &self.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct NewPost {
    pub group_id: GroupId,
    pub date: NaiveDate,
    #[builder(default, setter(into))]
    pub text: String,
    #[builder(default)]
    pub views: i64,
    #[builder(default)]
    pub reactions: i64,
    #[builder(default)]
    pub likes: i64,
    #[builder(default)]
    pub comments: i64,
}

impl NewPost {
    pub fn key(&self) -> PostKey<'_> {
        PostKey {
            group_id: self.group_id,
            date: self.date,
            text: &self.text,
        }
    }

    pub fn into_post(self, id: PostId) -> Post {
        Post {
            id,
            group_id: self.group_id,
            date: self.date,
            text: self.text,
            views: self.views,
            reactions: self.reactions,
            likes: self.likes,
            comments: self.comments,
        }
    }
}

/// Dedup key: at most one post per (group, date, text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostKey<'a> {
    pub group_id: GroupId,
    pub date: NaiveDate,
    pub text: &'a str,
}
