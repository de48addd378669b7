use chrono::{Days, NaiveDate};
use serde::Serialize;
use wallstat_common::Post;

use crate::strategy::AggregateStrategy;

/// Length of the "last week" window, reference date included.
const WEEK_DAYS: u64 = 7;

/// Per-group numbers shown in the report table. Derived on every read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatSnapshot {
    pub total_posts: usize,
    pub total_likes: i64,
    pub total_comments: i64,
    pub avg_likes_per_post: f64,
    pub max_likes_per_post: i64,
    pub avg_comments_per_post: f64,
    pub posts_last_week: usize,
}

impl StatSnapshot {
    pub fn from_posts(posts: &[Post], today: NaiveDate) -> Self {
        let aggregate = AggregateStrategy::aggregate(posts);
        let week_start = today
            .checked_sub_days(Days::new(WEEK_DAYS - 1))
            .unwrap_or(NaiveDate::MIN);

        Self {
            total_posts: posts.len(),
            total_likes: aggregate.total_likes,
            total_comments: aggregate.total_comments,
            avg_likes_per_post: aggregate.avg_likes_per_post,
            max_likes_per_post: aggregate.max_likes_per_post,
            avg_comments_per_post: aggregate.avg_comments_per_post,
            posts_last_week: posts
                .iter()
                .filter(|p| p.date >= week_start && p.date <= today)
                .count(),
        }
    }
}
