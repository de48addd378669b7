// Statistics strategies over one group's posts.
//
// Each strategy is pure: same posts in, same metrics out. They share one
// object-safe capability so callers can run any mix of them, and each also
// exposes a typed function for direct use.

use serde::Serialize;
use wallstat_common::Post;

pub trait StatisticsStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute(&self, posts: &[Post]) -> MetricSet;
}

/// Output of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricSet {
    Aggregate(AggregateStats),
    Engagement(EngagementRate),
    Performance(PerformanceStats),
}

/// The three built-in strategies, in display order.
pub fn all_strategies() -> Vec<Box<dyn StatisticsStrategy>> {
    vec![
        Box::new(AggregateStrategy),
        Box::new(EngagementStrategy),
        Box::new(PerformanceStrategy),
    ]
}

/// Counters are unbounded upstream; totals saturate instead of overflowing.
fn total(posts: &[Post], counter: impl Fn(&Post) -> i64) -> i64 {
    posts.iter().fold(0i64, |acc, p| acc.saturating_add(counter(p)))
}

fn mean(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

// --- Aggregate ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_likes: i64,
    pub total_comments: i64,
    pub avg_likes_per_post: f64,
    pub avg_comments_per_post: f64,
    pub max_likes_per_post: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateStrategy;

impl AggregateStrategy {
    /// Totals, per-post averages and the best post. Zero for no posts.
    pub fn aggregate(posts: &[Post]) -> AggregateStats {
        let total_likes = total(posts, |p| p.likes);
        let total_comments = total(posts, |p| p.comments);

        AggregateStats {
            total_likes,
            total_comments,
            avg_likes_per_post: mean(total_likes, posts.len()),
            avg_comments_per_post: mean(total_comments, posts.len()),
            max_likes_per_post: posts.iter().map(|p| p.likes).max().unwrap_or(0),
        }
    }
}

impl StatisticsStrategy for AggregateStrategy {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn compute(&self, posts: &[Post]) -> MetricSet {
        MetricSet::Aggregate(Self::aggregate(posts))
    }
}

// --- Engagement ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EngagementRate {
    /// Sum of likes + comments + reactions.
    pub total_engagement: i64,
    /// Truncated integer mean.
    pub avg_views: i64,
    /// Likes per comment; 0 when there are no comments.
    pub like_to_comment_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EngagementStrategy;

impl EngagementStrategy {
    pub fn engagement(posts: &[Post]) -> EngagementRate {
        if posts.is_empty() {
            return EngagementRate::default();
        }

        let total_likes = total(posts, |p| p.likes);
        let total_comments = total(posts, |p| p.comments);
        let total_views = total(posts, |p| p.views);
        let total_engagement = total(posts, |p| {
            p.likes.saturating_add(p.comments).saturating_add(p.reactions)
        });

        let like_to_comment_ratio = if total_comments > 0 {
            total_likes as f64 / total_comments as f64
        } else {
            0.0
        };

        EngagementRate {
            total_engagement,
            avg_views: total_views / posts.len() as i64,
            like_to_comment_ratio,
        }
    }
}

impl StatisticsStrategy for EngagementStrategy {
    fn name(&self) -> &'static str {
        "engagement"
    }

    fn compute(&self, posts: &[Post]) -> MetricSet {
        MetricSet::Engagement(Self::engagement(posts))
    }
}

// --- Performance ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub top_post_likes: i64,
    pub bottom_post_likes: i64,
    /// Population variance of likes around the truncated integer mean.
    pub variance_in_likes: f64,
    pub post_count: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceStrategy;

impl PerformanceStrategy {
    pub fn performance(posts: &[Post]) -> PerformanceStats {
        if posts.is_empty() {
            return PerformanceStats::default();
        }

        let count = posts.len() as i128;
        let total_likes: i128 = posts.iter().map(|p| i128::from(p.likes)).sum();
        // Truncate before taking deviations; the variance depends on it.
        let mean_likes = total_likes / count;
        let sum_squares: f64 = posts
            .iter()
            .map(|p| {
                let diff = (i128::from(p.likes) - mean_likes) as f64;
                diff * diff
            })
            .sum();

        PerformanceStats {
            top_post_likes: posts.iter().map(|p| p.likes).max().unwrap_or(0),
            bottom_post_likes: posts.iter().map(|p| p.likes).min().unwrap_or(0),
            variance_in_likes: sum_squares / count as f64,
            post_count: posts.len(),
        }
    }
}

impl StatisticsStrategy for PerformanceStrategy {
    fn name(&self) -> &'static str {
        "performance"
    }

    fn compute(&self, posts: &[Post]) -> MetricSet {
        MetricSet::Performance(Self::performance(posts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn post(likes: i64, comments: i64, views: i64, reactions: i64) -> Post {
        Post {
            id: 0,
            group_id: 1,
            date: NaiveDate::from_ymd_opt(2025, 12, 4).unwrap(),
            text: String::new(),
            views,
            reactions,
            likes,
            comments,
        }
    }

    fn likes(values: &[i64]) -> Vec<Post> {
        values.iter().map(|&l| post(l, 0, 0, 0)).collect()
    }

    // --- Aggregate ---

    #[test]
    fn aggregate_totals_and_averages() {
        let posts = vec![post(100, 10, 0, 0), post(200, 20, 0, 0), post(300, 30, 0, 0)];
        let stats = AggregateStrategy::aggregate(&posts);

        assert_eq!(stats.total_likes, 600);
        assert_eq!(stats.total_comments, 60);
        assert_eq!(stats.avg_likes_per_post, 200.0);
        assert_eq!(stats.max_likes_per_post, 300);
        assert_eq!(stats.avg_comments_per_post, 20.0);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(AggregateStrategy::aggregate(&[]), AggregateStats::default());
    }

    #[test]
    fn aggregate_average_is_not_truncated() {
        let stats = AggregateStrategy::aggregate(&[post(1, 1, 0, 0), post(2, 0, 0, 0)]);
        assert_eq!(stats.avg_likes_per_post, 1.5);
        assert_eq!(stats.avg_comments_per_post, 0.5);
    }

    // --- Engagement ---

    #[test]
    fn engagement_of_one_post() {
        let rate = EngagementStrategy::engagement(&[post(10, 2, 100, 5)]);

        assert_eq!(rate.total_engagement, 17);
        assert_eq!(rate.avg_views, 100);
        assert_eq!(rate.like_to_comment_ratio, 5.0);
    }

    #[test]
    fn ratio_without_comments_is_zero() {
        let rate = EngagementStrategy::engagement(&[post(10, 0, 100, 5)]);
        assert_eq!(rate.like_to_comment_ratio, 0.0);
        assert_eq!(rate.total_engagement, 15);
    }

    #[test]
    fn average_views_truncate() {
        let rate = EngagementStrategy::engagement(&[post(0, 0, 10, 0), post(0, 0, 15, 0)]);
        assert_eq!(rate.avg_views, 12);
    }

    #[test]
    fn engagement_of_nothing_is_zero() {
        assert_eq!(EngagementStrategy::engagement(&[]), EngagementRate::default());
    }

    // --- Performance ---

    #[test]
    fn performance_spread() {
        let stats = PerformanceStrategy::performance(&likes(&[50, 100, 150]));

        assert_eq!(stats.top_post_likes, 150);
        assert_eq!(stats.bottom_post_likes, 50);
        assert_eq!(stats.post_count, 3);
        assert!((stats.variance_in_likes - 1666.6667).abs() < 0.001);
    }

    #[test]
    fn variance_uses_truncated_mean() {
        // Mean is 1.5, truncated to 1: deviations 0 and 1 → 0.5.
        // Around the exact mean it would be 0.25.
        let stats = PerformanceStrategy::performance(&likes(&[1, 2]));
        assert_eq!(stats.variance_in_likes, 0.5);
    }

    #[test]
    fn huge_like_counts_do_not_overflow() {
        let stats = PerformanceStrategy::performance(&likes(&[0, 10_000_000_000]));
        assert_eq!(stats.top_post_likes, 10_000_000_000);
        assert_eq!(stats.bottom_post_likes, 0);
        assert_eq!(stats.variance_in_likes, 2.5e19);
    }

    #[test]
    fn totals_saturate_at_the_counter_limit() {
        let posts = vec![post(i64::MAX, i64::MAX, i64::MAX, 1), post(1, 1, 1, 1)];

        let aggregate = AggregateStrategy::aggregate(&posts);
        assert_eq!(aggregate.total_likes, i64::MAX);
        assert_eq!(aggregate.total_comments, i64::MAX);
        assert_eq!(aggregate.max_likes_per_post, i64::MAX);

        let rate = EngagementStrategy::engagement(&posts);
        assert_eq!(rate.total_engagement, i64::MAX);
        assert_eq!(rate.avg_views, i64::MAX / 2);
        assert_eq!(rate.like_to_comment_ratio, 1.0);

        let stats = PerformanceStrategy::performance(&posts);
        assert!(stats.variance_in_likes.is_finite());
    }

    #[test]
    fn single_post_has_no_variance() {
        let stats = PerformanceStrategy::performance(&likes(&[42]));
        assert_eq!(stats.top_post_likes, 42);
        assert_eq!(stats.bottom_post_likes, 42);
        assert_eq!(stats.variance_in_likes, 0.0);
    }

    #[test]
    fn performance_of_nothing_is_zero() {
        assert_eq!(PerformanceStrategy::performance(&[]), PerformanceStats::default());
    }

    // --- Polymorphic use ---

    #[test]
    fn strategies_are_repeatable_in_any_order() {
        let posts = vec![post(10, 2, 100, 5), post(30, 0, 50, 1), post(20, 4, 10, 0)];
        let forward: Vec<MetricSet> = all_strategies().iter().map(|s| s.compute(&posts)).collect();
        let backward: Vec<MetricSet> = all_strategies()
            .iter()
            .rev()
            .map(|s| s.compute(&posts))
            .rev()
            .collect();
        let again: Vec<MetricSet> = all_strategies().iter().map(|s| s.compute(&posts)).collect();

        assert_eq!(forward, backward);
        assert_eq!(forward, again);
    }

    #[test]
    fn compute_wraps_the_typed_result() {
        let posts = likes(&[5, 15]);
        assert_eq!(
            PerformanceStrategy.compute(&posts),
            MetricSet::Performance(PerformanceStrategy::performance(&posts))
        );
        let names: Vec<&str> = all_strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["aggregate", "engagement", "performance"]);
    }
}
