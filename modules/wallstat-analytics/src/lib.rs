pub mod report;
pub mod snapshot;
pub mod strategy;

pub use report::{
    ChartSeries, Dashboard, GroupAnalyticsReport, GroupStats, MAX_CONCURRENT_POST_READS,
    PARSED_AT_PLACEHOLDER,
};
pub use snapshot::StatSnapshot;
pub use strategy::{
    all_strategies, AggregateStats, AggregateStrategy, EngagementRate, EngagementStrategy,
    MetricSet, PerformanceStats, PerformanceStrategy, StatisticsStrategy,
};
