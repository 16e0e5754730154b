// Performance scoring domain
pub mod benchmark;
pub mod engagement;
pub mod individual;
pub mod team;

pub use benchmark::{
    BatchComparison, Benchmark, BenchmarkComparison, BenchmarkSet, MetricRecord, PerformanceLevel,
    RelativePosition, Segment,
};
pub use engagement::{
    EngagementLevel, EngagementMetrics, EngagementResult, EngagementTrend, calculate_engagement,
    calculate_engagement_with,
};
pub use individual::{
    ComponentScores, FeedbackSignal, GoalScore, PerformanceInputs, PerformanceResult, ReviewInput,
    ReviewType, calculate_performance_score, calculate_performance_score_with,
};
pub use team::{MemberAnalysis, MemberCategory, MemberScore, TeamInput, TeamMathResult, calculate_team_analytics};
