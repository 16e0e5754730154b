// Goal scoring domain
pub mod risk;
pub mod task_mapper;
pub mod types;

pub use risk::assess_goal_risk;
pub use task_mapper::calculate_goal_from_tasks;
pub use types::{
    GoalMathResult, GoalRiskInput, GoalRiskResult, RiskLevel, TaskBreakdown, TaskCompletion,
};
