use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single task completion record belonging to a goal.
///
/// `weight` is 0-10, `progress` 0-100, `quality` 0-5 and `complexity` 1-5.
/// `days_late` is negative when the task finished early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub task_id: String,
    pub goal_id: String,
    pub weight: f64,
    pub progress: f64,
    pub quality: f64,
    pub days_late: i32,
    pub complexity: u8,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Per-task contribution to the goal composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub task_id: String,
    pub weighted_contribution: f64,
    pub quality_impact: f64,
    pub timeliness_impact: f64,
}

/// Goal score aggregated from its child tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMathResult {
    pub goal_id: String,
    pub completion_score: f64,
    pub quality_adjusted_score: f64,
    /// In (-1, +1): positive when tasks land early on average
    pub timeliness_factor: f64,
    pub composite_score: f64,
    /// Progress points per day
    pub velocity: f64,
    pub predicted_completion_date: Option<DateTime<Utc>>,
    pub risk_score: f64,
    pub efficiency: f64,
    pub task_breakdown: Vec<TaskBreakdown>,
}

impl GoalMathResult {
    /// Neutral result for a goal without tasks.
    pub fn empty(goal_id: impl Into<String>) -> Self {
        Self {
            goal_id: goal_id.into(),
            completion_score: 0.0,
            quality_adjusted_score: 0.0,
            timeliness_factor: 0.0,
            composite_score: 0.0,
            velocity: 0.0,
            predicted_completion_date: None,
            risk_score: 50.0,
            efficiency: 0.0,
            task_breakdown: Vec::new(),
        }
    }
}

/// Risk classification for a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// LOW < 25 <= MEDIUM < 50 <= HIGH < 75 <= CRITICAL
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Inputs to the goal risk assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRiskInput {
    /// Current progress 0-100
    pub progress: f64,
    pub days_remaining: f64,
    pub total_days: f64,
    /// Progress points per day, oldest first
    #[serde(default)]
    pub velocity_history: Vec<f64>,
    /// Risk of each upstream dependency, 0-100
    #[serde(default)]
    pub dependency_risks: Vec<f64>,
    /// 1-5
    pub complexity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRiskResult {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub schedule_risk: f64,
    pub velocity_risk: f64,
    pub dependency_risk: f64,
    pub complexity_risk: f64,
    /// Progress expected at the deadline if the current pace holds
    pub projected_completion: f64,
    pub required_velocity: f64,
    pub current_velocity: f64,
    pub days_needed_at_current_pace: Option<f64>,
}
