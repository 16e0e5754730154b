use crate::config::ScoringConfig;
use crate::domain::cpis::{CpisInput, CpisResult, compute_cpis_with};
use crate::domain::goals::{
    GoalMathResult, GoalRiskInput, GoalRiskResult, TaskCompletion, assess_goal_risk,
    calculate_goal_from_tasks,
};
use crate::domain::performance::{
    EngagementMetrics, EngagementResult, MemberScore, PerformanceInputs, PerformanceResult,
    TeamInput, TeamMathResult, calculate_engagement_with, calculate_performance_score_with,
    calculate_team_analytics,
};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One subject's input in a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject<T> {
    pub subject_id: String,
    pub input: T,
}

/// One subject's result, tagged with its id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored<T> {
    pub subject_id: String,
    pub result: T,
}

/// Tasks of one goal to aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalTasks {
    pub goal_id: String,
    pub tasks: Vec<TaskCompletion>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Team analytics over a roster together with each member's CPIS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    pub members: Vec<Scored<CpisResult>>,
    pub analytics: TeamMathResult,
}

/// Parallel scorer for many subjects at once.
///
/// Calculators are pure, so each subject is an independent unit of work on
/// the rayon pool. Output order always matches input order.
pub struct BatchScorer {
    config: ScoringConfig,
}

impl BatchScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// CPIS for every person in the roster.
    pub fn score_roster(&self, roster: &[Subject<CpisInput>]) -> Vec<Scored<CpisResult>> {
        info!("Scoring CPIS for {} people", roster.len());
        roster
            .par_iter()
            .map(|subject| Scored {
                subject_id: subject.subject_id.clone(),
                result: compute_cpis_with(&subject.input, &self.config.cpis),
            })
            .collect()
    }

    pub fn score_individuals(
        &self,
        subjects: &[Subject<PerformanceInputs>],
    ) -> Vec<Scored<PerformanceResult>> {
        info!("Scoring {} individuals", subjects.len());
        subjects
            .par_iter()
            .map(|subject| Scored {
                subject_id: subject.subject_id.clone(),
                result: calculate_performance_score_with(&subject.input, &self.config.individual),
            })
            .collect()
    }

    pub fn score_engagement(
        &self,
        subjects: &[Subject<EngagementMetrics>],
    ) -> Vec<Scored<EngagementResult>> {
        info!("Scoring engagement for {} people", subjects.len());
        subjects
            .par_iter()
            .map(|subject| Scored {
                subject_id: subject.subject_id.clone(),
                result: calculate_engagement_with(&subject.input, &self.config.engagement),
            })
            .collect()
    }

    pub fn assess_goal_risks(&self, goals: &[Subject<GoalRiskInput>]) -> Vec<Scored<GoalRiskResult>> {
        goals
            .par_iter()
            .map(|subject| Scored {
                subject_id: subject.subject_id.clone(),
                result: assess_goal_risk(&subject.input),
            })
            .collect()
    }

    /// Task-to-goal aggregation, all goals evaluated at the same `now`.
    pub fn map_goals(&self, goals: &[GoalTasks], now: DateTime<Utc>) -> Vec<GoalMathResult> {
        goals
            .par_iter()
            .map(|goal| calculate_goal_from_tasks(&goal.goal_id, &goal.tasks, goal.due_date, now))
            .collect()
    }

    /// Score a roster and feed the CPIS scores into team analytics.
    pub fn team_from_roster(
        &self,
        roster: &[Subject<CpisInput>],
        historical_averages: &[f64],
    ) -> TeamReport {
        let members = self.score_roster(roster);
        let team_input = TeamInput {
            members: members
                .iter()
                .map(|m| MemberScore {
                    member_id: m.subject_id.clone(),
                    score: m.result.score,
                })
                .collect(),
            historical_averages: historical_averages.to_vec(),
        };
        let analytics = calculate_team_analytics(&team_input);
        TeamReport { members, analytics }
    }
}

impl Default for BatchScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
