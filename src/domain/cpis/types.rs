use super::grade::Grade;
use crate::domain::config::DimensionWeights;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The eight CPIS dimensions, in scoring order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DimensionCode {
    Gai,
    Rqs,
    Fsi,
    Cis,
    Cri,
    Gts,
    Eqs,
    Iii,
}

impl DimensionCode {
    pub const ALL: [DimensionCode; 8] = [
        DimensionCode::Gai,
        DimensionCode::Rqs,
        DimensionCode::Fsi,
        DimensionCode::Cis,
        DimensionCode::Cri,
        DimensionCode::Gts,
        DimensionCode::Eqs,
        DimensionCode::Iii,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DimensionCode::Gai => "Goal Attainment",
            DimensionCode::Rqs => "Review Quality",
            DimensionCode::Fsi => "Feedback Sentiment",
            DimensionCode::Cis => "Collaboration",
            DimensionCode::Cri => "Consistency",
            DimensionCode::Gts => "Growth",
            DimensionCode::Eqs => "Evidence Quality",
            DimensionCode::Iii => "Initiative",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionCode::Gai => "GAI",
            DimensionCode::Rqs => "RQS",
            DimensionCode::Fsi => "FSI",
            DimensionCode::Cis => "CIS",
            DimensionCode::Cri => "CRI",
            DimensionCode::Gts => "GTS",
            DimensionCode::Eqs => "EQS",
            DimensionCode::Iii => "III",
        }
    }

    /// Weight of this dimension in a weight table
    pub fn weight_in(&self, weights: &DimensionWeights) -> f64 {
        match self {
            DimensionCode::Gai => weights.gai,
            DimensionCode::Rqs => weights.rqs,
            DimensionCode::Fsi => weights.fsi,
            DimensionCode::Cis => weights.cis,
            DimensionCode::Cri => weights.cri,
            DimensionCode::Gts => weights.gts,
            DimensionCode::Eqs => weights.eqs,
            DimensionCode::Iii => weights.iii,
        }
    }

    pub fn base_weight(&self) -> f64 {
        self.weight_in(&DimensionWeights::default())
    }
}

/// One scored CPIS dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpisDimension {
    pub name: String,
    pub code: DimensionCode,
    /// 0-100
    pub raw_score: f64,
    /// Weight as actually applied (after re-weighting)
    pub weight: f64,
    pub weighted_score: f64,
    pub grade: Grade,
    /// False when the dimension lacks enough data to be scored
    pub has_data: bool,
    pub sub_metrics: BTreeMap<String, f64>,
}

impl CpisDimension {
    /// Dimension at its base weight.
    pub fn new(
        code: DimensionCode,
        raw_score: f64,
        has_data: bool,
        sub_metrics: BTreeMap<String, f64>,
    ) -> Self {
        let weight = code.base_weight();
        Self {
            name: code.name().to_string(),
            code,
            raw_score,
            weight,
            weighted_score: raw_score * weight,
            grade: Grade::from_score(raw_score),
            has_data,
            sub_metrics,
        }
    }

    /// Copy of this dimension carrying a different applied weight.
    pub fn with_weight(&self, weight: f64) -> Self {
        Self {
            weight,
            weighted_score: self.raw_score * weight,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl GoalPriority {
    pub fn multiplier(&self) -> f64 {
        match self {
            GoalPriority::Low => 0.85,
            GoalPriority::Medium => 1.0,
            GoalPriority::High => 1.15,
            GoalPriority::Critical => 1.35,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

fn default_complexity() -> f64 {
    3.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpisGoal {
    /// 0-100
    pub progress: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub priority: GoalPriority,
    /// Negative when delivered early
    #[serde(default)]
    pub days_late: f64,
    /// Depth of the goal in the alignment tree (0 = standalone)
    #[serde(default)]
    pub alignment_depth: u32,
    /// 1-5
    #[serde(default = "default_complexity")]
    pub complexity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CpisReviewType {
    Manager,
    ThreeSixty,
    Peer,
    Upward,
    External,
    #[serde(rename = "SELF")]
    SelfReview,
}

impl CpisReviewType {
    pub fn weight(&self) -> f64 {
        match self {
            CpisReviewType::Manager => 1.5,
            CpisReviewType::ThreeSixty => 1.3,
            CpisReviewType::Peer => 1.0,
            CpisReviewType::Upward => 0.9,
            CpisReviewType::External => 0.8,
            CpisReviewType::SelfReview => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpisReview {
    /// 1-5
    pub rating: f64,
    /// 0-100
    pub reviewer_trust: f64,
    pub review_type: CpisReviewType,
    /// 0..1, produced by the upstream bias detector
    #[serde(default)]
    pub bias_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpisFeedback {
    /// -1..1
    pub sentiment: f64,
    #[serde(default)]
    pub has_skill_tag: bool,
    #[serde(default)]
    pub has_value_tag: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborationCounters {
    pub cross_functional_goals: u32,
    pub feedback_given: u32,
    pub feedback_received: u32,
    pub one_on_ones: u32,
    pub recognitions_given: u32,
    pub team_contributions: u32,
}

impl CollaborationCounters {
    /// Sum of all six channels, widened so saturated counters cannot overflow.
    pub fn total_activity(&self) -> u64 {
        [
            self.cross_functional_goals,
            self.feedback_given,
            self.feedback_received,
            self.one_on_ones,
            self.recognitions_given,
            self.team_contributions,
        ]
        .into_iter()
        .map(u64::from)
        .sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyCounters {
    pub total_deadlines: u32,
    pub deadlines_met: u32,
    /// Mean days overdue across missed deadlines
    pub avg_days_overdue: f64,
    /// Variance of weekly velocity
    pub velocity_variance: f64,
    pub streak_days: u32,
    /// Standard deviation of received ratings
    pub rating_std_dev: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthCounters {
    /// Prior period CPIS scores, oldest first
    pub historical_scores: Vec<f64>,
    pub skill_progressions: u32,
    pub trainings_completed: u32,
    /// 0-100
    pub dev_plan_progress: f64,
    /// 0-100
    pub promotion_readiness: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceCounters {
    pub total: u32,
    pub verified: u32,
    /// 0-100
    pub avg_impact: f64,
    /// 0-100
    pub avg_quality: f64,
    /// Number of distinct evidence types submitted
    pub evidence_types: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitiativeCounters {
    pub innovation_ideas: u32,
    pub mentoring_sessions: u32,
    pub knowledge_shares: u32,
    pub process_improvements: u32,
    pub voluntary_goals: u32,
}

/// Everything CPIS needs for one person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpisInput {
    pub goals: Vec<CpisGoal>,
    pub reviews: Vec<CpisReview>,
    pub feedbacks: Vec<CpisFeedback>,
    pub collaboration: CollaborationCounters,
    pub consistency: ConsistencyCounters,
    pub growth: GrowthCounters,
    pub evidence: EvidenceCounters,
    pub initiative: InitiativeCounters,
    pub tenure_years: f64,
    /// Job level. Carried through for callers that group results; no
    /// calculator reads it.
    pub level: u8,
    pub department_avg: Option<f64>,
    pub org_avg: Option<f64>,
}

impl CpisInput {
    /// Goals + reviews + feedback entries
    pub fn evidence_data_points(&self) -> usize {
        self.goals.len() + self.reviews.len() + self.feedbacks.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BiasFlag {
    /// At least one review carries a high bias score
    FlaggedReviews,
    SelfReviewInflation,
    DisparateImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessAnalysis {
    pub bias_detected: bool,
    /// Net score delta from Bayesian shrinkage
    pub adjustment_applied: f64,
    pub disparate_impact_ratio: f64,
    pub bias_flags: Vec<BiasFlag>,
    /// 0..1
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub level: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub data_points: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajectoryDirection {
    Improving,
    Stable,
    Declining,
}

impl TrajectoryDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 1.0 {
            TrajectoryDirection::Improving
        } else if slope < -1.0 {
            TrajectoryDirection::Declining
        } else {
            TrajectoryDirection::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub slope: f64,
    pub direction: TrajectoryDirection,
    pub predicted_next: f64,
    pub r_squared: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpisResult {
    /// Final score, 0-100
    pub score: f64,
    /// Score before fairness correction
    pub raw_score: f64,
    pub grade: Grade,
    /// 1-5
    pub star_rating: u8,
    pub rank_label: String,
    pub dimensions: Vec<CpisDimension>,
    pub fairness: FairnessAnalysis,
    pub confidence_interval: ConfidenceInterval,
    pub trajectory: Trajectory,
    /// Dimension names
    pub strengths: Vec<String>,
    /// Dimension names
    pub growth_areas: Vec<String>,
    pub formula_breakdown: String,
}
