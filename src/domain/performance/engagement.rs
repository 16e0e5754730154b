//! Engagement scoring from activity counters.
//!
//! Five components (participation, communication, collaboration, initiative,
//! responsiveness) are each scored on 0-100 from capped activity ratios and
//! blended with configurable weights. A separate additive risk tally flags
//! people drifting toward disengagement.

use crate::domain::config::{EngagementConfig, EngagementWeights};
use crate::domain::goals::RiskLevel;
use crate::domain::stats::{clamp_pct, round_to};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Score change beyond which the trend is no longer stable
const TREND_THRESHOLD: f64 = 5.0;

const LOW_OVERALL: f64 = 40.0;
const DECLINING_TREND: f64 = -10.0;
const LOW_PARTICIPATION: f64 = 30.0;
const LOW_COMMUNICATION: f64 = 30.0;
const LOW_INITIATIVE: f64 = 20.0;
const LOW_RESPONSIVENESS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipationActivity {
    pub meetings_attended: u32,
    pub total_meetings: u32,
    /// Share of meetings with an active contribution, 0..1
    pub meeting_participation_rate: f64,
    pub forum_posts: u32,
    pub events_attended: u32,
    pub surveys_completed: u32,
    pub total_surveys: u32,
}

impl Default for ParticipationActivity {
    fn default() -> Self {
        Self {
            meetings_attended: 0,
            total_meetings: 0,
            meeting_participation_rate: 0.5,
            forum_posts: 0,
            events_attended: 0,
            surveys_completed: 0,
            total_surveys: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationActivity {
    pub messages_sent: u32,
    pub expected_messages_per_week: f64,
    pub responses_to_mentions: u32,
    pub total_mentions: u32,
    /// 0..1
    pub clarity: f64,
    pub reactions_given: u32,
}

impl Default for CommunicationActivity {
    fn default() -> Self {
        Self {
            messages_sent: 0,
            expected_messages_per_week: 50.0,
            responses_to_mentions: 0,
            total_mentions: 0,
            clarity: 0.7,
            reactions_given: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborationActivity {
    pub code_reviews_given: u32,
    pub pair_programming_sessions: u32,
    pub knowledge_contributions: u32,
    pub cross_team_collaborations: u32,
    pub mentoring_sessions: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitiativeActivity {
    pub self_initiated_tasks: u32,
    pub improvements_suggested: u32,
    pub voluntary_contributions: u32,
    pub proactive_problem_solving: u32,
    pub learning_activities: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsivenessActivity {
    pub avg_response_time_hours: f64,
    /// Share of messages answered, 0..1
    pub response_rate: f64,
    /// Share of working hours online, 0..1
    pub availability: f64,
    pub acknowledgment_rate: f64,
}

impl Default for ResponsivenessActivity {
    fn default() -> Self {
        Self {
            avg_response_time_hours: 24.0,
            response_rate: 0.7,
            availability: 0.8,
            acknowledgment_rate: 0.6,
        }
    }
}

/// When and how activity happens; descriptive only, not scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPattern {
    /// Activity count per hour label
    pub hourly_activity: BTreeMap<String, f64>,
    /// Activity count per weekday label
    pub daily_activity: BTreeMap<String, f64>,
    pub activity_variance: f64,
    pub synchronous_pct: f64,
    pub asynchronous_pct: f64,
    pub total_activities: u32,
    pub active_days: u32,
    pub avg_daily_activities: f64,
    pub consistency_score: f64,
}

impl Default for ActivityPattern {
    fn default() -> Self {
        Self {
            hourly_activity: BTreeMap::new(),
            daily_activity: BTreeMap::new(),
            activity_variance: 0.0,
            synchronous_pct: 0.0,
            asynchronous_pct: 0.0,
            total_activities: 0,
            active_days: 0,
            avg_daily_activities: 0.0,
            consistency_score: 50.0,
        }
    }
}

/// Earlier engagement readings used for the trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementHistory {
    pub current_score: f64,
    pub previous_score: f64,
    pub week_ago_score: f64,
    /// Longer-run trend of the score; below -10 counts as a risk factor
    pub trend: f64,
}

impl Default for EngagementHistory {
    fn default() -> Self {
        Self {
            current_score: 50.0,
            previous_score: 50.0,
            week_ago_score: 50.0,
            trend: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementMetrics {
    pub participation: ParticipationActivity,
    pub communication: CommunicationActivity,
    pub collaboration: CollaborationActivity,
    pub initiative: InitiativeActivity,
    pub responsiveness: ResponsivenessActivity,
    pub pattern: ActivityPattern,
    pub history: EngagementHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementLevel {
    VeryHigh,
    High,
    Moderate,
    Low,
    VeryLow,
}

impl EngagementLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            EngagementLevel::VeryHigh
        } else if score >= 65.0 {
            EngagementLevel::High
        } else if score >= 45.0 {
            EngagementLevel::Moderate
        } else if score >= 30.0 {
            EngagementLevel::Low
        } else {
            EngagementLevel::VeryLow
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementTrend {
    Improving,
    Stable,
    Declining,
}

impl EngagementTrend {
    pub fn from_change(change: f64) -> Self {
        if change > TREND_THRESHOLD {
            EngagementTrend::Improving
        } else if change < -TREND_THRESHOLD {
            EngagementTrend::Declining
        } else {
            EngagementTrend::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementComponents {
    pub participation: f64,
    pub communication: f64,
    pub collaboration: f64,
    pub initiative: f64,
    pub responsiveness: f64,
}

impl EngagementComponents {
    fn as_array(&self) -> [f64; 5] {
        [
            self.participation,
            self.communication,
            self.collaboration,
            self.initiative,
            self.responsiveness,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub total_activities: u32,
    pub active_days: u32,
    pub avg_daily_activities: f64,
    pub consistency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementPatterns {
    pub peak_activity_hour: Option<String>,
    pub most_active_day: Option<String>,
    /// 100 minus the capped activity variance
    pub consistency_score: f64,
    pub synchronous_pct: f64,
    pub asynchronous_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementResult {
    pub overall_score: f64,
    pub level: EngagementLevel,
    pub components: EngagementComponents,
    pub activity_summary: ActivitySummary,
    pub patterns: EngagementPatterns,
    pub trend_direction: EngagementTrend,
    pub change_from_previous: f64,
    pub week_over_week_change: f64,
    pub risk_factors: Vec<String>,
    pub at_risk: bool,
    /// Additive disengagement risk tally
    pub risk_points: u32,
    pub risk_level: RiskLevel,
}

/// Score engagement with the default component weights.
pub fn calculate_engagement(metrics: &EngagementMetrics) -> EngagementResult {
    calculate_engagement_with(metrics, &EngagementConfig::default())
}

/// Score engagement from activity counters.
pub fn calculate_engagement_with(
    metrics: &EngagementMetrics,
    config: &EngagementConfig,
) -> EngagementResult {
    let components = EngagementComponents {
        participation: score_participation(&metrics.participation),
        communication: score_communication(&metrics.communication),
        collaboration: score_collaboration(&metrics.collaboration),
        initiative: score_initiative(&metrics.initiative),
        responsiveness: score_responsiveness(&metrics.responsiveness),
    };
    let overall = blend(&components, &config.weights);

    let history = &metrics.history;
    let change = history.current_score - history.previous_score;
    let week_over_week = history.current_score - history.week_ago_score;

    let (risk_factors, risk_points) = assess_risk(overall, &components, history.trend);
    let risk_level = disengagement_level(risk_points);

    debug!(
        "Engagement: overall={:.2} risk_points={} level={:?}",
        overall, risk_points, risk_level
    );

    EngagementResult {
        overall_score: round_to(overall, 2),
        level: EngagementLevel::from_score(overall),
        components: EngagementComponents {
            participation: round_to(components.participation, 2),
            communication: round_to(components.communication, 2),
            collaboration: round_to(components.collaboration, 2),
            initiative: round_to(components.initiative, 2),
            responsiveness: round_to(components.responsiveness, 2),
        },
        activity_summary: summarize(&metrics.pattern),
        patterns: patterns(&metrics.pattern),
        trend_direction: EngagementTrend::from_change(change),
        change_from_previous: round_to(change, 2),
        week_over_week_change: round_to(week_over_week, 2),
        risk_factors,
        at_risk: risk_level != RiskLevel::Low,
        risk_points,
        risk_level,
    }
}

fn blend(components: &EngagementComponents, weights: &EngagementWeights) -> f64 {
    clamp_pct(
        components
            .as_array()
            .iter()
            .zip(weights.as_array())
            .map(|(score, weight)| score * weight)
            .sum(),
    )
}

/// `count / target`, capped at 1
fn capped(count: u32, target: f64) -> f64 {
    (f64::from(count) / target).min(1.0)
}

/// `done / total` with an empty total counted as 1, capped at 1
fn completion_rate(done: u32, total: u32) -> f64 {
    (f64::from(done) / f64::from(total.max(1))).min(1.0)
}

fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn score_participation(activity: &ParticipationActivity) -> f64 {
    let score = completion_rate(activity.meetings_attended, activity.total_meetings) * 30.0
        + unit(activity.meeting_participation_rate) * 25.0
        + capped(activity.forum_posts, 10.0) * 20.0
        + capped(activity.events_attended, 5.0) * 15.0
        + completion_rate(activity.surveys_completed, activity.total_surveys) * 10.0;
    clamp_pct(score)
}

fn score_communication(activity: &CommunicationActivity) -> f64 {
    // Volume may exceed expectations by half before it stops counting
    let message_rate = if activity.expected_messages_per_week > 0.0 {
        (f64::from(activity.messages_sent) / activity.expected_messages_per_week).min(1.5)
    } else {
        0.0
    };
    let score = (message_rate * 30.0).min(40.0)
        + completion_rate(activity.responses_to_mentions, activity.total_mentions) * 25.0
        + unit(activity.clarity) * 20.0
        + capped(activity.reactions_given, 20.0) * 15.0;
    clamp_pct(score)
}

fn score_collaboration(activity: &CollaborationActivity) -> f64 {
    let score = capped(activity.code_reviews_given, 10.0) * 25.0
        + capped(activity.pair_programming_sessions, 5.0) * 20.0
        + capped(activity.knowledge_contributions, 3.0) * 20.0
        + capped(activity.cross_team_collaborations, 5.0) * 20.0
        + capped(activity.mentoring_sessions, 3.0) * 15.0;
    clamp_pct(score)
}

fn score_initiative(activity: &InitiativeActivity) -> f64 {
    let score = capped(activity.self_initiated_tasks, 3.0) * 30.0
        + capped(activity.improvements_suggested, 2.0) * 25.0
        + capped(activity.voluntary_contributions, 3.0) * 20.0
        + capped(activity.proactive_problem_solving, 3.0) * 15.0
        + capped(activity.learning_activities, 2.0) * 10.0;
    clamp_pct(score)
}

fn score_responsiveness(activity: &ResponsivenessActivity) -> f64 {
    let hours = activity.avg_response_time_hours;
    let speed = if hours <= 2.0 {
        40.0
    } else if hours <= 8.0 {
        30.0
    } else if hours <= 24.0 {
        20.0
    } else {
        10.0
    };
    let score = speed
        + unit(activity.response_rate) * 30.0
        + unit(activity.availability) * 20.0
        + unit(activity.acknowledgment_rate) * 10.0;
    clamp_pct(score)
}

fn assess_risk(overall: f64, components: &EngagementComponents, trend: f64) -> (Vec<String>, u32) {
    let checks = [
        (overall < LOW_OVERALL, "Overall engagement below threshold", 30),
        (trend < DECLINING_TREND, "Declining engagement trend", 20),
        (
            components.participation < LOW_PARTICIPATION,
            "Very low participation in meetings and activities",
            15,
        ),
        (
            components.communication < LOW_COMMUNICATION,
            "Minimal communication with team",
            15,
        ),
        (components.initiative < LOW_INITIATIVE, "Lack of proactive behavior", 10),
        (
            components.responsiveness < LOW_RESPONSIVENESS,
            "Slow or no responses to communications",
            10,
        ),
    ];

    let mut factors = Vec::new();
    let mut points = 0;
    for (triggered, factor, weight) in checks {
        if triggered {
            factors.push(factor.to_string());
            points += weight;
        }
    }
    (factors, points)
}

/// LOW < 15 <= MEDIUM < 30 <= HIGH < 50 <= CRITICAL
pub fn disengagement_level(risk_points: u32) -> RiskLevel {
    if risk_points >= 50 {
        RiskLevel::Critical
    } else if risk_points >= 30 {
        RiskLevel::High
    } else if risk_points >= 15 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Label with the highest count; the first label wins ties.
fn busiest(distribution: &BTreeMap<String, f64>) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (label, &count) in distribution {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label.clone())
}

fn patterns(pattern: &ActivityPattern) -> EngagementPatterns {
    EngagementPatterns {
        peak_activity_hour: busiest(&pattern.hourly_activity),
        most_active_day: busiest(&pattern.daily_activity),
        consistency_score: round_to(clamp_pct(100.0 - pattern.activity_variance.min(100.0)), 2),
        synchronous_pct: pattern.synchronous_pct,
        asynchronous_pct: pattern.asynchronous_pct,
    }
}

fn summarize(pattern: &ActivityPattern) -> ActivitySummary {
    ActivitySummary {
        total_activities: pattern.total_activities,
        active_days: pattern.active_days,
        avg_daily_activities: round_to(pattern.avg_daily_activities, 1),
        consistency_score: round_to(pattern.consistency_score, 1),
    }
}
