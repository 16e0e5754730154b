//! The eight CPIS dimension calculators.
//!
//! Each function is independent and total: it scores one slice of a
//! [`CpisInput`](super::CpisInput) on 0-100 and reports whether the slice held
//! enough data to be counted. Weights are applied later by the engine.

use super::types::{
    CollaborationCounters, ConsistencyCounters, CpisDimension, CpisFeedback, CpisGoal, CpisReview,
    CpisReviewType, DimensionCode, EvidenceCounters, GrowthCounters, InitiativeCounters,
};
use crate::domain::stats::{
    bounded_sigmoid, clamp_pct, ewma, mean, sigmoid, sigmoid_with, trend, weighted_harmonic_mean,
    weighted_mean,
};
use std::collections::BTreeMap;
use tracing::debug;

const FEEDBACK_EWMA_ALPHA: f64 = 0.35;
const NEUTRAL_FEEDBACK_SCORE: f64 = 50.0;
const NEUTRAL_DEADLINE_SCORE: f64 = 75.0;
const NEUTRAL_GROWTH_TREND: f64 = 50.0;
const MAX_ALIGNMENT_BONUS: f64 = 1.15;

/// (k, x0) logistic normalizer per collaboration channel, with its sub-weight
const CIS_CHANNELS: [(&str, f64, f64, f64); 6] = [
    ("crossFunctional", 0.8, 2.0, 0.20),
    ("feedbackGiven", 0.4, 5.0, 0.15),
    ("feedbackReceived", 0.4, 5.0, 0.15),
    ("oneOnOnes", 0.5, 4.0, 0.15),
    ("recognitionsGiven", 0.6, 3.0, 0.15),
    ("teamContributions", 0.3, 8.0, 0.20),
];

/// (k, x0) logistic normalizer per initiative counter, with its weight
const III_COUNTERS: [(&str, f64, f64, f64); 5] = [
    ("innovation", 0.5, 3.0, 0.25),
    ("mentoring", 0.4, 4.0, 0.20),
    ("knowledgeSharing", 0.5, 3.0, 0.20),
    ("processImprovements", 0.6, 2.0, 0.15),
    ("voluntaryGoals", 0.6, 2.0, 0.20),
];

fn dimension(
    code: DimensionCode,
    raw_score: f64,
    has_data: bool,
    sub_metrics: BTreeMap<String, f64>,
) -> CpisDimension {
    if !has_data {
        debug!("{} has no data", code.as_str());
    }
    CpisDimension::new(code, clamp_pct(raw_score), has_data, sub_metrics)
}

fn metrics<const N: usize>(entries: [(&str, f64); N]) -> BTreeMap<String, f64> {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Goal Attainment Index.
pub fn compute_gai(goals: &[CpisGoal]) -> CpisDimension {
    if goals.is_empty() {
        return dimension(DimensionCode::Gai, 0.0, false, metrics([("goalCount", 0.0)]));
    }

    let mut values = Vec::with_capacity(goals.len());
    let mut timeliness = Vec::with_capacity(goals.len());
    for goal in goals {
        let timeliness_factor = bounded_sigmoid(-goal.days_late, 0.6, 1.4, 0.15, 0.0);
        let alignment_bonus = (1.0 + 0.03 * goal.alignment_depth as f64).min(MAX_ALIGNMENT_BONUS);
        let complexity_bonus = 1.0 + 0.0125 * (goal.complexity.clamp(1.0, 5.0) - 1.0);
        values.push(
            clamp_pct(goal.progress)
                * goal.priority.multiplier()
                * timeliness_factor
                * alignment_bonus
                * complexity_bonus,
        );
        timeliness.push(timeliness_factor);
    }
    let weights: Vec<f64> = goals.iter().map(|g| g.weight.max(0.0)).collect();
    let progress: Vec<f64> = goals.iter().map(|g| clamp_pct(g.progress)).collect();

    dimension(
        DimensionCode::Gai,
        weighted_mean(&values, &weights),
        true,
        metrics([
            ("goalCount", goals.len() as f64),
            ("avgProgress", mean(&progress)),
            ("avgTimeliness", mean(&timeliness)),
        ]),
    )
}

/// Review Quality Score.
pub fn compute_rqs(reviews: &[CpisReview]) -> CpisDimension {
    if reviews.is_empty() {
        return dimension(DimensionCode::Rqs, 0.0, false, metrics([("reviewCount", 0.0)]));
    }

    let values: Vec<f64> = reviews
        .iter()
        .map(|r| r.rating.clamp(1.0, 5.0) * (1.0 - 0.5 * r.bias_score.clamp(0.0, 1.0)))
        .collect();
    let weights: Vec<f64> = reviews
        .iter()
        .map(|r| r.reviewer_trust.clamp(0.0, 100.0) * r.review_type.weight())
        .collect();
    let harmonic = weighted_harmonic_mean(&values, &weights);

    let ratings: Vec<f64> = reviews.iter().map(|r| r.rating).collect();
    let biases: Vec<f64> = reviews.iter().map(|r| r.bias_score).collect();
    let self_reviews = reviews
        .iter()
        .filter(|r| r.review_type == CpisReviewType::SelfReview)
        .count();

    dimension(
        DimensionCode::Rqs,
        harmonic / 5.0 * 100.0,
        true,
        metrics([
            ("reviewCount", reviews.len() as f64),
            ("avgRating", mean(&ratings)),
            ("avgBiasScore", mean(&biases)),
            ("selfReviewCount", self_reviews as f64),
        ]),
    )
}

/// Feedback Sentiment Index. Neutral 50 without feedback.
pub fn compute_fsi(feedbacks: &[CpisFeedback]) -> CpisDimension {
    if feedbacks.is_empty() {
        return dimension(
            DimensionCode::Fsi,
            NEUTRAL_FEEDBACK_SCORE,
            false,
            metrics([("feedbackCount", 0.0)]),
        );
    }

    let mut ordered: Vec<&CpisFeedback> = feedbacks.iter().collect();
    ordered.sort_by_key(|f| f.created_at);

    let values: Vec<f64> = ordered
        .iter()
        .map(|f| {
            let mut multiplier = 1.0;
            if f.has_skill_tag {
                multiplier += 0.1;
            }
            if f.has_value_tag {
                multiplier += 0.1;
            }
            (f.sentiment.clamp(-1.0, 1.0) * multiplier).clamp(-1.0, 1.0)
        })
        .collect();
    let smoothed = ewma(&values, FEEDBACK_EWMA_ALPHA);

    let sentiments: Vec<f64> = feedbacks.iter().map(|f| f.sentiment).collect();
    let tagged = feedbacks
        .iter()
        .filter(|f| f.has_skill_tag || f.has_value_tag)
        .count();

    dimension(
        DimensionCode::Fsi,
        (smoothed + 1.0) / 2.0 * 100.0,
        true,
        metrics([
            ("feedbackCount", feedbacks.len() as f64),
            ("avgSentiment", mean(&sentiments)),
            ("ewmaSentiment", smoothed),
            ("taggedRatio", tagged as f64 / feedbacks.len() as f64),
        ]),
    )
}

/// Collaboration Index. Counts as data once total activity reaches `min_activity`.
pub fn compute_cis(counters: &CollaborationCounters, min_activity: u32) -> CpisDimension {
    let counts = [
        counters.cross_functional_goals,
        counters.feedback_given,
        counters.feedback_received,
        counters.one_on_ones,
        counters.recognitions_given,
        counters.team_contributions,
    ];

    let mut sub_metrics = BTreeMap::new();
    let mut raw = 0.0;
    for ((name, k, x0, sub_weight), count) in CIS_CHANNELS.iter().zip(counts) {
        let channel = bounded_sigmoid(count as f64, 0.0, 100.0, *k, *x0);
        raw += sub_weight * channel;
        sub_metrics.insert(name.to_string(), channel);
    }
    let total = counters.total_activity();
    sub_metrics.insert("totalActivity".to_string(), total as f64);

    dimension(DimensionCode::Cis, raw, total >= u64::from(min_activity), sub_metrics)
}

/// Consistency & Reliability Index.
pub fn compute_cri(counters: &ConsistencyCounters) -> CpisDimension {
    let has_deadlines = counters.total_deadlines > 0;
    let on_time_rate = if has_deadlines {
        counters.deadlines_met.min(counters.total_deadlines) as f64
            / counters.total_deadlines as f64
            * 100.0
    } else {
        NEUTRAL_DEADLINE_SCORE
    };
    let deadline_score = if has_deadlines {
        (100.0 - 10.0 * counters.avg_days_overdue.max(0.0)).max(0.0)
    } else {
        NEUTRAL_DEADLINE_SCORE
    };
    let velocity_stability = (1.0 - (counters.velocity_variance.max(0.0) / 50.0).min(1.0)) * 100.0;
    let streak = sigmoid_with(counters.streak_days as f64, 0.1, 14.0) * 100.0;
    let rating_stability = (1.0 - (counters.rating_std_dev.max(0.0) / 2.0).min(1.0)) * 100.0;

    let raw = 0.30 * on_time_rate
        + 0.25 * velocity_stability
        + 0.20 * streak
        + 0.15 * rating_stability
        + 0.10 * deadline_score;

    dimension(
        DimensionCode::Cri,
        raw,
        has_deadlines || counters.streak_days > 0,
        metrics([
            ("onTimeRate", on_time_rate),
            ("velocityStability", velocity_stability),
            ("streak", streak),
            ("ratingStability", rating_stability),
            ("deadlineScore", deadline_score),
        ]),
    )
}

/// Growth Trajectory Score.
pub fn compute_gts(growth: &GrowthCounters) -> CpisDimension {
    let trend_score = if growth.historical_scores.len() >= 2 {
        sigmoid(trend(&growth.historical_scores).slope) * 100.0
    } else {
        NEUTRAL_GROWTH_TREND
    };
    let skills = sigmoid_with(growth.skill_progressions as f64, 0.5, 3.0) * 100.0;
    let training = sigmoid_with(growth.trainings_completed as f64, 0.5, 2.0) * 100.0;
    let dev_plan = clamp_pct(growth.dev_plan_progress);
    let readiness = clamp_pct(growth.promotion_readiness);

    let raw = 0.35 * trend_score + 0.20 * skills + 0.15 * training + 0.15 * dev_plan + 0.15 * readiness;

    let has_data = !growth.historical_scores.is_empty()
        || growth.skill_progressions > 0
        || growth.trainings_completed > 0
        || dev_plan > 0.0
        || readiness > 0.0;

    dimension(
        DimensionCode::Gts,
        raw,
        has_data,
        metrics([
            ("trend", trend_score),
            ("skillProgression", skills),
            ("training", training),
            ("devPlanProgress", dev_plan),
            ("promotionReadiness", readiness),
        ]),
    )
}

/// Evidence Quality Score. Zero without evidence.
pub fn compute_eqs(evidence: &EvidenceCounters) -> CpisDimension {
    if evidence.total == 0 {
        return dimension(DimensionCode::Eqs, 0.0, false, metrics([("evidenceCount", 0.0)]));
    }

    let verification_rate =
        evidence.verified.min(evidence.total) as f64 / evidence.total as f64 * 100.0;
    let diversity = sigmoid_with(evidence.evidence_types as f64, 0.5, 3.0) * 100.0;
    let raw = 0.25 * verification_rate
        + 0.30 * clamp_pct(evidence.avg_impact)
        + 0.25 * clamp_pct(evidence.avg_quality)
        + 0.20 * diversity;

    dimension(
        DimensionCode::Eqs,
        raw,
        true,
        metrics([
            ("evidenceCount", evidence.total as f64),
            ("verificationRate", verification_rate),
            ("typeDiversity", diversity),
        ]),
    )
}

/// Initiative & Innovation Index.
pub fn compute_iii(initiative: &InitiativeCounters) -> CpisDimension {
    let counts = [
        initiative.innovation_ideas,
        initiative.mentoring_sessions,
        initiative.knowledge_shares,
        initiative.process_improvements,
        initiative.voluntary_goals,
    ];

    let mut sub_metrics = BTreeMap::new();
    let mut raw = 0.0;
    for ((name, k, x0, weight), count) in III_COUNTERS.iter().zip(counts) {
        let normalized = sigmoid_with(count as f64, *k, *x0) * 100.0;
        raw += weight * normalized;
        sub_metrics.insert(name.to_string(), normalized);
    }

    dimension(DimensionCode::Iii, raw, counts.iter().any(|&c| c > 0), sub_metrics)
}
