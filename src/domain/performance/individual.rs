//! Individual performance scoring with dynamic weight redistribution.
//!
//! Five data sources (goals, reviews, feedback, attendance, collaboration)
//! are blended with base weights. When a source is entirely absent its
//! weight moves to the present sources along a fixed per-source split, so
//! the effective weights always sum to 1.

use crate::domain::config::{IndividualConfig, SourceWeights};
use crate::domain::stats::{clamp_pct, ewma, mean, percentile_rank, sigmoid_with, weighted_mean};
use serde::{Deserialize, Serialize};
use tracing::debug;

const FEEDBACK_EWMA_ALPHA: f64 = 0.3;
const NEUTRAL_FEEDBACK_SCORE: f64 = 50.0;

/// Source order used by the redistribution table
const GOALS: usize = 0;
const REVIEWS: usize = 1;
const FEEDBACK: usize = 2;
const ATTENDANCE: usize = 3;
const COLLABORATION: usize = 4;

/// Row = absent source, column = share of its weight each other source receives.
const REDISTRIBUTION: [[f64; 5]; 5] = [
    // goals -> reviews, feedback, attendance, collaboration
    [0.0, 0.50, 0.15, 0.15, 0.20],
    // reviews -> goals, feedback, attendance, collaboration
    [0.60, 0.0, 0.20, 0.05, 0.15],
    // feedback -> goals, reviews, attendance, collaboration
    [0.40, 0.40, 0.0, 0.10, 0.10],
    // attendance -> goals, reviews, feedback, collaboration
    [0.40, 0.30, 0.10, 0.0, 0.20],
    // collaboration -> goals, reviews, feedback, attendance
    [0.40, 0.30, 0.20, 0.10, 0.0],
];

/// Reviewer relationship to the reviewee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewType {
    #[serde(rename = "SELF")]
    SelfReview,
    Peer,
    Manager,
    DirectReport,
}

impl ReviewType {
    pub fn weight(&self) -> f64 {
        match self {
            ReviewType::Manager => 1.5,
            ReviewType::Peer => 1.0,
            ReviewType::DirectReport => 0.8,
            ReviewType::SelfReview => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalScore {
    /// 0-100
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewInput {
    /// 1-5
    pub rating: f64,
    /// 0-100
    pub reviewer_trust: f64,
    pub review_type: ReviewType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSignal {
    /// -1..1
    pub sentiment: f64,
    /// 0 (oldest) ..1 (most recent)
    pub recency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceInputs {
    #[serde(default)]
    pub goals: Vec<GoalScore>,
    #[serde(default)]
    pub reviews: Vec<ReviewInput>,
    #[serde(default)]
    pub feedback: Vec<FeedbackSignal>,
    /// 0..1
    #[serde(default)]
    pub attendance_rate: Option<f64>,
    /// 0-100
    #[serde(default)]
    pub collaboration_score: Option<f64>,
    /// Peer scores used for the percentile
    #[serde(default)]
    pub population: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub goal_attainment: f64,
    pub review_score: f64,
    pub feedback_score: f64,
    pub attendance_score: f64,
    pub collaboration_score: f64,
}

impl ComponentScores {
    fn as_array(&self) -> [f64; 5] {
        [
            self.goal_attainment,
            self.review_score,
            self.feedback_score,
            self.attendance_score,
            self.collaboration_score,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResult {
    pub overall_score: f64,
    pub components: ComponentScores,
    pub percentile: Option<f64>,
    /// 0..1
    pub confidence: f64,
    /// Effective weights after redistribution
    pub weights: SourceWeights,
    /// 1-5
    pub derived_rating: u8,
}

/// Score an individual with the default base weights.
pub fn calculate_performance_score(inputs: &PerformanceInputs) -> PerformanceResult {
    calculate_performance_score_with(inputs, &IndividualConfig::default())
}

pub fn calculate_performance_score_with(
    inputs: &PerformanceInputs,
    config: &IndividualConfig,
) -> PerformanceResult {
    let present = [
        !inputs.goals.is_empty(),
        !inputs.reviews.is_empty(),
        !inputs.feedback.is_empty(),
        inputs.attendance_rate.is_some(),
        inputs.collaboration_score.is_some(),
    ];
    let weights = redistribute_weights(&config.weights, present);

    let components = ComponentScores {
        goal_attainment: goal_attainment(&inputs.goals),
        review_score: review_score(&inputs.reviews),
        feedback_score: feedback_score(&inputs.feedback),
        attendance_score: inputs
            .attendance_rate
            .map(|rate| rate.clamp(0.0, 1.0) * 100.0)
            .unwrap_or(0.0),
        collaboration_score: inputs.collaboration_score.map(clamp_pct).unwrap_or(0.0),
    };

    let weighted_sum: f64 = weights
        .as_array()
        .iter()
        .zip(components.as_array().iter())
        .map(|(w, c)| w * c)
        .sum();
    let overall_score = clamp_pct(weighted_sum.round());

    let percentile = inputs
        .population
        .as_deref()
        .filter(|population| !population.is_empty())
        .map(|population| percentile_rank(overall_score, population));

    let data_points = (inputs.goals.len() + inputs.reviews.len() + inputs.feedback.len()) as f64;
    let trust: Vec<f64> = inputs
        .reviews
        .iter()
        .map(|r| clamp_pct(r.reviewer_trust))
        .collect();
    let confidence =
        (0.6 * sigmoid_with(data_points, 0.3, 5.0) + 0.4 * mean(&trust) / 100.0).clamp(0.0, 1.0);

    let derived_rating = derive_rating(overall_score, percentile);

    debug!(
        "Individual score {:.0} (rating {}, confidence {:.2}, present sources {:?})",
        overall_score, derived_rating, confidence, present
    );

    PerformanceResult {
        overall_score,
        components,
        percentile,
        confidence,
        weights,
        derived_rating,
    }
}

/// Move the weight of absent sources onto present ones.
///
/// `present` follows the order goals, reviews, feedback, attendance,
/// collaboration. When every source or no source is present the base
/// weights are returned unchanged.
pub fn redistribute_weights(base: &SourceWeights, present: [bool; 5]) -> SourceWeights {
    if present.iter().all(|&p| p) || !present.iter().any(|&p| p) {
        return *base;
    }

    let mut weights = base.as_array();
    for absent in [GOALS, REVIEWS, FEEDBACK, ATTENDANCE, COLLABORATION] {
        if present[absent] {
            continue;
        }
        let share = weights[absent];
        weights[absent] = 0.0;

        let row = REDISTRIBUTION[absent];
        let live_total: f64 = (0..5).filter(|&i| present[i]).map(|i| row[i]).sum();
        let live_count = present.iter().filter(|&&p| p).count() as f64;
        for i in (0..5).filter(|&i| present[i]) {
            weights[i] += if live_total > 0.0 {
                share * row[i] / live_total
            } else {
                share / live_count
            };
        }
    }

    let sum: f64 = weights.iter().sum();
    if sum > 0.0 {
        for w in weights.iter_mut() {
            *w /= sum;
        }
    }
    SourceWeights::from_array(weights)
}

/// Map a score (or percentile, when known) onto a 1-5 rating.
pub fn derive_rating(overall_score: f64, percentile: Option<f64>) -> u8 {
    match percentile {
        Some(p) if p >= 90.0 => 5,
        Some(p) if p >= 70.0 => 4,
        Some(p) if p >= 30.0 => 3,
        Some(p) if p >= 10.0 => 2,
        Some(_) => 1,
        None if overall_score >= 85.0 => 5,
        None if overall_score >= 70.0 => 4,
        None if overall_score >= 50.0 => 3,
        None if overall_score >= 30.0 => 2,
        None => 1,
    }
}

fn goal_attainment(goals: &[GoalScore]) -> f64 {
    let scores: Vec<f64> = goals.iter().map(|g| clamp_pct(g.score)).collect();
    let weights: Vec<f64> = goals.iter().map(|g| g.weight.max(0.0)).collect();
    weighted_mean(&scores, &weights)
}

fn review_score(reviews: &[ReviewInput]) -> f64 {
    let scores: Vec<f64> = reviews
        .iter()
        .map(|r| r.rating.clamp(1.0, 5.0) / 5.0 * 100.0)
        .collect();
    let weights: Vec<f64> = reviews
        .iter()
        .map(|r| clamp_pct(r.reviewer_trust) / 100.0 * r.review_type.weight())
        .collect();
    weighted_mean(&scores, &weights)
}

fn feedback_score(feedback: &[FeedbackSignal]) -> f64 {
    if feedback.is_empty() {
        return NEUTRAL_FEEDBACK_SCORE;
    }
    let mut ordered = feedback.to_vec();
    ordered.sort_by(|a, b| a.recency.total_cmp(&b.recency));
    let sentiments: Vec<f64> = ordered.iter().map(|f| f.sentiment.clamp(-1.0, 1.0)).collect();
    clamp_pct((ewma(&sentiments, FEEDBACK_EWMA_ALPHA) + 1.0) / 2.0 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_inputs() -> PerformanceInputs {
        PerformanceInputs {
            goals: vec![
                GoalScore {
                    score: 80.0,
                    weight: 2.0,
                },
                GoalScore {
                    score: 60.0,
                    weight: 1.0,
                },
            ],
            reviews: vec![ReviewInput {
                rating: 4.0,
                reviewer_trust: 100.0,
                review_type: ReviewType::Manager,
            }],
            feedback: vec![FeedbackSignal {
                sentiment: 0.5,
                recency: 1.0,
            }],
            attendance_rate: Some(0.9),
            collaboration_score: Some(70.0),
            population: None,
        }
    }

    fn weight_sum(w: &SourceWeights) -> f64 {
        w.sum()
    }

    #[test]
    fn test_all_sources_present_keeps_base_weights() {
        let result = calculate_performance_score(&full_inputs());
        let base = SourceWeights::default();
        assert_eq!(result.weights, base);
        // 0.4*73.33 + 0.3*80 + 0.1*75 + 0.1*90 + 0.1*70 = 76.83
        assert_eq!(result.overall_score, 77.0);
        assert_eq!(result.derived_rating, 4);
    }

    #[test]
    fn test_redistribution_conserves_weight() {
        let base = SourceWeights::default();
        for mask in 1..32u32 {
            let present = [
                mask & 1 != 0,
                mask & 2 != 0,
                mask & 4 != 0,
                mask & 8 != 0,
                mask & 16 != 0,
            ];
            let weights = redistribute_weights(&base, present);
            assert!((weight_sum(&weights) - 1.0).abs() < 1e-9, "mask {}", mask);
            for (i, w) in weights.as_array().iter().enumerate() {
                if !present[i] {
                    assert_eq!(*w, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_missing_goals_moves_weight_to_reviews_first() {
        let weights = redistribute_weights(&SourceWeights::default(), [false, true, true, true, true]);
        // 0.30 + 0.40 * 0.50
        assert!((weights.reviews - 0.50).abs() < 1e-9);
        assert!((weights.collaboration - 0.18).abs() < 1e-9);
    }

    #[test]
    fn test_no_feedback_defaults_to_neutral() {
        let mut inputs = full_inputs();
        inputs.feedback.clear();
        let result = calculate_performance_score(&inputs);
        assert_eq!(result.components.feedback_score, 50.0);
        assert_eq!(result.weights.feedback, 0.0);
    }

    #[test]
    fn test_review_type_weighting() {
        let reviews = vec![
            ReviewInput {
                rating: 5.0,
                reviewer_trust: 100.0,
                review_type: ReviewType::Manager,
            },
            ReviewInput {
                rating: 1.0,
                reviewer_trust: 100.0,
                review_type: ReviewType::SelfReview,
            },
        ];
        // (100 * 1.5 + 20 * 0.5) / 2.0
        assert!((review_score(&reviews) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_drives_rating() {
        let mut inputs = full_inputs();
        inputs.population = Some(vec![10.0, 20.0, 30.0, 40.0, 50.0]);
        let result = calculate_performance_score(&inputs);
        assert_eq!(result.percentile, Some(100.0));
        assert_eq!(result.derived_rating, 5);

        inputs.population = Some(vec![]);
        assert!(calculate_performance_score(&inputs).percentile.is_none());
    }

    #[test]
    fn test_derive_rating_thresholds() {
        assert_eq!(derive_rating(85.0, None), 5);
        assert_eq!(derive_rating(84.9, None), 4);
        assert_eq!(derive_rating(29.0, None), 1);
        assert_eq!(derive_rating(0.0, Some(10.0)), 2);
        assert_eq!(derive_rating(100.0, Some(5.0)), 1);
    }

    #[test]
    fn test_confidence_bounds() {
        let result = calculate_performance_score(&PerformanceInputs::default());
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
        assert!((result.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_review_type_serde_names() {
        let json = serde_json::to_string(&ReviewType::SelfReview).unwrap();
        assert_eq!(json, "\"SELF\"");
        let parsed: ReviewType = serde_json::from_str("\"DIRECT_REPORT\"").unwrap();
        assert_eq!(parsed, ReviewType::DirectReport);
    }
}
