use super::types::{BiasFlag, CpisInput, CpisReviewType, FairnessAnalysis};
use crate::domain::config::FairnessConfig;
use crate::domain::stats::{bayesian_estimate, mean, sigmoid_with};
use tracing::debug;

/// Detect bias signals and shrink thin-evidence scores toward their priors.
///
/// `score` is the pre-fairness composite. Department shrinkage applies below
/// `shrinkage_data_threshold` data points; new hires with very little data
/// are pulled further toward the org average.
pub fn analyze_fairness(input: &CpisInput, score: f64, config: &FairnessConfig) -> FairnessAnalysis {
    let mut bias_flags = Vec::new();

    if input
        .reviews
        .iter()
        .any(|r| r.bias_score > config.bias_flag_threshold)
    {
        bias_flags.push(BiasFlag::FlaggedReviews);
    }

    if self_review_inflated(input, config.self_inflation_ratio) {
        bias_flags.push(BiasFlag::SelfReviewInflation);
    }

    let disparate_impact_ratio = match input.department_avg {
        Some(avg) if avg > 0.0 => score / avg,
        _ => 1.0,
    };
    if disparate_impact_ratio < config.disparate_impact_floor {
        bias_flags.push(BiasFlag::DisparateImpact);
    }

    let data_points = input.evidence_data_points();
    let mut adjusted = score;

    match input.department_avg {
        Some(dept_avg) if data_points < config.shrinkage_data_threshold => {
            let prior_weight = (config.shrinkage_base_prior
                - data_points as f64 * config.shrinkage_prior_step)
                .max(0.0);
            adjusted = bayesian_estimate(adjusted, data_points as f64, dept_avg, prior_weight);
        }
        _ => {}
    }

    match input.org_avg {
        Some(org_avg)
            if input.tenure_years < config.new_hire_tenure_years
                && data_points < config.new_hire_data_threshold =>
        {
            adjusted = bayesian_estimate(
                adjusted,
                data_points as f64,
                org_avg,
                config.org_prior_weight,
            );
        }
        _ => {}
    }

    let adjustment_applied = adjusted - score;
    if adjustment_applied != 0.0 || !bias_flags.is_empty() {
        debug!(
            "Fairness: adjustment={:+.2} disparate_impact={:.3} flags={:?}",
            adjustment_applied, disparate_impact_ratio, bias_flags
        );
    }

    FairnessAnalysis {
        bias_detected: !bias_flags.is_empty(),
        adjustment_applied,
        disparate_impact_ratio,
        bias_flags,
        confidence: sigmoid_with(data_points as f64, 0.3, 5.0),
    }
}

fn self_review_inflated(input: &CpisInput, ratio: f64) -> bool {
    let (own, others): (Vec<f64>, Vec<f64>) = input.reviews.iter().fold(
        (Vec::new(), Vec::new()),
        |(mut own, mut others), review| {
            if review.review_type == CpisReviewType::SelfReview {
                own.push(review.rating);
            } else {
                others.push(review.rating);
            }
            (own, others)
        },
    );
    if own.is_empty() || others.is_empty() {
        return false;
    }
    let others_mean = mean(&others);
    others_mean > 0.0 && mean(&own) > ratio * others_mean
}
