//! CPIS composite scoring.
//!
//! Pipeline: eight independent dimension scores, re-weighting around
//! dimensions without data, tenure factor, fairness shrinkage, then the
//! presentation fields (grade, stars, interval, trajectory, highlights).

use super::dimensions::{
    compute_cis, compute_cri, compute_eqs, compute_fsi, compute_gai, compute_gts, compute_iii,
    compute_rqs,
};
use super::fairness::analyze_fairness;
use super::grade::{Grade, rank_label, star_rating};
use super::types::{
    ConfidenceInterval, CpisDimension, CpisInput, CpisResult, Trajectory, TrajectoryDirection,
};
use crate::domain::config::{CpisConfig, DimensionWeights};
use crate::domain::stats::{clamp_pct, round_to, sigmoid_with, trend};
use tracing::debug;

const HIGHLIGHT_COUNT: usize = 3;
const STRENGTH_FLOOR: f64 = 50.0;
const GROWTH_CEILING: f64 = 80.0;
const MIN_INTERVAL_MARGIN: f64 = 2.0;

/// Score one person with the default configuration.
pub fn compute_cpis(input: &CpisInput) -> CpisResult {
    compute_cpis_with(input, &CpisConfig::default())
}

/// Score one person.
pub fn compute_cpis_with(input: &CpisInput, config: &CpisConfig) -> CpisResult {
    let scored = [
        compute_gai(&input.goals),
        compute_rqs(&input.reviews),
        compute_fsi(&input.feedbacks),
        compute_cis(&input.collaboration, config.collaboration_min_activity),
        compute_cri(&input.consistency),
        compute_gts(&input.growth),
        compute_eqs(&input.evidence),
        compute_iii(&input.initiative),
    ];
    let dimensions = reweight_dimensions(&scored, &config.weights);

    let weighted_total: f64 = dimensions.iter().map(|d| d.weighted_score).sum();
    let tenure_factor = config.tenure_factor(input.tenure_years);
    let base_score = clamp_pct(weighted_total * tenure_factor);

    let fairness = analyze_fairness(input, base_score, &config.fairness);
    let score = round_to(clamp_pct(base_score + fairness.adjustment_applied), 2);
    let raw_score = round_to(base_score, 2);

    let data_points = input.evidence_data_points()
        + input.evidence.total as usize
        + input.growth.historical_scores.len();
    let confidence_interval = confidence_interval(score, data_points);
    let trajectory = trajectory(&input.growth.historical_scores, score);
    let (strengths, growth_areas) = highlights(&dimensions);
    let formula_breakdown =
        formula_breakdown(&dimensions, weighted_total, tenure_factor, fairness.adjustment_applied, score);

    debug!(
        "CPIS: raw={:.2} tenure={:.3} fairness={:+.2} final={:.2}",
        raw_score, tenure_factor, fairness.adjustment_applied, score
    );

    CpisResult {
        score,
        raw_score,
        grade: Grade::from_score(score),
        star_rating: star_rating(score),
        rank_label: rank_label(score).to_string(),
        dimensions,
        fairness,
        confidence_interval,
        trajectory,
        strengths,
        growth_areas,
        formula_breakdown,
    }
}

/// Apply configured weights, moving the weight of no-data dimensions onto the
/// live ones in proportion to their base weights.
///
/// Returns new records; the input is untouched. When no dimension has data
/// the base weights are kept.
pub fn reweight_dimensions(
    dimensions: &[CpisDimension],
    weights: &DimensionWeights,
) -> Vec<CpisDimension> {
    let live_weight: f64 = dimensions
        .iter()
        .filter(|d| d.has_data)
        .map(|d| d.code.weight_in(weights))
        .sum();

    if live_weight <= 0.0 {
        return dimensions
            .iter()
            .map(|d| d.with_weight(d.code.weight_in(weights)))
            .collect();
    }

    if live_weight < weights.sum() {
        debug!(
            "Redistributing {:.3} of weight across live dimensions",
            weights.sum() - live_weight
        );
    }

    dimensions
        .iter()
        .map(|d| {
            if d.has_data {
                d.with_weight(d.code.weight_in(weights) / live_weight)
            } else {
                d.with_weight(0.0)
            }
        })
        .collect()
}

/// Interval around `score` that narrows as evidence accumulates.
pub fn confidence_interval(score: f64, data_points: usize) -> ConfidenceInterval {
    let level = 0.6 + 0.4 * sigmoid_with(data_points as f64, 0.25, 8.0);
    let margin = (15.0 * (1.0 - level)).max(MIN_INTERVAL_MARGIN);
    ConfidenceInterval {
        level,
        lower_bound: clamp_pct(score - margin),
        upper_bound: clamp_pct(score + margin),
        data_points,
    }
}

/// Regression over the historical scores followed by the current one.
pub fn trajectory(historical_scores: &[f64], current_score: f64) -> Trajectory {
    if historical_scores.is_empty() {
        return Trajectory {
            slope: 0.0,
            direction: TrajectoryDirection::Stable,
            predicted_next: current_score,
            r_squared: 0.0,
        };
    }

    let mut series = historical_scores.to_vec();
    series.push(current_score);
    let regression = trend(&series);

    Trajectory {
        slope: regression.slope,
        direction: TrajectoryDirection::from_slope(regression.slope),
        predicted_next: clamp_pct(regression.intercept + regression.slope * series.len() as f64),
        r_squared: regression.r_squared,
    }
}

/// Top and bottom live dimensions by raw score.
fn highlights(dimensions: &[CpisDimension]) -> (Vec<String>, Vec<String>) {
    let mut live: Vec<&CpisDimension> = dimensions.iter().filter(|d| d.has_data).collect();

    live.sort_by(|a, b| b.raw_score.total_cmp(&a.raw_score));
    let strengths = live
        .iter()
        .take(HIGHLIGHT_COUNT)
        .filter(|d| d.raw_score >= STRENGTH_FLOOR)
        .map(|d| d.name.clone())
        .collect();

    live.reverse();
    let growth_areas = live
        .iter()
        .take(HIGHLIGHT_COUNT)
        .filter(|d| d.raw_score < GROWTH_CEILING)
        .map(|d| d.name.clone())
        .collect();

    (strengths, growth_areas)
}

fn formula_breakdown(
    dimensions: &[CpisDimension],
    weighted_total: f64,
    tenure_factor: f64,
    adjustment: f64,
    score: f64,
) -> String {
    let mut out = String::from("CPIS = sum(raw x weight) x tenure + fairness\n");
    for d in dimensions {
        let line = if d.has_data {
            format!(
                "  {} {:>6.2} x {:.4} = {:>6.2}\n",
                d.code.as_str(),
                d.raw_score,
                d.weight,
                d.weighted_score
            )
        } else {
            format!("  {} no data (weight redistributed)\n", d.code.as_str())
        };
        out.push_str(&line);
    }
    out.push_str(&format!(
        "  = {:.2} x {:.3} (tenure) {:+.2} (fairness) = {:.2}",
        weighted_total, tenure_factor, adjustment, score
    ));
    out
}
