//! Removes per-reviewer leniency/strictness ("hawk/dove") bias.
//!
//! Each rating is normalized against its reviewer's own rating history and
//! rescaled onto the global distribution of all ratings.

use crate::domain::stats::{mean, sample_std_dev};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Reviewers with fewer ratings than this get a plain mean shift
const MIN_RATINGS_FOR_ZSCORE: usize = 3;

const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub review_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    /// 1-5
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibratedRating {
    pub review_id: String,
    pub reviewer_id: String,
    pub reviewee_id: String,
    pub original_rating: f64,
    pub calibrated_rating: f64,
    pub adjustment: f64,
}

#[derive(Debug, Clone, Copy)]
struct ReviewerStats {
    count: usize,
    mean: f64,
    std_dev: f64,
}

/// Calibrate every rating against its reviewer's distribution.
///
/// Output preserves input order.
pub fn calibrate_ratings(ratings: &[RatingRecord]) -> Vec<CalibratedRating> {
    if ratings.is_empty() {
        return Vec::new();
    }

    let all: Vec<f64> = ratings.iter().map(|r| r.rating).collect();
    let global_mean = mean(&all);
    let global_std = sample_std_dev(&all);

    let mut by_reviewer: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in ratings {
        by_reviewer
            .entry(record.reviewer_id.as_str())
            .or_default()
            .push(record.rating);
    }
    let reviewer_stats: BTreeMap<&str, ReviewerStats> = by_reviewer
        .iter()
        .map(|(&reviewer, given)| {
            (
                reviewer,
                ReviewerStats {
                    count: given.len(),
                    mean: mean(given),
                    std_dev: sample_std_dev(given),
                },
            )
        })
        .collect();

    debug!(
        "Calibrating {} ratings from {} reviewers (global mean={:.3}, std={:.3})",
        ratings.len(),
        reviewer_stats.len(),
        global_mean,
        global_std
    );

    ratings
        .iter()
        .map(|record| {
            let stats = reviewer_stats
                .get(record.reviewer_id.as_str())
                .copied()
                .unwrap_or(ReviewerStats {
                    count: 0,
                    mean: global_mean,
                    std_dev: 0.0,
                });

            let calibrated = if stats.count < MIN_RATINGS_FOR_ZSCORE || stats.std_dev == 0.0 {
                record.rating - (stats.mean - global_mean)
            } else {
                let z = (record.rating - stats.mean) / stats.std_dev;
                z * global_std + global_mean
            };
            let calibrated_rating = calibrated.clamp(MIN_RATING, MAX_RATING);

            CalibratedRating {
                review_id: record.review_id.clone(),
                reviewer_id: record.reviewer_id.clone(),
                reviewee_id: record.reviewee_id.clone(),
                original_rating: record.rating,
                calibrated_rating,
                adjustment: calibrated_rating - record.rating,
            }
        })
        .collect()
}
