use crate::domain::stats::{
    clamp_pct, gini_coefficient, linear_regression, mean, shannon_entropy, standard_deviation,
    z_score,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Width of each rating-distribution bucket (0-20, ..., 80-100)
const BUCKET_WIDTH: f64 = 20.0;
const BUCKET_COUNT: usize = 5;

const HIGH_PERFORMER_Z: f64 = 1.0;
const LOW_PERFORMER_Z: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberScore {
    pub member_id: String,
    /// 0-100
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInput {
    pub members: Vec<MemberScore>,
    /// Team averages of previous periods, oldest first
    #[serde(default)]
    pub historical_averages: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberCategory {
    High,
    Average,
    Low,
}

impl MemberCategory {
    pub fn from_z_score(z: f64) -> Self {
        if z > HIGH_PERFORMER_Z {
            MemberCategory::High
        } else if z < LOW_PERFORMER_Z {
            MemberCategory::Low
        } else {
            MemberCategory::Average
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAnalysis {
    pub member_id: String,
    pub score: f64,
    pub z_score: f64,
    pub category: MemberCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMathResult {
    pub avg_score: f64,
    /// Population standard deviation of member scores
    pub score_spread: f64,
    /// 0..1
    pub rating_entropy: f64,
    /// 0..1
    pub gini_coefficient: f64,
    pub velocity_trend: f64,
    pub predicted_next_avg: f64,
    pub members: Vec<MemberAnalysis>,
}

/// Distribution analytics over a team's member scores.
pub fn calculate_team_analytics(input: &TeamInput) -> TeamMathResult {
    let scores: Vec<f64> = input.members.iter().map(|m| m.score).collect();
    let avg_score = mean(&scores);
    let score_spread = standard_deviation(&scores);

    let rating_entropy = shannon_entropy(&bucket_distribution(&scores));
    let gini = gini_coefficient(&scores).clamp(0.0, 1.0);

    let (velocity_trend, predicted_next_avg) = if input.historical_averages.len() >= 2 {
        let mut series = input.historical_averages.clone();
        series.push(avg_score);
        let x: Vec<f64> = (0..series.len()).map(|i| i as f64).collect();
        let regression = linear_regression(&x, &series);
        let next = regression.intercept + regression.slope * series.len() as f64;
        (regression.slope, clamp_pct(next))
    } else {
        (0.0, avg_score)
    };

    let members = input
        .members
        .iter()
        .map(|member| {
            let z = z_score(member.score, avg_score, score_spread);
            MemberAnalysis {
                member_id: member.member_id.clone(),
                score: member.score,
                z_score: z,
                category: MemberCategory::from_z_score(z),
            }
        })
        .collect();

    debug!(
        "Team of {}: avg={:.2} spread={:.2} entropy={:.3} gini={:.3} trend={:.3}",
        scores.len(),
        avg_score,
        score_spread,
        rating_entropy,
        gini,
        velocity_trend
    );

    TeamMathResult {
        avg_score,
        score_spread,
        rating_entropy,
        gini_coefficient: gini,
        velocity_trend,
        predicted_next_avg,
        members,
    }
}

/// Counts of scores in five equal-width buckets; 100 lands in the top bucket.
fn bucket_distribution(scores: &[f64]) -> [f64; BUCKET_COUNT] {
    let mut buckets = [0.0; BUCKET_COUNT];
    for &score in scores {
        let index = ((clamp_pct(score) / BUCKET_WIDTH) as usize).min(BUCKET_COUNT - 1);
        buckets[index] += 1.0;
    }
    buckets
}
