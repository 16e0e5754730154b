//! Scoring Configuration Domain Value Objects
//!
//! Base weights and empirically chosen thresholds used by the individual
//! scorer, the CPIS engine and the engagement scorer. Every field has a
//! default so partial TOML documents deserialize cleanly.

use crate::domain::errors::ConfigError;
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Minimum total collaboration activity before CIS counts as having data
pub const DEFAULT_COLLABORATION_MIN_ACTIVITY: u32 = 12;

/// Base weights of the individual performance data sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub goals: f64,
    pub reviews: f64,
    pub feedback: f64,
    pub attendance: f64,
    pub collaboration: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            goals: 0.40,
            reviews: 0.30,
            feedback: 0.10,
            attendance: 0.10,
            collaboration: 0.10,
        }
    }
}

impl SourceWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.goals,
            self.reviews,
            self.feedback,
            self.attendance,
            self.collaboration,
        ]
    }

    pub fn from_array(values: [f64; 5]) -> Self {
        Self {
            goals: values[0],
            reviews: values[1],
            feedback: values[2],
            attendance: values[3],
            collaboration: values[4],
        }
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndividualConfig {
    pub weights: SourceWeights,
}

/// Base weights of the eight CPIS dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub gai: f64,
    pub rqs: f64,
    pub fsi: f64,
    pub cis: f64,
    pub cri: f64,
    pub gts: f64,
    pub eqs: f64,
    pub iii: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            gai: 0.25,
            rqs: 0.20,
            fsi: 0.12,
            cis: 0.10,
            cri: 0.10,
            gts: 0.08,
            eqs: 0.08,
            iii: 0.07,
        }
    }
}

impl DimensionWeights {
    /// Weights in dimension order GAI, RQS, FSI, CIS, CRI, GTS, EQS, III
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.gai, self.rqs, self.fsi, self.cis, self.cri, self.gts, self.eqs, self.iii,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

/// Bias detection and Bayesian shrinkage parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FairnessConfig {
    /// Reviews with a bias score above this are flagged
    pub bias_flag_threshold: f64,
    /// Self mean above this multiple of the others' mean is inflation
    pub self_inflation_ratio: f64,
    /// Disparate impact ratios below this are flagged (four-fifths rule)
    pub disparate_impact_floor: f64,
    /// Shrink toward the department average below this many data points
    pub shrinkage_data_threshold: usize,
    pub shrinkage_base_prior: f64,
    pub shrinkage_prior_step: f64,
    pub new_hire_tenure_years: f64,
    pub new_hire_data_threshold: usize,
    pub org_prior_weight: f64,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            bias_flag_threshold: 0.3,
            self_inflation_ratio: 1.3,
            disparate_impact_floor: 0.8,
            shrinkage_data_threshold: 10,
            shrinkage_base_prior: 5.0,
            shrinkage_prior_step: 0.5,
            new_hire_tenure_years: 0.5,
            new_hire_data_threshold: 5,
            org_prior_weight: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpisConfig {
    pub weights: DimensionWeights,
    pub collaboration_min_activity: u32,
    /// Tenure factor gained per year of tenure
    pub tenure_step: f64,
    /// Upper bound of the tenure factor
    pub tenure_cap: f64,
    pub fairness: FairnessConfig,
}

impl Default for CpisConfig {
    fn default() -> Self {
        Self {
            weights: DimensionWeights::default(),
            collaboration_min_activity: DEFAULT_COLLABORATION_MIN_ACTIVITY,
            tenure_step: 0.025,
            tenure_cap: 1.12,
            fairness: FairnessConfig::default(),
        }
    }
}

impl CpisConfig {
    /// `min(tenure_cap, 1 + tenure_years * tenure_step)`
    pub fn tenure_factor(&self, tenure_years: f64) -> f64 {
        (1.0 + tenure_years.max(0.0) * self.tenure_step).min(self.tenure_cap)
    }
}

/// Component weights of the engagement score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementWeights {
    pub participation: f64,
    pub communication: f64,
    pub collaboration: f64,
    pub initiative: f64,
    pub responsiveness: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            participation: 0.25,
            communication: 0.20,
            collaboration: 0.20,
            initiative: 0.20,
            responsiveness: 0.15,
        }
    }
}

impl EngagementWeights {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.participation,
            self.communication,
            self.collaboration,
            self.initiative,
            self.responsiveness,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub weights: EngagementWeights,
}

/// Complete scoring configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub individual: IndividualConfig,
    pub cpis: CpisConfig,
    pub engagement: EngagementConfig,
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let source_names = ["goals", "reviews", "feedback", "attendance", "collaboration"];
        validate_weights(
            "individual",
            &source_names,
            &self.individual.weights.as_array(),
        )?;

        let dimension_names = ["gai", "rqs", "fsi", "cis", "cri", "gts", "eqs", "iii"];
        validate_weights("cpis", &dimension_names, &self.cpis.weights.as_array())?;

        let component_names = [
            "participation",
            "communication",
            "collaboration",
            "initiative",
            "responsiveness",
        ];
        validate_weights(
            "engagement",
            &component_names,
            &self.engagement.weights.as_array(),
        )?;

        if self.cpis.tenure_step < 0.0 {
            return Err(out_of_range("tenure_step", self.cpis.tenure_step, "must be >= 0"));
        }
        if self.cpis.tenure_cap < 1.0 {
            return Err(out_of_range("tenure_cap", self.cpis.tenure_cap, "must be >= 1"));
        }

        let fairness = &self.cpis.fairness;
        if !(0.0..=1.0).contains(&fairness.bias_flag_threshold) {
            return Err(out_of_range(
                "bias_flag_threshold",
                fairness.bias_flag_threshold,
                "must be within [0, 1]",
            ));
        }
        if fairness.self_inflation_ratio < 1.0 {
            return Err(out_of_range(
                "self_inflation_ratio",
                fairness.self_inflation_ratio,
                "must be >= 1",
            ));
        }
        if fairness.disparate_impact_floor <= 0.0 || fairness.disparate_impact_floor > 1.0 {
            return Err(out_of_range(
                "disparate_impact_floor",
                fairness.disparate_impact_floor,
                "must be within (0, 1]",
            ));
        }
        if fairness.shrinkage_base_prior < 0.0
            || fairness.shrinkage_prior_step < 0.0
            || fairness.org_prior_weight <= 0.0
        {
            return Err(out_of_range(
                "shrinkage priors",
                fairness.shrinkage_base_prior.min(fairness.org_prior_weight),
                "priors must be non-negative and org_prior_weight positive",
            ));
        }
        Ok(())
    }
}

fn validate_weights(section: &str, names: &[&str], weights: &[f64]) -> Result<(), ConfigError> {
    for (name, &value) in names.iter().zip(weights.iter()) {
        if value < 0.0 || !value.is_finite() {
            return Err(ConfigError::NegativeWeight {
                name: format!("{}.{}", section, name),
                value,
            });
        }
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(ConfigError::WeightSum {
            section: section.to_string(),
            sum,
        });
    }
    Ok(())
}

fn out_of_range(name: &str, value: f64, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        name: name.to_string(),
        value,
        reason: reason.to_string(),
    }
}
