//! Configuration domain module
//!
//! Domain value objects for scoring configuration: base weights, no-data
//! thresholds and fairness parameters, validated independently of how they
//! are loaded.

pub mod scoring_config;

pub use scoring_config::{
    CpisConfig, DimensionWeights, EngagementConfig, EngagementWeights, FairnessConfig,
    IndividualConfig, ScoringConfig, SourceWeights,
};
