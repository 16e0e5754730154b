// Statistical primitives shared by every calculator
pub mod stats;

// Scoring configuration value objects
pub mod config;

// Goal aggregation and risk
pub mod goals;

// Review calibration
pub mod reviews;

// Individual, team and benchmark scoring
pub mod performance;

// 8-dimension composite score
pub mod cpis;

// Domain-specific error types
pub mod errors;
