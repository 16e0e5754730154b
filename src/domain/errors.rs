use thiserror::Error;

/// Errors raised while validating scoring configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Negative weight for {name}: {value}")]
    NegativeWeight { name: String, value: f64 },

    #[error("{section} weights must sum to 1.0, got {sum:.6}")]
    WeightSum { section: String, sum: f64 },

    #[error("Invalid {name}: {value} ({reason})")]
    OutOfRange {
        name: String,
        value: f64,
        reason: String,
    },
}

/// Errors raised while building a statistical benchmark
#[derive(Debug, Error, PartialEq)]
pub enum BenchmarkError {
    #[error("Insufficient data points ({count}) for reliable benchmark of {metric}: need {required}")]
    InsufficientData {
        metric: String,
        count: usize,
        required: usize,
    },

    #[error("Benchmark {metric} contains non-finite values")]
    NonFiniteValue { metric: String },

    #[error("No data available for {metric} in the requested segment")]
    EmptySegment { metric: String },

    #[error("Benchmark not found: {key}")]
    NotFound { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_formatting() {
        let error = ConfigError::WeightSum {
            section: "cpis".to_string(),
            sum: 0.95,
        };

        let msg = error.to_string();
        assert!(msg.contains("cpis"));
        assert!(msg.contains("0.950000"));
    }

    #[test]
    fn test_benchmark_error_formatting() {
        let error = BenchmarkError::InsufficientData {
            metric: "goal_score".to_string(),
            count: 4,
            required: 10,
        };

        let msg = error.to_string();
        assert!(msg.contains("goal_score"));
        assert!(msg.contains("(4)"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_missing_benchmark_names_key() {
        let error = BenchmarkError::NotFound {
            key: "goal_score_dept:eng".to_string(),
        };
        assert_eq!(error.to_string(), "Benchmark not found: goal_score_dept:eng");
    }
}
