//! Configuration loading for perfscore.
//!
//! A `ScoringConfig` comes from an optional TOML file, is then patched by
//! environment variables, and is validated before use. Calculators only ever
//! see the validated value objects from `domain::config`.

pub use crate::domain::config::{
    CpisConfig, DimensionWeights, EngagementConfig, EngagementWeights, FairnessConfig,
    IndividualConfig, ScoringConfig, SourceWeights,
};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// Path of an optional TOML config file
pub const CONFIG_PATH_VAR: &str = "PERFSCORE_CONFIG";
pub const MIN_ACTIVITY_VAR: &str = "PERFSCORE_CIS_MIN_ACTIVITY";
pub const TENURE_CAP_VAR: &str = "PERFSCORE_TENURE_CAP";

impl ScoringConfig {
    /// Parse and validate a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScoringConfig =
            toml::from_str(content).context("Failed to parse scoring config TOML")?;
        config.validate().context("Invalid scoring config")?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    /// Defaults, then `PERFSCORE_CONFIG` file, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => {
                info!("Loading scoring config from {}", path);
                Self::from_file(Path::new(&path))?
            }
            Err(_) => ScoringConfig::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment) and
    /// re-validate.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_override::<u32, _>(&lookup, MIN_ACTIVITY_VAR)? {
            self.cpis.collaboration_min_activity = value;
        }
        if let Some(value) = parse_override::<f64, _>(&lookup, TENURE_CAP_VAR)? {
            self.cpis.tenure_cap = value;
        }
        self.validate().context("Invalid scoring config after overrides")?;
        Ok(())
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .context(format!("Failed to parse {}", key))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScoringConfig::from_toml_str(
            r#"
            [cpis]
            collaboration_min_activity = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.cpis.collaboration_min_activity, 20);
        assert_eq!(config.cpis.weights, DimensionWeights::default());
        assert_eq!(config.individual, IndividualConfig::default());
    }

    #[test]
    fn test_bad_weights_rejected() {
        let err = ScoringConfig::from_toml_str(
            r#"
            [individual.weights]
            goals = 0.9
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("sum"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(ScoringConfig::from_toml_str("[cpis\n").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ScoringConfig::default();
        config
            .apply_overrides(lookup_from(&[(MIN_ACTIVITY_VAR, "8"), (TENURE_CAP_VAR, " 1.05 ")]))
            .unwrap();
        assert_eq!(config.cpis.collaboration_min_activity, 8);
        assert_eq!(config.cpis.tenure_cap, 1.05);
    }

    #[test]
    fn test_unparsable_override_names_variable() {
        let mut config = ScoringConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[(MIN_ACTIVITY_VAR, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(MIN_ACTIVITY_VAR));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ScoringConfig::from_file(Path::new("/nonexistent/perfscore.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/perfscore.toml"));
    }
}
