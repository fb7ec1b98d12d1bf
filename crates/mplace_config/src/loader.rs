//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{PlacementConfig, SnapshotCadence};
use std::path::Path;

/// Name of the configuration file looked up in a run directory.
pub const CONFIG_FILE_NAME: &str = "mplace.toml";

/// Loads and validates an `mplace.toml` configuration from a run directory.
pub fn load_config(run_dir: &Path) -> Result<PlacementConfig, ConfigError> {
    let path = run_dir.join(CONFIG_FILE_NAME);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates an `mplace.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<PlacementConfig, ConfigError> {
    let config: PlacementConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates ranges of every configuration value.
///
/// Programmatically built configurations go through the same checks before
/// a run starts.
pub fn validate_config(config: &PlacementConfig) -> Result<(), ConfigError> {
    let run = &config.run;
    if run.max_iterations == 0 {
        return Err(ConfigError::invalid(
            "run.max_iterations",
            "must be greater than zero",
        ));
    }
    require_positive("run.convergence_threshold", run.convergence_threshold)?;
    if run.convergence_streak == 0 {
        return Err(ConfigError::invalid(
            "run.convergence_streak",
            "must be at least 1",
        ));
    }
    if run.snapshot_cadence == SnapshotCadence::Every(0) {
        return Err(ConfigError::invalid(
            "run.snapshot_cadence",
            "must be at least 1",
        ));
    }
    if run.star_threshold == 1 || run.star_threshold == 2 {
        return Err(ConfigError::invalid(
            "run.star_threshold",
            "must be 0 (disabled) or at least 3",
        ));
    }

    let solver = &config.solver;
    require_positive("solver.tolerance", solver.tolerance)?;
    if solver.max_steps == 0 {
        return Err(ConfigError::invalid(
            "solver.max_steps",
            "must be greater than zero",
        ));
    }
    require_positive("solver.anchor_weight", solver.anchor_weight)?;

    require_positive("boundary.soft_weight", config.boundary.soft_weight)?;

    let strength = config.spreading.strength;
    if !(strength > 0.0 && strength <= 1.0) {
        return Err(ConfigError::invalid(
            "spreading.strength",
            format!("must lie in (0, 1], got {strength}"),
        ));
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be a positive finite number, got {value}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundaryMode, NetModel};

    #[test]
    fn empty_config_takes_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, PlacementConfig::default());
        assert_eq!(config.run.max_iterations, 200);
        assert_eq!(config.run.convergence_threshold, 1e-4);
        assert_eq!(config.run.net_model, NetModel::Clique);
        assert_eq!(config.boundary.mode, BoundaryMode::Hard);
        assert!(!config.spreading.enabled);
        assert!(config.solver.parallel_axes);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[run]
max_iterations = 46
convergence_threshold = 1e-5
convergence_streak = 3
snapshot_cadence = 5
net_model = "star"
star_threshold = 8
random_seed = 7

[solver]
tolerance = 1e-8
max_steps = 4
parallel_axes = false
anchor_weight = 0.1

[boundary]
mode = "soft"
soft_weight = 25.0

[spreading]
enabled = true
strength = 1.0
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.run.max_iterations, 46);
        assert_eq!(config.run.convergence_streak, 3);
        assert_eq!(config.run.snapshot_cadence, SnapshotCadence::Every(5));
        assert_eq!(config.run.net_model, NetModel::Star);
        assert_eq!(config.run.star_threshold, 8);
        assert_eq!(config.run.random_seed, 7);
        assert_eq!(config.solver.max_steps, 4);
        assert!(!config.solver.parallel_axes);
        assert_eq!(config.boundary.mode, BoundaryMode::Soft);
        assert_eq!(config.boundary.soft_weight, 25.0);
        assert!(config.spreading.enabled);
    }

    #[test]
    fn zero_budget_rejected() {
        let err = load_config_from_str("[run]\nmax_iterations = 0\n").unwrap_err();
        assert_eq!(err.field(), Some("run.max_iterations"));
    }

    #[test]
    fn non_positive_threshold_rejected() {
        let err = load_config_from_str("[run]\nconvergence_threshold = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let err = load_config_from_str("[run]\nconvergence_threshold = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn zero_streak_rejected() {
        assert!(load_config_from_str("[run]\nconvergence_streak = 0\n").is_err());
    }

    #[test]
    fn zero_cadence_rejected() {
        let err = load_config_from_str("[run]\nsnapshot_cadence = 0\n").unwrap_err();
        assert_eq!(err.field(), Some("run.snapshot_cadence"));
    }

    #[test]
    fn tiny_star_threshold_rejected() {
        assert!(load_config_from_str("[run]\nstar_threshold = 2\n").is_err());
        assert!(load_config_from_str("[run]\nstar_threshold = 3\n").is_ok());
    }

    #[test]
    fn strength_out_of_range_rejected() {
        assert!(load_config_from_str("[spreading]\nstrength = 0.0\n").is_err());
        assert!(load_config_from_str("[spreading]\nstrength = 1.5\n").is_err());
    }

    #[test]
    fn nan_rejected_programmatically() {
        let mut config = PlacementConfig::default();
        config.solver.tolerance = f64::NAN;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[run]\nrandom_seed = 99\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.run.random_seed, 99);
    }

    #[test]
    fn io_error_from_nonexistent_dir() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert!(path.ends_with(CONFIG_FILE_NAME)),
            other => panic!("expected a read error, got {other}"),
        }
    }
}
