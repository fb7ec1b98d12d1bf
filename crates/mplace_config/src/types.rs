//! Configuration types deserialized from `mplace.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The top-level run configuration parsed from `mplace.toml`.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementConfig {
    /// Outer loop settings (budget, convergence, snapshots, net model, seed).
    #[serde(default)]
    pub run: RunConfig,
    /// Inner linear solver settings.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Core-rectangle containment settings.
    #[serde(default)]
    pub boundary: BoundaryConfig,
    /// Post-convergence spreading stage settings.
    #[serde(default)]
    pub spreading: SpreadingConfig,
}

/// Outer-loop run parameters.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Maximum number of outer passes before giving up on convergence.
    pub max_iterations: u32,
    /// Convergence threshold, as a fraction of the core diagonal.
    pub convergence_threshold: f64,
    /// Number of consecutive passes that must stay below the threshold.
    pub convergence_streak: u32,
    /// How often a pass is recorded as a snapshot.
    #[serde(deserialize_with = "deserialize_cadence")]
    pub snapshot_cadence: SnapshotCadence,
    /// How multi-pin nets are decomposed into pairwise terms.
    pub net_model: NetModel,
    /// Nets with more pins than this use the star model regardless of
    /// [`net_model`](Self::net_model). Zero disables the switch.
    pub star_threshold: u32,
    /// Seed for the random initial placement.
    pub random_seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            convergence_threshold: 1e-4,
            convergence_streak: 1,
            snapshot_cadence: SnapshotCadence::EveryPass,
            net_model: NetModel::Clique,
            star_threshold: 0,
            random_seed: 42,
        }
    }
}

/// Snapshot emission cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotCadence {
    /// Record every outer pass.
    EveryPass,
    /// Record every `n`-th outer pass (counting from pass 0).
    Every(u32),
}

impl SnapshotCadence {
    /// Returns `true` if pass `iteration` should be recorded.
    pub fn records(self, iteration: u32) -> bool {
        match self {
            SnapshotCadence::EveryPass => true,
            SnapshotCadence::Every(0) => false,
            SnapshotCadence::Every(n) => iteration % n == 0,
        }
    }
}

impl Serialize for SnapshotCadence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SnapshotCadence::EveryPass => serializer.serialize_str("every_pass"),
            SnapshotCadence::Every(n) => serializer.serialize_u32(*n),
        }
    }
}

/// Deserializes a cadence given either as a positive integer or as the
/// string `"every_pass"`.
fn deserialize_cadence<'de, D>(deserializer: D) -> Result<SnapshotCadence, D::Error>
where
    D: Deserializer<'de>,
{
    struct CadenceVisitor;

    impl<'de> Visitor<'de> for CadenceVisitor {
        type Value = SnapshotCadence;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a positive integer or \"every_pass\"")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            match v {
                "every_pass" => Ok(SnapshotCadence::EveryPass),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            u32::try_from(v)
                .map(|n| {
                    if n == 1 {
                        SnapshotCadence::EveryPass
                    } else {
                        SnapshotCadence::Every(n)
                    }
                })
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            let v = i64::try_from(v)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))?;
            self.visit_i64(v)
        }
    }

    deserializer.deserialize_any(CadenceVisitor)
}

/// Decomposition of a multi-pin net into pairwise quadratic terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetModel {
    /// Every pin pair connected, each edge weighted `w / (n - 1)`.
    #[default]
    Clique,
    /// Every pin connected to a synthetic center node.
    Star,
}

/// Conjugate-gradient solver settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Relative residual tolerance (`‖r‖ ≤ tolerance · ‖b‖`).
    pub tolerance: f64,
    /// Inner step cap per axis solve.
    pub max_steps: u32,
    /// Solve the x and y axes concurrently.
    pub parallel_axes: bool,
    /// Spring weight tying an unanchored component to its current position.
    pub anchor_weight: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_steps: 1000,
            parallel_axes: true,
            anchor_weight: 0.01,
        }
    }
}

/// How the core rectangle is enforced between passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Clamp every movable cell back inside the core after each pass.
    #[default]
    Hard,
    /// Pull escaped cells back with a spring on the next pass.
    Soft,
}

/// Core-rectangle containment settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundaryConfig {
    /// Hard clamp or soft spring-back.
    pub mode: BoundaryMode,
    /// Spring weight used in [`BoundaryMode::Soft`].
    pub soft_weight: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            mode: BoundaryMode::Hard,
            soft_weight: 10.0,
        }
    }
}

/// Post-convergence spreading stage settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpreadingConfig {
    /// Run the built-in spreading stage after the quadratic loop.
    pub enabled: bool,
    /// Blend factor toward the spread target, in `(0, 1]`.
    pub strength: f64,
}

impl Default for SpreadingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn net_model_variants() {
        for (input, expected) in [("clique", NetModel::Clique), ("star", NetModel::Star)] {
            let toml = format!("[run]\nnet_model = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.run.net_model, expected);
        }
    }

    #[test]
    fn boundary_mode_variants() {
        for (input, expected) in [("hard", BoundaryMode::Hard), ("soft", BoundaryMode::Soft)] {
            let toml = format!("[boundary]\nmode = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.boundary.mode, expected);
        }
    }

    #[test]
    fn cadence_integer() {
        let config = load_config_from_str("[run]\nsnapshot_cadence = 5\n").unwrap();
        assert_eq!(config.run.snapshot_cadence, SnapshotCadence::Every(5));
    }

    #[test]
    fn cadence_one_is_every_pass() {
        let config = load_config_from_str("[run]\nsnapshot_cadence = 1\n").unwrap();
        assert_eq!(config.run.snapshot_cadence, SnapshotCadence::EveryPass);
    }

    #[test]
    fn cadence_string() {
        let config = load_config_from_str("[run]\nsnapshot_cadence = \"every_pass\"\n").unwrap();
        assert_eq!(config.run.snapshot_cadence, SnapshotCadence::EveryPass);
    }

    #[test]
    fn cadence_bad_string_rejected() {
        assert!(load_config_from_str("[run]\nsnapshot_cadence = \"often\"\n").is_err());
    }

    #[test]
    fn cadence_negative_rejected() {
        assert!(load_config_from_str("[run]\nsnapshot_cadence = -3\n").is_err());
    }

    #[test]
    fn cadence_records() {
        assert!(SnapshotCadence::EveryPass.records(7));
        assert!(SnapshotCadence::Every(5).records(0));
        assert!(SnapshotCadence::Every(5).records(10));
        assert!(!SnapshotCadence::Every(5).records(11));
    }

    #[test]
    fn cadence_serializes_in_file_form() {
        let mut config = PlacementConfig::default();
        config.run.snapshot_cadence = SnapshotCadence::Every(4);
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("snapshot_cadence = 4"));
        assert_eq!(load_config_from_str(&text).unwrap(), config);
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(load_config_from_str("[run]\nmax_iters = 3\n").is_err());
    }
}
