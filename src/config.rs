use serde::Deserialize;
use std::path::Path;

use crate::core::Detector;

/// Weights must sum to 1.0 within this tolerance.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: RuleWeights,
    pub bands: StatusBands,
}

/// Combination weight per detector.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RuleWeights {
    pub aco: f64,
    pub pso: f64,
    pub abc: f64,
    pub firefly: f64,
    pub fss: f64,
    pub gwo: f64,
}

/// Lower bounds of the `suspicious` and `threat` bands. Both are inclusive.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct StatusBands {
    pub suspicious: f64,
    pub threat: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            aco: Detector::Aco.default_weight(),
            pso: Detector::Pso.default_weight(),
            abc: Detector::Abc.default_weight(),
            firefly: Detector::Firefly.default_weight(),
            fss: Detector::Fss.default_weight(),
            gwo: Detector::Gwo.default_weight(),
        }
    }
}

impl Default for StatusBands {
    fn default() -> Self {
        Self {
            suspicious: 0.3,
            threat: 0.7,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl RuleWeights {
    pub fn get(&self, detector: Detector) -> f64 {
        match detector {
            Detector::Aco => self.aco,
            Detector::Pso => self.pso,
            Detector::Abc => self.abc,
            Detector::Firefly => self.firefly,
            Detector::Fss => self.fss,
            Detector::Gwo => self.gwo,
        }
    }

    pub fn is_valid(&self) -> bool {
        let mut total = 0.0;
        for detector in Detector::ALL {
            let w = self.get(detector);
            if !w.is_finite() || w < 0.0 {
                return false;
            }
            total += w;
        }
        (total - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

impl StatusBands {
    pub fn is_valid(&self) -> bool {
        0.0 <= self.suspicious && self.suspicious <= self.threat && self.threat <= 1.0
    }
}

impl EngineConfig {
    /// Replace invalid weights or bands with defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.weights.is_valid() {
            tracing::warn!(
                "Engine weights {:?} must be non-negative and sum to 1.0, using defaults",
                self.weights
            );
            self.weights = RuleWeights::default();
        }
        if !self.bands.is_valid() {
            tracing::warn!(
                "Status bands {:?} must satisfy 0 <= suspicious <= threat <= 1, using defaults",
                self.bands
            );
            self.bands = StatusBands::default();
        }
        self
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(contents)?;
        config.engine = config.engine.sanitized();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_engine_constants() {
        let config = Config::default();
        let w = config.engine.weights;
        assert_eq!(
            [w.aco, w.pso, w.abc, w.firefly, w.fss, w.gwo],
            [0.15, 0.15, 0.20, 0.20, 0.20, 0.10]
        );
        assert_eq!(config.engine.bands.suspicious, 0.3);
        assert_eq!(config.engine.bands.threat, 0.7);
        assert!(config.output.pretty);
        assert!(w.is_valid());
        assert!(config.engine.bands.is_valid());
    }

    #[test]
    fn shipped_example_matches_defaults() {
        let config = Config::parse(include_str!("../demos/aegiswarm.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config = Config::parse(
            r#"
            [engine.bands]
            threat = 0.8

            [output]
            pretty = false
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.bands.threat, 0.8);
        assert_eq!(config.engine.bands.suspicious, 0.3);
        assert_eq!(config.engine.weights, RuleWeights::default());
        assert!(!config.output.pretty);
    }

    #[test]
    fn custom_weights_accepted() {
        let config = Config::parse(
            r#"
            [engine.weights]
            aco = 0.5
            pso = 0.5
            abc = 0.0
            firefly = 0.0
            fss = 0.0
            gwo = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.weights.aco, 0.5);
        assert_eq!(config.engine.weights.get(Detector::Abc), 0.0);
    }

    #[test]
    fn weights_not_summing_to_one_fall_back() {
        let config = Config::parse(
            r#"
            [engine.weights]
            aco = 0.9
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.weights, RuleWeights::default());
    }

    #[test]
    fn negative_weight_falls_back() {
        let weights = RuleWeights {
            aco: -0.1,
            pso: 0.25,
            ..RuleWeights::default()
        };
        assert!(!weights.is_valid());
    }

    #[test]
    fn inverted_bands_fall_back() {
        let config = Config::parse(
            r#"
            [engine.bands]
            suspicious = 0.8
            threat = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.bands, StatusBands::default());
    }

    #[test]
    fn malformed_toml_is_error() {
        assert!(Config::parse("[engine\nweights = ").is_err());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\npretty = false").unwrap();
        let config = Config::load(file.path());
        assert!(!config.output.pretty);
    }

    #[test]
    fn unparsable_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output = 12 = 13").unwrap();
        assert_eq!(Config::load(file.path()), Config::default());
    }
}
