pub mod pipeline;
pub mod record;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use record::{EventKind, LogRecord};

/// The full ordered set of records submitted for one evaluation.
pub type LogBatch = Vec<LogRecord>;

/// The six independent scoring rules, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    Aco,
    Pso,
    Abc,
    Firefly,
    Fss,
    Gwo,
}

impl Detector {
    pub const ALL: [Detector; 6] = [
        Detector::Aco,
        Detector::Pso,
        Detector::Abc,
        Detector::Firefly,
        Detector::Fss,
        Detector::Gwo,
    ];

    /// External identifier used as the key in `detection_summary`.
    pub fn name(self) -> &'static str {
        match self {
            Detector::Aco => "aco",
            Detector::Pso => "pso",
            Detector::Abc => "abc",
            Detector::Firefly => "firefly",
            Detector::Fss => "fss",
            Detector::Gwo => "gwo",
        }
    }

    pub fn default_weight(self) -> f64 {
        match self {
            Detector::Aco => 0.15,
            Detector::Pso => 0.15,
            Detector::Abc => 0.20,
            Detector::Firefly => 0.20,
            Detector::Fss => 0.20,
            Detector::Gwo => 0.10,
        }
    }
}

/// Per-rule sub-scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectionSummary {
    pub aco: f64,
    pub pso: f64,
    pub abc: f64,
    pub firefly: f64,
    pub fss: f64,
    pub gwo: f64,
}

impl DetectionSummary {
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

    pub fn iter(&self) -> impl Iterator<Item = (Detector, f64)> + '_ {
        Detector::ALL.into_iter().map(|d| (d, self.get(d)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Safe,       // <0.3
    Suspicious, // <0.7
    Threat,     // ≥0.7
}

impl OverallStatus {
    /// Band a threat score with the default thresholds.
    pub fn from_score(score: f64) -> Self {
        crate::detection::score::band(score, &crate::config::StatusBands::default())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Safe => "safe",
            OverallStatus::Suspicious => "suspicious",
            OverallStatus::Threat => "threat",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The composite assessment for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreReport {
    pub overall_status: OverallStatus,
    pub threat_score: f64,
    pub detection_summary: DetectionSummary,
}

impl ScoreReport {
    /// The canonical all-zero report for an empty or absent batch.
    pub fn safe() -> Self {
        Self {
            overall_status: OverallStatus::Safe,
            threat_score: 0.0,
            detection_summary: DetectionSummary::default(),
        }
    }
}
