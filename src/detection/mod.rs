pub mod indicators;
pub mod rules;
pub mod score;

use tracing::info;

use crate::config::{EngineConfig, RuleWeights, StatusBands};
use crate::core::{DetectionSummary, LogRecord, ScoreReport};

/// The threat engine runs all six rules over a batch and combines them into
/// one report. It holds only immutable configuration and is safe to share.
#[derive(Debug, Clone, Default)]
pub struct ThreatEngine {
    weights: RuleWeights,
    bands: StatusBands,
}

impl ThreatEngine {
    pub fn new(config: &EngineConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            weights: config.weights,
            bands: config.bands,
        }
    }

    pub fn evaluate(&self, batch: &[LogRecord]) -> ScoreReport {
        if batch.is_empty() {
            return ScoreReport::safe();
        }

        let detection_summary = DetectionSummary {
            aco: rules::source_reputation(batch),
            pso: rules::active_threats(batch),
            abc: rules::access_anomalies(batch),
            firefly: rules::attack_chain(batch),
            fss: rules::critical_events(batch),
            gwo: rules::internal_targeting(batch),
        };
        let threat_score = score::compute_composite(&detection_summary, &self.weights);
        let overall_status = score::band(threat_score, &self.bands);

        info!(
            records = batch.len(),
            threat_score,
            status = %overall_status,
            "Batch evaluated"
        );

        ScoreReport {
            overall_status,
            threat_score,
            detection_summary,
        }
    }
}

/// Evaluate a batch with the default weights and bands.
pub fn evaluate(batch: &[LogRecord]) -> ScoreReport {
    ThreatEngine::default().evaluate(batch)
}
