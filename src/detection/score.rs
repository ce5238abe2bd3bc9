use crate::config::{RuleWeights, StatusBands};
use crate::core::{DetectionSummary, OverallStatus};

/// Weighted sum of the sub-scores, clamped to `[0, 1]`.
pub fn compute_composite(summary: &DetectionSummary, weights: &RuleWeights) -> f64 {
    let total: f64 = summary
        .iter()
        .map(|(detector, value)| value * weights.get(detector))
        .sum();
    total.clamp(0.0, 1.0)
}

/// Map a threat score to its band. Band lower bounds are inclusive.
pub fn band(score: f64, bands: &StatusBands) -> OverallStatus {
    if score < bands.suspicious {
        OverallStatus::Safe
    } else if score < bands.threat {
        OverallStatus::Suspicious
    } else {
        OverallStatus::Threat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_summary(value: f64) -> DetectionSummary {
        DetectionSummary {
            aco: value,
            pso: value,
            abc: value,
            firefly: value,
            fss: value,
            gwo: value,
        }
    }

    #[test]
    fn all_zero() {
        assert_eq!(compute_composite(&make_summary(0.0), &RuleWeights::default()), 0.0);
    }

    #[test]
    fn all_one_is_clamped_to_one() {
        let score = compute_composite(&make_summary(1.0), &RuleWeights::default());
        assert!(score <= 1.0);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn weights_applied_per_detector() {
        let summary = DetectionSummary {
            abc: 1.0,
            gwo: 1.0,
            ..DetectionSummary::default()
        };
        // 0.20 + 0.10
        let score = compute_composite(&summary, &RuleWeights::default());
        assert!((score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn custom_weights() {
        let weights = RuleWeights {
            aco: 1.0,
            pso: 0.0,
            abc: 0.0,
            firefly: 0.0,
            fss: 0.0,
            gwo: 0.0,
        };
        let summary = DetectionSummary {
            aco: 0.42,
            pso: 1.0,
            ..DetectionSummary::default()
        };
        assert!((compute_composite(&summary, &weights) - 0.42).abs() < 1e-9);
    }

    #[test]
    fn band_boundaries() {
        let bands = StatusBands::default();
        assert_eq!(band(0.0, &bands), OverallStatus::Safe);
        assert_eq!(band(0.29999, &bands), OverallStatus::Safe);
        assert_eq!(band(0.3, &bands), OverallStatus::Suspicious);
        assert_eq!(band(0.69999, &bands), OverallStatus::Suspicious);
        assert_eq!(band(0.7, &bands), OverallStatus::Threat);
        assert_eq!(band(1.0, &bands), OverallStatus::Threat);
    }

    #[test]
    fn from_score_uses_default_bands() {
        assert_eq!(OverallStatus::from_score(0.29999), OverallStatus::Safe);
        assert_eq!(OverallStatus::from_score(0.3), OverallStatus::Suspicious);
        assert_eq!(OverallStatus::from_score(0.7), OverallStatus::Threat);
    }

    #[test]
    fn custom_bands() {
        let bands = StatusBands {
            suspicious: 0.5,
            threat: 0.9,
        };
        assert_eq!(band(0.4, &bands), OverallStatus::Safe);
        assert_eq!(band(0.8, &bands), OverallStatus::Suspicious);
        assert_eq!(band(0.9, &bands), OverallStatus::Threat);
    }
}
