//! Multi-heuristic security log scoring.
//!
//! A batch of log records is run through six independent rule sets, each
//! producing a sub-score in `[0, 1]`. The sub-scores are combined with fixed
//! weights into a threat score, which is banded into `safe`, `suspicious`, or
//! `threat`.

pub mod config;
pub mod core;
pub mod detection;
pub mod input;

pub use crate::config::Config;
pub use crate::core::{DetectionSummary, Detector, LogBatch, LogRecord, OverallStatus, ScoreReport};
pub use crate::detection::{ThreatEngine, evaluate};
pub use crate::input::InputError;
