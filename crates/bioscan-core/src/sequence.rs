//! # Status Sequences
//!
//! The scripted status texts shown while "connecting" and "scanning".
//!
//! ## Timeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  connect()                                                              │
//! │  ├── 0.0s  "Searching for BioScanner device..."                         │
//! │  ├── 0.6s  "Device found: BioScanner Pro"                               │
//! │  ├── 1.2s  "Establishing secure link..."                                │
//! │  ├── 1.8s  "Calibrating sensor array..."                                │
//! │  ├── 2.4s  "Connection established"                                     │
//! │  └── 3.0s  settle: connected = true, status cleared                     │
//! │                                                                         │
//! │  Each label stays on screen for its step duration, then the next one   │
//! │  replaces it. Scan sequences work the same way, labels differ by mode.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module only describes sequences. Running them on a clock is the job
//! of the session crate.

use std::time::Duration;

use crate::types::ScanMode;

/// Default time each status label stays visible.
pub const DEFAULT_STEP: Duration = Duration::from_millis(600);

const CONNECT_LABELS: [&str; 5] = [
    "Searching for BioScanner device...",
    "Device found: BioScanner Pro",
    "Establishing secure link...",
    "Calibrating sensor array...",
    "Connection established",
];

const VISUAL_SCAN_LABELS: [&str; 5] = [
    "Capturing sample image...",
    "Analyzing surface texture...",
    "Detecting mold colonies...",
    "Screening for mycotoxins...",
    "Compiling nutrient profile...",
];

const SENSOR_SCAN_LABELS: [&str; 5] = [
    "Priming bacteria sensor...",
    "Reading sample chemistry...",
    "Matching pathogen signatures...",
    "Measuring toxin levels...",
    "Compiling nutrient profile...",
];

/// One status update: a label and how long it stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStep {
    pub label: &'static str,
    pub duration: Duration,
}

/// An ordered, finite list of status steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSequence {
    steps: Vec<StatusStep>,
}

impl StatusSequence {
    /// Builds a sequence where every label shares the same cadence.
    pub fn uniform(labels: &[&'static str], step: Duration) -> Self {
        StatusSequence {
            steps: labels
                .iter()
                .map(|label| StatusStep {
                    label: *label,
                    duration: step,
                })
                .collect(),
        }
    }

    /// The five-step connect sequence.
    pub fn connect(step: Duration) -> Self {
        Self::uniform(&CONNECT_LABELS, step)
    }

    /// The scan sequence for a mode.
    pub fn scan(mode: ScanMode, step: Duration) -> Self {
        match mode {
            ScanMode::Visual => Self::uniform(&VISUAL_SCAN_LABELS, step),
            ScanMode::SensorBased => Self::uniform(&SENSOR_SCAN_LABELS, step),
        }
    }

    pub fn steps(&self) -> &[StatusStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Time from the first label until the sequence settles.
    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Labels in display order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.label).collect()
    }
}

impl IntoIterator for StatusSequence {
    type Item = StatusStep;
    type IntoIter = std::vec::IntoIter<StatusStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_has_five_steps() {
        let seq = StatusSequence::connect(DEFAULT_STEP);
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.total_duration(), Duration::from_millis(3000));
        assert_eq!(seq.labels()[4], "Connection established");
    }

    #[test]
    fn test_scan_labels_differ_by_mode() {
        let visual = StatusSequence::scan(ScanMode::Visual, DEFAULT_STEP);
        let sensor = StatusSequence::scan(ScanMode::SensorBased, DEFAULT_STEP);

        assert_eq!(visual.len(), sensor.len());
        assert_ne!(visual.labels(), sensor.labels());
        assert_eq!(sensor.labels()[0], "Priming bacteria sensor...");
    }

    #[test]
    fn test_zero_cadence() {
        let seq = StatusSequence::connect(Duration::ZERO);
        assert_eq!(seq.total_duration(), Duration::ZERO);
        assert!(!seq.is_empty());
    }
}
