//! # Result Synthesizer
//!
//! Produces the (entirely synthetic) analysis shown after a scan.
//!
//! ## Branch Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    synthesize(tag, mode)                                │
//! │                                                                         │
//! │  tag == "bacteria_sensor" ──► draw p=0.4 ──┬─► SensorContaminated      │
//! │          │                                 └─► SensorClean             │
//! │          ▼ no                                                           │
//! │  tag is a library id ─────► fixed record ──┬─► Apple                   │
//! │          │                                 └─► Milk                    │
//! │          ▼ no                                                           │
//! │  tag == "camera" or Visual ► draw p=0.3 ───┬─► MoldDetected            │
//! │          │                                 └─► VisualClean             │
//! │          ▼ no                                                           │
//! │  anything else ──────────────────────────────► Generic                 │
//! │                                                                         │
//! │  At most ONE random draw per call. Library samples never draw.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every branch is a [`Finding`] variant; [`Finding::into_result`] turns it
//! into a fully populated [`ScanResult`], so no branch can forget a block.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::library;
use crate::types::{
    BacteriaBlock, Contamination, MoldBlock, MoldSeverity, NutrientBlock, ScanMode, ScanResult,
    ToxinBlock, ToxinLevel, Verdict,
};
use crate::validation::{validate_probability, ValidationResult};
use crate::{CAMERA_SAMPLE_TAG, SENSOR_SAMPLE_TAG};

/// Probability that a sensor sample comes back contaminated.
pub const DEFAULT_SENSOR_CONTAMINATION_PROBABILITY: f64 = 0.4;

/// Probability that a visual sample shows mold.
pub const DEFAULT_MOLD_PROBABILITY: f64 = 0.3;

// =============================================================================
// Policy
// =============================================================================

/// Outcome probabilities for the random branches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisPolicy {
    pub sensor_contamination_probability: f64,
    pub mold_probability: f64,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        SynthesisPolicy {
            sensor_contamination_probability: DEFAULT_SENSOR_CONTAMINATION_PROBABILITY,
            mold_probability: DEFAULT_MOLD_PROBABILITY,
        }
    }
}

impl SynthesisPolicy {
    /// Both probabilities must lie in [0, 1].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_probability(
            "sensor_contamination_probability",
            self.sensor_contamination_probability,
        )?;
        validate_probability("mold_probability", self.mold_probability)
    }
}

// =============================================================================
// Finding
// =============================================================================

/// Which canned analysis a scan produced. One variant per branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finding {
    SensorContaminated,
    SensorClean,
    Apple,
    Milk,
    MoldDetected,
    VisualClean,
    Generic,
}

impl Finding {
    /// Picks the branch for `tag` / `mode`, drawing from `rng` at most once.
    pub fn classify<R: Rng + ?Sized>(
        tag: &str,
        mode: ScanMode,
        policy: &SynthesisPolicy,
        rng: &mut R,
    ) -> Finding {
        if tag == SENSOR_SAMPLE_TAG {
            return if rng.gen_bool(policy.sensor_contamination_probability) {
                Finding::SensorContaminated
            } else {
                Finding::SensorClean
            };
        }

        match tag {
            library::APPLE => return Finding::Apple,
            library::MILK => return Finding::Milk,
            _ => {}
        }

        if tag == CAMERA_SAMPLE_TAG || mode == ScanMode::Visual {
            return if rng.gen_bool(policy.mold_probability) {
                Finding::MoldDetected
            } else {
                Finding::VisualClean
            };
        }

        Finding::Generic
    }

    /// Assembles the complete result record for this finding.
    pub fn into_result(self, tag: &str, mode: ScanMode, at: DateTime<Utc>) -> ScanResult {
        ScanResult {
            id: Uuid::new_v4().to_string(),
            sample_tag: tag.to_string(),
            timestamp: at,
            overall: self.overall(),
            confidence: self.confidence(),
            mode,
            contamination: self.contamination(),
            toxins: self.toxins(),
            nutrients: self.nutrients(),
        }
    }

    fn overall(self) -> Verdict {
        match self {
            Finding::SensorContaminated | Finding::MoldDetected => Verdict::Danger,
            Finding::Milk => Verdict::Caution,
            Finding::SensorClean | Finding::Apple | Finding::VisualClean | Finding::Generic => {
                Verdict::Safe
            }
        }
    }

    fn confidence(self) -> f64 {
        match self {
            Finding::SensorContaminated => 0.92,
            Finding::SensorClean => 0.96,
            Finding::MoldDetected => 0.89,
            Finding::VisualClean => 0.94,
            Finding::Apple | Finding::Milk | Finding::Generic => 0.95,
        }
    }

    fn contamination(self) -> Contamination {
        match self {
            Finding::SensorContaminated => Contamination::Bacteria(BacteriaBlock {
                detected: true,
                confidence: 0.92,
                pathogens: strings(&["E. coli", "Salmonella", "Listeria monocytogenes"]),
            }),
            Finding::SensorClean => bacteria_clean(0.96),
            Finding::Apple => bacteria_clean(0.98),
            Finding::Milk => Contamination::Bacteria(BacteriaBlock {
                detected: true,
                confidence: 0.87,
                pathogens: strings(&["E. coli (trace)"]),
            }),
            Finding::Generic => bacteria_clean(0.92),
            Finding::MoldDetected => Contamination::Mold(MoldBlock {
                detected: true,
                types: strings(&["Aspergillus flavus", "Penicillium expansum"]),
                severity: MoldSeverity::Severe,
                coverage_percent: 18.5,
                spore_count: 42_000,
            }),
            Finding::VisualClean => Contamination::Mold(MoldBlock {
                detected: false,
                types: Vec::new(),
                severity: MoldSeverity::None,
                coverage_percent: 0.0,
                spore_count: 0,
            }),
        }
    }

    fn toxins(self) -> ToxinBlock {
        match self {
            Finding::SensorContaminated => ToxinBlock {
                detected: true,
                level: ToxinLevel::Moderate,
                types: strings(&["Shiga toxin", "Bacterial endotoxins"]),
                concentration_ppm: 1.4,
            },
            Finding::Apple => ToxinBlock {
                detected: true,
                level: ToxinLevel::Low,
                types: strings(&["Pesticide residue"]),
                concentration_ppm: 0.02,
            },
            Finding::MoldDetected => ToxinBlock {
                detected: true,
                level: ToxinLevel::High,
                types: strings(&["Aflatoxin B1", "Patulin"]),
                concentration_ppm: 12.5,
            },
            Finding::SensorClean | Finding::Milk | Finding::VisualClean | Finding::Generic => {
                ToxinBlock::clean()
            }
        }
    }

    fn nutrients(self) -> NutrientBlock {
        match self {
            Finding::SensorContaminated => nutrients(
                25,
                &[("A", 10), ("C", 20)],
                &[("Calcium", 18), ("Iron", 12)],
                &[("Protein", 10)],
            ),
            Finding::SensorClean => nutrients(
                88,
                &[("A", 35), ("B6", 22), ("C", 60)],
                &[("Magnesium", 30), ("Potassium", 48)],
                &[("Fiber", 14), ("Protein", 12)],
            ),
            Finding::Apple => nutrients(
                85,
                &[("C", 95), ("A", 12), ("K", 8)],
                &[("Potassium", 78), ("Iron", 5)],
                &[("Fiber", 12), ("Sugar", 19)],
            ),
            Finding::Milk => nutrients(
                72,
                &[("D", 45), ("B12", 67), ("A", 28)],
                &[("Calcium", 89), ("Phosphorus", 67)],
                &[("Protein", 24), ("Fat", 18)],
            ),
            Finding::MoldDetected => nutrients(
                15,
                &[("A", 5), ("C", 10)],
                &[("Iron", 8)],
                &[("Fiber", 6)],
            ),
            Finding::VisualClean => nutrients(
                82,
                &[("A", 30), ("C", 52), ("K", 18)],
                &[("Iron", 15), ("Potassium", 40)],
                &[("Fiber", 10), ("Sugar", 9)],
            ),
            Finding::Generic => nutrients(
                78,
                &[("C", 45), ("A", 23), ("K", 15)],
                &[("Iron", 34), ("Magnesium", 28)],
                &[("Fiber", 8), ("Protein", 15)],
            ),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn scores(items: &[(&str, u8)]) -> BTreeMap<String, u8> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn bacteria_clean(confidence: f64) -> Contamination {
    Contamination::Bacteria(BacteriaBlock {
        detected: false,
        confidence,
        pathogens: Vec::new(),
    })
}

fn nutrients(
    health_score: u8,
    vitamins: &[(&str, u8)],
    minerals: &[(&str, u8)],
    composition: &[(&str, u8)],
) -> NutrientBlock {
    NutrientBlock {
        health_score,
        vitamins: scores(vitamins),
        minerals: scores(minerals),
        composition: scores(composition),
    }
}

// =============================================================================
// Synthesizer
// =============================================================================

/// Result synthesizer with a validated outcome policy.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    policy: SynthesisPolicy,
}

impl Synthesizer {
    /// Creates a synthesizer, rejecting probabilities outside [0, 1].
    pub fn new(policy: SynthesisPolicy) -> ValidationResult<Self> {
        policy.validate()?;
        Ok(Synthesizer { policy })
    }

    /// Returns the active policy.
    pub fn policy(&self) -> &SynthesisPolicy {
        &self.policy
    }

    /// Synthesizes a result with an injected generator and timestamp.
    ///
    /// ## Example
    /// ```rust
    /// use bioscan_core::synthesizer::Synthesizer;
    /// use bioscan_core::{ScanMode, Verdict};
    /// use rand::rngs::StdRng;
    /// use rand::SeedableRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let result = Synthesizer::default().synthesize_with(
    ///     "apple",
    ///     ScanMode::Visual,
    ///     &mut rng,
    ///     chrono::Utc::now(),
    /// );
    /// assert_eq!(result.overall, Verdict::Safe);
    /// assert_eq!(result.nutrients.health_score, 85);
    /// ```
    pub fn synthesize_with<R: Rng + ?Sized>(
        &self,
        tag: &str,
        mode: ScanMode,
        rng: &mut R,
        at: DateTime<Utc>,
    ) -> ScanResult {
        Finding::classify(tag, mode, &self.policy, rng).into_result(tag, mode, at)
    }
}

/// Synthesizes a result with the default policy and unseeded randomness.
pub fn synthesize(tag: &str, mode: ScanMode) -> ScanResult {
    Synthesizer::default().synthesize_with(tag, mode, &mut rand::thread_rng(), Utc::now())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALL_FINDINGS: [Finding; 7] = [
        Finding::SensorContaminated,
        Finding::SensorClean,
        Finding::Apple,
        Finding::Milk,
        Finding::MoldDetected,
        Finding::VisualClean,
        Finding::Generic,
    ];

    #[test]
    fn test_apple_is_fixed_record() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result =
                Synthesizer::default().synthesize_with("apple", ScanMode::Visual, &mut rng, Utc::now());

            assert_eq!(result.overall, Verdict::Safe);
            assert_eq!(result.nutrients.health_score, 85);
            assert_eq!(result.toxins.types, vec!["Pesticide residue".to_string()]);
            assert_eq!(result.toxins.level, ToxinLevel::Low);
            assert!(!result.contamination.detected());
        }
    }

    #[test]
    fn test_milk_is_fixed_record() {
        let result = synthesize("milk", ScanMode::Visual);

        assert_eq!(result.overall, Verdict::Caution);
        assert_eq!(result.nutrients.health_score, 72);
        match result.contamination {
            Contamination::Bacteria(ref b) => {
                assert_eq!(b.pathogens, vec!["E. coli (trace)".to_string()]);
            }
            ref other => panic!("expected bacteria block, got {:?}", other),
        }
        assert!(!result.toxins.detected);
    }

    #[test]
    fn test_sensor_contamination_frequency() {
        let synthesizer = Synthesizer::default();
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;
        let mut contaminated = 0;

        for _ in 0..trials {
            let result = synthesizer.synthesize_with(
                "bacteria_sensor",
                ScanMode::SensorBased,
                &mut rng,
                Utc::now(),
            );
            if result.contamination.detected() {
                contaminated += 1;
                assert_eq!(result.overall, Verdict::Danger);
                assert_eq!(result.nutrients.health_score, 25);
            } else {
                assert_eq!(result.overall, Verdict::Safe);
                assert_eq!(result.nutrients.health_score, 88);
            }
        }

        let frequency = contaminated as f64 / trials as f64;
        assert!((frequency - 0.4).abs() < 0.03, "frequency was {}", frequency);
    }

    #[test]
    fn test_mold_frequency_for_uploads() {
        let synthesizer = Synthesizer::default();
        let mut rng = StdRng::seed_from_u64(9);
        let trials = 10_000;
        let mut moldy = 0;

        for _ in 0..trials {
            let result =
                synthesizer.synthesize_with("uploaded", ScanMode::Visual, &mut rng, Utc::now());
            assert!(matches!(result.contamination, Contamination::Mold(_)));
            if result.contamination.detected() {
                moldy += 1;
                assert_eq!(result.nutrients.health_score, 15);
            } else {
                assert_eq!(result.nutrients.health_score, 82);
            }
        }

        let frequency = moldy as f64 / trials as f64;
        assert!((frequency - 0.3).abs() < 0.03, "frequency was {}", frequency);
    }

    #[test]
    fn test_branch_selection() {
        let policy = SynthesisPolicy::default();
        let mut rng = StdRng::seed_from_u64(1);

        // Camera tag uses the mold branch even outside visual mode
        let finding = Finding::classify("camera", ScanMode::SensorBased, &policy, &mut rng);
        assert!(matches!(finding, Finding::MoldDetected | Finding::VisualClean));

        // Unknown tag outside visual mode falls through to the generic record
        let finding = Finding::classify("uploaded", ScanMode::SensorBased, &policy, &mut rng);
        assert_eq!(finding, Finding::Generic);

        // Library ids win over the visual branch
        let finding = Finding::classify("milk", ScanMode::Visual, &policy, &mut rng);
        assert_eq!(finding, Finding::Milk);
    }

    #[test]
    fn test_certain_probabilities() {
        let synthesizer = Synthesizer::new(SynthesisPolicy {
            sensor_contamination_probability: 1.0,
            mold_probability: 0.0,
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let sensor =
            synthesizer.synthesize_with("bacteria_sensor", ScanMode::SensorBased, &mut rng, Utc::now());
        assert_eq!(sensor.overall, Verdict::Danger);

        let camera = synthesizer.synthesize_with("camera", ScanMode::Visual, &mut rng, Utc::now());
        assert_eq!(camera.overall, Verdict::Safe);
    }

    #[test]
    fn test_every_branch_in_range() {
        let now = Utc::now();
        for finding in ALL_FINDINGS {
            let result = finding.into_result("tag", ScanMode::Visual, now);
            assert!((0.0..=1.0).contains(&result.confidence), "{:?}", finding);
            assert!(result.nutrients.health_score <= 100, "{:?}", finding);
            assert!(!result.nutrients.vitamins.is_empty(), "{:?}", finding);
            assert!(!result.nutrients.minerals.is_empty(), "{:?}", finding);
            if let Contamination::Bacteria(ref b) = result.contamination {
                assert!((0.0..=1.0).contains(&b.confidence));
            }
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let synthesizer = Synthesizer::default();
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..32)
                .map(|_| {
                    synthesizer
                        .synthesize_with("bacteria_sensor", ScanMode::SensorBased, &mut rng, Utc::now())
                        .overall
                })
                .collect::<Vec<_>>()
        };

        assert_eq!(draw(11), draw(11));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let policy = SynthesisPolicy {
            sensor_contamination_probability: 1.2,
            ..Default::default()
        };
        assert!(Synthesizer::new(policy).is_err());
    }
}
