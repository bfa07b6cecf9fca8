//! # Recommendations
//!
//! Canned advice shown next to a result. The text depends only on the
//! verdict and on what the blocks report, so the display layer never has to
//! reinterpret the raw numbers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Contamination, ScanResult, ToxinLevel, Verdict};

/// Advice derived from a [`ScanResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// Banner text, e.g. "SAFE TO CONSUME".
    pub headline: String,
    pub safety: Vec<String>,
    pub nutrition: Vec<String>,
    /// One line for the bacteria/mold card.
    pub contamination_summary: String,
    /// One line for the toxin card.
    pub toxin_summary: String,
}

impl Recommendations {
    /// Builds the advice for a result.
    ///
    /// ## Example
    /// ```rust
    /// use bioscan_core::recommendations::Recommendations;
    /// use bioscan_core::{synthesize, ScanMode};
    ///
    /// let result = synthesize("milk", ScanMode::Visual);
    /// let advice = Recommendations::for_result(&result);
    /// assert_eq!(advice.headline, "CONSUME WITH CAUTION");
    /// ```
    pub fn for_result(result: &ScanResult) -> Self {
        Recommendations {
            headline: headline(result.overall).to_string(),
            safety: owned(safety_advice(result.overall)),
            nutrition: owned(&NUTRITION_TIPS),
            contamination_summary: contamination_summary(&result.contamination).to_string(),
            toxin_summary: toxin_summary(result).to_string(),
        }
    }
}

const NUTRITION_TIPS: [&str; 4] = [
    "Good source of natural vitamins",
    "Consider pairing with vitamin D sources",
    "Part of a balanced diet",
    "Regular consumption recommended",
];

/// Banner text for a verdict.
pub fn headline(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Safe => "SAFE TO CONSUME",
        Verdict::Caution => "CONSUME WITH CAUTION",
        Verdict::Danger => "DO NOT CONSUME",
    }
}

/// Safety advice for a verdict.
pub fn safety_advice(verdict: Verdict) -> &'static [&'static str] {
    match verdict {
        Verdict::Safe => &[
            "Safe for immediate consumption",
            "Store in appropriate conditions",
            "Consume within recommended timeframe",
        ],
        Verdict::Caution => &[
            "Cook thoroughly before consumption",
            "Wash thoroughly with clean water",
            "Monitor for any adverse reactions",
        ],
        Verdict::Danger => &[
            "Do not consume this sample",
            "Dispose of safely",
            "Check storage conditions",
        ],
    }
}

fn contamination_summary(contamination: &Contamination) -> &'static str {
    match contamination {
        Contamination::Bacteria(b) if b.detected => {
            "Harmful bacteria detected. Consider proper cooking or disposal."
        }
        Contamination::Bacteria(_) => "No harmful bacteria detected. Sample appears clean.",
        Contamination::Mold(m) if m.detected => {
            "Mold growth detected. Do not cut away affected areas, discard the sample."
        }
        Contamination::Mold(_) => "No mold growth detected. Surface appears clean.",
    }
}

fn toxin_summary(result: &ScanResult) -> &'static str {
    match result.toxins.level {
        _ if !result.toxins.detected => "No toxic substances detected. Sample is clean.",
        ToxinLevel::None | ToxinLevel::Low => {
            "Low levels of contaminants detected. Generally safe for consumption."
        }
        ToxinLevel::Moderate => "Elevated toxin levels detected. Consumption is not advised.",
        ToxinLevel::High => "Dangerous toxin concentration detected. Discard the sample.",
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
