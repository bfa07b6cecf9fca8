//! # Domain Types
//!
//! Core domain types used throughout BioScan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ SampleReference │   │   ScanResult    │   │    Verdict      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  UploadedImage  │   │  id (UUID)      │   │  Safe           │       │
//! │  │  LibrarySample  │   │  sample_tag     │   │  Caution        │       │
//! │  │  CapturedImage  │   │  overall        │   │  Danger         │       │
//! │  │  SensorSample   │   │  contamination  │   └─────────────────┘       │
//! │  └─────────────────┘   │  toxins         │                              │
//! │                        │  nutrients      │   ┌─────────────────┐       │
//! │  ┌─────────────────┐   └─────────────────┘   │    ScanMode     │       │
//! │  │  ImageHandle    │                         │  ─────────────  │       │
//! │  │  Bytes | Uri    │                         │  Visual         │       │
//! │  └─────────────────┘                         │  SensorBased    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything the display layer reads derives `TS`, so the TypeScript
//! bindings never drift from these definitions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::library;
use crate::validation::{validate_image_bytes, validate_image_uri, ValidationResult};
use crate::{CAMERA_SAMPLE_TAG, SENSOR_SAMPLE_TAG, UPLOAD_SAMPLE_TAG};

// =============================================================================
// Scan Mode
// =============================================================================

/// How the sample is analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Image based analysis (upload, library or camera capture).
    #[default]
    Visual,
    /// Simulated bacteria sensor with a loaded sample.
    SensorBased,
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Visual => write!(f, "visual"),
            ScanMode::SensorBased => write!(f, "sensor"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visual" | "camera" | "image" => Ok(ScanMode::Visual),
            "sensor" | "sensor_based" | "sensor-based" => Ok(ScanMode::SensorBased),
            other => Err(CoreError::Validation(
                crate::ValidationError::NotAllowed {
                    field: format!("mode '{}'", other),
                    allowed: vec!["visual".into(), "sensor".into()],
                },
            )),
        }
    }
}

// =============================================================================
// Verdict
// =============================================================================

/// Three-way overall safety classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Safe,
    Caution,
    Danger,
}

// =============================================================================
// Sample Reference
// =============================================================================

/// Handle to image data supplied by the image source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ImageHandle {
    /// Raw encoded image bytes (file contents or a captured frame).
    Bytes(Vec<u8>),
    /// Location of the image (data URI, file URI, URL).
    Uri(String),
}

/// The sample a scan acts upon.
///
/// Replaced wholesale on every new selection and cleared on reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SampleReference {
    /// Image picked from the file system.
    UploadedImage(ImageHandle),
    /// Pre-loaded demo sample, by library id.
    LibrarySample(String),
    /// Frame captured from the live camera.
    CapturedImage(ImageHandle),
    /// Sample placed on the bacteria sensor.
    SensorSample { loaded: bool },
}

impl SampleReference {
    /// Creates an uploaded-image sample from file bytes.
    pub fn uploaded_bytes(bytes: Vec<u8>) -> ValidationResult<Self> {
        validate_image_bytes(&bytes)?;
        Ok(SampleReference::UploadedImage(ImageHandle::Bytes(bytes)))
    }

    /// Creates an uploaded-image sample from a URI.
    pub fn uploaded_uri(uri: impl Into<String>) -> ValidationResult<Self> {
        let uri = uri.into();
        validate_image_uri(&uri)?;
        Ok(SampleReference::UploadedImage(ImageHandle::Uri(uri)))
    }

    /// Creates a captured-image sample from a camera frame.
    pub fn captured_bytes(bytes: Vec<u8>) -> ValidationResult<Self> {
        validate_image_bytes(&bytes)?;
        Ok(SampleReference::CapturedImage(ImageHandle::Bytes(bytes)))
    }

    /// Creates a library sample; the id must exist in the catalogue.
    ///
    /// ## Example
    /// ```rust
    /// use bioscan_core::SampleReference;
    ///
    /// assert!(SampleReference::library("apple").is_ok());
    /// assert!(SampleReference::library("durian").is_err());
    /// ```
    pub fn library(id: &str) -> CoreResult<Self> {
        let entry = library::find(id).ok_or_else(|| CoreError::UnknownSample(id.to_string()))?;
        Ok(SampleReference::LibrarySample(entry.id.to_string()))
    }

    /// A sample loaded on the sensor.
    pub fn sensor() -> Self {
        SampleReference::SensorSample { loaded: true }
    }

    /// Short kind name used in refusals and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SampleReference::UploadedImage(_) => "uploaded",
            SampleReference::LibrarySample(_) => "library",
            SampleReference::CapturedImage(_) => "captured",
            SampleReference::SensorSample { .. } => "sensor",
        }
    }

    /// Returns true if this sample can be attached in the given mode.
    pub fn fits_mode(&self, mode: ScanMode) -> bool {
        match self {
            SampleReference::SensorSample { .. } => mode == ScanMode::SensorBased,
            _ => mode == ScanMode::Visual,
        }
    }

    /// Returns true if a scan in `mode` can run on this sample.
    pub fn is_ready_for(&self, mode: ScanMode) -> bool {
        match self {
            SampleReference::SensorSample { loaded } => *loaded && mode == ScanMode::SensorBased,
            _ => mode == ScanMode::Visual,
        }
    }
}

/// Derives the synthesizer tag for a scan.
///
/// `"bacteria_sensor"` in sensor mode, otherwise `"camera"` for captures,
/// the library id for catalogue samples and `"uploaded"` for anything else.
pub fn sample_tag(mode: ScanMode, sample: &SampleReference) -> String {
    if mode == ScanMode::SensorBased {
        return SENSOR_SAMPLE_TAG.to_string();
    }

    match sample {
        SampleReference::CapturedImage(_) => CAMERA_SAMPLE_TAG.to_string(),
        SampleReference::LibrarySample(id) => id.clone(),
        _ => UPLOAD_SAMPLE_TAG.to_string(),
    }
}

// =============================================================================
// Result Blocks
// =============================================================================

/// Pathogen screening outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BacteriaBlock {
    pub detected: bool,
    pub confidence: f64,
    pub pathogens: Vec<String>,
}

/// Visible mold growth severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MoldSeverity {
    None,
    Low,
    Moderate,
    Severe,
}

/// Mold detection outcome (visual scans).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MoldBlock {
    pub detected: bool,
    pub types: Vec<String>,
    pub severity: MoldSeverity,
    /// Share of the visible surface covered, 0-100.
    pub coverage_percent: f64,
    /// Estimated spores per gram.
    pub spore_count: u32,
}

/// Contamination section of a result: bacteria or mold, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Contamination {
    Bacteria(BacteriaBlock),
    Mold(MoldBlock),
}

impl Contamination {
    /// Returns true if anything harmful was found.
    pub fn detected(&self) -> bool {
        match self {
            Contamination::Bacteria(b) => b.detected,
            Contamination::Mold(m) => m.detected,
        }
    }
}

/// Toxin concentration band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ToxinLevel {
    None,
    Low,
    Moderate,
    High,
}

/// Chemical contamination outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ToxinBlock {
    pub detected: bool,
    pub level: ToxinLevel,
    pub types: Vec<String>,
    pub concentration_ppm: f64,
}

impl ToxinBlock {
    /// A block with nothing detected.
    pub fn clean() -> Self {
        ToxinBlock {
            detected: false,
            level: ToxinLevel::None,
            types: Vec::new(),
            concentration_ppm: 0.0,
        }
    }
}

/// Nutritional profile. All scores are percentages of daily value, 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NutrientBlock {
    pub health_score: u8,
    pub vitamins: BTreeMap<String, u8>,
    pub minerals: BTreeMap<String, u8>,
    /// Fiber, sugar, protein, fat...
    pub composition: BTreeMap<String, u8>,
}

// =============================================================================
// Scan Result
// =============================================================================

/// A finished analysis. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Unique identifier (UUID v4).
    pub id: String,
    pub sample_tag: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
    pub overall: Verdict,
    /// Overall confidence, 0-1.
    pub confidence: f64,
    pub mode: ScanMode,
    pub contamination: Contamination,
    pub toxins: ToxinBlock,
    pub nutrients: NutrientBlock,
}

impl ScanResult {
    /// Encodes the result as pretty JSON for the display layer.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_mode_parsing() {
        assert_eq!("visual".parse::<ScanMode>().unwrap(), ScanMode::Visual);
        assert_eq!("camera".parse::<ScanMode>().unwrap(), ScanMode::Visual);
        assert_eq!("sensor".parse::<ScanMode>().unwrap(), ScanMode::SensorBased);
        assert_eq!(
            "Sensor_Based".parse::<ScanMode>().unwrap(),
            ScanMode::SensorBased
        );
        assert!("xray".parse::<ScanMode>().is_err());
    }

    #[test]
    fn test_sample_tag_derivation() {
        let captured = SampleReference::captured_bytes(vec![0xFF, 0xD8]).unwrap();
        let library = SampleReference::library("milk").unwrap();
        let uploaded = SampleReference::uploaded_uri("file:///tmp/bread.jpg").unwrap();

        assert_eq!(sample_tag(ScanMode::Visual, &captured), "camera");
        assert_eq!(sample_tag(ScanMode::Visual, &library), "milk");
        assert_eq!(sample_tag(ScanMode::Visual, &uploaded), "uploaded");
        assert_eq!(
            sample_tag(ScanMode::SensorBased, &SampleReference::sensor()),
            "bacteria_sensor"
        );
    }

    #[test]
    fn test_sample_fits_mode() {
        let sensor = SampleReference::sensor();
        let library = SampleReference::library("apple").unwrap();

        assert!(sensor.fits_mode(ScanMode::SensorBased));
        assert!(!sensor.fits_mode(ScanMode::Visual));
        assert!(library.fits_mode(ScanMode::Visual));
        assert!(!library.fits_mode(ScanMode::SensorBased));

        let unloaded = SampleReference::SensorSample { loaded: false };
        assert!(!unloaded.is_ready_for(ScanMode::SensorBased));
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert!(SampleReference::uploaded_bytes(Vec::new()).is_err());
        assert!(SampleReference::uploaded_uri("   ").is_err());
    }

    #[test]
    fn test_verdict_serializes_snake_case() {
        let json = serde_json::to_string(&Verdict::Caution).unwrap();
        assert_eq!(json, "\"caution\"");
    }
}
