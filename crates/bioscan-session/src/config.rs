//! # Scanner Configuration
//!
//! Configuration for the session runtime: device identity, sequence cadence
//! and synthesizer tuning.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BIOSCAN_SCAN_STEP_MS=200                                           │
//! │     BIOSCAN_SEED=42                                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/scanner/scanner.toml (Linux)                             │
//! │     ~/Library/Application Support/com.bioscan.scanner/scanner.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     600ms steps, p(sensor)=0.4, p(mold)=0.3, unseeded                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanner.toml
//! [device]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "BioScanner Pro"
//!
//! [timing]
//! connect_step_ms = 600
//! scan_step_ms = 600
//!
//! [synthesis]
//! sensor_contamination_probability = 0.4
//! mold_probability = 0.3
//! seed = 42  # omit for fresh randomness every run
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use bioscan_core::synthesizer::{
    DEFAULT_MOLD_PROBABILITY, DEFAULT_SENSOR_CONTAMINATION_PROBABILITY,
};
use bioscan_core::validation::{validate_probability, validate_step_ms};
use bioscan_core::SynthesisPolicy;

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Device Configuration
// =============================================================================

/// Identity of the (simulated) scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (UUID v4), generated on first run.
    pub id: String,

    /// Name shown in logs.
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_device_name() -> String {
    "BioScanner Pro".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            id: Uuid::new_v4().to_string(),
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Timing Settings
// =============================================================================

/// Cadence of the scripted status sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Time each connect label stays up (milliseconds).
    #[serde(default = "default_step_ms")]
    pub connect_step_ms: u64,

    /// Time each scan label stays up (milliseconds).
    #[serde(default = "default_step_ms")]
    pub scan_step_ms: u64,
}

fn default_step_ms() -> u64 {
    bioscan_core::sequence::DEFAULT_STEP.as_millis() as u64
}

impl Default for TimingSettings {
    fn default() -> Self {
        TimingSettings {
            connect_step_ms: default_step_ms(),
            scan_step_ms: default_step_ms(),
        }
    }
}

// =============================================================================
// Synthesis Settings
// =============================================================================

/// Outcome probabilities and optional seed for the synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisSettings {
    #[serde(default = "default_sensor_probability")]
    pub sensor_contamination_probability: f64,

    #[serde(default = "default_mold_probability")]
    pub mold_probability: f64,

    /// Fixed RNG seed. `None` means a fresh seed every session.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sensor_probability() -> f64 {
    DEFAULT_SENSOR_CONTAMINATION_PROBABILITY
}

fn default_mold_probability() -> f64 {
    DEFAULT_MOLD_PROBABILITY
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        SynthesisSettings {
            sensor_contamination_probability: default_sensor_probability(),
            mold_probability: default_mold_probability(),
            seed: None,
        }
    }
}

// =============================================================================
// Main Scanner Configuration
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub timing: TimingSettings,

    #[serde(default)]
    pub synthesis: SynthesisSettings,
}

impl ScannerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scanner.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load scanner config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        if self.device.id.is_empty() {
            return Err(SessionError::InvalidConfig("device.id is empty".into()));
        }

        validate_step_ms("timing.connect_step_ms", self.timing.connect_step_ms)
            .map_err(invalid)?;
        validate_step_ms("timing.scan_step_ms", self.timing.scan_step_ms).map_err(invalid)?;
        validate_probability(
            "synthesis.sensor_contamination_probability",
            self.synthesis.sensor_contamination_probability,
        )
        .map_err(invalid)?;
        validate_probability("synthesis.mold_probability", self.synthesis.mold_probability)
            .map_err(invalid)?;

        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// Unparseable values are logged and skipped.
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("BIOSCAN_DEVICE_NAME") {
            self.device.name = name;
        }

        if let Some(ms) = env_parsed::<u64>("BIOSCAN_CONNECT_STEP_MS") {
            debug!(ms, "Overriding connect cadence from environment");
            self.timing.connect_step_ms = ms;
        }

        if let Some(ms) = env_parsed::<u64>("BIOSCAN_SCAN_STEP_MS") {
            debug!(ms, "Overriding scan cadence from environment");
            self.timing.scan_step_ms = ms;
        }

        if let Some(seed) = env_parsed::<u64>("BIOSCAN_SEED") {
            debug!(seed, "Using fixed synthesizer seed from environment");
            self.synthesis.seed = Some(seed);
        }

        if let Some(p) = env_parsed::<f64>("BIOSCAN_SENSOR_PROBABILITY") {
            self.synthesis.sensor_contamination_probability = p;
        }

        if let Some(p) = env_parsed::<f64>("BIOSCAN_MOLD_PROBABILITY") {
            self.synthesis.mold_probability = p;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bioscan", "scanner")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the device ID.
    pub fn device_id(&self) -> &str {
        &self.device.id
    }

    pub fn connect_step(&self) -> Duration {
        Duration::from_millis(self.timing.connect_step_ms)
    }

    pub fn scan_step(&self) -> Duration {
        Duration::from_millis(self.timing.scan_step_ms)
    }

    /// Synthesizer policy from the `[synthesis]` section.
    pub fn synthesis_policy(&self) -> SynthesisPolicy {
        SynthesisPolicy {
            sensor_contamination_probability: self.synthesis.sensor_contamination_probability,
            mold_probability: self.synthesis.mold_probability,
        }
    }
}

fn invalid(err: bioscan_core::ValidationError) -> SessionError {
    SessionError::InvalidConfig(err.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment override");
            None
        }
    }
}
