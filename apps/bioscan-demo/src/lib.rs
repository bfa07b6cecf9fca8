//! # BioScan Demo Library
//!
//! Drives one scan session from sample selection to printed result.
//!
//! ## Module Organization
//! ```text
//! bioscan_demo_lib/
//! ├── lib.rs      ◄─── You are here (setup & run)
//! └── camera.rs   ◄─── Simulated capture device
//! ```

pub mod camera;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bioscan_core::{Recommendations, SampleReference, ScanMode, ScanResult, SessionPhase};
use bioscan_session::{
    CaptureDevice, CaptureModal, ChannelEmitter, ScanController, ScannerConfig, SessionEvent,
    SessionEventEmitter, SessionError,
};

use camera::SimulatedCamera;

type DemoResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Grabs tried before the capture dialog gives up.
const MAX_CAPTURE_ATTEMPTS: u32 = 3;

// =============================================================================
// Sample Choice
// =============================================================================

/// Which sample the demo scans, from `BIOSCAN_DEMO_SAMPLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoSample {
    Library(String),
    Sensor,
    Camera,
    Upload(PathBuf),
}

impl FromStr for DemoSample {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("upload:") {
            return Ok(DemoSample::Upload(PathBuf::from(path)));
        }

        match s.to_lowercase().as_str() {
            "sensor" | "bacteria" => Ok(DemoSample::Sensor),
            "camera" | "capture" => Ok(DemoSample::Camera),
            id if bioscan_core::library::contains(id) => Ok(DemoSample::Library(id.to_string())),
            other => Err(SessionError::InvalidConfig(format!(
                "Unknown demo sample: '{}'. Valid options: apple, milk, sensor, camera, upload:<path>",
                other
            ))),
        }
    }
}

impl DemoSample {
    /// Reads the choice from the environment; defaults to the apple.
    pub fn from_env() -> DemoResult<Self> {
        match std::env::var("BIOSCAN_DEMO_SAMPLE") {
            Ok(raw) => Ok(raw.parse()?),
            Err(_) => Ok(DemoSample::Library(bioscan_core::library::APPLE.to_string())),
        }
    }

    pub fn mode(&self) -> ScanMode {
        match self {
            DemoSample::Sensor => ScanMode::SensorBased,
            _ => ScanMode::Visual,
        }
    }
}

// =============================================================================
// Run
// =============================================================================

/// Runs the demo.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Logging (RUST_LOG, default info,bioscan=debug)                     │
/// │  2. ScannerConfig::load_or_default (scanner.toml + BIOSCAN_*)          │
/// │  3. Sample: library id, sensor, simulated camera, or uploaded file     │
/// │  4. connect() → wait for Connected → start_scan() → wait for Result    │
/// │  5. Print result JSON and recommendations                              │
/// │                                                                         │
/// │  A denied camera is reported and ends the run without a scan.         │
/// │  Ctrl-C at any point resets the session and exits.                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> DemoResult<()> {
    init_tracing();

    let config = ScannerConfig::load_or_default(None);
    let choice = DemoSample::from_env()?;
    info!(
        device = %config.device.name,
        device_id = %config.device_id(),
        sample = ?choice,
        "Starting BioScan demo"
    );

    let (emitter, mut events) = ChannelEmitter::new();
    let emitter: Arc<dyn SessionEventEmitter> = Arc::new(emitter);
    let controller = ScanController::with_emitter(&config, emitter.clone())?;

    if choice.mode() != controller.view().mode {
        controller.switch_mode(choice.mode());
    }
    let camera = camera_from_env();
    if !attach_sample(&controller, &choice, camera, emitter)? {
        println!("No sample attached, nothing to scan.");
        return Ok(());
    }

    controller.connect();

    let result = tokio::select! {
        result = drive(&controller, &mut events) => result?,
        _ = tokio::signal::ctrl_c() => {
            controller.reset();
            info!("Interrupted, session reset");
            return Ok(());
        }
    };

    print_report(&result)?;
    Ok(())
}

/// Picks the simulated camera from `BIOSCAN_CAMERA_UNAVAILABLE` and
/// `BIOSCAN_CAMERA_DROPPED_FRAMES`.
fn camera_from_env() -> Arc<dyn CaptureDevice> {
    const NAME: &str = "Rear camera";

    if std::env::var("BIOSCAN_CAMERA_UNAVAILABLE").is_ok() {
        return Arc::new(SimulatedCamera::unavailable(NAME));
    }

    let dropped = std::env::var("BIOSCAN_CAMERA_DROPPED_FRAMES")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0);
    Arc::new(SimulatedCamera::new(NAME).with_dropped_frames(dropped))
}

/// Attaches the chosen sample. Returns false when no sample could be
/// taken; the user has already been told why through the emitter.
fn attach_sample(
    controller: &ScanController,
    choice: &DemoSample,
    camera: Arc<dyn CaptureDevice>,
    emitter: Arc<dyn SessionEventEmitter>,
) -> DemoResult<bool> {
    let sample = match choice {
        DemoSample::Library(id) => SampleReference::library(id)?,
        DemoSample::Sensor => SampleReference::sensor(),
        DemoSample::Upload(path) => SampleReference::uploaded_bytes(std::fs::read(path)?)?,
        DemoSample::Camera => match capture(camera, emitter)? {
            Some(sample) => sample,
            None => return Ok(false),
        },
    };

    let ack = controller.select_sample(sample);
    if !ack.is_accepted() {
        warn!(?ack, "Sample was not attached");
    }
    Ok(ack.is_accepted())
}

/// Opens the capture dialog and takes one still, retrying dropped frames.
///
/// An unavailable or repeatedly failing camera yields `None`.
fn capture(
    camera: Arc<dyn CaptureDevice>,
    emitter: Arc<dyn SessionEventEmitter>,
) -> DemoResult<Option<SampleReference>> {
    let mut modal = CaptureModal::new(camera, emitter);

    match modal.open() {
        Ok(()) => {}
        Err(e) if e.is_recoverable() => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    for attempt in 1..=MAX_CAPTURE_ATTEMPTS {
        match modal.capture() {
            Ok(sample) => return Ok(Some(sample)),
            Err(SessionError::CaptureFailed(reason)) => {
                warn!(attempt, %reason, "Frame dropped, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    modal.cancel();
    Ok(None)
}

/// Follows the event stream: scans once connected, returns the result.
async fn drive(
    controller: &ScanController,
    events: &mut UnboundedReceiver<SessionEvent>,
) -> DemoResult<ScanResult> {
    let mut scan_requested = false;

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Status(Some(label)) => println!("  {}", label),
            SessionEvent::Status(None) => {}
            SessionEvent::View(view) => {
                if view.phase == SessionPhase::Connected && !scan_requested {
                    scan_requested = true;
                    let ack = controller.start_scan();
                    if !ack.is_accepted() {
                        return Err(format!("scan refused: {:?}", ack).into());
                    }
                }
            }
            SessionEvent::Result(result) => return Ok(result),
            SessionEvent::Error {
                message,
                recoverable,
            } => warn!(recoverable, "{}", message),
        }
    }

    Err(SessionError::ChannelClosed.into())
}

fn print_report(result: &ScanResult) -> DemoResult<()> {
    println!("{}", render_report(result)?);
    Ok(())
}

/// Headline, block summaries, safety advice, nutrition tips, then the JSON.
fn render_report(result: &ScanResult) -> DemoResult<String> {
    let advice = Recommendations::for_result(result);

    let mut out = format!("\n{}\n", advice.headline);
    out.push_str(&format!("  {}\n", advice.contamination_summary));
    out.push_str(&format!("  {}\n", advice.toxin_summary));
    for line in &advice.safety {
        out.push_str(&format!("  - {}\n", line));
    }
    out.push_str("\nNutrition\n");
    for tip in &advice.nutrition {
        out.push_str(&format!("  - {}\n", tip));
    }
    out.push('\n');
    out.push_str(&result.to_json()?);
    Ok(out)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bioscan_session=trace` - Trace the session runtime only
/// - Default: INFO, DEBUG for bioscan crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bioscan=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
