//! # BioScan Demo Entry Point
//!
//! Runs one simulated food scan in the terminal.
//!
//! ## Environment
//! - `BIOSCAN_DEMO_SAMPLE` - apple | milk | sensor | camera | upload:<path>
//! - `BIOSCAN_CAMERA_UNAVAILABLE` - set to simulate a denied camera
//! - `BIOSCAN_*` - scanner overrides (see `bioscan_session::config`)
//! - `RUST_LOG` - log filter

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The actual setup is in lib.rs for better testability
    bioscan_demo_lib::run().await
}
