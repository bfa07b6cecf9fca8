//! # Session State Machine
//!
//! The scan session as an explicit value object. Every transition takes the
//! current [`SessionState`] and returns the next one, or a [`Refusal`] that
//! leaves the caller's state untouched.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Scan Session Lifecycle                            │
//! │                                                                         │
//! │  ┌──────┐ select_sample ┌──────────────┐ begin_connect ┌────────────┐  │
//! │  │ Idle │──────────────►│ SampleLoaded │──────────────►│ Connecting │  │
//! │  └──┬───┘               └──────────────┘               └─────┬──────┘  │
//! │     │ begin_connect                            finish_connect │         │
//! │     └─────────────────────────►┌────────────┐◄────────────────┘         │
//! │                                │ Connected  │◄─── select_sample         │
//! │                                └─────┬──────┘                           │
//! │                          begin_scan  │  (needs a sample ready for mode) │
//! │                                      ▼                                  │
//! │                                ┌────────────┐ finish_scan ┌──────────┐  │
//! │                                │  Scanning  │────────────►│ Complete │  │
//! │                                └────────────┘             └────┬─────┘  │
//! │                                                    begin_scan │ (rescan)│
//! │                                                                         │
//! │  reset() / switch_mode(): ANY phase ──► Idle                           │
//! │                                                                         │
//! │  INVARIANTS                                                             │
//! │  • scanning ⇒ connected                                                 │
//! │  • result set ⇒ !scanning && !connecting                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::Refusal;
use crate::types::{sample_tag, SampleReference, ScanMode, ScanResult};

/// Result type for session transitions.
pub type Transition = Result<SessionState, Refusal>;

// =============================================================================
// Phase
// =============================================================================

/// Where the session is in its lifecycle. Derived from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    SampleLoaded,
    Connecting,
    Connected,
    Scanning,
    Complete,
}

impl SessionPhase {
    /// Returns true while a status sequence is running.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionPhase::Connecting | SessionPhase::Scanning)
    }
}

// =============================================================================
// Session State
// =============================================================================

/// One end-to-end user interaction, from sample selection to result.
///
/// Fields are private: the only way to change a session is through the
/// transition methods, which keep the invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    mode: ScanMode,
    sample: Option<SampleReference>,
    connected: bool,
    connecting: bool,
    scanning: bool,
    status_text: Option<String>,
    result: Option<ScanResult>,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::new(ScanMode::default())
    }
}

impl SessionState {
    /// A fresh session: no sample, nothing connected, no result.
    pub fn new(mode: ScanMode) -> Self {
        SessionState {
            mode,
            sample: None,
            connected: false,
            connecting: false,
            scanning: false,
            status_text: None,
            result: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn sample(&self) -> Option<&SampleReference> {
        self.sample.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        if self.result.is_some() {
            SessionPhase::Complete
        } else if self.scanning {
            SessionPhase::Scanning
        } else if self.connecting {
            SessionPhase::Connecting
        } else if self.connected {
            SessionPhase::Connected
        } else if self.sample.is_some() {
            SessionPhase::SampleLoaded
        } else {
            SessionPhase::Idle
        }
    }

    /// Returns true if both session invariants hold.
    pub fn is_consistent(&self) -> bool {
        let scan_needs_link = !self.scanning || self.connected;
        let result_is_final = self.result.is_none() || (!self.scanning && !self.connecting);
        scan_needs_link && result_is_final
    }

    /// Synthesizer tag for the attached sample, if any.
    pub fn scan_tag(&self) -> Option<String> {
        self.sample.as_ref().map(|s| sample_tag(self.mode, s))
    }

    // =========================================================================
    // Precondition Checks (exposed as view flags)
    // =========================================================================

    fn check_select(&self, sample: &SampleReference) -> Result<(), Refusal> {
        let phase = self.phase();
        if phase.is_busy() {
            return Err(Refusal::Busy { phase });
        }
        if phase == SessionPhase::Complete {
            return Err(Refusal::AlreadyComplete);
        }
        if !sample.fits_mode(self.mode) {
            return Err(Refusal::WrongMode {
                sample: sample.kind(),
                mode: self.mode,
            });
        }
        Ok(())
    }

    fn check_connect(&self) -> Result<(), Refusal> {
        if self.connected || self.connecting {
            return Err(Refusal::AlreadyConnected);
        }
        Ok(())
    }

    fn check_scan(&self) -> Result<(), Refusal> {
        let phase = self.phase();
        if phase.is_busy() {
            return Err(Refusal::Busy { phase });
        }
        if !self.connected {
            return Err(Refusal::NotConnected);
        }
        match self.sample {
            Some(ref sample) if sample.is_ready_for(self.mode) => Ok(()),
            _ => Err(Refusal::NoSample { mode: self.mode }),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Attaches a sample, replacing any previous one.
    pub fn select_sample(&self, sample: SampleReference) -> Transition {
        self.check_select(&sample)?;
        Ok(SessionState {
            sample: Some(sample),
            ..self.clone()
        })
    }

    /// Marks the sensor as holding a sample (sensor mode shorthand).
    pub fn load_sensor_sample(&self) -> Transition {
        self.select_sample(SampleReference::sensor())
    }

    /// Starts the connect sequence.
    pub fn begin_connect(&self) -> Transition {
        self.check_connect()?;
        Ok(SessionState {
            connecting: true,
            status_text: None,
            ..self.clone()
        })
    }

    /// Settles the connect sequence.
    pub fn finish_connect(&self) -> Transition {
        if !self.connecting {
            return Err(Refusal::NotInProgress("connect"));
        }
        Ok(SessionState {
            connecting: false,
            connected: true,
            status_text: None,
            ..self.clone()
        })
    }

    /// Starts the scan sequence. A previous result is discarded.
    pub fn begin_scan(&self) -> Transition {
        self.check_scan()?;
        Ok(SessionState {
            scanning: true,
            status_text: None,
            result: None,
            ..self.clone()
        })
    }

    /// Settles the scan sequence with its result.
    pub fn finish_scan(&self, result: ScanResult) -> Transition {
        if !self.scanning {
            return Err(Refusal::NotInProgress("scan"));
        }
        Ok(SessionState {
            scanning: false,
            status_text: None,
            result: Some(result),
            ..self.clone()
        })
    }

    /// Shows a status label of the running sequence.
    pub fn show_status(&self, label: &str) -> Transition {
        if !self.connecting && !self.scanning {
            return Err(Refusal::NotInProgress("sequence"));
        }
        Ok(SessionState {
            status_text: Some(label.to_string()),
            ..self.clone()
        })
    }

    /// Back to Idle in the same mode.
    pub fn reset(&self) -> SessionState {
        SessionState::new(self.mode)
    }

    /// Back to Idle in another mode.
    pub fn switch_mode(&self, mode: ScanMode) -> Transition {
        if mode == self.mode {
            return Err(Refusal::SameMode(mode));
        }
        Ok(SessionState::new(mode))
    }

    /// Read-only projection for the display layer.
    pub fn view(&self) -> SessionView {
        SessionView::from(self)
    }
}

// =============================================================================
// Session View
// =============================================================================

/// What the display layer needs to render buttons and banners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub phase: SessionPhase,
    pub mode: ScanMode,
    pub status_text: Option<String>,
    pub has_sample: bool,
    pub can_select_sample: bool,
    pub can_connect: bool,
    pub can_scan: bool,
    pub has_result: bool,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        let phase = state.phase();
        SessionView {
            phase,
            mode: state.mode,
            status_text: state.status_text.clone(),
            has_sample: state.sample.is_some(),
            can_select_sample: !phase.is_busy() && phase != SessionPhase::Complete,
            can_connect: state.check_connect().is_ok(),
            can_scan: state.check_scan().is_ok(),
            has_result: state.result.is_some(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesizer::Finding;
    use chrono::Utc;

    fn apple() -> SampleReference {
        SampleReference::library("apple").unwrap()
    }

    fn connected_with_apple() -> SessionState {
        SessionState::new(ScanMode::Visual)
            .select_sample(apple())
            .unwrap()
            .begin_connect()
            .unwrap()
            .finish_connect()
            .unwrap()
    }

    fn complete() -> SessionState {
        let scanning = connected_with_apple().begin_scan().unwrap();
        let result = Finding::Apple.into_result("apple", ScanMode::Visual, Utc::now());
        scanning.finish_scan(result).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert_eq!(state.mode(), ScanMode::Visual);
        assert!(state.is_consistent());
        assert!(state.view().can_connect);
        assert!(!state.view().can_scan);
    }

    #[test]
    fn test_happy_path_phases() {
        let idle = SessionState::new(ScanMode::Visual);
        let loaded = idle.select_sample(apple()).unwrap();
        assert_eq!(loaded.phase(), SessionPhase::SampleLoaded);

        let connecting = loaded.begin_connect().unwrap();
        assert_eq!(connecting.phase(), SessionPhase::Connecting);

        let connected = connecting.finish_connect().unwrap();
        assert_eq!(connected.phase(), SessionPhase::Connected);
        assert!(connected.view().can_scan);

        let scanning = connected.begin_scan().unwrap();
        assert_eq!(scanning.phase(), SessionPhase::Scanning);
        assert_eq!(scanning.scan_tag().as_deref(), Some("apple"));

        let result = Finding::Apple.into_result("apple", ScanMode::Visual, Utc::now());
        let done = scanning.finish_scan(result).unwrap();
        assert_eq!(done.phase(), SessionPhase::Complete);
        assert!(done.is_consistent());
        assert!(done.status_text().is_none());
    }

    #[test]
    fn test_scan_without_connection_is_refused() {
        for mode in [ScanMode::Visual, ScanMode::SensorBased] {
            let mut state = SessionState::new(mode);
            state = match mode {
                ScanMode::Visual => state.select_sample(apple()).unwrap(),
                ScanMode::SensorBased => state.load_sensor_sample().unwrap(),
            };

            assert_eq!(state.begin_scan(), Err(Refusal::NotConnected));
            assert!(!state.view().can_scan);
        }
    }

    #[test]
    fn test_scan_without_sample_is_refused() {
        let connected = SessionState::new(ScanMode::SensorBased)
            .begin_connect()
            .unwrap()
            .finish_connect()
            .unwrap();

        assert_eq!(
            connected.begin_scan(),
            Err(Refusal::NoSample {
                mode: ScanMode::SensorBased
            })
        );

        let unloaded = connected
            .select_sample(SampleReference::SensorSample { loaded: false })
            .unwrap();
        assert!(unloaded.begin_scan().is_err());
    }

    #[test]
    fn test_select_sample_ignored_while_busy() {
        let connecting = SessionState::default().begin_connect().unwrap();
        assert!(matches!(
            connecting.select_sample(apple()),
            Err(Refusal::Busy {
                phase: SessionPhase::Connecting
            })
        ));

        let scanning = connected_with_apple().begin_scan().unwrap();
        assert!(scanning.select_sample(apple()).is_err());
        assert!(!scanning.view().can_select_sample);
    }

    #[test]
    fn test_select_sample_while_connected_keeps_link() {
        let connected = connected_with_apple();
        let milk = SampleReference::library("milk").unwrap();
        let swapped = connected.select_sample(milk).unwrap();

        assert_eq!(swapped.phase(), SessionPhase::Connected);
        assert_eq!(swapped.scan_tag().as_deref(), Some("milk"));
    }

    #[test]
    fn test_sample_must_fit_mode() {
        let visual = SessionState::new(ScanMode::Visual);
        assert!(matches!(
            visual.load_sensor_sample(),
            Err(Refusal::WrongMode { .. })
        ));

        let sensor = SessionState::new(ScanMode::SensorBased);
        assert!(sensor.select_sample(apple()).is_err());
    }

    #[test]
    fn test_connect_twice_is_refused() {
        let connecting = SessionState::default().begin_connect().unwrap();
        assert_eq!(connecting.begin_connect(), Err(Refusal::AlreadyConnected));

        let connected = connecting.finish_connect().unwrap();
        assert_eq!(connected.begin_connect(), Err(Refusal::AlreadyConnected));
    }

    #[test]
    fn test_completion_without_sequence_is_refused() {
        let idle = SessionState::default();
        assert!(idle.finish_connect().is_err());
        assert!(idle.show_status("Calibrating").is_err());

        let result = Finding::Generic.into_result("uploaded", ScanMode::Visual, Utc::now());
        assert!(idle.finish_scan(result).is_err());
    }

    #[test]
    fn test_rescan_clears_previous_result() {
        let done = complete();
        assert!(done.select_sample(apple()).is_err());

        let rescanning = done.begin_scan().unwrap();
        assert!(rescanning.result().is_none());
        assert!(rescanning.is_consistent());
    }

    #[test]
    fn test_reset_from_any_phase() {
        let states = vec![
            SessionState::default(),
            SessionState::default().select_sample(apple()).unwrap(),
            SessionState::default().begin_connect().unwrap(),
            connected_with_apple(),
            connected_with_apple().begin_scan().unwrap(),
            complete(),
        ];

        for state in states {
            let reset = state.reset();
            assert_eq!(reset, SessionState::new(ScanMode::Visual));
            assert_eq!(reset.phase(), SessionPhase::Idle);
            assert!(reset.sample().is_none());
            assert!(reset.result().is_none());
        }
    }

    #[test]
    fn test_switch_mode_resets() {
        let switched = connected_with_apple()
            .switch_mode(ScanMode::SensorBased)
            .unwrap();

        assert_eq!(switched, SessionState::new(ScanMode::SensorBased));
        assert!(switched.switch_mode(ScanMode::SensorBased).is_err());
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let json = serde_json::to_value(SessionState::default().view()).unwrap();
        assert_eq!(json["phase"], "idle");
        assert_eq!(json["canConnect"], true);
    }
}
