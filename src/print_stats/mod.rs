//! Print job lifecycle and usage statistics.
//!
//! Tracks what phase a print is in, how long it has run, and how much
//! filament it has consumed, across pause/resume cycles. The tracker is
//! driven entirely by notifications from the command layer and consulted
//! by the status poller; it never initiates anything on its own.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::clock::TimeSource;
use crate::motion::MotionStatusSource;

/// Usage totals below this count as "no extrusion detected yet". Tolerance
/// for float noise in the position query, not a domain threshold.
const EXTRUSION_EPSILON: f64 = 1e-7;

/// Phase of the current print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintState {
    Standby,
    Printing,
    Paused,
    Error,
    Cancelled,
    Complete,
}

impl PrintState {
    pub fn as_str(self) -> &'static str {
        match self {
            PrintState::Standby => "standby",
            PrintState::Printing => "printing",
            PrintState::Paused => "paused",
            PrintState::Error => "error",
            PrintState::Cancelled => "cancelled",
            PrintState::Complete => "complete",
        }
    }
}

impl std::fmt::Display for PrintState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a job ended; selects the terminal state recorded by
/// [`PrintStats::notify_terminate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Error,
    Cancel,
    Complete,
}

impl JobOutcome {
    fn terminal_state(self) -> PrintState {
        match self {
            JobOutcome::Error => PrintState::Error,
            JobOutcome::Cancel => PrintState::Cancelled,
            JobOutcome::Complete => PrintState::Complete,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// A lifecycle notification arrived while its guard failed. Advisory:
    /// the state is left unchanged and the message shown to the operator.
    #[error("{0}")]
    InvalidTransition(&'static str),
}

/// Point-in-time view of the tracker as reported to operator interfaces.
/// All durations are seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub filename: String,
    pub total_duration: f64,
    pub print_duration: f64,
    pub filament_used: f64,
    pub state: PrintState,
    pub message: String,
}

/// Lifecycle and timing/usage tracker for the current print job.
///
/// One instance per host; constructed at startup and handed to the command
/// and status layers. All timestamps come from the injected clock, all
/// extruder reads from the injected motion-status source, so the whole
/// tracker is deterministic under test.
pub struct PrintStats {
    clock: Arc<dyn TimeSource>,
    gcode_move: Arc<dyn MotionStatusSource>,
    state: PrintState,
    filename: String,
    error_message: String,
    print_start_time: Option<f64>,
    last_pause_time: Option<f64>,
    prev_pause_duration: f64,
    last_epos: f64,
    filament_used: f64,
    total_duration: f64,
    init_duration: f64,
}

impl PrintStats {
    pub fn new(clock: Arc<dyn TimeSource>, gcode_move: Arc<dyn MotionStatusSource>) -> Self {
        Self {
            clock,
            gcode_move,
            state: PrintState::Standby,
            filename: String::new(),
            error_message: String::new(),
            print_start_time: None,
            last_pause_time: None,
            prev_pause_duration: 0.0,
            last_epos: 0.0,
            filament_used: 0.0,
            total_duration: 0.0,
            init_duration: 0.0,
        }
    }

    pub fn state(&self) -> PrintState {
        self.state
    }

    /// Fold newly commanded extruder movement into the usage total. Deltas
    /// may be negative on retraction; the running total is carried as-is,
    /// without clamping.
    fn track_filament(&mut self, eventtime: f64) {
        let motion = self.gcode_move.query(eventtime);
        self.filament_used += (motion.position - self.last_epos) / motion.extrude_factor;
        self.last_epos = motion.position;
    }

    /// Begin a job, or resume the current one out of a pause. Accepted from
    /// every state except an already-running print.
    pub fn notify_start(&mut self) -> Result<String, StatsError> {
        if self.state == PrintState::Printing {
            return Err(StatsError::InvalidTransition("Print is already started"));
        }
        let curtime = self.clock.monotonic();
        let mut resumed = false;
        if self.print_start_time.is_none() {
            self.print_start_time = Some(curtime);
        } else if let Some(pause_start) = self.last_pause_time.take() {
            // Close the open pause interval and fold it into the total.
            self.prev_pause_duration += curtime - pause_start;
            resumed = true;
        }
        // Re-baseline so extruder movement from before this start is not
        // attributed to the job.
        self.last_epos = self.gcode_move.query(curtime).position;
        self.state = PrintState::Printing;
        self.error_message.clear();
        let ack = if resumed { "Print resumed" } else { "Print started" };
        tracing::info!("{}", ack);
        Ok(ack.to_string())
    }

    /// Freeze accounting at the current instant. Never clobbers an open
    /// pause interval, and preserves an Error state reached independently:
    /// pausing after an error must not lose the error classification.
    pub fn notify_pause(&mut self) -> Result<String, StatsError> {
        if !matches!(self.state, PrintState::Printing | PrintState::Error) {
            return Err(StatsError::InvalidTransition(
                "Print is not currently printing",
            ));
        }
        if self.last_pause_time.is_none() {
            let curtime = self.clock.monotonic();
            self.last_pause_time = Some(curtime);
            self.track_filament(curtime);
        }
        if self.state != PrintState::Error {
            self.state = PrintState::Paused;
        }
        tracing::info!("Print paused");
        Ok("Print paused".to_string())
    }

    /// End the job with the given outcome. `message` is recorded for
    /// operator display; terminating with cancel/complete clears any prior
    /// error message.
    pub fn notify_terminate(
        &mut self,
        outcome: JobOutcome,
        message: Option<String>,
    ) -> Result<String, StatsError> {
        // An errored job whose accounting was frozen by a pause may still be
        // reclassified, e.g. an operator cancelling after a failure.
        let paused_after_error =
            self.state == PrintState::Error && self.last_pause_time.is_some();
        if !matches!(self.state, PrintState::Printing | PrintState::Paused)
            && !paused_after_error
        {
            return Err(StatsError::InvalidTransition(
                "Print is not currently printing",
            ));
        }
        let eventtime = self.clock.monotonic();
        self.state = outcome.terminal_state();
        if let Some(start) = self.print_start_time.take() {
            self.total_duration = eventtime - start;
            if self.filament_used < EXTRUSION_EPSILON {
                // Nothing was extruded; the whole unpaused run was startup
                // dwell.
                self.init_duration = self.total_duration - self.prev_pause_duration;
            }
        }
        self.error_message = message.unwrap_or_default();
        let ack = match outcome {
            JobOutcome::Error => "Print failed",
            JobOutcome::Cancel => "Print cancelled",
            JobOutcome::Complete => "Print complete",
        };
        if self.error_message.is_empty() {
            tracing::info!("{}", ack);
        } else {
            tracing::warn!("{}: {}", ack, self.error_message);
        }
        Ok(ack.to_string())
    }

    /// Zero all accumulators and return to standby. Always accepted. Only
    /// the basename of a supplied filename is kept.
    pub fn notify_reset(&mut self, filename: Option<&str>) -> Result<String, StatsError> {
        self.state = PrintState::Standby;
        self.filename.clear();
        self.error_message.clear();
        self.print_start_time = None;
        self.last_pause_time = None;
        self.prev_pause_duration = 0.0;
        self.last_epos = 0.0;
        self.filament_used = 0.0;
        self.total_duration = 0.0;
        self.init_duration = 0.0;
        if let Some(filename) = filename {
            self.filename = Path::new(filename)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        tracing::info!("Print stats reset");
        Ok("Print stats reset".to_string())
    }

    /// Point-in-time statistics at `eventtime`. Usage accrual only advances
    /// while printing; paused time is carried separately so the reported
    /// print duration excludes it along with the pre-extrusion dwell.
    pub fn get_status(&mut self, eventtime: f64) -> StatusSnapshot {
        let mut time_paused = self.prev_pause_duration;
        if let Some(start) = self.print_start_time {
            if let Some(pause_start) = self.last_pause_time {
                time_paused += eventtime - pause_start;
            } else {
                self.track_filament(eventtime);
            }
            self.total_duration = eventtime - start;
            if self.filament_used < EXTRUSION_EPSILON {
                // Still in the pre-extrusion window; it keeps growing until
                // the first usage is seen, then stays frozen.
                self.init_duration = self.total_duration - time_paused;
            }
        }
        StatusSnapshot {
            filename: self.filename.clone(),
            total_duration: self.total_duration,
            print_duration: self.total_duration - self.init_duration - time_paused,
            filament_used: self.filament_used,
            state: self.state,
            message: self.error_message.clone(),
        }
    }

    /// [`Self::get_status`] at the injected clock's current time.
    pub fn status_now(&mut self) -> StatusSnapshot {
        let eventtime = self.clock.monotonic();
        self.get_status(eventtime)
    }
}
