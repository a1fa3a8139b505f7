//! Submission and poll progress reporting.
//!
//! Reports observable progress while a query is in flight so users see that
//! the backend accepted the submission and how far along the poll budget is.
//! Progress is emitted on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for a query in flight.
#[derive(Clone, Debug)]
pub enum PollEvent {
    /// The compare request has been issued.
    Submitted,
    /// Waiting on an asynchronous job: status check n of the budget.
    Waiting { attempt: u32, max: u32 },
    /// Terminal payload received.
    Complete { matches: usize },
}

/// Reports query progress. Implementations write to stderr (human or JSON).
pub trait PollProgressReporter: Send + Sync {
    fn report(&self, event: PollEvent);
}

/// Human-friendly progress on stderr: "compare  waiting  3 / 40 checks".
pub struct StderrProgress;

impl PollProgressReporter for StderrProgress {
    fn report(&self, event: PollEvent) {
        let line = match &event {
            PollEvent::Submitted => "compare  submitted, waiting for results...\n".to_string(),
            PollEvent::Waiting { attempt, max } => {
                format!("compare  waiting  {} / {} checks\n", attempt, max)
            }
            PollEvent::Complete { matches } => {
                format!("compare  done  {} match(es)\n", matches)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl PollProgressReporter for JsonProgress {
    fn report(&self, event: PollEvent) {
        let obj = match &event {
            PollEvent::Submitted => serde_json::json!({
                "event": "progress",
                "phase": "submitted"
            }),
            PollEvent::Waiting { attempt, max } => serde_json::json!({
                "event": "progress",
                "phase": "waiting",
                "attempt": attempt,
                "max": max
            }),
            PollEvent::Complete { matches } => serde_json::json!({
                "event": "progress",
                "phase": "complete",
                "matches": matches
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl PollProgressReporter for NoProgress {
    fn report(&self, _event: PollEvent) {}
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Parse a `--progress` flag value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    pub fn reporter(&self) -> Box<dyn PollProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
