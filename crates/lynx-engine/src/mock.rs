use crate::native::NativeEngine;
use crate::AssetSource;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// One invocation of a native entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum NativeCall {
    Startup { asset_source: Option<String> },
    Shutdown,
    Tick,
    SurfaceChanged { width: i32, height: i32 },
    SetDisplayDensity { density: f32 },
    SetStatusBarHeight { height: i32 },
    Pause,
    Resume,
}

impl NativeCall {
    pub fn name(&self) -> &'static str {
        match self {
            NativeCall::Startup { .. } => "startup",
            NativeCall::Shutdown => "shutdown",
            NativeCall::Tick => "tick",
            NativeCall::SurfaceChanged { .. } => "surface_changed",
            NativeCall::SetDisplayDensity { .. } => "set_display_density",
            NativeCall::SetStatusBarHeight { .. } => "set_status_bar_height",
            NativeCall::Pause => "pause",
            NativeCall::Resume => "resume",
        }
    }
}

impl fmt::Display for NativeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeCall::Startup {
                asset_source: Some(source),
            } => write!(f, "startup({source})"),
            NativeCall::Startup { asset_source: None } => write!(f, "startup(null)"),
            NativeCall::SurfaceChanged { width, height } => {
                write!(f, "surface_changed({width}, {height})")
            }
            NativeCall::SetDisplayDensity { density } => {
                write!(f, "set_display_density({density})")
            }
            NativeCall::SetStatusBarHeight { height } => {
                write!(f, "set_status_bar_height({height})")
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Shared, ordered record of native calls. Clones observe the same log, so a
/// test can keep one handle while the engine itself is boxed inside a session.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<NativeCall>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: NativeCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn snapshot(&self) -> Vec<NativeCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.snapshot().iter().map(NativeCall::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.snapshot().iter().filter(|c| c.name() == name).count()
    }

    pub fn len(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Engine that performs no work and records every entry-point call.
///
/// By default it mirrors an engine exporting only the six required entry
/// points; `with_pause_resume` also records the optional pause/resume calls.
pub struct RecordingEngine {
    log: CallLog,
    pause_resume: bool,
}

impl RecordingEngine {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            pause_resume: false,
        }
    }

    #[must_use]
    pub fn with_pause_resume(mut self) -> Self {
        self.pause_resume = true;
        self
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl NativeEngine for RecordingEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn startup(&mut self, assets: Option<&AssetSource>) {
        self.log.record(NativeCall::Startup {
            asset_source: assets.map(ToString::to_string),
        });
    }

    fn shutdown(&mut self) {
        self.log.record(NativeCall::Shutdown);
    }

    fn tick(&mut self) {
        self.log.record(NativeCall::Tick);
    }

    fn surface_changed(&mut self, width: i32, height: i32) {
        self.log.record(NativeCall::SurfaceChanged { width, height });
    }

    fn set_display_density(&mut self, density: f32) {
        self.log.record(NativeCall::SetDisplayDensity { density });
    }

    fn set_status_bar_height(&mut self, height: i32) {
        self.log.record(NativeCall::SetStatusBarHeight { height });
    }

    fn pause(&mut self) {
        if self.pause_resume {
            self.log.record(NativeCall::Pause);
        }
    }

    fn resume(&mut self) {
        if self.pause_resume {
            self.log.record(NativeCall::Resume);
        }
    }
}
