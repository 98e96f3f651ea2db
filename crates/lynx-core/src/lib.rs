//! Lifecycle bridge between a host activity and a native engine.
//!
//! This crate owns the `EngineSession` state machine that decides which native
//! entry points run and in what order, the `ActivityAdapter` that translates
//! host lifecycle callbacks into session operations, display-metric
//! resolution, scenario replay, and the frame driver that delivers ticks.

pub mod adapter;
pub mod bridge;
pub mod driver;
pub mod lifecycle;
pub mod metrics;
pub mod replay;
pub mod session;

pub use adapter::{ActivityAdapter, ContentSurface};
pub use bridge::Bridge;
pub use driver::{install_signal_handler, shutdown_requested, DriverReport, FrameDriver};
pub use lifecycle::{validate_transition, SessionState, Transition};
pub use metrics::{resolve as resolve_metrics, DisplayMetricsSnapshot, STATUS_BAR_REFERENCE_DP};
pub use replay::{replay, ReplayReport, SimulatedSurface};
pub use session::{EngineSession, SessionOptions, SurfaceSize};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("engine error: {0}")]
    Engine(#[from] lynx_engine::EngineError),
    #[error("cannot {transition} a {state} session")]
    InvalidTransition { state: String, transition: String },
    #[error("an asset source is required but none was attached")]
    MissingAssetSource,
}

impl CoreError {
    /// Errors that mean the bridge cannot run at all, as opposed to a single
    /// rejected operation.
    pub fn is_fatal(&self) -> bool {
        match self {
            CoreError::Engine(e) => e.is_link_error(),
            CoreError::MissingAssetSource => true,
            CoreError::InvalidTransition { .. } => false,
        }
    }
}
