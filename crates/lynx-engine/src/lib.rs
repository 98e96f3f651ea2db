//! The native engine boundary for the Lynx lifecycle bridge.
//!
//! This crate models the engine as a black box reachable through a fixed set of
//! entry points: the `NativeEngine` trait, a shared-library implementation that
//! resolves every entry point once at load time (`NativeLibrary`, `DylibEngine`),
//! a `RecordingEngine` that logs each call for tests and replays, and
//! `select_engine` which attaches the configured backend.

pub mod assets;
#[cfg(unix)]
pub mod dylib;
pub mod mock;
pub mod native;

pub use assets::AssetSource;
#[cfg(unix)]
pub use dylib::{DylibEngine, NativeLibrary};
pub use mock::{CallLog, NativeCall, RecordingEngine};
pub use native::{select_engine, EngineLoader, NativeEngine};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load native library '{path}': {reason}")]
    LibraryLoad { path: String, reason: String },
    #[error("native entry point '{0}' is missing")]
    MissingSymbol(String),
    #[error("engine backend '{0}' is not available on this system")]
    BackendUnavailable(String),
    #[error("engine.library is not configured")]
    MissingLibrary,
    #[error("invalid asset source: {0}")]
    InvalidAssetSource(String),
}

impl EngineError {
    /// Load and link failures: the native library cannot be used at all.
    pub fn is_link_error(&self) -> bool {
        matches!(
            self,
            EngineError::LibraryLoad { .. } | EngineError::MissingSymbol(_)
        )
    }
}
