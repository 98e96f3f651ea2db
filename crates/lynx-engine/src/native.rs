use crate::mock::{CallLog, RecordingEngine};
use crate::{AssetSource, EngineError};
use lynx_schema::EngineSection;
#[cfg(unix)]
use std::sync::Arc;

/// The native engine's entry points, as seen from the lifecycle bridge.
///
/// None of them report errors: everything that can fail (loading, linking)
/// happens once when the engine is attached, before a session exists.
pub trait NativeEngine: Send {
    fn name(&self) -> &str;

    /// One-time startup; not reentrant while the engine is running.
    fn startup(&mut self, assets: Option<&AssetSource>);

    /// Must be a no-op when startup never completed.
    fn shutdown(&mut self);

    fn tick(&mut self);

    /// `(0, 0)` means the surface is gone; the engine must not render.
    fn surface_changed(&mut self, width: i32, height: i32);

    fn set_display_density(&mut self, density: f32);

    /// Height in physical pixels.
    fn set_status_bar_height(&mut self, height: i32);

    /// Optional pause entry point. Engines without one simply stop
    /// receiving ticks while suspended.
    fn pause(&mut self) {}

    fn resume(&mut self) {}
}

/// An attached engine backend that can hand out one engine per session.
///
/// Attaching happens once per process; every activity instance (including
/// ones the host recreates) gets a fresh engine from the same loader.
#[derive(Debug)]
pub enum EngineLoader {
    #[cfg(unix)]
    Dylib(Arc<crate::dylib::NativeLibrary>),
    Mock(CallLog),
}

impl EngineLoader {
    pub fn name(&self) -> &'static str {
        match self {
            #[cfg(unix)]
            EngineLoader::Dylib(_) => "dylib",
            EngineLoader::Mock(_) => "mock",
        }
    }

    pub fn spawn(&self) -> Box<dyn NativeEngine> {
        match self {
            #[cfg(unix)]
            EngineLoader::Dylib(library) => Box::new(crate::dylib::DylibEngine::new(library)),
            EngineLoader::Mock(log) => Box::new(RecordingEngine::new(log.clone())),
        }
    }

    /// Whether spawned engines receive the optional pause call.
    pub fn has_pause(&self) -> bool {
        match self {
            #[cfg(unix)]
            EngineLoader::Dylib(library) => library.has_pause(),
            EngineLoader::Mock(_) => false,
        }
    }

    pub fn has_resume(&self) -> bool {
        match self {
            #[cfg(unix)]
            EngineLoader::Dylib(library) => library.has_resume(),
            EngineLoader::Mock(_) => false,
        }
    }

    /// The shared call log when the recording engine is attached.
    pub fn call_log(&self) -> Option<&CallLog> {
        match self {
            #[cfg(unix)]
            EngineLoader::Dylib(_) => None,
            EngineLoader::Mock(log) => Some(log),
        }
    }
}

pub fn select_engine(section: &EngineSection) -> Result<EngineLoader, EngineError> {
    match section.backend.as_str() {
        #[cfg(unix)]
        "dylib" => {
            let path = section
                .library
                .as_deref()
                .ok_or(EngineError::MissingLibrary)?;
            let library = crate::dylib::NativeLibrary::open(path, &section.symbol_prefix)?;
            Ok(EngineLoader::Dylib(library))
        }
        "mock" => Ok(EngineLoader::Mock(CallLog::new())),
        other => Err(EngineError::BackendUnavailable(other.to_owned())),
    }
}
