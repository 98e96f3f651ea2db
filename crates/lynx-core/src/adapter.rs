use crate::lifecycle::SessionState;
use crate::metrics;
use crate::session::{EngineSession, SessionOptions, SurfaceSize};
use crate::CoreError;
use lynx_engine::{AssetSource, NativeEngine};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// The host-owned drawable the engine renders into.
pub trait ContentSurface {
    /// Current size, or `None` while the surface has no backing buffer.
    fn size(&self) -> Option<SurfaceSize>;
}

/// Translates host activity callbacks into session operations.
///
/// The adapter holds its surface weakly: the host owns the surface and may
/// tear it down before the adapter hears about it. One adapter serves one
/// activity instance; a recreated activity gets a fresh adapter.
pub struct ActivityAdapter {
    surface: Option<Weak<dyn ContentSurface>>,
    session: EngineSession,
    destroyed: bool,
}

impl ActivityAdapter {
    pub fn new(
        engine: Box<dyn NativeEngine>,
        asset_source: Option<AssetSource>,
        options: SessionOptions,
    ) -> Self {
        Self {
            surface: None,
            session: EngineSession::new(engine, asset_source, options),
            destroyed: false,
        }
    }

    /// Attach the content surface and start the engine on first attach.
    pub fn on_surface_created(&mut self, surface: &Arc<dyn ContentSurface>) -> Result<(), CoreError> {
        if self.destroyed {
            debug!("surface created after destroy, ignoring");
            return Ok(());
        }
        self.surface = Some(Arc::downgrade(surface));

        match self.session.state() {
            SessionState::Uninitialized => self.session.start(),
            state => {
                debug!("surface attached while {state}, engine already started");
                Ok(())
            }
        }
    }

    pub fn on_surface_changed(&mut self, width: i32, height: i32) {
        if self.destroyed {
            debug!("surface change after destroy, ignoring");
            return;
        }
        self.session.surface_changed(width, height);
    }

    pub fn on_pause(&mut self) {
        self.session.suspend();
    }

    /// `density` is the display density scale; 0 means the host does not
    /// know it yet, and no metrics are forwarded.
    #[allow(clippy::float_cmp)]
    pub fn on_resume(&mut self, density: f32) -> Result<(), CoreError> {
        if self.destroyed {
            debug!("resume after destroy, ignoring");
            return Ok(());
        }

        let snapshot = if density == 0.0 {
            debug!("display density unknown on resume");
            None
        } else {
            Some(metrics::resolve(density))
        };
        self.session.resume(snapshot)?;

        if let Some(size) = self.live_surface_size() {
            self.session.surface_changed(size.width, size.height);
        }
        Ok(())
    }

    /// Shut the engine down. Only the first call has any effect.
    pub fn on_destroy(&mut self) {
        if self.destroyed {
            debug!("duplicate destroy ignored");
            return;
        }
        info!("activity destroyed");
        self.destroyed = true;
        self.surface = None;
        self.session.stop();
    }

    /// Forward one frame from the host's frame source.
    pub fn tick(&mut self) -> bool {
        self.session.tick()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &EngineSession {
        &self.session
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn has_surface(&self) -> bool {
        self.surface
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Size of the attached surface, if it is still alive and has area.
    fn live_surface_size(&self) -> Option<SurfaceSize> {
        let surface = self.surface.as_ref()?.upgrade()?;
        surface.size().filter(|size| !size.is_empty())
    }
}
