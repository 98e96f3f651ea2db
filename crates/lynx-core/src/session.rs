use crate::lifecycle::{validate_transition, SessionState, Transition};
use crate::metrics::DisplayMetricsSnapshot;
use crate::CoreError;
use lynx_engine::{AssetSource, NativeEngine};
use lynx_schema::SessionSection;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Push density and status-bar height to the engine whenever they are
    /// known and the engine is running.
    pub forward_density_metrics: bool,
    /// Refuse to start without an asset source.
    pub asset_source_required: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            forward_density_metrics: true,
            asset_source_required: true,
        }
    }
}

impl From<SessionSection> for SessionOptions {
    fn from(section: SessionSection) -> Self {
        Self {
            forward_density_metrics: section.forward_density_metrics,
            asset_source_required: section.asset_source_required,
        }
    }
}

/// Drawable size in physical pixels. `(0, 0)` means no drawable surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceSize {
    pub width: i32,
    pub height: i32,
}

impl SurfaceSize {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for SurfaceSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The single authority over native engine calls.
///
/// Every entry point is reached through a session operation, and each
/// operation is legal in some states and silently dropped (with a log line)
/// in others. Surface sizes that arrive while the engine is not running are
/// buffered, latest wins, and delivered once on the next start or resume.
pub struct EngineSession {
    state: SessionState,
    engine: Box<dyn NativeEngine>,
    asset_source: Option<AssetSource>,
    options: SessionOptions,
    surface_size: SurfaceSize,
    pending_surface: Option<SurfaceSize>,
    delivered_surface: Option<SurfaceSize>,
    display_metrics: Option<DisplayMetricsSnapshot>,
}

impl EngineSession {
    pub fn new(
        engine: Box<dyn NativeEngine>,
        asset_source: Option<AssetSource>,
        options: SessionOptions,
    ) -> Self {
        Self {
            state: SessionState::Uninitialized,
            engine,
            asset_source,
            options,
            surface_size: SurfaceSize::ZERO,
            pending_surface: None,
            delivered_surface: None,
            display_metrics: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn asset_source(&self) -> Option<&AssetSource> {
        self.asset_source.as_ref()
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Last size reported by the host, whether or not it reached the engine.
    pub fn surface_size(&self) -> SurfaceSize {
        self.surface_size
    }

    pub fn pending_surface(&self) -> Option<SurfaceSize> {
        self.pending_surface
    }

    pub fn display_metrics(&self) -> Option<DisplayMetricsSnapshot> {
        self.display_metrics
    }

    pub fn start(&mut self) -> Result<(), CoreError> {
        self.launch().map(|_| ())
    }

    /// Start the engine and replay the buffered surface. Returns whether the
    /// replay forwarded a surface, and with it the current metrics.
    fn launch(&mut self) -> Result<bool, CoreError> {
        let next = validate_transition(self.state, Transition::Start)?;
        if self.options.asset_source_required && self.asset_source.is_none() {
            return Err(CoreError::MissingAssetSource);
        }

        info!(
            "starting native engine ({}) from {}",
            self.engine.name(),
            self.state
        );
        self.engine.startup(self.asset_source.as_ref());
        self.state = next;
        self.delivered_surface = None;
        Ok(self.replay_pending_surface())
    }

    pub fn suspend(&mut self) {
        match validate_transition(self.state, Transition::Suspend) {
            Ok(next) => {
                info!("suspending native engine");
                self.engine.pause();
                self.state = next;
            }
            Err(_) => debug!("suspend ignored: session is {}", self.state),
        }
    }

    /// Bring the engine to the foreground and, when `metrics` is given,
    /// record and forward them.
    ///
    /// Resuming an uninitialized session starts it; resuming a running one
    /// only refreshes the metrics.
    pub fn resume(&mut self, metrics: Option<DisplayMetricsSnapshot>) -> Result<(), CoreError> {
        if self.state == SessionState::Terminated {
            debug!("resume ignored: session is terminated");
            return Ok(());
        }
        // Metrics reported with this resume apply to the surface replayed by it.
        if let Some(metrics) = metrics {
            self.display_metrics = Some(metrics);
        }

        let replayed = match self.state {
            SessionState::Uninitialized => {
                debug!("resume before start, starting implicitly");
                self.launch()?
            }
            SessionState::Suspended => {
                let next = validate_transition(self.state, Transition::Resume)?;
                info!("resuming native engine");
                self.engine.resume();
                self.state = next;
                self.replay_pending_surface()
            }
            SessionState::Running | SessionState::Terminated => {
                debug!("resume while running, refreshing display metrics");
                false
            }
        };

        if metrics.is_some() && !replayed {
            self.forward_metrics();
        }
        Ok(())
    }

    pub fn surface_changed(&mut self, width: i32, height: i32) {
        if width < 0 || height < 0 {
            warn!("ignoring surface change with negative size {width}x{height}");
            return;
        }

        let size = SurfaceSize::new(width, height);
        match self.state {
            SessionState::Terminated => {
                debug!("surface change to {size} dropped: session is terminated");
            }
            SessionState::Running => {
                self.surface_size = size;
                self.forward_surface(size);
            }
            SessionState::Uninitialized | SessionState::Suspended => {
                debug!("buffering surface {size} until the engine runs");
                self.surface_size = size;
                self.pending_surface = Some(size);
            }
        }
    }

    /// Deliver one frame. Returns whether the engine actually ticked.
    pub fn tick(&mut self) -> bool {
        if self.state == SessionState::Running {
            self.engine.tick();
            true
        } else {
            trace!("tick dropped: session is {}", self.state);
            false
        }
    }

    pub fn stop(&mut self) {
        let from = self.state;
        match validate_transition(from, Transition::Stop) {
            Ok(next) => {
                if from == SessionState::Uninitialized {
                    debug!("stop before start: nothing to shut down");
                } else {
                    info!("shutting down native engine");
                    self.engine.shutdown();
                }
                self.state = next;
                self.pending_surface = None;
                self.delivered_surface = None;
            }
            Err(_) => debug!("stop ignored: session already terminated"),
        }
    }

    fn replay_pending_surface(&mut self) -> bool {
        match self.pending_surface.take() {
            Some(size) => {
                debug!("replaying buffered surface {size}");
                self.forward_surface(size)
            }
            None => false,
        }
    }

    /// Returns whether the surface reached the engine.
    fn forward_surface(&mut self, size: SurfaceSize) -> bool {
        if self.delivered_surface == Some(size) {
            debug!("surface {size} already delivered");
            return false;
        }
        self.engine.surface_changed(size.width, size.height);
        self.delivered_surface = Some(size);
        self.forward_metrics();
        true
    }

    fn forward_metrics(&mut self) {
        if !self.options.forward_density_metrics {
            return;
        }
        match self.display_metrics {
            Some(metrics) => {
                self.engine.set_display_density(metrics.density_scale);
                self.engine.set_status_bar_height(metrics.status_bar_height_px);
            }
            None => debug!("display density not known yet, metrics not forwarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use lynx_engine::{CallLog, NativeCall, RecordingEngine};
    use std::ptr::NonNull;

    fn assets() -> AssetSource {
        AssetSource::from_raw(NonNull::<u8>::dangling().as_ptr().cast()).unwrap()
    }

    fn session_with(options: SessionOptions) -> (EngineSession, CallLog) {
        let log = CallLog::new();
        let engine = Box::new(RecordingEngine::new(log.clone()).with_pause_resume());
        (EngineSession::new(engine, Some(assets()), options), log)
    }

    fn session() -> (EngineSession, CallLog) {
        session_with(SessionOptions::default())
    }

    #[test]
    fn new_session_is_uninitialized() {
        let (s, log) = session();
        assert_eq!(s.state(), SessionState::Uninitialized);
        assert_eq!(s.surface_size(), SurfaceSize::ZERO);
        assert!(s.pending_surface().is_none());
        assert!(s.display_metrics().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn start_calls_startup_once() {
        let (mut s, log) = session();
        s.start().unwrap();
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(log.names(), vec!["startup"]);
    }

    #[test]
    fn start_passes_asset_source() {
        let (mut s, log) = session();
        s.start().unwrap();
        match &log.snapshot()[0] {
            NativeCall::Startup { asset_source } => assert!(asset_source.is_some()),
            other => panic!("unexpected call {other}"),
        }
    }

    #[test]
    fn start_while_running_is_rejected() {
        let (mut s, log) = session();
        s.start().unwrap();
        assert!(matches!(
            s.start(),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert_eq!(log.count("startup"), 1);
    }

    #[test]
    fn start_while_suspended_is_rejected() {
        let (mut s, _log) = session();
        s.start().unwrap();
        s.suspend();
        assert!(s.start().is_err());
        assert_eq!(s.state(), SessionState::Suspended);
    }

    #[test]
    fn start_without_required_asset_source_fails() {
        let log = CallLog::new();
        let mut s = EngineSession::new(
            Box::new(RecordingEngine::new(log.clone())),
            None,
            SessionOptions::default(),
        );
        assert!(matches!(s.start(), Err(CoreError::MissingAssetSource)));
        assert_eq!(s.state(), SessionState::Uninitialized);
        assert!(log.is_empty());
    }

    #[test]
    fn start_without_optional_asset_source() {
        let log = CallLog::new();
        let options = SessionOptions {
            asset_source_required: false,
            ..SessionOptions::default()
        };
        let mut s = EngineSession::new(Box::new(RecordingEngine::new(log.clone())), None, options);
        s.start().unwrap();
        assert_eq!(log.snapshot(), vec![NativeCall::Startup { asset_source: None }]);
    }

    #[test]
    fn surface_before_start_is_buffered_and_replayed_once() {
        let (mut s, log) = session();
        s.surface_changed(640, 480);
        s.surface_changed(1080, 1920);
        assert!(log.is_empty());
        assert_eq!(s.pending_surface(), Some(SurfaceSize::new(1080, 1920)));
        assert_eq!(s.surface_size(), SurfaceSize::new(1080, 1920));

        s.start().unwrap();
        assert_eq!(
            log.snapshot(),
            vec![
                NativeCall::Startup {
                    asset_source: Some(assets().to_string())
                },
                NativeCall::SurfaceChanged {
                    width: 1080,
                    height: 1920
                },
            ]
        );
        assert!(s.pending_surface().is_none());
    }

    #[test]
    fn surface_while_suspended_is_delivered_on_resume() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.suspend();
        s.surface_changed(800, 600);
        assert_eq!(log.count("surface_changed"), 0);

        s.resume(None).unwrap();
        assert_eq!(log.names(), vec!["startup", "pause", "resume", "surface_changed"]);
    }

    #[test]
    fn surface_while_running_is_forwarded() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.surface_changed(1080, 1920);
        s.surface_changed(1920, 1080);
        assert_eq!(log.count("surface_changed"), 2);
    }

    #[test]
    fn same_surface_is_not_forwarded_twice() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.surface_changed(1080, 1920);
        s.surface_changed(1080, 1920);
        assert_eq!(log.count("surface_changed"), 1);
    }

    #[test]
    fn zero_surface_is_forwarded() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.surface_changed(1080, 1920);
        s.surface_changed(0, 0);
        assert_eq!(
            log.snapshot().last(),
            Some(&NativeCall::SurfaceChanged {
                width: 0,
                height: 0
            })
        );
    }

    #[test]
    fn negative_surface_is_dropped() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.surface_changed(-1, 480);
        s.surface_changed(640, -480);
        assert_eq!(log.count("surface_changed"), 0);
        assert_eq!(s.surface_size(), SurfaceSize::ZERO);
    }

    #[test]
    fn suspend_outside_running_is_dropped() {
        let (mut s, log) = session();
        s.suspend();
        assert_eq!(s.state(), SessionState::Uninitialized);
        s.start().unwrap();
        s.suspend();
        s.suspend();
        assert_eq!(s.state(), SessionState::Suspended);
        assert_eq!(log.count("pause"), 1);
    }

    #[test]
    fn resume_from_uninitialized_starts() {
        let (mut s, log) = session();
        s.resume(Some(metrics::resolve(2.0))).unwrap();
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(
            log.names(),
            vec!["startup", "set_display_density", "set_status_bar_height"]
        );
    }

    #[test]
    fn resume_while_running_only_refreshes_metrics() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.resume(Some(metrics::resolve(1.5))).unwrap();
        assert_eq!(log.count("resume"), 0);
        assert_eq!(
            &log.snapshot()[1..],
            &[
                NativeCall::SetDisplayDensity { density: 1.5 },
                NativeCall::SetStatusBarHeight { height: 38 },
            ]
        );
        assert_eq!(s.display_metrics(), Some(metrics::resolve(1.5)));
    }

    #[test]
    fn resume_propagates_missing_asset_source() {
        let mut s = EngineSession::new(
            Box::new(RecordingEngine::new(CallLog::new())),
            None,
            SessionOptions::default(),
        );
        assert!(matches!(
            s.resume(None),
            Err(CoreError::MissingAssetSource)
        ));
    }

    #[test]
    fn metrics_are_not_forwarded_when_disabled() {
        let (mut s, log) = session_with(SessionOptions {
            forward_density_metrics: false,
            ..SessionOptions::default()
        });
        s.resume(Some(metrics::resolve(2.0))).unwrap();
        s.surface_changed(1080, 1920);
        assert_eq!(log.names(), vec!["startup", "surface_changed"]);
        assert!(s.display_metrics().is_some());
    }

    #[test]
    fn known_metrics_follow_every_surface_change() {
        let (mut s, log) = session();
        s.resume(Some(metrics::resolve(2.0))).unwrap();
        log.clear();
        s.surface_changed(1920, 1080);
        assert_eq!(
            log.snapshot(),
            vec![
                NativeCall::SurfaceChanged {
                    width: 1920,
                    height: 1080
                },
                NativeCall::SetDisplayDensity { density: 2.0 },
                NativeCall::SetStatusBarHeight { height: 50 },
            ]
        );
    }

    #[test]
    fn density_change_while_suspended_is_forwarded_once_on_resume() {
        let (mut s, log) = session();
        s.resume(Some(metrics::resolve(1.0))).unwrap();
        s.suspend();
        s.surface_changed(1920, 1080);
        log.clear();

        s.resume(Some(metrics::resolve(3.0))).unwrap();
        assert_eq!(
            log.snapshot(),
            vec![
                NativeCall::Resume,
                NativeCall::SurfaceChanged {
                    width: 1920,
                    height: 1080
                },
                NativeCall::SetDisplayDensity { density: 3.0 },
                NativeCall::SetStatusBarHeight { height: 75 },
            ]
        );
        assert_eq!(s.display_metrics(), Some(metrics::resolve(3.0)));
    }

    #[test]
    fn implicit_start_replays_surface_with_new_metrics() {
        let (mut s, log) = session();
        s.surface_changed(1080, 1920);
        s.resume(Some(metrics::resolve(2.0))).unwrap();
        assert_eq!(
            log.names(),
            vec![
                "startup",
                "surface_changed",
                "set_display_density",
                "set_status_bar_height"
            ]
        );
        assert_eq!(
            log.snapshot()[2],
            NativeCall::SetDisplayDensity { density: 2.0 }
        );
    }

    #[test]
    fn tick_only_reaches_running_engine() {
        let (mut s, log) = session();
        assert!(!s.tick());
        s.start().unwrap();
        assert!(s.tick());
        s.suspend();
        assert!(!s.tick());
        s.stop();
        assert!(!s.tick());
        assert_eq!(log.count("tick"), 1);
    }

    #[test]
    fn stop_shuts_down_exactly_once() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.stop();
        s.stop();
        assert_eq!(s.state(), SessionState::Terminated);
        assert_eq!(log.count("shutdown"), 1);
    }

    #[test]
    fn stop_from_suspended_shuts_down() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.suspend();
        s.stop();
        assert_eq!(log.names(), vec!["startup", "pause", "shutdown"]);
    }

    #[test]
    fn stop_before_start_makes_no_native_call() {
        let (mut s, log) = session();
        s.surface_changed(640, 480);
        s.stop();
        assert_eq!(s.state(), SessionState::Terminated);
        assert!(s.pending_surface().is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn terminated_session_drops_everything_but_start() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.stop();
        log.clear();

        s.surface_changed(640, 480);
        s.suspend();
        s.resume(Some(metrics::resolve(2.0))).unwrap();
        assert!(!s.tick());
        assert!(log.is_empty());
        assert!(s.pending_surface().is_none());
    }

    #[test]
    fn restart_after_stop_redelivers_surface() {
        let (mut s, log) = session();
        s.start().unwrap();
        s.surface_changed(1080, 1920);
        s.stop();
        s.start().unwrap();
        // Nothing buffered across the stop, so only startup runs again.
        assert_eq!(
            log.names(),
            vec!["startup", "surface_changed", "shutdown", "startup"]
        );
        s.surface_changed(1080, 1920);
        assert_eq!(log.count("surface_changed"), 2);
    }
}
