use crate::adapter::{ActivityAdapter, ContentSurface};
use crate::lifecycle::SessionState;
use crate::session::{SessionOptions, SurfaceSize};
use crate::CoreError;
use lynx_engine::{AssetSource, NativeEngine};
use lynx_schema::{LifecycleEvent, Scenario};
use serde::Serialize;
use std::cell::Cell;
use std::sync::Arc;
use tracing::debug;

/// Host-side surface used when replaying a scenario.
#[derive(Debug)]
pub struct SimulatedSurface {
    size: Cell<SurfaceSize>,
}

impl SimulatedSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Cell::new(SurfaceSize::new(width, height)),
        }
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.size.set(SurfaceSize::new(width, height));
    }
}

impl ContentSurface for SimulatedSurface {
    fn size(&self) -> Option<SurfaceSize> {
        Some(self.size.get())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub events: usize,
    /// Activity instances created, including the initial one.
    pub adapters: usize,
    pub ticks_delivered: u64,
    pub final_state: SessionState,
}

/// Drive a fresh activity through `scenario`, creating one engine per
/// activity instance with `spawn`.
///
/// A `recreate` event destroys the current activity (if the scenario has not
/// already) and continues with a new one, as a host does on a configuration
/// change.
pub fn replay<F>(
    scenario: &Scenario,
    options: SessionOptions,
    asset_source: Option<&AssetSource>,
    mut spawn: F,
) -> Result<ReplayReport, CoreError>
where
    F: FnMut() -> Box<dyn NativeEngine>,
{
    let mut adapter = ActivityAdapter::new(spawn(), asset_source.cloned(), options);
    let mut surface: Option<Arc<SimulatedSurface>> = None;
    let mut report = ReplayReport {
        events: 0,
        adapters: 1,
        ticks_delivered: 0,
        final_state: SessionState::Uninitialized,
    };

    for (index, event) in scenario.events.iter().enumerate() {
        debug!("event {index}: {}", event.name());
        match *event {
            LifecycleEvent::SurfaceCreated { width, height } => {
                let created = Arc::new(SimulatedSurface::new(width, height));
                let handle: Arc<dyn ContentSurface> = created.clone();
                surface = Some(created);
                adapter.on_surface_created(&handle)?;
            }
            LifecycleEvent::SurfaceChanged { width, height } => {
                if let Some(current) = &surface {
                    current.resize(width, height);
                }
                adapter.on_surface_changed(width, height);
            }
            LifecycleEvent::Pause => adapter.on_pause(),
            LifecycleEvent::Resume { density } => adapter.on_resume(density)?,
            LifecycleEvent::Destroy => {
                adapter.on_destroy();
                surface = None;
            }
            LifecycleEvent::Tick { count } => {
                for _ in 0..count {
                    if adapter.tick() {
                        report.ticks_delivered += 1;
                    }
                }
            }
            LifecycleEvent::Recreate => {
                if !adapter.is_destroyed() {
                    adapter.on_destroy();
                }
                surface = None;
                adapter = ActivityAdapter::new(spawn(), asset_source.cloned(), options);
                report.adapters += 1;
            }
        }
        report.events += 1;
    }

    report.final_state = adapter.state();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lynx_engine::{CallLog, RecordingEngine};
    use lynx_schema::parse_scenario_str;
    use std::ptr::NonNull;

    fn assets() -> AssetSource {
        AssetSource::from_raw(NonNull::<u8>::dangling().as_ptr().cast()).unwrap()
    }

    fn run(toml: &str) -> (ReplayReport, CallLog) {
        let scenario = parse_scenario_str(toml).unwrap();
        let log = CallLog::new();
        let report = replay(
            &scenario,
            SessionOptions::default(),
            Some(&assets()),
            || Box::new(RecordingEngine::new(log.clone())),
        )
        .unwrap();
        (report, log)
    }

    #[test]
    fn replay_foreground_cycle() {
        let (report, log) = run(
            r#"
scenario_version = 1

[[events]]
event = "surface_created"
width = 0
height = 0

[[events]]
event = "surface_changed"
width = 1080
height = 1920

[[events]]
event = "pause"

[[events]]
event = "resume"
density = 2.0

[[events]]
event = "destroy"
"#,
        );
        assert_eq!(report.events, 5);
        assert_eq!(report.adapters, 1);
        assert_eq!(report.final_state, SessionState::Terminated);
        assert_eq!(
            log.names(),
            vec![
                "startup",
                "surface_changed",
                "set_display_density",
                "set_status_bar_height",
                "shutdown"
            ]
        );
    }

    #[test]
    fn replay_counts_delivered_ticks() {
        let (report, log) = run(
            r#"
scenario_version = 1

[[events]]
event = "tick"
count = 4

[[events]]
event = "resume"
density = 1.0

[[events]]
event = "tick"
count = 3

[[events]]
event = "pause"

[[events]]
event = "tick"
"#,
        );
        assert_eq!(report.ticks_delivered, 3);
        assert_eq!(report.final_state, SessionState::Suspended);
        assert_eq!(log.count("tick"), 3);
    }

    #[test]
    fn recreate_spawns_fresh_activity() {
        let (report, log) = run(
            r#"
scenario_version = 1

[[events]]
event = "surface_created"
width = 720
height = 1280

[[events]]
event = "recreate"

[[events]]
event = "surface_created"
width = 1280
height = 720

[[events]]
event = "surface_changed"
width = 1280
height = 720
"#,
        );
        assert_eq!(report.adapters, 2);
        assert_eq!(report.final_state, SessionState::Running);
        assert_eq!(
            log.names(),
            vec!["startup", "shutdown", "startup", "surface_changed"]
        );
    }

    #[test]
    fn recreate_after_destroy_does_not_shut_down_twice() {
        let (report, log) = run(
            r#"
scenario_version = 1

[[events]]
event = "resume"

[[events]]
event = "destroy"

[[events]]
event = "recreate"
"#,
        );
        assert_eq!(report.final_state, SessionState::Uninitialized);
        assert_eq!(log.count("shutdown"), 1);
    }

    #[test]
    fn report_serializes_state_in_snake_case() {
        let (report, _log) = run("scenario_version = 1\n");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["events"], 0);
        assert_eq!(json["final_state"], "uninitialized");
    }

    #[test]
    fn replay_stops_on_fatal_error() {
        let scenario = parse_scenario_str(
            r#"
scenario_version = 1

[[events]]
event = "surface_created"
width = 0
height = 0
"#,
        )
        .unwrap();
        let err = replay(&scenario, SessionOptions::default(), None, || {
            Box::new(RecordingEngine::new(CallLog::new()))
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::MissingAssetSource));
    }
}
