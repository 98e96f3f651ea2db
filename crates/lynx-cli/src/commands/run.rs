use super::{attach, colorize_state, core_error, json_pretty, EXIT_SUCCESS};
use lynx_core::{ContentSurface, DriverReport, SessionState, SimulatedSurface};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct RunOptions {
    pub density: f32,
    pub width: i32,
    pub height: i32,
    pub frames: u64,
}

#[derive(Serialize)]
struct RunOutput {
    engine: &'static str,
    driver: DriverReport,
    final_state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    native_calls: Option<usize>,
}

pub fn run(
    config: Option<&Path>,
    assets: Option<&Path>,
    options: &RunOptions,
    json: bool,
) -> Result<u8, String> {
    if options.density.is_nan() || options.density < 0.0 {
        return Err(format!(
            "density must be zero (unknown) or positive, got {}",
            options.density
        ));
    }
    if options.width < 0 || options.height < 0 {
        return Err(format!(
            "surface size must be non-negative, got {}x{}",
            options.width, options.height
        ));
    }

    let bridge = attach(config, assets)?;
    let mut activity = bridge.create_activity();

    let surface = Arc::new(SimulatedSurface::new(0, 0));
    let handle: Arc<dyn ContentSurface> = surface.clone();
    activity
        .on_surface_created(&handle)
        .map_err(|e| core_error(&e))?;
    surface.resize(options.width, options.height);
    activity.on_surface_changed(options.width, options.height);
    activity
        .on_resume(options.density)
        .map_err(|e| core_error(&e))?;

    let mut driver = bridge.frame_driver();
    if options.frames > 0 {
        driver = driver.with_frame_limit(options.frames);
    }
    debug!("driving frames every {:?}", driver.interval());
    let report = driver.run(&mut activity);

    activity.on_pause();
    activity.on_destroy();

    let output = RunOutput {
        engine: bridge.engine_name(),
        driver: report,
        final_state: activity.state(),
        native_calls: bridge.call_log().map(lynx_engine::CallLog::len),
    };

    if json {
        println!("{}", json_pretty(&output)?);
    } else {
        println!(
            "{} frames ({} delivered, {} dropped) on {} engine; final state: {}",
            output.driver.frames,
            output.driver.delivered,
            output.driver.dropped,
            output.engine,
            colorize_state(&output.final_state.to_string())
        );
        if let Some(calls) = output.native_calls {
            println!("{calls} native calls recorded");
        }
    }
    Ok(EXIT_SUCCESS)
}
