use super::{attach, colorize_state, core_error, json_pretty, EXIT_SUCCESS};
use lynx_core::ReplayReport;
use lynx_engine::NativeCall;
use lynx_schema::parse_scenario_file;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ReplayOutput<'a> {
    scenario: Option<&'a str>,
    engine: &'static str,
    report: &'a ReplayReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    calls: Option<Vec<NativeCall>>,
}

pub fn run(
    config: Option<&Path>,
    assets: Option<&Path>,
    scenario_path: &Path,
    json: bool,
) -> Result<u8, String> {
    let scenario =
        parse_scenario_file(scenario_path).map_err(|e| format!("scenario error: {e}"))?;
    let bridge = attach(config, assets)?;
    let report = bridge.replay(&scenario).map_err(|e| core_error(&e))?;
    let calls = bridge.call_log().map(lynx_engine::CallLog::snapshot);

    if json {
        let output = ReplayOutput {
            scenario: scenario.name.as_deref(),
            engine: bridge.engine_name(),
            report: &report,
            calls,
        };
        println!("{}", json_pretty(&output)?);
        return Ok(EXIT_SUCCESS);
    }

    if let Some(calls) = &calls {
        for (index, call) in calls.iter().enumerate() {
            println!("{:>4}  {call}", index + 1);
        }
    }
    println!(
        "replayed {} events across {} activities, {} ticks delivered; final state: {}",
        report.events,
        report.adapters,
        report.ticks_delivered,
        colorize_state(&report.final_state.to_string())
    );
    Ok(EXIT_SUCCESS)
}
