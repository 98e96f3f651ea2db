pub mod check;
pub mod completions;
pub mod metrics;
pub mod replay;
pub mod run;

use lynx_core::{Bridge, CoreError};
use lynx_engine::{AssetSource, EngineError};
use lynx_schema::{parse_config_file, BridgeConfig};
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_LINK_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn colorize_state(state: &str) -> String {
    use console::Style;
    match state {
        "running" => Style::new().green().bold().apply_to(state).to_string(),
        "suspended" => Style::new().yellow().apply_to(state).to_string(),
        "uninitialized" => Style::new().dim().apply_to(state).to_string(),
        "terminated" => Style::new().blue().apply_to(state).to_string(),
        other => other.to_owned(),
    }
}

/// Load the bridge configuration, or the built-in recording setup when no
/// file is given.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, String> {
    match path {
        Some(path) => parse_config_file(path).map_err(|e| format!("config error: {e}")),
        None => {
            let mut config = BridgeConfig::mock();
            config.session.asset_source_required = false;
            Ok(config)
        }
    }
}

pub fn load_assets(dir: Option<&Path>) -> Result<Option<AssetSource>, String> {
    dir.map(AssetSource::directory)
        .transpose()
        .map_err(|e| format!("config error: {e}"))
}

pub fn engine_error(e: &EngineError) -> String {
    if e.is_link_error() {
        format!("link error: {e}")
    } else {
        format!("config error: {e}")
    }
}

pub fn core_error(e: &CoreError) -> String {
    match e {
        CoreError::Engine(inner) => engine_error(inner),
        CoreError::MissingAssetSource => format!("config error: {e}"),
        CoreError::InvalidTransition { .. } => e.to_string(),
    }
}

pub fn attach(config: Option<&Path>, assets: Option<&Path>) -> Result<Bridge, String> {
    let config = load_config(config)?;
    let assets = load_assets(assets)?;
    Bridge::attach(&config, assets).map_err(|e| core_error(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_pretty_serializes_object() {
        let val = serde_json::json!({"state": "running"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"state\""));
        assert!(result.contains("\"running\""));
    }

    #[test]
    fn colorize_state_keeps_text() {
        for state in ["running", "suspended", "uninitialized", "terminated", "other"] {
            assert!(colorize_state(state).contains(state));
        }
    }

    #[test]
    fn default_config_is_recording_engine_without_assets() {
        let config = load_config(None).unwrap();
        assert_eq!(config.engine.backend, "mock");
        assert!(!config.session.asset_source_required);
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.starts_with("config error:"));
    }

    #[test]
    fn missing_assets_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_assets(Some(&dir.path().join("absent"))).unwrap_err();
        assert!(err.starts_with("config error:"));
    }

    #[test]
    fn link_errors_get_their_own_prefix() {
        let err = engine_error(&EngineError::MissingSymbol("engine_tick".to_owned()));
        assert!(err.starts_with("link error:"));
        let err = core_error(&CoreError::Engine(EngineError::BackendUnavailable(
            "metal".to_owned(),
        )));
        assert!(err.starts_with("config error:"));
    }
}
