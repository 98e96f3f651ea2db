//! Configuration and scenario schema for the Lynx lifecycle bridge.
//!
//! This crate defines the declarative inputs of the bridge: the TOML bridge
//! configuration (`BridgeConfig`) that selects the native engine and the
//! session behavior flags, and the TOML lifecycle scenario (`Scenario`) used to
//! replay a sequence of OS callbacks against an activity adapter.

pub mod config;
pub mod scenario;

pub use config::{
    parse_config_file, parse_config_str, BridgeConfig, ConfigError, DriverSection, EngineSection,
    SessionSection, DEFAULT_SYMBOL_PREFIX,
};
pub use scenario::{
    parse_scenario_file, parse_scenario_str, LifecycleEvent, Scenario, ScenarioError,
};
