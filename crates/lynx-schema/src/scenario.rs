use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse scenario: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported scenario_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("event {index}: surface dimensions must be non-negative, got {width}x{height}")]
    NegativeSurface {
        index: usize,
        width: i32,
        height: i32,
    },
    #[error("event {index}: density must be zero (unknown) or positive, got {density}")]
    InvalidDensity { index: usize, density: f32 },
}

/// One OS lifecycle callback, in the order the host delivered it.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    SurfaceCreated {
        width: i32,
        height: i32,
    },
    SurfaceChanged {
        width: i32,
        height: i32,
    },
    Pause,
    Resume {
        #[serde(default)]
        density: f32,
    },
    Destroy,
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },
    /// The host tears the activity down and builds a new instance without
    /// killing the process (configuration change).
    Recreate,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::SurfaceCreated { .. } => "surface_created",
            LifecycleEvent::SurfaceChanged { .. } => "surface_changed",
            LifecycleEvent::Pause => "pause",
            LifecycleEvent::Resume { .. } => "resume",
            LifecycleEvent::Destroy => "destroy",
            LifecycleEvent::Tick { .. } => "tick",
            LifecycleEvent::Recreate => "recreate",
        }
    }
}

fn default_tick_count() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub scenario_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub events: Vec<LifecycleEvent>,
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.scenario_version != 1 {
            return Err(ScenarioError::UnsupportedVersion(self.scenario_version));
        }
        for (index, event) in self.events.iter().enumerate() {
            match *event {
                LifecycleEvent::SurfaceCreated { width, height }
                | LifecycleEvent::SurfaceChanged { width, height }
                    if width < 0 || height < 0 =>
                {
                    return Err(ScenarioError::NegativeSurface {
                        index,
                        width,
                        height,
                    });
                }
                LifecycleEvent::Resume { density } if density.is_nan() || density < 0.0 => {
                    return Err(ScenarioError::InvalidDensity { index, density });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

pub fn parse_scenario_str(input: &str) -> Result<Scenario, ScenarioError> {
    let scenario: Scenario = toml::from_str(input)?;
    scenario.validate()?;
    Ok(scenario)
}

pub fn parse_scenario_file(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let content = fs::read_to_string(path)?;
    parse_scenario_str(&content)
}
