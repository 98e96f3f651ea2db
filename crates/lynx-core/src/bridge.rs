use crate::adapter::ActivityAdapter;
use crate::driver::FrameDriver;
use crate::replay::{replay, ReplayReport};
use crate::session::SessionOptions;
use crate::CoreError;
use lynx_engine::{select_engine, AssetSource, CallLog, EngineLoader};
use lynx_schema::{BridgeConfig, Scenario};
use tracing::info;

/// Process-wide attachment of the native engine.
///
/// Attaching is where every fatal condition surfaces: an unloadable library,
/// a missing entry point, or a required asset source that was never provided.
/// Once attached, activities are created without further failure points
/// other than the session's own transition checks.
#[derive(Debug)]
pub struct Bridge {
    loader: EngineLoader,
    asset_source: Option<AssetSource>,
    options: SessionOptions,
    frame_rate: u32,
}

impl Bridge {
    pub fn attach(config: &BridgeConfig, asset_source: Option<AssetSource>) -> Result<Self, CoreError> {
        let options = SessionOptions::from(config.session);
        if options.asset_source_required && asset_source.is_none() {
            return Err(CoreError::MissingAssetSource);
        }

        let loader = select_engine(&config.engine)?;
        info!(
            "bridge attached to {} engine (asset source: {})",
            loader.name(),
            asset_source
                .as_ref()
                .map_or_else(|| "none".to_owned(), ToString::to_string)
        );

        Ok(Self {
            loader,
            asset_source,
            options,
            frame_rate: config.driver.frame_rate,
        })
    }

    /// A new activity instance with its own engine session.
    pub fn create_activity(&self) -> ActivityAdapter {
        ActivityAdapter::new(self.loader.spawn(), self.asset_source.clone(), self.options)
    }

    pub fn replay(&self, scenario: &Scenario) -> Result<ReplayReport, CoreError> {
        replay(scenario, self.options, self.asset_source.as_ref(), || {
            self.loader.spawn()
        })
    }

    pub fn frame_driver(&self) -> FrameDriver {
        FrameDriver::new(self.frame_rate)
    }

    pub fn engine_name(&self) -> &'static str {
        self.loader.name()
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Calls made so far, when the recording engine is attached.
    pub fn call_log(&self) -> Option<&CallLog> {
        self.loader.call_log()
    }
}
