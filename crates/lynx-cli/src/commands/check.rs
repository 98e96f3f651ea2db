use super::{engine_error, json_pretty, load_config, EXIT_SUCCESS};
use lynx_engine::select_engine;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CheckReport {
    backend: &'static str,
    library: Option<PathBuf>,
    symbol_prefix: String,
    pause: bool,
    resume: bool,
}

pub fn run(config: Option<&Path>, json: bool) -> Result<u8, String> {
    let config = load_config(config)?;
    let loader = select_engine(&config.engine).map_err(|e| engine_error(&e))?;

    let report = CheckReport {
        backend: loader.name(),
        library: config.engine.library.clone(),
        symbol_prefix: config.engine.symbol_prefix.clone(),
        pause: loader.has_pause(),
        resume: loader.has_resume(),
    };

    if json {
        println!("{}", json_pretty(&report)?);
    } else {
        println!("backend:       {}", report.backend);
        if let Some(library) = &report.library {
            println!("library:       {}", library.display());
        }
        println!("prefix:        {}", report.symbol_prefix);
        println!("pause:         {}", yes_no(report.pause));
        println!("resume:        {}", yes_no(report.resume));
        println!("all required entry points resolved");
    }
    Ok(EXIT_SUCCESS)
}

fn yes_no(defined: bool) -> &'static str {
    if defined {
        "yes"
    } else {
        "no"
    }
}
