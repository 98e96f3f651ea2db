mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_LINK_ERROR};
use lynx_core::install_signal_handler;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "lynx",
    version,
    about = "Host simulator for the Lynx engine lifecycle bridge"
)]
struct Cli {
    /// Path to the bridge configuration file. Without one, the recording
    /// engine is used and no asset source is required.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory handed to the engine as its asset source.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a lifecycle scenario against the configured engine.
    Replay {
        /// Path to scenario TOML file.
        scenario: PathBuf,
    },
    /// Create an activity, drive frames, then destroy it.
    Run {
        /// Display density scale reported on resume (0 = unknown).
        #[arg(long, default_value_t = 1.0)]
        density: f32,
        /// Surface width in pixels.
        #[arg(long, default_value_t = 1080)]
        width: i32,
        /// Surface height in pixels.
        #[arg(long, default_value_t = 1920)]
        height: i32,
        /// Number of frames to drive; 0 runs until interrupted.
        #[arg(long, default_value_t = 60)]
        frames: u64,
    },
    /// Show the display metrics derived from a density scale.
    Metrics {
        /// Display density scale (e.g. 2.0).
        #[arg(allow_negative_numbers = true)]
        density: f32,
    },
    /// Load the configured engine and resolve its entry points.
    Check,
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("LYNX_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    install_signal_handler();

    let config = cli.config.as_deref();
    let assets = cli.assets.as_deref();
    let json_output = cli.json;

    let result = match cli.command {
        Commands::Replay { scenario } => {
            commands::replay::run(config, assets, &scenario, json_output)
        }
        Commands::Run {
            density,
            width,
            height,
            frames,
        } => commands::run::run(
            config,
            assets,
            &commands::run::RunOptions {
                density,
                width,
                height,
                frames,
            },
            json_output,
        ),
        Commands::Metrics { density } => commands::metrics::run(density, json_output),
        Commands::Check => commands::check::run(config, json_output),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("config error:") || msg.starts_with("scenario error:")
            {
                EXIT_CONFIG_ERROR
            } else if msg.starts_with("link error:") {
                EXIT_LINK_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
