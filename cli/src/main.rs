//! Studio CLI binary: check and inspect the model catalog and presets.
//!
//! Subcommands: `validate` (strict report, exit code 1 when invalid), `inspect` (what a new
//! UI session would load and select).

mod log_format;
mod logging;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cli::{run_inspect, run_validate, ProjectPaths, ValidateOptions};

#[derive(Parser, Debug)]
#[command(name = "studio")]
#[command(about = "Studio — validate and inspect models.yaml / presets.yaml")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Project directory holding models.yaml, presets.yaml, .env and secrets.toml (default: .)
    #[arg(short, long, value_name = "DIR", global = true)]
    project_dir: Option<PathBuf>,

    /// Catalog file (default: <project-dir>/models.yaml or STUDIO_MODELS_FILE)
    #[arg(long, value_name = "PATH", global = true)]
    models: Option<PathBuf>,

    /// Presets file (default: <project-dir>/presets.yaml or STUDIO_PRESETS_FILE)
    #[arg(long, value_name = "PATH", global = true)]
    presets: Option<PathBuf>,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Validate both documents and report every problem found
    Validate {
        /// Minimum number of models the catalog must list
        #[arg(long, default_value_t = 1, value_name = "N")]
        min_models: usize,
    },
    /// Show catalog source, backends, presets and notices for a fresh session
    Inspect,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let env_applied = config::load_and_apply("studio", args.project_dir.as_deref());
    logging::init()?;
    match env_applied {
        Ok(n) => tracing::debug!(applied = n, "environment loaded"),
        Err(e) => tracing::warn!(error = %e, "could not load .env / XDG config"),
    }

    let paths = ProjectPaths {
        project_dir: args.project_dir,
        models: args.models,
        presets: args.presets,
    };
    let mut stdout = std::io::stdout().lock();

    match args.cmd {
        Command::Validate { min_models } => {
            let opts = ValidateOptions {
                paths,
                min_models,
                json: args.json,
            };
            let valid = run_validate(&opts, &mut stdout)?;
            stdout.flush()?;
            if !valid {
                std::process::exit(1);
            }
        }
        Command::Inspect => {
            let _span = tracing::info_span!("inspect").entered();
            if let Err(e) = run_inspect(&paths, args.json, &mut stdout) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
