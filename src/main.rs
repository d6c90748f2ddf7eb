use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use pyv_launcher::deps::ProcessSync;
use pyv_launcher::download::HttpDownloader;
use pyv_launcher::{pipeline, Config, Layout, Options, Stage, StageError};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Fetch uv and PyV, install dependencies, start PyV in the background", long_about = None)]
struct Cli {
    /// Directory everything is installed into (default: current directory)
    #[arg(long)]
    root: Option<String>,

    /// Config file (default: <root>/launcher.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Provision only, don't start the application
    #[arg(long)]
    no_launch: bool,

    /// Exit immediately on failure instead of waiting for Enter
    #[arg(long)]
    no_pause: bool,

    /// Show which steps would run and exit
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let no_pause = cli.no_pause;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "❌".red(), format!("{:#}", e).red());

            let in_launch = e
                .downcast_ref::<StageError>()
                .map(|s| s.stage == Stage::Launch)
                .unwrap_or(false);
            if in_launch && !no_pause {
                wait_for_enter();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = resolve_root(&cli.root)?;
    let config = Config::load(&root, cli.config.as_deref())?;
    let layout = Layout::resolve(&root, &config);

    let options = Options {
        launch: !cli.no_launch,
    };

    if cli.dry_run {
        println!("📋 Plan for {}", root.display());
        for step in pipeline::plan(&layout, &options) {
            if step.skipped {
                println!("  - {} (skipped)", step.name);
            } else if step.pending {
                println!("  • {}", step.name);
            } else {
                println!("  ✓ {} (done)", step.name);
            }
        }
        return Ok(());
    }

    let downloader = HttpDownloader::new()?;
    pipeline::run(&layout, &options, &downloader, &ProcessSync)?;

    Ok(())
}

/// Resolve the launcher root from the option or the current directory
fn resolve_root(root: &Option<String>) -> Result<PathBuf> {
    let path = match root {
        Some(p) => {
            let expanded = shellexpand::tilde(p);
            let path = PathBuf::from(expanded.as_ref());
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            path
        }
        None => env::current_dir()?,
    };

    // Absolute so paths stay valid after the launcher changes directory;
    // dunce keeps Windows paths free of the \\?\ prefix
    dunce::canonicalize(&path).with_context(|| format!("Root does not exist: {}", path.display()))
}

fn wait_for_enter() {
    println!("Press Enter to exit...");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input).ok();
}
