//! The provisioning sequence: runtime → app → dependencies → launch
//!
//! Each step checks for its end-state artifact first and does nothing if it
//! is present, so running the pipeline again is safe.

use anyhow::Result;
use std::fmt;

use crate::deps::{self, SyncRunner};
use crate::download::Downloader;
use crate::paths::Layout;
use crate::{app, launch, runtime};

/// What a step did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// End-state artifact was already on disk
    Present,
    /// Step did its work
    Installed,
}

/// Step a failure is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Runtime,
    App,
    /// Runtime copy, dependency sync and process start
    Launch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Runtime => "installing runtime",
            Stage::App => "installing application",
            Stage::Launch => "launching application",
        };
        f.write_str(name)
    }
}

/// A step failure tagged with its stage
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub source: anyhow::Error,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.stage, self.source)
    }
}

impl std::error::Error for StageError {}

trait InStage<T> {
    fn in_stage(self, stage: Stage) -> Result<T>;
}

impl<T> InStage<T> for Result<T> {
    fn in_stage(self, stage: Stage) -> Result<T> {
        self.map_err(|source| StageError { stage, source }.into())
    }
}

/// Pipeline switches
#[derive(Debug, Clone)]
pub struct Options {
    /// Start the application after provisioning
    pub launch: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { launch: true }
    }
}

/// What a full run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub runtime: Outcome,
    pub app: Outcome,
    pub deps: Outcome,
    /// PID of the detached application, if launched
    pub pid: Option<u32>,
}

/// Run every step in order
pub fn run(
    layout: &Layout,
    options: &Options,
    downloader: &dyn Downloader,
    runner: &dyn SyncRunner,
) -> Result<Report> {
    let runtime = runtime::ensure(layout, downloader).in_stage(Stage::Runtime)?;
    let app = app::ensure(layout, downloader).in_stage(Stage::App)?;
    let deps = deps::ensure(layout, runner).in_stage(Stage::Launch)?;

    let pid = if options.launch {
        println!("🚀 Starting application in the background...");
        let pid = launch::start(layout).in_stage(Stage::Launch)?;
        println!("✅ Started (pid {}), output in {}", pid, layout.log_file.display());
        Some(pid)
    } else {
        None
    };

    Ok(Report {
        runtime,
        app,
        deps,
        pid,
    })
}

/// One line of a dry-run plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub name: &'static str,
    /// True when the step would do work
    pub pending: bool,
    /// Turned off by the run options
    pub skipped: bool,
}

impl PlannedStep {
    fn new(name: &'static str, pending: bool) -> Self {
        Self {
            name,
            pending,
            skipped: false,
        }
    }
}

/// Which steps would do work, judged only by artifact presence
pub fn plan(layout: &Layout, options: &Options) -> Vec<PlannedStep> {
    vec![
        PlannedStep::new(
            "download runtime",
            !layout.runtime_exe.exists() && !layout.runtime_archive.exists(),
        ),
        PlannedStep::new("unpack runtime", !layout.runtime_exe.exists()),
        PlannedStep::new(
            "download application",
            !layout.app_dir.exists() && !layout.app_archive.exists(),
        ),
        PlannedStep::new("extract application", !layout.app_dir.exists()),
        PlannedStep::new(
            "copy runtime into application",
            !layout.local_runtime.exists(),
        ),
        PlannedStep::new("install dependencies", layout.installed_marker().is_none()),
        PlannedStep {
            name: "launch application",
            pending: options.launch,
            skipped: !options.launch,
        },
    ]
}
