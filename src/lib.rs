pub mod app;
pub mod archive;
pub mod config;
pub mod deps;
pub mod download;
pub mod launch;
pub mod paths;
pub mod pipeline;
pub mod runtime;
pub mod workdir;

// Re-export commonly used types
pub use config::Config;
pub use paths::Layout;
pub use pipeline::{Options, Outcome, Report, Stage, StageError};
