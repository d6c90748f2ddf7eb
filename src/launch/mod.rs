//! Process launcher - start the application detached from the console
//!
//! The app runs through the local runtime copy inside the application
//! directory. Its stdout and stderr go to the log file, which is truncated on
//! every launch. The launcher does not wait for the child and keeps no handle
//! to it.
//!
//! Detachment:
//! - Windows: `DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP`; no console is
//!   allocated, and `pythonw` opens no window of its own
//! - Unix: the child starts a new session (`setsid`) before exec

mod internal;

use anyhow::Result;

use crate::paths::Layout;

/// Start the application in the background and return its PID
pub fn start(layout: &Layout) -> Result<u32> {
    internal::start(layout)
}
