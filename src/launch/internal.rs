//! Internal implementation for the launcher

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Write;
use std::process::{Command, Stdio};

use crate::paths::Layout;
use crate::workdir::WorkingDir;

pub fn start(layout: &Layout) -> Result<u32> {
    if !layout.local_runtime.exists() {
        bail!("{} not found", layout.local_runtime.display());
    }

    let _cwd = WorkingDir::enter(&layout.app_dir)?;

    let mut log = File::create(&layout.log_file)
        .with_context(|| format!("Failed to create log file {}", layout.log_file.display()))?;
    writeln!(
        log,
        "[{}] launching {} {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
        layout.local_runtime.display(),
        layout.run_args.join(" ")
    )?;
    let log_err = log.try_clone().context("Failed to duplicate log handle")?;

    let mut command = Command::new(&layout.local_runtime);
    command
        .args(&layout.run_args)
        .current_dir(&layout.app_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err));
    detach(&mut command);

    let child = command
        .spawn()
        .with_context(|| format!("Failed to start {}", layout.local_runtime.display()))?;

    // Fire and forget: the handle is dropped without waiting
    Ok(child.id())
}

// A detached process gets no console, so there is no window to hide
#[cfg(windows)]
const DETACH_FLAGS: u32 = {
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP
};

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;

    command.creation_flags(DETACH_FLAGS);
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // SAFETY: setsid is async-signal-safe and the closure touches no parent state
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}
