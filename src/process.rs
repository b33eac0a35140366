//! The external programs the shell relies on.
//!
//! Everything that spawns a process goes through [`Toolchain`] so the shell
//! can be driven without touching the network or the real key store.

use std::{
    path::Path,
    process::{Command, Output, Stdio},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::{debug, info};

use crate::error::{Error, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Installs a Ctrl-C handler that only records the interrupt.
///
/// Children in the foreground process group still receive SIGINT, so `ssh`
/// stops while the shell keeps running.
pub fn install_interrupt_handler() {
    // set_handler can only be called once per process
    if let Err(e) = ctrlc::set_handler(|| {
        info!("Received Ctrl+C signal");
        INTERRUPTED.store(true, Ordering::Relaxed);
    }) {
        debug!("Could not set Ctrl-C handler: {}", e);
    }
}

/// Returns whether Ctrl-C was pressed since the last call and clears the flag.
pub fn take_interrupt() -> bool {
    INTERRUPTED.swap(false, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub trait Toolchain {
    /// Sends a single ICMP echo; `true` if the host answered.
    fn ping(&self, hostname: &str) -> Result<bool>;

    /// Writes an unencrypted ed25519 pair to `key_file` and `key_file.pub`.
    fn keygen(&self, key_file: &Path, comment: &str) -> Result<CommandOutput>;

    /// Runs `ssh` with the user's terminal as stdin.
    fn ssh(&self, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs the programs found on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemToolchain;

fn spawn_failed(program: &str, e: std::io::Error) -> Error {
    Error::Process {
        program: program.to_string(),
        message: e.to_string(),
    }
}

impl Toolchain for SystemToolchain {
    fn ping(&self, hostname: &str) -> Result<bool> {
        debug!(hostname, "ping");
        let status = Command::new("ping")
            .args(["-c", "1", "-i", "0.5", hostname])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| spawn_failed("ping", e))?;
        Ok(status.success())
    }

    fn keygen(&self, key_file: &Path, comment: &str) -> Result<CommandOutput> {
        debug!(key_file = %key_file.display(), "ssh-keygen");
        let output = Command::new("ssh-keygen")
            .args(["-t", "ed25519", "-C", comment, "-q", "-N", ""])
            .arg("-f")
            .arg(key_file)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_failed("ssh-keygen", e))?;
        Ok(output.into())
    }

    fn ssh(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(?args, "ssh");
        let output = Command::new("ssh")
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .and_then(|child| child.wait_with_output())
            .map_err(|e| spawn_failed("ssh", e))?;
        Ok(output.into())
    }
}
