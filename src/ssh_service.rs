use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::command::ConnectCommand;

/// Runs a session to completion, handing it the terminal in the meantime.
pub trait SessionLauncher {
    fn launch(&mut self, command: &ConnectCommand) -> Result<()>;
}

/// Launches the command line through `sh -c` so user options keep their
/// shell quoting.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    session_active: Arc<AtomicBool>,
}

impl ShellLauncher {
    pub fn new(session_active: Arc<AtomicBool>) -> Self {
        Self { session_active }
    }
}

impl SessionLauncher for ShellLauncher {
    fn launch(&mut self, command: &ConnectCommand) -> Result<()> {
        tracing::info!("Launching {} session: {}", command.program, command.line);

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&command.line);

        // Let the session inherit stdio so it is interactive
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Interrupts belong to the child until it exits
        self.session_active.store(true, Ordering::SeqCst);
        let status = cmd.status();
        self.session_active.store(false, Ordering::SeqCst);

        let status =
            status.with_context(|| format!("Failed to execute {} command", command.program))?;

        if !status.success() {
            // ssh/mosh print their own diagnostics on the shared terminal
            tracing::error!(
                "{} command finished with a non-zero status: {}",
                command.program,
                status
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clears_session_flag_after_exit() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut launcher = ShellLauncher::new(flag.clone());

        launcher
            .launch(&ConnectCommand {
                program: "ssh",
                line: "exit 3".to_string(),
            })
            .unwrap();

        assert!(!flag.load(Ordering::SeqCst));
    }
}
