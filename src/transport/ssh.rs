//! TZ-011: SSH execution.
//!
//! Uses the `ssh` binary directly — no libssh2 dependency. The command
//! text is piped to the remote shell's stdin rather than passed as an
//! argument, which sidesteps argument length limits and quoting
//! injection.

use super::ExecOutput;
use crate::cluster::Host;
use std::io::Write;
use std::process::{Command, Stdio};

/// Execute a command on a remote host via SSH.
pub fn exec_ssh(host: &Host, command: &str) -> Result<ExecOutput, String> {
    let mut cmd = Command::new("ssh");
    cmd.args(["-o", "BatchMode=yes"])
        .args(["-o", "ConnectTimeout=5"])
        .args(["-o", "StrictHostKeyChecking=accept-new"]);

    if let Some(ref key) = host.ssh_key {
        cmd.args(["-i", &expand_tilde(key)]);
    }

    cmd.arg(host.login())
        .arg("bash")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| format!("failed to spawn ssh to {}: {}", host.addr, e))?;

    if let Some(ref mut stdin) = child.stdin {
        stdin
            .write_all(command.as_bytes())
            .map_err(|e| format!("stdin write error: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("ssh wait error: {}", e))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Render the one-line `ssh user@addr 'command'` form, for dry runs and
/// the fanout result report.
pub fn render_ssh_command(host: &Host, command: &str) -> String {
    format!("ssh {} '{}'", host.login(), command.replace('\'', r"'\''"))
}

/// Expand a leading `~/` to $HOME.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{}/{}", home, rest);
        }
    }
    path.to_string()
}
