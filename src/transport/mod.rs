//! TZ-010/011: Command execution — local and SSH.
//!
//! Everything above this layer sees commands as strings and results as
//! `(stdout, stderr, exit_code)` triples. Dispatch between a local
//! subprocess and `ssh` is decided by the target address.

pub mod local;
pub mod ssh;

use crate::cluster::Host;
use crate::core::{parse, Value};
use std::fmt;

/// Output from executing a command or script.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Structured failure for the fail-on-non-zero wrapper. Carries the
/// original command and the full captured triple.
#[derive(Debug, Clone)]
pub struct CommandError {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "command {:?} failed with exit code {}: {}",
            self.command,
            self.exit_code,
            self.stderr.trim()
        )
    }
}

impl std::error::Error for CommandError {}

/// Execute a command on a host. Dispatches to a local subprocess or SSH
/// based on the address.
pub fn exec(host: &Host, command: &str) -> Result<ExecOutput, String> {
    if is_local_addr(&host.addr) {
        local::exec_local(command)
    } else {
        ssh::exec_ssh(host, command)
    }
}

/// Execute a command locally and fail on non-zero exit.
pub fn run_checked(command: &str) -> Result<ExecOutput, CommandError> {
    match local::exec_local(command) {
        Ok(out) if out.success() => Ok(out),
        Ok(out) => Err(CommandError {
            command: command.to_string(),
            stdout: out.stdout,
            stderr: out.stderr,
            exit_code: out.exit_code,
        }),
        Err(e) => Err(CommandError {
            command: command.to_string(),
            stdout: String::new(),
            stderr: e,
            exit_code: -1,
        }),
    }
}

/// Execute a command locally and type its stdout through the inference
/// engine. A non-zero exit still yields whatever stdout was produced.
pub fn capture(command: &str) -> Result<Value, String> {
    let out = local::exec_local(command)?;
    if !out.success() {
        eprintln!(
            "warning: {:?} exited {}; typing its output anyway",
            command, out.exit_code
        );
    }
    parse(&out.stdout)
}

/// Check if an address is this machine.
fn is_local_addr(addr: &str) -> bool {
    if addr == "127.0.0.1" || addr == "localhost" || addr == "::1" {
        return true;
    }
    if let Ok(hostname) = std::fs::read_to_string("/etc/hostname") {
        if addr == hostname.trim() {
            return true;
        }
    }
    false
}
