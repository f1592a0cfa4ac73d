//! TZ-010: Local subprocess execution.
//!
//! Three modes: plain capture, line-streaming capture, and interactive
//! (terminal bound straight through). Commands run under `bash` so
//! polyglot shell blocks can rely on `set -o pipefail`.

use super::ExecOutput;
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

/// Execute a command locally and capture the full output triple.
pub fn exec_local(script: &str) -> Result<ExecOutput, String> {
    let mut child = Command::new("bash")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to spawn bash: {}", e))?;

    if let Some(ref mut stdin) = child.stdin {
        stdin
            .write_all(script.as_bytes())
            .map_err(|e| format!("stdin write error: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("wait error: {}", e))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Execute a command locally, invoking `on_line` for every stdout line
/// as it arrives. The full triple is still returned at the end.
pub fn exec_local_streaming(
    script: &str,
    on_line: &mut dyn FnMut(&str),
) -> Result<ExecOutput, String> {
    let mut child = Command::new("bash")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to spawn bash: {}", e))?;

    // Write then drop stdin so bash sees EOF before we drain stdout.
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(script.as_bytes())
            .map_err(|e| format!("stdin write error: {}", e))?;
    }

    let stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| "stdout pipe missing".to_string())?;

    let mut collected = String::new();
    for line in BufReader::new(stdout_pipe).lines() {
        let line = line.map_err(|e| format!("stdout read error: {}", e))?;
        on_line(&line);
        collected.push_str(&line);
        collected.push('\n');
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("wait error: {}", e))?;

    Ok(ExecOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: collected,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Execute a command with the terminal bound directly to the child.
/// Nothing is captured; only the exit code comes back.
pub fn exec_local_interactive(script: &str) -> Result<ExecOutput, String> {
    let status = Command::new("bash")
        .arg("-c")
        .arg(script)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| format!("failed to spawn bash: {}", e))?;

    Ok(ExecOutput {
        exit_code: status.code().unwrap_or(-1),
        stdout: String::new(),
        stderr: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tz010_local_echo() {
        let out = exec_local("echo hello").unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn test_tz010_local_failure() {
        let out = exec_local("exit 42").unwrap();
        assert!(!out.success());
        assert_eq!(out.exit_code, 42);
    }

    #[test]
    fn test_tz010_local_stderr() {
        let out = exec_local("echo err >&2").unwrap();
        assert!(out.success());
        assert!(out.stderr.contains("err"));
    }

    #[test]
    fn test_tz010_local_multiline() {
        let out = exec_local("echo line1\necho line2").unwrap();
        assert!(out.success());
        let lines: Vec<_> = out.stdout.lines().collect();
        assert_eq!(lines, vec!["line1", "line2"]);
    }

    #[test]
    fn test_tz010_local_pipefail() {
        let out = exec_local("set -euo pipefail\nfalse | true").unwrap();
        assert!(!out.success(), "pipefail should catch false in pipeline");
    }

    #[test]
    fn test_tz010_streaming_sees_each_line() {
        let mut seen = Vec::new();
        let out = exec_local_streaming("echo a\necho b\necho c", &mut |line| {
            seen.push(line.to_string());
        })
        .unwrap();
        assert!(out.success());
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert_eq!(out.stdout, "a\nb\nc\n");
    }

    #[test]
    fn test_tz010_streaming_captures_stderr_and_code() {
        let mut count = 0usize;
        let out = exec_local_streaming("echo x; echo boom >&2; exit 5", &mut |_| count += 1).unwrap();
        assert_eq!(count, 1);
        assert_eq!(out.exit_code, 5);
        assert!(out.stderr.contains("boom"));
    }
}
