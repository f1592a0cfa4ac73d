//! TZ-008: Block execution loop.
//!
//! Blocks run strictly in file order against one shared context; there
//! is no parallelism inside a run because later blocks read what
//! earlier blocks wrote. Failure handling is asymmetric on purpose: a
//! shell block that exits non-zero is logged and skipped, a script
//! block that errors aborts the run.

use super::context::{is_identifier, ExecutionContext};
use super::eval::{AssignEvaluator, ScriptEvaluator};
use super::{scanner, Block, Language};
use crate::runlog::{generate_run_id, RunEvent, RunLog};
use crate::transport::local;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Environment keys the shell mutates on its own; never worth recording.
const ENV_NOISE: [&str; 5] = ["_", "SHLVL", "PWD", "OLDPWD", "__trenza_rc"];

struct ShellFailure {
    exit_code: i32,
    message: String,
}

/// Executes block sequences. One `Runner` may serve many runs; each run
/// gets a fresh context.
pub struct Runner {
    evaluator: Box<dyn ScriptEvaluator>,
    log: Option<RunLog>,
    echo: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            evaluator: Box::new(AssignEvaluator::new()),
            log: None,
            echo: true,
        }
    }

    /// Swap in a different script-language evaluator.
    pub fn with_evaluator(evaluator: Box<dyn ScriptEvaluator>) -> Self {
        Self {
            evaluator,
            log: None,
            echo: true,
        }
    }

    /// Record run events to a JSONL log.
    pub fn log_to(mut self, log: RunLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Suppress shell block stdout (library callers, tests).
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Split and run a polyglot file.
    pub fn run_file(&mut self, path: &Path) -> Result<ExecutionContext, String> {
        let blocks = scanner::scan_file(path)?;
        self.run_blocks(&blocks, &path.display().to_string())
    }

    /// Split and run an in-memory snippet.
    pub fn run_str(&mut self, code: &str) -> Result<ExecutionContext, String> {
        let blocks = scanner::scan_str(code);
        self.run_blocks(&blocks, "<string>")
    }

    /// Run pre-split blocks in order against a fresh context.
    pub fn run_blocks(&mut self, blocks: &[Block], source: &str) -> Result<ExecutionContext, String> {
        let run_id = generate_run_id();
        let start = Instant::now();
        self.log_event(RunEvent::RunStarted {
            run_id: run_id.clone(),
            source: source.to_string(),
            trenza_version: env!("CARGO_PKG_VERSION").to_string(),
        });

        let mut ctx = ExecutionContext::new();
        let mut run_count = 0u32;
        let mut failed = 0u32;

        for (index, block) in blocks.iter().enumerate() {
            self.log_event(RunEvent::BlockStarted {
                run_id: run_id.clone(),
                index,
                language: block.lang.to_string(),
            });
            let block_start = Instant::now();

            match block.lang {
                Language::Script => {
                    if let Err(e) = self.exec_script_block(block, &mut ctx) {
                        self.log_event(RunEvent::BlockFailed {
                            run_id: run_id.clone(),
                            index,
                            language: block.lang.to_string(),
                            exit_code: -1,
                            error: e.clone(),
                        });
                        return Err(format!("script block {}: {}", index, e));
                    }
                }
                Language::Shell => {
                    if let Err(failure) = self.exec_shell_block(block, &mut ctx) {
                        failed += 1;
                        eprintln!(
                            "shell block {} failed (exit {}): {}",
                            index, failure.exit_code, failure.message
                        );
                        self.log_event(RunEvent::BlockFailed {
                            run_id: run_id.clone(),
                            index,
                            language: block.lang.to_string(),
                            exit_code: failure.exit_code,
                            error: failure.message,
                        });
                        continue;
                    }
                }
            }

            run_count += 1;
            self.log_event(RunEvent::BlockCompleted {
                run_id: run_id.clone(),
                index,
                language: block.lang.to_string(),
                duration_seconds: block_start.elapsed().as_secs_f64(),
            });
        }

        self.log_event(RunEvent::RunCompleted {
            run_id,
            blocks_run: run_count,
            blocks_failed: failed,
            total_seconds: start.elapsed().as_secs_f64(),
        });

        Ok(ctx)
    }

    fn exec_script_block(
        &mut self,
        block: &Block,
        ctx: &mut ExecutionContext,
    ) -> Result<(), String> {
        ctx.merge_env_into_vars();
        let outcome = self.evaluator.eval(&block.body, &ctx.vars)?;
        for (name, value) in outcome.bindings {
            ctx.vars.insert(name, value);
        }
        Ok(())
    }

    fn exec_shell_block(
        &self,
        block: &Block,
        ctx: &mut ExecutionContext,
    ) -> Result<(), ShellFailure> {
        let sentinel = format!("__TRENZA_ENV_{}__", generate_run_id());

        let mut script = String::new();
        for line in ctx.export_lines() {
            script.push_str(&line);
            script.push('\n');
        }
        script.push_str(&block.body);
        script.push('\n');
        // Preserve the block's exit code across the env dump.
        script.push_str("__trenza_rc=$?\n");
        script.push_str(&format!("printf '\\n%s\\n' '{}'\n", sentinel));
        script.push_str("env\n");
        script.push_str("exit $__trenza_rc\n");

        let out = local::exec_local(&script).map_err(|e| ShellFailure {
            exit_code: -1,
            message: e,
        })?;

        let marker = format!("\n{}\n", sentinel);
        let (shown, dump) = match out.stdout.split_once(marker.as_str()) {
            Some((before, after)) => (before, Some(after)),
            None => (out.stdout.as_str(), None),
        };
        if self.echo && !shown.is_empty() {
            println!("{}", shown);
        }

        if !out.success() {
            return Err(ShellFailure {
                exit_code: out.exit_code,
                message: out.stderr.trim().to_string(),
            });
        }

        if let Some(dump) = dump {
            absorb_env_dump(ctx, dump);
        }
        Ok(())
    }

    fn log_event(&self, event: RunEvent) {
        if let Some(ref log) = self.log {
            let _ = log.append(event);
        }
    }
}

/// Diff recognizable `KEY=VALUE` dump lines against what the child
/// started with, recording only what the block itself set or changed.
fn absorb_env_dump(ctx: &mut ExecutionContext, dump: &str) {
    let mut baseline: HashMap<String, String> = std::env::vars().collect();
    for (key, value) in &ctx.env {
        baseline.insert(key.clone(), value.clone());
    }
    for (key, value) in &ctx.vars {
        if let Some(rendered) = value.export_string() {
            baseline.insert(key.clone(), rendered);
        }
    }

    for line in dump.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if !is_identifier(key) || ENV_NOISE.contains(&key) {
            continue;
        }
        if baseline.get(key).is_some_and(|v| v == value) {
            continue;
        }
        ctx.env.insert(key.to_string(), value.to_string());
    }
}
