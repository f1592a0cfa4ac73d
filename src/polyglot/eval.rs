//! TZ-007: Script-language evaluation.
//!
//! The evaluator seam carries an explicit binding contract: a block's
//! outcome is exactly the set of names it wrote. Nothing is scraped out
//! of an evaluation scope after the fact, so a custom evaluator plugged
//! in here has one obligation — declare its writes.

use super::context::is_identifier;
use crate::core::{parse, Value};
use crate::transport;
use indexmap::IndexMap;

/// Result of evaluating one script block: the bindings it wrote, in
/// statement order.
#[derive(Debug, Default)]
pub struct EvalOutcome {
    pub bindings: IndexMap<String, Value>,
}

/// Evaluates script-language source against a seed scope.
///
/// Errors propagate: a script block that fails aborts its whole run.
pub trait ScriptEvaluator {
    fn eval(
        &mut self,
        source: &str,
        seed: &IndexMap<String, Value>,
    ) -> Result<EvalOutcome, String>;
}

/// The built-in evaluator: one assignment per line.
///
/// ```text
/// count = 3                 # literal, typed by the inference engine
/// copy = $count             # reference to a seeded or earlier binding
/// kernel = $(uname -r)      # command capture, stdout typed
/// ```
///
/// Blank lines and `#` comments are skipped. Anything else is an error.
#[derive(Debug, Default)]
pub struct AssignEvaluator;

impl AssignEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptEvaluator for AssignEvaluator {
    fn eval(
        &mut self,
        source: &str,
        seed: &IndexMap<String, Value>,
    ) -> Result<EvalOutcome, String> {
        let mut outcome = EvalOutcome::default();

        for raw in source.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, rhs) = line
                .split_once('=')
                .ok_or_else(|| format!("not an assignment: {:?}", line))?;
            let name = name.trim();
            if !is_identifier(name) {
                return Err(format!("bad variable name: {:?}", name));
            }

            let value = eval_rhs(rhs.trim(), seed, &outcome.bindings)?;
            outcome.bindings.insert(name.to_string(), value);
        }

        Ok(outcome)
    }
}

fn eval_rhs(
    rhs: &str,
    seed: &IndexMap<String, Value>,
    written: &IndexMap<String, Value>,
) -> Result<Value, String> {
    // $(command) — capture and type the command's stdout.
    if let Some(cmd) = rhs.strip_prefix("$(").and_then(|s| s.strip_suffix(')')) {
        return transport::capture(cmd);
    }

    // $name — reference, newest binding wins.
    if let Some(name) = rhs.strip_prefix('$') {
        return written
            .get(name)
            .or_else(|| seed.get(name))
            .cloned()
            .ok_or_else(|| format!("undefined variable: {}", name));
    }

    // Quoted literal — always a string.
    if let Some(inner) = strip_string_literal(rhs) {
        return Ok(Value::Str(inner.to_string()));
    }

    // Bare literal — typed by the inference engine.
    parse(rhs)
}

fn strip_string_literal(rhs: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if rhs.len() >= 2 && rhs.starts_with(quote) && rhs.ends_with(quote) {
            return Some(&rhs[1..rhs.len() - 1]);
        }
    }
    None
}
