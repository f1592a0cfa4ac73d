//! TZ-006: Shared execution context for a polyglot run.
//!
//! One context per run, never shared across runs. Script bindings hold
//! typed values; shell bindings hold plain strings. Values cross the
//! language boundary as `export` lines (script → shell) and as string
//! bindings merged back (shell → script).

use crate::core::Value;
use indexmap::IndexMap;

/// Per-run variable state.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    /// Script-language bindings.
    pub vars: IndexMap<String, Value>,
    /// Shell environment bindings.
    pub env: IndexMap<String, String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `export KEY='VALUE'` lines: first the shell bindings, then
    /// the script bindings (script wins on collision). Script values a
    /// shell cannot hold are omitted.
    pub fn export_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (key, value) in &self.env {
            if is_identifier(key) {
                lines.push(export_line(key, value));
            }
        }
        for (key, value) in &self.vars {
            if let Some(rendered) = value.export_string() {
                if is_identifier(key) {
                    lines.push(export_line(key, &rendered));
                }
            }
        }
        lines
    }

    /// Merge shell bindings into the script bindings as strings. Keys
    /// that are not valid identifiers are skipped.
    pub fn merge_env_into_vars(&mut self) {
        for (key, value) in &self.env {
            if is_identifier(key) {
                self.vars.insert(key.clone(), Value::Str(value.clone()));
            }
        }
    }
}

fn export_line(key: &str, value: &str) -> String {
    format!("export {}='{}'", key, value.replace('\'', r"'\''"))
}

/// Shell-safe variable name: leading letter or underscore, then
/// alphanumerics or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
