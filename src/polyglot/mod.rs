//! Polyglot scripts — braided script/shell source files.
//!
//! A polyglot file interleaves two languages: the trenza assignment
//! language (`script`) and POSIX shell (`shell`). Marker lines partition
//! the file into language-tagged blocks which execute in file order
//! against one shared context.

pub mod context;
pub mod eval;
pub mod runner;
pub mod scanner;

pub use context::ExecutionContext;
pub use eval::{AssignEvaluator, EvalOutcome, ScriptEvaluator};
pub use runner::Runner;
pub use scanner::{scan_file, scan_str};

use std::fmt;

/// Which language a block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Script,
    Shell,
}

impl Language {
    /// The other language.
    pub fn complement(self) -> Self {
        match self {
            Self::Script => Self::Shell,
            Self::Shell => Self::Script,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => write!(f, "script"),
            Self::Shell => write!(f, "shell"),
        }
    }
}

/// A contiguous run of same-language source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lang: Language,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tz005_language_complement() {
        assert_eq!(Language::Script.complement(), Language::Shell);
        assert_eq!(Language::Shell.complement(), Language::Script);
    }

    #[test]
    fn test_tz005_language_display() {
        assert_eq!(Language::Script.to_string(), "script");
        assert_eq!(Language::Shell.to_string(), "shell");
    }
}
