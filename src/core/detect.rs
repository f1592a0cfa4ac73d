//! TZ-002: Output type detection.
//!
//! Classifies a raw text blob (the captured stdout of a command) into an
//! `InferredType` by an ordered first-match-wins rule chain. Ordering is
//! load-bearing: numeric multi-line input must classify as an array
//! before any generic fallback, and a bracket span must not be read as a
//! bare string.

use super::types::InferredType;
use regex::Regex;
use std::sync::LazyLock;

static INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("int pattern"));
static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+$").expect("float pattern"));
static BOOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:true|false)$").expect("bool pattern"));
static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date pattern"));
static BRACKET_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\[.*\]|\{.*\})$").expect("bracket pattern"));
pub(crate) static ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("assign pattern"));

/// Classify raw text. Empty (after trim) input is `Nothing`; anything
/// unrecognized falls through to `Str`.
pub fn detect(text: &str) -> InferredType {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return InferredType::Nothing;
    }
    if INT_RE.is_match(trimmed) {
        return InferredType::Int;
    }
    if FLOAT_RE.is_match(trimmed) {
        return InferredType::Float;
    }
    if BOOL_RE.is_match(trimmed) {
        return InferredType::Bool;
    }
    if DATE_PREFIX_RE.is_match(trimmed) {
        return InferredType::DateTime;
    }
    if trimmed.contains('\n') {
        return detect_array(trimmed);
    }
    if BRACKET_SPAN_RE.is_match(trimmed) {
        return InferredType::Json;
    }
    if ASSIGN_RE.is_match(trimmed) {
        return InferredType::Dict;
    }
    InferredType::Str
}

/// Multi-line input: homogeneous numeric lines make a typed array,
/// anything else a string array. Blank lines are ignored.
fn detect_array(trimmed: &str) -> InferredType {
    let lines: Vec<&str> = trimmed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.iter().all(|l| INT_RE.is_match(l)) {
        InferredType::IntArray
    } else if lines.iter().all(|l| FLOAT_RE.is_match(l)) {
        InferredType::FloatArray
    } else {
        InferredType::StringArray
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tz002_empty_is_nothing() {
        assert_eq!(detect(""), InferredType::Nothing);
        assert_eq!(detect("   "), InferredType::Nothing);
        assert_eq!(detect("\n\t\n"), InferredType::Nothing);
    }

    #[test]
    fn test_tz002_int() {
        assert_eq!(detect("0"), InferredType::Int);
        assert_eq!(detect("42"), InferredType::Int);
        assert_eq!(detect("  42  "), InferredType::Int);
        assert_eq!(detect("42\n"), InferredType::Int);
    }

    #[test]
    fn test_tz002_negative_is_not_int() {
        // The digit pattern is unsigned; a leading sign falls to Str.
        assert_eq!(detect("-42"), InferredType::Str);
    }

    #[test]
    fn test_tz002_float() {
        assert_eq!(detect("3.14"), InferredType::Float);
        assert_eq!(detect("0.0"), InferredType::Float);
        assert_eq!(detect(".5"), InferredType::Str);
        assert_eq!(detect("3."), InferredType::Str);
    }

    #[test]
    fn test_tz002_bool_case_insensitive() {
        assert_eq!(detect("true"), InferredType::Bool);
        assert_eq!(detect("FALSE"), InferredType::Bool);
        assert_eq!(detect("True"), InferredType::Bool);
        assert_eq!(detect("yes"), InferredType::Str);
    }

    #[test]
    fn test_tz002_datetime_prefix() {
        assert_eq!(detect("2026-02-16"), InferredType::DateTime);
        assert_eq!(detect("2026-02-16 14:30:00"), InferredType::DateTime);
        assert_eq!(detect("2026-02-16T14:30:00Z"), InferredType::DateTime);
        assert_eq!(detect("16/02/2026"), InferredType::Str);
    }

    #[test]
    fn test_tz002_int_array() {
        assert_eq!(detect("1\n2\n3"), InferredType::IntArray);
        assert_eq!(detect("1\n\n2\n3\n"), InferredType::IntArray);
        assert_eq!(detect("  1\n  2"), InferredType::IntArray);
    }

    #[test]
    fn test_tz002_float_array() {
        assert_eq!(detect("1.5\n2.5"), InferredType::FloatArray);
    }

    #[test]
    fn test_tz002_mixed_numeric_lines_are_string_array() {
        // One int line alongside float lines breaks homogeneity both
        // ways, so the input degrades to a string array.
        assert_eq!(detect("1\n2.5"), InferredType::StringArray);
        assert_eq!(detect("1\ntwo\n3"), InferredType::StringArray);
        assert_eq!(detect("alpha\nbeta"), InferredType::StringArray);
    }

    #[test]
    fn test_tz002_array_before_json() {
        // Rule order: a newline-bearing bracket span is inspected as
        // lines, never as a bracket span.
        assert_eq!(detect("[1,\n2]"), InferredType::StringArray);
    }

    #[test]
    fn test_tz002_json_span() {
        assert_eq!(detect("[1, 2, 3]"), InferredType::Json);
        assert_eq!(detect("{a: 1, b: 2}"), InferredType::Json);
        assert_eq!(detect("[]"), InferredType::Json);
        assert_eq!(detect("{}"), InferredType::Json);
        assert_eq!(detect("[unclosed"), InferredType::Str);
    }

    #[test]
    fn test_tz002_dict_assignment() {
        assert_eq!(detect("PATH=/usr/bin"), InferredType::Dict);
        assert_eq!(detect("_private=1"), InferredType::Dict);
        assert_eq!(detect("9lives=no"), InferredType::Str);
    }

    #[test]
    fn test_tz002_fallback_str() {
        assert_eq!(detect("hello world"), InferredType::Str);
        assert_eq!(detect("12 monkeys"), InferredType::Str);
    }
}
