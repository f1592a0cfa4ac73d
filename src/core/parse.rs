//! TZ-003: Parsing detected output into values.
//!
//! Scalar and datetime parses never fail past the caller: a malformed
//! input degrades to the original trimmed text. Array parses are all or
//! nothing — one bad element aborts the conversion with an error the
//! caller must handle. The Json splitter is flat and comma-naive on
//! purpose; nested brackets or quoted commas misparse, and that shape is
//! part of the contract.

use super::detect::{detect, ASSIGN_RE};
use super::types::{InferredType, JsonShape, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

/// Datetime formats tried in order; first parse wins.
const DATETIME_FORMATS: [&str; 4] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Detect the type of `text`, then parse it.
pub fn parse(text: &str) -> Result<Value, String> {
    parse_as(text, detect(text))
}

/// Parse `text` as a specific type.
///
/// Whitespace-only input is `Nothing` regardless of the target type.
pub fn parse_as(text: &str, target: InferredType) -> Result<Value, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Value::Nothing);
    }

    match target {
        InferredType::Nothing => Ok(Value::Nothing),
        InferredType::Int => Ok(parse_int(trimmed)),
        InferredType::Float => Ok(parse_float(trimmed)),
        InferredType::Bool => Ok(parse_bool(trimmed)),
        InferredType::DateTime => Ok(parse_datetime(trimmed)),
        InferredType::IntArray => parse_int_array(trimmed),
        InferredType::FloatArray => parse_float_array(trimmed),
        InferredType::StringArray => Ok(Value::StringArray(non_empty_lines(trimmed))),
        InferredType::Json => Ok(parse_json_span(trimmed)),
        InferredType::Dict => Ok(parse_dict(trimmed)),
        InferredType::Str => Ok(Value::Str(trimmed.to_string())),
    }
}

fn parse_int(trimmed: &str) -> Value {
    match trimmed.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => {
            eprintln!("warning: cannot parse {:?} as int, keeping text", trimmed);
            Value::Str(trimmed.to_string())
        }
    }
}

fn parse_float(trimmed: &str) -> Value {
    match trimmed.parse::<f64>() {
        Ok(x) => Value::Float(x),
        Err(_) => {
            eprintln!("warning: cannot parse {:?} as float, keeping text", trimmed);
            Value::Str(trimmed.to_string())
        }
    }
}

/// Permissive: `true`/`1`/`yes` (any case) are true, everything else is
/// false. Malformed boolean text yields false, never an error.
fn parse_bool(trimmed: &str) -> Value {
    let lower = trimmed.to_lowercase();
    Value::Bool(matches!(lower.as_str(), "true" | "1" | "yes"))
}

fn parse_datetime(trimmed: &str) -> Value {
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Value::DateTime(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Value::DateTime(d.and_time(NaiveTime::MIN));
        }
    }
    Value::Str(trimmed.to_string())
}

fn parse_int_array(trimmed: &str) -> Result<Value, String> {
    let mut items = Vec::new();
    for line in non_empty_lines(trimmed) {
        let n = line
            .parse::<i64>()
            .map_err(|e| format!("bad int element {:?}: {}", line, e))?;
        items.push(n);
    }
    Ok(Value::IntArray(items))
}

fn parse_float_array(trimmed: &str) -> Result<Value, String> {
    let mut items = Vec::new();
    for line in non_empty_lines(trimmed) {
        let x = line
            .parse::<f64>()
            .map_err(|e| format!("bad float element {:?}: {}", line, e))?;
        items.push(x);
    }
    Ok(Value::FloatArray(items))
}

/// Flat bracket-span splitter. Strips the outer `[]`/`{}`, splits the
/// remainder on every comma, and for `{}` splits each segment on the
/// first `:`. No nesting, no escape handling. Input that is not a
/// bracket span degrades to the trimmed text.
fn parse_json_span(trimmed: &str) -> Value {
    if let Some(inner) = strip_wrap(trimmed, '[', ']') {
        let items: Vec<String> = inner
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        return Value::Json(JsonShape::List(items));
    }

    if let Some(inner) = strip_wrap(trimmed, '{', '}') {
        let mut map = IndexMap::new();
        for segment in inner.split(',') {
            if let Some((key, value)) = segment.split_once(':') {
                map.insert(strip_quotes(key).to_string(), strip_quotes(value).to_string());
            }
        }
        return Value::Json(JsonShape::Map(map));
    }

    Value::Str(trimmed.to_string())
}

/// Line-oriented `identifier=value` map. Lines that do not match are
/// silently skipped; values lose surrounding quotes.
fn parse_dict(trimmed: &str) -> Value {
    let mut map = IndexMap::new();
    for line in trimmed.lines() {
        if let Some(caps) = ASSIGN_RE.captures(line.trim()) {
            map.insert(caps[1].to_string(), strip_quotes(&caps[2]).to_string());
        }
    }
    Value::Dict(map)
}

fn non_empty_lines(trimmed: &str) -> Vec<String> {
    trimmed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_wrap(s: &str, open: char, close: char) -> Option<&str> {
    s.strip_prefix(open)?.strip_suffix(close)
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}
