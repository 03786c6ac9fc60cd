// File: src/builtins.rs
//
// Built-in native functions for the SynthFlow standard library.
// These are the pure conversion and I/O helpers behind the native
// dispatch in the interpreter; anything touching the interpreter's
// output sink (print, the input prompt) lives in the interpreter itself.

use crate::interpreter::Value;
use std::fs;
use std::io::BufRead;

/// Numeric parse/cast behind int(x). Booleans convert to 0/1, strings
/// are parsed after trimming, floats truncate toward zero.
pub fn int_cast(value: &Value) -> Result<i64, String> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(n) => Ok(*n as i64),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Cannot convert string '{}' to int", s)),
        Value::Bool(b) => Ok(if *b { 1 } else { 0 }),
        other => Err(format!("Cannot convert {} to int", other.type_name())),
    }
}

/// Numeric parse/cast behind float(x)
pub fn float_cast(value: &Value) -> Result<f64, String> {
    match value {
        Value::Float(n) => Ok(*n),
        Value::Int(n) => Ok(*n as f64),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("Cannot convert string '{}' to float", s)),
        other => Err(format!("Cannot convert {} to float", other.type_name())),
    }
}

/// len(x): byte length for strings, element count for arrays
pub fn length(value: &Value) -> Result<i64, String> {
    match value {
        Value::Str(s) => Ok(s.len() as i64),
        Value::Array(elements) => Ok(elements.borrow().len() as i64),
        other => Err(format!(
            "len() requires a string or array, got {}",
            other.type_name()
        )),
    }
}

/// Whole-file read behind read_file(path)
pub fn read_file(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|_| format!("Cannot open file: {}", path))
}

/// Whole-file write behind write_file(path, content)
pub fn write_file(path: &str, content: &str) -> Result<(), String> {
    fs::write(path, content).map_err(|_| format!("Cannot open file for writing: {}", path))
}

/// One line from standard input, without the trailing newline
pub fn read_line() -> Result<String, String> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("Failed to read input: {}", e))?;
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}
