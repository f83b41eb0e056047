use std::error::Error;
use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;

use devpanel_types::{ErrorRecord, LogValue};

/// Sanitize one log argument into an owned, serializable value
///
/// Serialization failures (hostile `Serialize` impls, non-string map keys,
/// non-finite floats) degrade to the argument's `Debug` form. The result is
/// a deep copy; later mutation of the original cannot change the stored
/// entry.
pub fn sanitize_value<T>(value: &T) -> LogValue
where
    T: Serialize + Debug + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(json) => from_json(json),
        Err(_) => LogValue::Text(format!("{value:?}")),
    }
}

/// Convert an already-serialized JSON tree into a tagged log value
pub fn from_json(json: Value) -> LogValue {
    match json {
        Value::Null => LogValue::Null,
        Value::Bool(b) => LogValue::Bool(b),
        Value::Number(n) => match n.as_f64() {
            Some(f) => LogValue::Number(f),
            None => LogValue::Text(n.to_string()),
        },
        Value::String(s) => LogValue::Text(s),
        other => LogValue::Record(other),
    }
}

/// Normalize an error argument to `{name, message, chain}`
pub fn sanitize_error(err: &dyn Error) -> LogValue {
    sanitize_error_named("Error", err)
}

/// Normalize an error with an explicit name
pub fn sanitize_error_named(name: &str, err: &dyn Error) -> LogValue {
    let mut record = ErrorRecord::new(name, err.to_string());
    let mut source = err.source();
    while let Some(cause) = source {
        record.chain.push(cause.to_string());
        source = cause.source();
    }
    LogValue::Error(record)
}

/// Build a sanitized argument list from a sequence of expressions
///
/// Each argument must implement `Serialize` and `Debug`.
#[macro_export]
macro_rules! values {
    () => { Vec::new() };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::sanitize::sanitize_value(&$arg)),+]
    };
}
