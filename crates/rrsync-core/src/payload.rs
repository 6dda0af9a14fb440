//! Provider payload inspection
//!
//! The provider reports failures as JSON error payloads, either a single
//! object or an array of objects carrying `errorCode` and `errorMessage`.
//! One code is not a failure at all: [`NO_DATA_ERROR_CODE`] means "no
//! resources of this kind are configured in the zone", which readers must
//! treat exactly like an empty listing.

use serde_json::Value;
use std::fmt;

/// Provider error code for "Data not found"
pub const NO_DATA_ERROR_CODE: i64 = 70002;

/// One entry of a provider error payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderErrorEntry {
    /// Numeric provider error code
    pub code: i64,
    /// Human readable message
    pub message: String,
}

impl fmt::Display for ProviderErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

fn entry_from(value: &Value) -> Option<ProviderErrorEntry> {
    let code = value.get("errorCode")?.as_i64()?;
    let message = value
        .get("errorMessage")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string();
    Some(ProviderErrorEntry { code, message })
}

/// Parse an error-shaped payload
///
/// Returns `None` when `value` is not an error payload (e.g. a real listing).
pub fn error_entries(value: &Value) -> Option<Vec<ProviderErrorEntry>> {
    match value {
        Value::Object(_) => entry_from(value).map(|e| vec![e]),
        Value::Array(items) if !items.is_empty() => {
            let entries: Vec<_> = items.iter().filter_map(entry_from).collect();
            (entries.len() == items.len()).then_some(entries)
        }
        _ => None,
    }
}

/// Whether `value` is the "no resources of this kind" sentinel
pub fn is_no_data(value: &Value) -> bool {
    error_entries(value)
        .is_some_and(|entries| entries.iter().all(|e| e.code == NO_DATA_ERROR_CODE))
}

/// Collect every error reported in a batch response
///
/// A batch response is an array with one result per submitted operation.
/// Each result may carry the error inline or nested under `response`.
pub fn batch_errors(value: &Value) -> Vec<ProviderErrorEntry> {
    if let Some(entries) = error_entries(value) {
        return entries;
    }

    let Value::Array(results) = value else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    for result in results {
        if let Some(entry) = entry_from(result) {
            errors.push(entry);
            continue;
        }
        match result.get("response") {
            Some(inner @ Value::Object(_)) => errors.extend(entry_from(inner)),
            Some(Value::Array(inner)) => errors.extend(inner.iter().filter_map(entry_from)),
            _ => {}
        }
    }
    errors
}

/// Render error entries as a single line
pub fn describe(entries: &[ProviderErrorEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
