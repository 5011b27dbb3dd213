//! Turns raw API responses into [`ProcessedRecord`]s.
//!
//! Three steps, none of them doing I/O:
//! 1. keep only status-200 responses ([`filter_successful`]);
//! 2. unwrap each `{"data": ...}` envelope and concatenate the records
//!    ([`flatten_responses`]);
//! 3. project every record onto a [`ColumnSchema`] ([`project_records`]).
//!
//! The API sends `"data"` either as an array of slots or as an object keyed
//! by slot id. Object values are taken in the order their keys appear in the
//! response body, not in any order the request controls.

use chrono::{DateTime, Duration, Local};
use serde_json::Value;

use crate::error::BetterError;
use crate::types::{CellValue, Column, DayOutcome, ProcessedRecord, RawResponse};

/// Converts one raw JSON value into a typed cell. The error string becomes
/// the `reason` of [`BetterError::Coercion`].
pub type Coercer = fn(&Value) -> Result<CellValue, String>;

/// What to do when a record's column cannot be coerced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoercionPolicy {
    /// Fail the whole normalization.
    #[default]
    Abort,
    /// Log a warning and drop the offending record.
    Skip,
}

/// Immutable table of recognized columns and their coercion functions.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Vec<(Column, Coercer)>,
}

impl ColumnSchema {
    /// The four columns the Better API exposes.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            columns: vec![
                (Column::Timestamp, coerce_timestamp as Coercer),
                (Column::Spaces, coerce_spaces as Coercer),
                (Column::Duration, coerce_duration as Coercer),
                (Column::Price, coerce_price as Coercer),
            ],
        }
    }

    #[must_use]
    pub fn new(columns: Vec<(Column, Coercer)>) -> Self {
        Self { columns }
    }

    fn lookup(&self, key: &str) -> Option<(Column, Coercer)> {
        self.columns
            .iter()
            .find(|(column, _)| column.name() == key)
            .copied()
    }

    /// Projects one raw record onto the schema.
    ///
    /// Keys outside the schema are dropped; schema columns missing from the
    /// record stay missing.
    ///
    /// # Errors
    ///
    /// - [`BetterError::NonObjectRecord`] if `raw` is not a JSON object.
    /// - [`BetterError::Coercion`] for the first column that fails.
    pub fn project(&self, raw: &Value) -> Result<ProcessedRecord, BetterError> {
        let Some(fields) = raw.as_object() else {
            return Err(BetterError::NonObjectRecord {
                kind: json_kind(raw),
            });
        };
        let mut record = ProcessedRecord::default();

        for (key, value) in fields {
            if let Some((column, coerce)) = self.lookup(key) {
                let cell = coerce(value).map_err(|reason| BetterError::Coercion {
                    column: column.name(),
                    reason,
                })?;
                record.insert(column, cell);
            }
        }

        Ok(record)
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::standard()
    }
}

/// Keeps responses with status exactly 200, in their original order.
///
/// Dropped days are logged; a 422 ("no sessions that day") is expected and
/// logged at debug, anything else at warn.
#[must_use]
pub fn filter_successful(responses: Vec<RawResponse>) -> Vec<RawResponse> {
    responses
        .into_iter()
        .filter(|response| match response.outcome() {
            DayOutcome::Success => true,
            DayOutcome::NoData => {
                tracing::debug!(day = %response.day.date(), "no availability for day");
                false
            }
            DayOutcome::Failed { status } => {
                tracing::warn!(day = %response.day.date(), status, "dropping unsuccessful response");
                false
            }
        })
        .collect()
}

/// Parses one response body and returns its records.
///
/// `context` names the response in error messages.
///
/// # Errors
///
/// - [`BetterError::InvalidJson`] if the body is not JSON.
/// - [`BetterError::MissingData`] if the body has no `"data"` field.
/// - [`BetterError::UnrecognizedEnvelopeShape`] if `"data"` is neither an
///   object nor an array.
pub fn parse_envelope(body: &str, context: &str) -> Result<Vec<Value>, BetterError> {
    let mut payload: Value =
        serde_json::from_str(body).map_err(|e| BetterError::InvalidJson {
            context: context.to_owned(),
            source: e,
        })?;

    let data = payload
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| BetterError::MissingData {
            context: context.to_owned(),
        })?;

    match data {
        Value::Object(slots) => Ok(slots.into_iter().map(|(_, slot)| slot).collect()),
        Value::Array(slots) => Ok(slots),
        other => Err(BetterError::UnrecognizedEnvelopeShape {
            context: context.to_owned(),
            kind: json_kind(&other),
        }),
    }
}

/// Concatenates the records of every response, in response order.
///
/// Callers pass already-filtered responses; statuses are not re-checked.
///
/// # Errors
///
/// - [`BetterError::EmptyResult`] if `responses` is empty.
/// - Any error from [`parse_envelope`].
pub fn flatten_responses(responses: &[RawResponse]) -> Result<Vec<Value>, BetterError> {
    if responses.is_empty() {
        return Err(BetterError::EmptyResult { requested: 0 });
    }

    let mut records = Vec::new();
    for response in responses {
        let context = format!("date {}", response.day.date());
        records.extend(parse_envelope(&response.body, &context)?);
    }
    Ok(records)
}

/// Projects every raw record onto `schema`, preserving order.
///
/// # Errors
///
/// Under [`CoercionPolicy::Abort`], returns the first
/// [`BetterError::Coercion`] or [`BetterError::NonObjectRecord`]. Under
/// [`CoercionPolicy::Skip`] this never fails.
pub fn project_records(
    records: &[Value],
    schema: &ColumnSchema,
    policy: CoercionPolicy,
) -> Result<Vec<ProcessedRecord>, BetterError> {
    let mut processed = Vec::with_capacity(records.len());
    for (index, raw) in records.iter().enumerate() {
        match schema.project(raw) {
            Ok(record) => processed.push(record),
            Err(e) if policy == CoercionPolicy::Skip => {
                tracing::warn!(index, error = %e, "skipping record that failed coercion");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(processed)
}

/// Runs filter, flatten, and projection over a batch of responses.
///
/// # Errors
///
/// - [`BetterError::EmptyResult`] if no response has status 200.
/// - Any error from [`flatten_responses`] or [`project_records`].
pub fn normalize_responses(
    responses: Vec<RawResponse>,
    schema: &ColumnSchema,
    policy: CoercionPolicy,
) -> Result<Vec<ProcessedRecord>, BetterError> {
    let requested = responses.len();
    let successful = filter_successful(responses);
    if successful.is_empty() {
        return Err(BetterError::EmptyResult { requested });
    }

    let raw = flatten_responses(&successful)?;
    let processed = project_records(&raw, schema, policy)?;

    tracing::debug!(
        requested,
        successful = successful.len(),
        raw = raw.len(),
        processed = processed.len(),
        "normalized availability"
    );

    Ok(processed)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Column coercions
// ---------------------------------------------------------------------------

/// Unix epoch seconds (integer or fractional) to a local instant.
fn coerce_timestamp(value: &Value) -> Result<CellValue, String> {
    let utc = if let Some(secs) = value.as_i64() {
        DateTime::from_timestamp(secs, 0)
    } else if let Some(secs) = value.as_f64() {
        epoch_from_f64(secs)
    } else {
        return Err(format!("expected epoch seconds, got {}", json_kind(value)));
    };

    utc.map(|ts| CellValue::Timestamp(ts.with_timezone(&Local)))
        .ok_or_else(|| format!("epoch {value} is out of range"))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn epoch_from_f64(secs: f64) -> Option<DateTime<chrono::Utc>> {
    if !secs.is_finite() || secs.abs() >= 1e15 {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// An integer count; accepts integers, integral strings, truncated floats,
/// and booleans.
fn coerce_spaces(value: &Value) -> Result<CellValue, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(CellValue::Spaces(i))
            } else {
                n.as_f64()
                    .and_then(truncate_f64)
                    .map(CellValue::Spaces)
                    .ok_or_else(|| format!("number {n} does not fit an integer count"))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(CellValue::Spaces)
            .map_err(|e| format!("\"{s}\" is not an integer: {e}")),
        Value::Bool(b) => Ok(CellValue::Spaces(i64::from(*b))),
        other => Err(format!("expected an integer count, got {}", json_kind(other))),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_f64(f: f64) -> Option<i64> {
    let t = f.trunc();
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then(|| t as i64)
}

/// A string such as `"60min"`: every `min` is removed and the rest parsed as
/// whole minutes.
fn coerce_duration(value: &Value) -> Result<CellValue, String> {
    let Some(raw) = value.as_str() else {
        return Err(format!("expected a string like \"60min\", got {}", json_kind(value)));
    };
    let remainder = raw.replace("min", "");
    let minutes = remainder
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("\"{raw}\" leaves \"{remainder}\" after removing \"min\": {e}"))?;
    Duration::try_minutes(minutes)
        .map(CellValue::Duration)
        .ok_or_else(|| format!("{minutes} minutes is out of range"))
}

/// An object whose `formatted_amount` is kept; a missing amount is null, not
/// an error.
fn coerce_price(value: &Value) -> Result<CellValue, String> {
    let Some(price) = value.as_object() else {
        return Err(format!("expected a price object, got {}", json_kind(value)));
    };
    let amount = match price.get("formatted_amount") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };
    Ok(CellValue::Price(amount))
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
