use crate::model::{Schedule, TaskRecord, format_date, parse_date};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COLOR: &str = "skyblue";
pub const DEFAULT_BAR_HEIGHT: f64 = 0.5;

const NAME_KEYS: [&str; 2] = ["task", "name"];
const HEIGHT_KEYS: [&str; 2] = ["height", "barHeight"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("malformed JSON: {0}")]
    ParseFailure(String),
    #[error("expected a JSON array of task records, found {0}")]
    NotAnArray(&'static str),
    #[error("record {0} is not a JSON object")]
    NotARecord(usize),
    #[error("record {1} is missing required field `{0}`")]
    MissingField(&'static str, usize),
    #[error("record {1} field `{0}` must be a string")]
    WrongType(&'static str, usize),
    #[error("record {1} field `{0}` is not a YYYY-MM-DD date: {2}")]
    InvalidDate(&'static str, usize, String),
    #[error("record {index} ends ({end}) before it starts ({start})")]
    EndBeforeStart {
        index: usize,
        start: String,
        end: String,
    },
}

impl NormalizationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ParseFailure(_) => "parse_failure",
            Self::NotAnArray(_) => "not_an_array",
            Self::NotARecord(_) => "not_a_record",
            Self::MissingField(..) => "missing_field",
            Self::WrongType(..) => "wrong_type",
            Self::InvalidDate(..) => "invalid_date",
            Self::EndBeforeStart { .. } => "end_before_start",
        }
    }
}

/// What to do with a payload that is a single object instead of an array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectPolicy {
    #[default]
    Reject,
    Wrap,
}

/// What to do with a record whose `end` precedes its `start`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrderPolicy {
    #[default]
    Reject,
    Allow,
    Clamp,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    pub default_color: String,
    pub default_bar_height: f64,
    pub object_policy: ObjectPolicy,
    pub date_order: DateOrderPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_COLOR.to_string(),
            default_bar_height: DEFAULT_BAR_HEIGHT,
            object_policy: ObjectPolicy::default(),
            date_order: DateOrderPolicy::default(),
        }
    }
}

pub fn normalize_schedule(json_text: &str) -> Result<Schedule, NormalizationError> {
    normalize_schedule_with(json_text, &NormalizeOptions::default())
}

pub fn normalize_schedule_with(
    json_text: &str,
    options: &NormalizeOptions,
) -> Result<Schedule, NormalizationError> {
    let value: Value = serde_json::from_str(json_text)
        .map_err(|err| NormalizationError::ParseFailure(err.to_string()))?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(map) if options.object_policy == ObjectPolicy::Wrap => {
            vec![Value::Object(map)]
        }
        other => return Err(NormalizationError::NotAnArray(value_kind(&other))),
    };

    let mut tasks = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let Value::Object(fields) = record else {
            return Err(NormalizationError::NotARecord(index));
        };
        tasks.push(normalize_record(fields, index, options)?);
    }

    log::debug!("normalized {} task record(s)", tasks.len());
    Ok(Schedule::new(tasks))
}

fn normalize_record(
    fields: &Map<String, Value>,
    index: usize,
    options: &NormalizeOptions,
) -> Result<TaskRecord, NormalizationError> {
    let name = required_string(fields, &NAME_KEYS, index)?;
    if name.trim().is_empty() {
        return Err(NormalizationError::MissingField(NAME_KEYS[0], index));
    }
    let raw_start = required_string(fields, &["start"], index)?;
    let raw_end = required_string(fields, &["end"], index)?;

    let start = parse_date(raw_start)
        .map_err(|_| NormalizationError::InvalidDate("start", index, raw_start.to_string()))?;
    let mut end = parse_date(raw_end)
        .map_err(|_| NormalizationError::InvalidDate("end", index, raw_end.to_string()))?;

    if end < start {
        match options.date_order {
            DateOrderPolicy::Reject => {
                return Err(NormalizationError::EndBeforeStart {
                    index,
                    start: format_date(start),
                    end: format_date(end),
                });
            }
            DateOrderPolicy::Clamp => end = start,
            DateOrderPolicy::Allow => {}
        }
    }

    let color = match first_present(fields, &["color"]) {
        Some(Value::String(color)) => color.clone(),
        Some(other) => {
            log::debug!("record {index}: ignoring color {other}, using default");
            options.default_color.clone()
        }
        None => options.default_color.clone(),
    };

    let bar_height = match first_present(fields, &HEIGHT_KEYS) {
        Some(value) => match value.as_f64() {
            Some(height) if height.is_finite() && height > 0.0 => height,
            _ => {
                log::debug!("record {index}: ignoring height {value}, using default");
                options.default_bar_height
            }
        },
        None => options.default_bar_height,
    };

    Ok(TaskRecord {
        name: name.to_string(),
        start,
        end,
        color,
        bar_height,
    })
}

fn first_present<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(Value::Null) | None => None,
        Some(value) => Some(value),
    })
}

/// Looks the field up under each alias in turn; errors name the first alias.
fn required_string<'a>(
    fields: &'a Map<String, Value>,
    keys: &[&'static str],
    index: usize,
) -> Result<&'a str, NormalizationError> {
    let field = keys[0];
    match first_present(fields, keys) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(NormalizationError::WrongType(field, index)),
        None => Err(NormalizationError::MissingField(field, index)),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
