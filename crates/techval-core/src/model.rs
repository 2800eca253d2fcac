use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single record as emitted by the engine: a JSON object keyed by the wire vocabulary.
pub type RawRecord = Map<String, Value>;

pub const KEY_CRITERIA_ID: &str = "criteriaId";
pub const KEY_CHECKED: &str = "checked";
pub const KEY_PASSES: &str = "passes";
pub const KEY_MESSAGE: &str = "message";

/// Identifier of a validation criterion, e.g. `API01`. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CriteriaId(String);

impl CriteriaId {
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("criteriaId must not be blank".to_string());
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CriteriaId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CriteriaId> for String {
    fn from(id: CriteriaId) -> Self {
        id.0
    }
}

impl fmt::Display for CriteriaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// What the engine reported for one criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The engine does not evaluate this criterion (yet).
    NotChecked { message: Option<String> },
    /// Evaluated. `passes: None` means no automatic verdict could be reached.
    Checked {
        passes: Option<bool>,
        message: Option<String>,
    },
}

impl Outcome {
    pub fn is_checked(&self) -> bool {
        matches!(self, Outcome::Checked { .. })
    }

    pub fn passes(&self) -> Option<bool> {
        match self {
            Outcome::NotChecked { .. } => None,
            Outcome::Checked { passes, .. } => *passes,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::NotChecked { message } | Outcome::Checked { message, .. } => {
                message.as_deref()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// Checked, but the engine could not decide automatically.
    Manual,
    NotChecked,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Manual => "manual",
            Verdict::NotChecked => "not_checked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionResult {
    pub criteria_id: CriteriaId,
    pub outcome: Outcome,
}

impl CriterionResult {
    pub fn passed(id: CriteriaId, message: Option<String>) -> Self {
        Self {
            criteria_id: id,
            outcome: Outcome::Checked {
                passes: Some(true),
                message,
            },
        }
    }

    pub fn failed(id: CriteriaId, message: Option<String>) -> Self {
        Self {
            criteria_id: id,
            outcome: Outcome::Checked {
                passes: Some(false),
                message,
            },
        }
    }

    pub fn not_checked(id: CriteriaId) -> Self {
        Self {
            criteria_id: id,
            outcome: Outcome::NotChecked { message: None },
        }
    }

    pub fn verdict(&self) -> Verdict {
        match &self.outcome {
            Outcome::NotChecked { .. } => Verdict::NotChecked,
            Outcome::Checked {
                passes: Some(true), ..
            } => Verdict::Pass,
            Outcome::Checked {
                passes: Some(false),
                ..
            } => Verdict::Fail,
            Outcome::Checked { passes: None, .. } => Verdict::Manual,
        }
    }

    /// Parse one engine record. `passes`/`message` set to JSON `null` count as absent.
    pub fn from_record(record: &RawRecord) -> Result<Self, String> {
        let criteria_id = match record.get(KEY_CRITERIA_ID) {
            Some(Value::String(s)) => CriteriaId::new(s.clone())?,
            Some(other) => {
                return Err(format!(
                    "{KEY_CRITERIA_ID} must be a string, got {}",
                    json_type(other)
                ))
            }
            None => return Err(format!("missing required key '{KEY_CRITERIA_ID}'")),
        };

        let checked = match record.get(KEY_CHECKED) {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(format!(
                    "{KEY_CHECKED} must be a boolean, got {}",
                    json_type(other)
                ))
            }
            None => return Err(format!("missing required key '{KEY_CHECKED}'")),
        };

        let passes = match record.get(KEY_PASSES) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                return Err(format!(
                    "{KEY_PASSES} must be a boolean, got {}",
                    json_type(other)
                ))
            }
        };

        let message = match record.get(KEY_MESSAGE) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                return Err(format!(
                    "{KEY_MESSAGE} must be a string, got {}",
                    json_type(other)
                ))
            }
        };

        for key in record.keys() {
            if ![KEY_CRITERIA_ID, KEY_CHECKED, KEY_PASSES, KEY_MESSAGE].contains(&key.as_str()) {
                tracing::debug!(criteria_id = %criteria_id, key = %key, "ignoring unknown record key");
            }
        }

        let outcome = if checked {
            Outcome::Checked { passes, message }
        } else {
            if passes.is_some() {
                return Err(format!(
                    "criterion {criteria_id} reports '{KEY_PASSES}' but is not checked"
                ));
            }
            Outcome::NotChecked { message }
        };

        Ok(Self {
            criteria_id,
            outcome,
        })
    }

    /// Wire form. Absent optionals are omitted, never written as `null`.
    pub fn to_record(&self) -> RawRecord {
        let mut record = Map::new();
        record.insert(
            KEY_CRITERIA_ID.to_string(),
            Value::String(self.criteria_id.to_string()),
        );
        record.insert(
            KEY_CHECKED.to_string(),
            Value::Bool(self.outcome.is_checked()),
        );
        if let Some(passes) = self.outcome.passes() {
            record.insert(KEY_PASSES.to_string(), Value::Bool(passes));
        }
        if let Some(message) = self.outcome.message() {
            record.insert(KEY_MESSAGE.to_string(), Value::String(message.to_string()));
        }
        record
    }
}

impl Serialize for CriterionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CriterionResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = RawRecord::deserialize(deserializer)?;
        Self::from_record(&record).map_err(serde::de::Error::custom)
    }
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
