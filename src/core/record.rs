//! Record normalization - loosely-typed API records into strict shapes
//!
//! The platform returns components as free-form JSON objects. Everything
//! downstream (indexing, resolution, listing) works on the strict
//! [`Component`] and [`Workflow`] shapes built here, so field lookups and
//! fallbacks live in this one module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Raw JSON fields of a record
pub type Fields = Map<String, Value>;

/// Field names checked for a record identifier, in order
const ID_FIELDS: &[&str] = &["id", "_id"];

/// Timestamps above this are milliseconds rather than seconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// Action types that address a Data Manager through `form_data_id`
pub const RECORD_ACTIONS: &[&str] = &[
    "find_record",
    "find_records",
    "create_record",
    "create_records",
    "update_record",
    "delete_record",
];

/// The four component collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Data Manager
    #[value(name = "dm")]
    DataManager,
    /// Single-Form Experience Manager
    SingleExp,
    /// Multiple-Form Experience Manager
    MultiExp,
    /// Workflow (visual programming) component
    #[value(alias = "vp")]
    Workflow,
}

impl ComponentKind {
    pub fn all() -> &'static [ComponentKind] {
        &[
            ComponentKind::DataManager,
            ComponentKind::SingleExp,
            ComponentKind::MultiExp,
            ComponentKind::Workflow,
        ]
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::DataManager => "Data Manager",
            ComponentKind::SingleExp => "Single Exp. Manager",
            ComponentKind::MultiExp => "Multiple Exp. Manager",
            ComponentKind::Workflow => "Visual Programming",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised when an input collection has the wrong structure
///
/// Partially-populated records are tolerated; only a collection that is
/// not a sequence of records at all is rejected.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RecordError {
    #[error("{collection} collection is not a sequence of records (found {found})")]
    #[diagnostic(
        code(cinv::record::not_a_sequence),
        help("expected a JSON array, or an object with a \"data\" array")
    )]
    NotASequence {
        collection: ComponentKind,
        found: &'static str,
    },

    #[error("{collection} record #{position} is not an object (found {found})")]
    #[diagnostic(code(cinv::record::not_a_record))]
    NotARecord {
        collection: ComponentKind,
        position: usize,
        found: &'static str,
    },
}

/// A normalized component record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// Identifier rendered as text (`5` and `"5"` both become `"5"`)
    pub id: Option<String>,
    pub name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// The original record, untouched
    pub fields: Fields,
}

impl Component {
    pub fn from_fields(fields: Fields) -> Self {
        let id = ID_FIELDS
            .iter()
            .find_map(|field| fields.get(*field).and_then(scalar_text));
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let created_at = fields.get("created_at").and_then(parse_timestamp);
        let updated_at = fields.get("updated_at").and_then(parse_timestamp);

        Self {
            id,
            name,
            created_at,
            updated_at,
            fields,
        }
    }
}

/// How a workflow is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    /// Trigger type, e.g. `function`, `job`, `dedicated_job`, `api_v2`
    pub kind: String,
    /// Name read from `trigger.<kind>.name`, if any
    pub name: Option<String>,
}

impl Trigger {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj.get("type")?.as_str()?.to_string();
        let name = named_target(obj, &kind);
        Some(Self { kind, name })
    }
}

/// One step of a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Action type; empty when the record carries none
    pub kind: String,
    /// Identifier of the referenced component, if the type references one
    pub target: Option<String>,
}

impl Action {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let kind = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let target = if RECORD_ACTIONS.contains(&kind.as_str()) {
            obj.get("form_data_id").and_then(scalar_text)
        } else {
            named_target(obj, &kind)
        };

        Some(Self { kind, target })
    }
}

/// A normalized workflow record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workflow {
    pub component: Component,
    pub trigger: Option<Trigger>,
    /// Actions in stored order
    pub actions: Vec<Action>,
}

impl Workflow {
    pub fn from_fields(fields: Fields) -> Self {
        let trigger = fields.get("trigger").and_then(Trigger::from_value);
        let actions = fields
            .get("actions")
            .and_then(Value::as_array)
            .map(|actions| actions.iter().filter_map(Action::from_value).collect())
            .unwrap_or_default();

        Self {
            component: Component::from_fields(fields),
            trigger,
            actions,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.component.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.component.name.as_deref()
    }
}

/// Unwrap a collection payload into its records
///
/// Accepts a bare array or the API envelope `{"data": [...]}`.
pub fn parse_collection(value: Value, collection: ComponentKind) -> Result<Vec<Fields>, RecordError> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(RecordError::NotASequence {
                    collection,
                    found: value_kind(&other),
                })
            }
            None => {
                return Err(RecordError::NotASequence {
                    collection,
                    found: "object",
                })
            }
        },
        other => {
            return Err(RecordError::NotASequence {
                collection,
                found: value_kind(&other),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(position, item)| match item {
            Value::Object(fields) => Ok(fields),
            other => Err(RecordError::NotARecord {
                collection,
                position,
                found: value_kind(&other),
            }),
        })
        .collect()
}

/// Parse a Data Manager / Single / Multi collection
pub fn parse_components(value: Value, collection: ComponentKind) -> Result<Vec<Component>, RecordError> {
    Ok(parse_collection(value, collection)?
        .into_iter()
        .map(Component::from_fields)
        .collect())
}

/// Parse a Workflow collection
pub fn parse_workflows(value: Value) -> Result<Vec<Workflow>, RecordError> {
    Ok(parse_collection(value, ComponentKind::Workflow)?
        .into_iter()
        .map(Workflow::from_fields)
        .collect())
}

/// Read `obj.<kind>.name`
fn named_target(obj: &Fields, kind: &str) -> Option<String> {
    if kind.is_empty() {
        return None;
    }
    obj.get(kind)
        .and_then(Value::as_object)
        .and_then(|inner| inner.get("name"))
        .and_then(scalar_text)
}

/// Render a string or number as identifier text; null and empty are absent
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse an epoch timestamp in seconds or milliseconds
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    epoch_to_datetime(raw)
}

/// Convert epoch seconds (or milliseconds above the threshold) to UTC
pub fn epoch_to_datetime(raw: f64) -> Option<DateTime<Utc>> {
    if !raw.is_finite() {
        return None;
    }
    let seconds = if raw > MILLIS_THRESHOLD { raw / 1000.0 } else { raw };
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
