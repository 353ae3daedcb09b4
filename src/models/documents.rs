use bson::{doc, oid::ObjectId, Bson, Document};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{RepositoryError, RepositoryResult, ValidationError, ValidationResult};

/// Primary key field of every collection
pub const ID_FIELD: &str = "_id";

/// Outcome of a single-document insert
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    pub inserted_id: Bson,
}

/// Outcome of a single-document update, with or without upsert
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Bson>,
}

/// Outcome of a single-document delete
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Insert acknowledgement as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResponse {
    pub acknowledged: bool,
    pub inserted_id: Value,
}

/// Update acknowledgement as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Value>,
}

/// Delete acknowledgement as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

impl From<InsertOutcome> for InsertOneResponse {
    fn from(outcome: InsertOutcome) -> Self {
        Self {
            acknowledged: true,
            inserted_id: bson_to_json(outcome.inserted_id),
        }
    }
}

impl From<UpdateOutcome> for UpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        Self {
            acknowledged: true,
            matched_count: outcome.matched_count,
            modified_count: outcome.modified_count,
            upserted_count: u64::from(outcome.upserted_id.is_some()),
            upserted_id: outcome.upserted_id.map(bson_to_json),
        }
    }
}

impl From<DeleteOutcome> for DeleteResponse {
    fn from(outcome: DeleteOutcome) -> Self {
        Self {
            acknowledged: true,
            deleted_count: outcome.deleted_count,
        }
    }
}

/// Render a BSON value the way the Node driver serializes it to JSON:
/// object ids as hex strings, dates as RFC 3339.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(formatted) => Value::String(formatted),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::Null | Bson::Undefined => Value::Null,
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}

pub fn documents_to_json(documents: Vec<Document>) -> Value {
    Value::Array(documents.into_iter().map(document_to_json).collect())
}

/// Build an `{_id: ObjectId}` filter from a path parameter.
pub fn id_filter(id: &str) -> RepositoryResult<Document> {
    let oid = ObjectId::parse_str(id).map_err(|_| RepositoryError::InvalidIdentifier {
        id: id.to_string(),
    })?;
    Ok(doc! { ID_FIELD: oid })
}

/// Convert a JSON request body into a document, stored verbatim.
pub fn json_to_document(body: &Map<String, Value>) -> RepositoryResult<Document> {
    Ok(bson::to_document(body)?)
}

/// Require that a request body is a JSON object.
pub fn require_object(body: Value, field: &str) -> ValidationResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: format!("JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
