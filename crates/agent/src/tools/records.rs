//! Record tools backed by the JSON store: list, last, create.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::info;

use parley_core::{Lead, ToolError, WellnessEntry};
use parley_store::RecordStore;

use crate::tools::{ArgKind, ArgSpec, Tool, ToolSpec};

fn persistence(err: parley_store::StoreError) -> ToolError {
    ToolError::Persistence(err.to_string())
}

fn string_arg(args: &Value, name: &str) -> String {
    args[name].as_str().unwrap_or_default().to_owned()
}

/// Read out a whole collection, optionally filtered by exact field values.
pub struct ListRecords {
    store: RecordStore,
}

impl ListRecords {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListRecords {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "list_records",
            description: "List the records in a collection",
            args: vec![
                ArgSpec::required("collection", ArgKind::String),
                ArgSpec::optional("filters", ArgKind::Object),
            ],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let collection = string_arg(&args, "collection");
        let mut records = load_collection(&self.store, &collection).await?;

        if let Some(filters) = args.get("filters").and_then(Value::as_object) {
            records.retain(|record| {
                filters.iter().all(|(key, expected)| record.get(key) == Some(expected))
            });
        }

        Ok(json!({ "collection": collection, "count": records.len(), "records": records }))
    }
}

/// The most recent record in a collection, e.g. the caller's last order.
pub struct GetLastRecord {
    store: RecordStore,
}

impl GetLastRecord {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetLastRecord {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "get_last_record",
            description: "Fetch the most recent record in a collection",
            args: vec![ArgSpec::required("collection", ArgKind::String)],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let collection = string_arg(&args, "collection");
        let mut records = load_collection(&self.store, &collection).await?;
        match records.pop() {
            Some(record) => Ok(json!({ "collection": collection, "record": record })),
            None => Err(ToolError::NotFound(format!("no records in `{collection}`"))),
        }
    }
}

/// Append a record to a collection. Leads repeated verbatim by the caller
/// are acknowledged without being stored twice. The clock is the owning
/// session's notion of "now", never ambient process time.
pub struct CreateRecord {
    store: RecordStore,
    clock: DateTime<Utc>,
}

impl CreateRecord {
    pub fn new(store: RecordStore, clock: DateTime<Utc>) -> Self {
        Self { store, clock }
    }

    async fn create_lead(&self, fields: BTreeMap<String, String>) -> Result<Value, ToolError> {
        let mut lead = Lead::from_fields(fields);

        let existing = self.store.leads().load().await;
        let duplicate = existing.last().is_some_and(|stored| {
            let mut stored = stored.clone();
            stored.extra.remove("id");
            stored == lead
        });
        if duplicate {
            info!(name = %lead.name, "lead.duplicate_acknowledged");
            return Ok(json!({ "collection": "leads", "created": false, "record": lead }));
        }

        let id = self.store.ids().next_id("lead").await.map_err(persistence)?;
        lead.extra.insert("id".to_owned(), id.clone());
        self.store.leads().append(lead.clone()).await.map_err(persistence)?;
        Ok(json!({ "collection": "leads", "created": true, "id": id, "record": lead }))
    }

    async fn create_wellness(
        &self,
        mut fields: BTreeMap<String, String>,
    ) -> Result<Value, ToolError> {
        let entry = WellnessEntry {
            date: fields
                .remove("date")
                .unwrap_or_else(|| self.clock.format("%Y-%m-%d").to_string()),
            mood: fields.remove("mood").unwrap_or_default(),
            goals: fields
                .remove("goals")
                .map(|raw| {
                    raw.split(',')
                        .map(|goal| goal.trim().to_owned())
                        .filter(|goal| !goal.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            summary: fields.remove("summary").unwrap_or_default(),
        };

        self.store.wellness().append(entry.clone()).await.map_err(persistence)?;
        let id = self.store.ids().next_id("wellness").await.map_err(persistence)?;
        Ok(json!({ "collection": "wellness", "created": true, "id": id, "record": entry }))
    }
}

#[async_trait]
impl Tool for CreateRecord {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "create_record",
            description: "Append a record to a collection",
            args: vec![
                ArgSpec::required("collection", ArgKind::String),
                ArgSpec::required("fields", ArgKind::Object),
            ],
        }
    }

    async fn execute(&self, args: Value) -> Result<Value, ToolError> {
        let collection = string_arg(&args, "collection");
        let fields: BTreeMap<String, String> = args["fields"]
            .as_object()
            .map(|map| {
                map.iter()
                    .map(|(key, value)| {
                        let text = match value {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        };
                        (key.clone(), text)
                    })
                    .collect()
            })
            .unwrap_or_default();

        match collection.as_str() {
            "leads" => self.create_lead(fields).await,
            "wellness" => self.create_wellness(fields).await,
            other => Err(ToolError::InvalidArguments {
                tool: "create_record".to_string(),
                message: format!("cannot create records in `{other}`"),
            }),
        }
    }
}

async fn load_collection(store: &RecordStore, collection: &str) -> Result<Vec<Value>, ToolError> {
    let records = match collection {
        "orders" => to_values(store.orders().load().await),
        "leads" => to_values(store.leads().load().await),
        "wellness" => to_values(store.wellness().load().await),
        "concepts" => to_values(store.concepts().load().await),
        other => {
            return Err(ToolError::NotFound(format!("unknown collection `{other}`")));
        }
    };
    records.map_err(|err| ToolError::Execution(err.to_string()))
}

fn to_values<T: serde::Serialize>(records: Vec<T>) -> Result<Vec<Value>, serde_json::Error> {
    records.into_iter().map(serde_json::to_value).collect()
}
