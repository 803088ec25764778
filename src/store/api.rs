use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::types::{Mutation, Record, WriteOp, WriteOutcome, WriteRequest};
use crate::types::{Resource, TripId};

/// Content type that keeps a POST a CORS "simple" request.
const SIMPLE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Read and write access to the remote tabular store.
///
/// Reads never fail from the caller's point of view: any transport or
/// format problem degrades to an empty collection. Writes report whether
/// the request completed but are never retried.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch every row of `resource`, filtered to `scope` when given.
    async fn read(&self, resource: Resource, scope: Option<&TripId>) -> Vec<Record>;

    /// Send one add/update/delete.
    async fn write(&self, op: WriteOp, resource: Resource, payload: &Value) -> WriteOutcome;

    /// Convenience wrapper for a prepared [`Mutation`].
    async fn apply(&self, mutation: &Mutation) -> WriteOutcome {
        self.write(mutation.op, mutation.resource, &mutation.payload).await
    }

    /// Get the name of this store (for logging).
    fn name(&self) -> &'static str;
}

/// Client for a spreadsheet-backed web endpoint.
///
/// No request timeout is configured: a hung request keeps its view loading
/// until it resolves.
#[derive(Clone)]
pub struct HttpStore {
    endpoint: String,
    client: Client,
}

impl HttpStore {
    /// Create a store client from config
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_endpoint(config.require_endpoint()?))
    }

    /// Create a store client for an explicit base URL
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }

    /// The base URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET `?action=get&sheet=..[&tripId=..]` and decode the body
    async fn fetch(&self, resource: Resource, scope: Option<&TripId>) -> Result<Value> {
        let mut query = vec![("action", "get"), ("sheet", resource.sheet())];
        if let Some(trip) = scope {
            query.push(("tripId", trip.as_str()));
        }

        let resp = self.client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Read of {} failed: {}", resource, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::store_status(
                format!("Read of {} returned {}", resource, status),
                status.as_u16(),
            ));
        }

        resp.json().await
            .map_err(|e| Error::parse(format!("Invalid JSON reading {}: {}", resource, e)))
    }

    /// POST one write and return whatever record the store echoed back
    async fn send(&self, op: WriteOp, resource: Resource, payload: &Value) -> Result<Option<Record>> {
        let body = serde_json::to_string(&WriteRequest {
            action: op,
            sheet: resource.sheet(),
            data: payload,
        })
        .map_err(|e| Error::parse(format!("Could not encode {} payload: {}", resource, e)))?;

        let resp = self.client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SIMPLE_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} on {} failed: {}", op.action(), resource, e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::store_status(
                format!("{} on {} returned {}", op.action(), resource, status),
                status.as_u16(),
            ));
        }

        // The body is informational; an unreadable one still counts as sent.
        let text = resp.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<Value>(&text).ok().and_then(echoed_record))
    }
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn read(&self, resource: Resource, scope: Option<&TripId>) -> Vec<Record> {
        match self.fetch(resource, scope).await {
            Ok(body) => records_from_body(resource, body),
            Err(e) => {
                tracing::warn!(%resource, error = %e, "read failed, showing no data");
                Vec::new()
            }
        }
    }

    async fn write(&self, op: WriteOp, resource: Resource, payload: &Value) -> WriteOutcome {
        match self.send(op, resource, payload).await {
            Ok(echoed) => {
                tracing::debug!(%resource, action = op.action(), echoed = echoed.is_some(), "write sent");
                WriteOutcome::Sent { echoed }
            }
            Err(e) => {
                tracing::warn!(%resource, action = op.action(), error = %e, "write failed");
                WriteOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    fn name(&self) -> &'static str {
        "HttpStore"
    }
}

/// Turn a read response into records. Anything other than an array is "no data".
pub fn records_from_body(resource: Resource, body: Value) -> Vec<Record> {
    match body {
        Value::Array(rows) => rows
            .into_iter()
            .filter_map(Record::from_value)
            .map(|mut record| {
                record.normalize(resource);
                record
            })
            .collect(),
        Value::Object(map) => {
            if let Some(message) = map.get("error") {
                tracing::warn!(%resource, %message, "store returned an error shape");
            }
            Vec::new()
        }
        other => {
            tracing::debug!(%resource, kind = ?other, "non-array read body ignored");
            Vec::new()
        }
    }
}

/// Pick an echoed row out of a write response, if it carries an id
fn echoed_record(body: Value) -> Option<Record> {
    let Value::Object(mut map) = body else {
        return None;
    };
    if let Some(Value::Object(data)) = map.remove("data") {
        if data.contains_key("id") {
            return Record::from_value(Value::Object(data));
        }
    }
    if map.contains_key("id") {
        return Record::from_value(Value::Object(map));
    }
    None
}
