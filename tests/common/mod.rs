//! Shared test plumbing: a scripted transport and sample table bindings.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rowgrid::{
    FieldConfig, FieldTypeTag, GridResult, Method, RowSchema, SelectOption, TableBinding,
    TableService, Transport, TransportResponse,
};
use serde_json::{json, Value as JsonValue};

/// One request as seen by the transport boundary.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
}

impl RecordedRequest {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport double that replays scripted responses in order and records
/// every request it sees. Panics when a test forgot to script a response.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn enqueue(&self, status: u16, body: JsonValue) {
        self.responses.lock().unwrap().push_back(TransportResponse {
            status,
            body: Some(body),
        });
    }

    pub fn enqueue_no_content(&self, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .push_back(TransportResponse { status, body: None });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<JsonValue>,
    ) -> GridResult<TransportResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body,
        });
        let response = self.responses.lock().unwrap().pop_front();
        match response {
            Some(response) => Ok(response),
            None => panic!("no scripted response for {} {}", method.as_str(), path),
        }
    }
}

/// The Person table used throughout the integration tests.
pub fn person_schema() -> RowSchema {
    RowSchema::builder()
        .field("name", "Name", FieldTypeTag::Text)
        .primary()
        .field("age", "Age", FieldTypeTag::Number)
        .config(FieldConfig::Number {
            decimal_places: 0,
            negative: false,
        })
        .field("cv", "CV", FieldTypeTag::LongText)
        .field("nda_signed", "NDA Signed", FieldTypeTag::Boolean)
        .field("state", "State", FieldTypeTag::SingleSelect)
        .config(FieldConfig::SingleSelect {
            options: vec![
                SelectOption::new(1, "Intern"),
                SelectOption::new(2, "Temporary"),
                SelectOption::new(3, "Permanent employee"),
            ],
        })
        .field("uuid", "UUID", FieldTypeTag::Uuid)
        .build()
        .expect("person schema is valid")
}

pub fn person_service(transport: Arc<MockTransport>) -> TableService {
    let binding =
        TableBinding::new(1201, "Person", person_schema()).expect("person binding is valid");
    TableService::new(transport, binding)
}

/// A server-shaped Person row body.
pub fn person_row(id: u64, name: &str, age: &str) -> JsonValue {
    json!({
        "id": id,
        "order": format!("{}.00000", id),
        "Name": name,
        "Age": age,
        "CV": null,
        "NDA Signed": false,
        "State": null,
        "UUID": "7b1df2e6-47c6-4f37-a6eb-23e95ba2e0e5",
    })
}

/// A server-shaped list page body.
pub fn page_body(count: u64, has_next: bool, results: Vec<JsonValue>) -> JsonValue {
    json!({
        "count": count,
        "next": if has_next { json!("https://grid.example.com/next") } else { JsonValue::Null },
        "previous": null,
        "results": results,
    })
}
