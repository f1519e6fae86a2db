//! Shared mock collaborators for the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use indexmap::IndexMap;

use datagrid_lib::Grid;
use datagrid_lib::action::Export;
use datagrid_lib::column::Column;
use datagrid_lib::http::{
    Authorizer, GridServices, HttpRequest, Response, Router, SessionStorage, SubRequestDispatcher,
};
use datagrid_lib::model::Row;
use datagrid_lib::source::VectorSource;

// =============================================================================
// Request
// =============================================================================

/// A request built field by field; defaults to a plain GET whose referer
/// matches the grid URL, so session state survives unless a test says
/// otherwise.
pub struct MockRequest {
    parameters: serde_json::Map<String, serde_json::Value>,
    attributes: HashMap<String, String>,
    headers: HashMap<String, String>,
    xhr: bool,
}

impl MockRequest {
    pub fn new() -> Self {
        let mut headers = HashMap::new();
        headers.insert("referer".to_string(), "http://example.com/grid".to_string());
        let mut attributes = HashMap::new();
        attributes.insert("_controller".to_string(), "App\\GridController::list".to_string());
        attributes.insert("_route".to_string(), "grid".to_string());
        Self {
            parameters: serde_json::Map::new(),
            attributes,
            headers,
            xhr: false,
        }
    }

    /// Stores the grid's query bucket under its hash key.
    pub fn with_bucket(mut self, hash: &str, bucket: serde_json::Value) -> Self {
        self.parameters.insert(hash.to_string(), bucket);
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn without_attribute(mut self, key: &str) -> Self {
        self.attributes.remove(key);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn xhr(mut self) -> Self {
        self.xhr = true;
        self
    }
}

impl HttpRequest for MockRequest {
    fn parameter(&self, key: &str) -> Option<serde_json::Value> {
        self.parameters.get(key).cloned()
    }

    fn attribute(&self, key: &str) -> Option<String> {
        self.attributes.get(key).cloned()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }

    fn is_xml_http_request(&self) -> bool {
        self.xhr
    }

    fn scheme(&self) -> String {
        "http".to_string()
    }

    fn http_host(&self) -> String {
        "example.com".to_string()
    }

    fn base_url(&self) -> String {
        String::new()
    }

    fn path_info(&self) -> String {
        "/grid".to_string()
    }
}

// =============================================================================
// Session, router, authorizer, dispatcher
// =============================================================================

#[derive(Default)]
pub struct MemorySession {
    values: Mutex<serde_json::Map<String, serde_json::Value>>,
}

impl MemorySession {
    pub fn seed(&self, key: &str, value: serde_json::Value) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }
}

impl SessionStorage for MemorySession {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: serde_json::Value) {
        self.values.lock().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

pub struct StubRouter;

impl Router for StubRouter {
    fn generate(&self, route: &str, _parameters: &IndexMap<String, String>) -> String {
        format!("/{route}")
    }
}

pub struct GrantAll;

impl Authorizer for GrantAll {
    fn is_granted(&self, _role: &str) -> bool {
        true
    }
}

pub struct DenyAll;

impl Authorizer for DenyAll {
    fn is_granted(&self, _role: &str) -> bool {
        false
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    pub calls: Mutex<Vec<(String, IndexMap<String, serde_json::Value>)>>,
}

impl SubRequestDispatcher for RecordingDispatcher {
    fn forward(
        &self,
        controller: &str,
        parameters: IndexMap<String, serde_json::Value>,
    ) -> Response {
        self.calls
            .lock()
            .unwrap()
            .push((controller.to_string(), parameters));
        Response::ok().body("forwarded")
    }
}

// =============================================================================
// Export
// =============================================================================

/// Counts the rows it is handed and answers with the count as its body.
pub struct CountingExport {
    title: String,
    rows_seen: Option<usize>,
}

impl CountingExport {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            rows_seen: None,
        }
    }
}

impl Export for CountingExport {
    fn title(&self) -> &str {
        &self.title
    }

    fn compute_data(&mut self, grid: &Grid) {
        self.rows_seen = Some(grid.rows().map(|rows| rows.len()).unwrap_or(0));
    }

    fn response(&self) -> Response {
        Response::ok()
            .content_type("text/csv")
            .body(self.rows_seen.unwrap_or(0).to_string())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn services(session: Arc<MemorySession>) -> GridServices {
    GridServices::new(Arc::new(StubRouter), Arc::new(GrantAll), session)
}

pub fn people_rows() -> Vec<Row> {
    vec![
        Row::new().set("id", 1i64).set("name", "Ada").set("age", 36i64),
        Row::new().set("id", 2i64).set("name", "Brian").set("age", 70i64),
        Row::new().set("id", 3i64).set("name", "Barbara").set("age", 61i64),
    ]
}

/// A ready grid over the people fixture, identified as `books` so its hash
/// is the stable `grid_books`.
pub fn people_grid(session: Arc<MemorySession>) -> Grid {
    let mut grid = Grid::new(services(session), "books");
    grid.add_column(Column::new("id", "Id").primary(true));
    grid.add_column(Column::new("name", "Name"));
    grid.add_column(Column::new("age", "Age"));
    grid.set_source(Box::new(VectorSource::new("people", people_rows())))
        .unwrap();
    grid
}

pub const HASH: &str = "grid_books";

pub fn bucket(entries: &[(&str, serde_json::Value)]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, value) in entries {
        map.insert(key.to_string(), value.clone());
    }
    serde_json::Value::Object(map)
}

pub fn request_with(entries: &[(&str, serde_json::Value)]) -> MockRequest {
    MockRequest::new().with_bucket(HASH, bucket(entries))
}

pub fn seeded_session(entries: &[(&str, serde_json::Value)]) -> Arc<MemorySession> {
    let session = Arc::new(MemorySession::default());
    session.seed(HASH, bucket(entries));
    session
}

pub fn empty_session() -> Arc<MemorySession> {
    Arc::new(MemorySession::default())
}
