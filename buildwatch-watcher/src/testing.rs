//! Test doubles shared by the watcher tests

use async_trait::async_trait;
use buildwatch_client::{ClientError, JsonFetcher, MasterClient};
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const MASTER_URL: &str = "http://master.test:8010";

/// Canned answer for one URL
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Json(JsonValue),
    Status(u16),
    Garbage,
}

/// In-memory buildbot master
#[derive(Debug, Default)]
pub struct FakeMaster {
    responses: Mutex<HashMap<String, FakeResponse>>,
    requests: Mutex<Vec<String>>,
}

impl FakeMaster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A client for [`MASTER_URL`] backed by this fake
    pub fn client(self: &Arc<Self>) -> MasterClient {
        MasterClient::with_fetcher(MASTER_URL, self.clone())
    }

    pub fn respond(&self, path: &str, response: FakeResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{}/json/{}", MASTER_URL, path), response);
    }

    pub fn set_builders(&self, names: &[&str]) {
        let builders: serde_json::Map<String, JsonValue> = names
            .iter()
            .map(|name| (name.to_string(), json!({ "state": "idle" })))
            .collect();
        self.respond("builders", FakeResponse::Json(JsonValue::Object(builders)));
    }

    pub fn set_latest(&self, builder: &str, number: i64) {
        self.respond(
            &format!("builders/{}/builds/-1", builder),
            FakeResponse::Json(json!({ "number": number })),
        );
    }

    pub fn set_build(&self, builder: &str, number: i64, detail: JsonValue) {
        self.respond(
            &format!("builders/{}/builds/{}", builder, number),
            FakeResponse::Json(detail),
        );
    }

    pub fn set_running(&self, builder: &str, number: i64) {
        self.set_build(builder, number, json!({ "number": number, "times": [100.0, null] }));
    }

    pub fn set_finished(&self, builder: &str, number: i64) {
        self.set_build(builder, number, json!({ "number": number, "times": [100.0, 200.0] }));
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl JsonFetcher for FakeMaster {
    async fn fetch_json(&self, url: &str) -> buildwatch_client::Result<JsonValue> {
        self.requests.lock().unwrap().push(url.to_string());

        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(FakeResponse::Json(value)) => Ok(value),
            Some(FakeResponse::Status(status)) => Err(ClientError::api_error(status, "")),
            Some(FakeResponse::Garbage) => {
                Err(ClientError::ParseError("expected value at line 1".to_string()))
            }
            None => Err(ClientError::api_error(404, "Not Found")),
        }
    }
}
