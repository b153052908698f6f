#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use p7run_exec::lifecycle::{Event, EventSink};
use p7run_exec::secrets::SecretValue;
use p7run_exec::transport::{
    FormField, HttpClient, HttpError, HttpRequestParts, HttpResponseParts, RequestBody,
};
use p7run_exec::{ApiClient, ClientConfig};
use serde_json::{json, Value};

pub const BASE: &str = "http://p7.test/";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub json: Option<Value>,
    pub form: Vec<FormField>,
}

impl Recorded {
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// In-memory stand-in for the REST API with a single workflow `wf1` and run `/runs/1/`.
pub struct FakeApi {
    inner: Mutex<FakeState>,
}

struct FakeState {
    before_start: VecDeque<&'static str>,
    after_start: VecDeque<&'static str>,
    started: bool,
    parameters: Value,
    results: Value,
    failing_uploads: Vec<String>,
    reads_after_terminal: usize,
    terminal_seen: bool,
    log: Vec<Recorded>,
}

impl FakeApi {
    /// `before_start` and `after_start` are the states returned by successive reads of
    /// the run; the last one repeats.
    pub fn new(before_start: &[&'static str], after_start: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(FakeState {
                before_start: before_start.iter().copied().collect(),
                after_start: after_start.iter().copied().collect(),
                started: false,
                parameters: default_parameters(),
                results: default_results(),
                failing_uploads: Vec::new(),
                reads_after_terminal: 0,
                terminal_seen: false,
                log: Vec::new(),
            }),
        })
    }

    pub fn with_parameters(self: Arc<Self>, parameters: Value) -> Arc<Self> {
        self.inner.lock().unwrap().parameters = parameters;
        self
    }

    pub fn with_results(self: Arc<Self>, results: Value) -> Arc<Self> {
        self.inner.lock().unwrap().results = results;
        self
    }

    /// Uploads whose `destination`/`directory` field equals `field` get a 500.
    pub fn fail_upload(self: Arc<Self>, field: &str) -> Arc<Self> {
        self.inner.lock().unwrap().failing_uploads.push(field.to_string());
        self
    }

    pub fn log(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().log.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.log().iter().map(Recorded::line).collect()
    }

    /// Reads of the run document after the first terminal state was served.
    pub fn reads_after_terminal(&self) -> usize {
        self.inner.lock().unwrap().reads_after_terminal
    }

    pub fn client(self: &Arc<Self>) -> ApiClient {
        let mut cfg = ClientConfig::new(url::Url::parse(BASE).unwrap());
        cfg.request_timeout = Duration::from_secs(5);
        ApiClient::new(self.clone(), cfg, SecretValue::from_string("t0ken".to_string())).unwrap()
    }
}

fn next_state(queue: &mut VecDeque<&'static str>) -> &'static str {
    if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue.front().copied().unwrap_or("CONFIGURATION")
    }
}

fn respond(status: u16, body: Value) -> HttpResponseParts {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "application/json".to_string());
    HttpResponseParts {
        status,
        headers,
        body: serde_json::to_vec(&body).unwrap(),
    }
}

#[async_trait]
impl HttpClient for FakeApi {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        let mut st = self.inner.lock().unwrap();
        let (json_body, form) = match &req.body {
            RequestBody::Empty => (None, Vec::new()),
            RequestBody::Json(bytes) => (serde_json::from_slice(bytes).ok(), Vec::new()),
            RequestBody::Form(fields) => (None, fields.clone()),
        };
        st.log.push(Recorded {
            method: req.method.clone(),
            path: req.url.path().to_string(),
            query: req.url.query().map(str::to_string),
            headers: req.headers.clone(),
            json: json_body.clone(),
            form: form.clone(),
        });

        let resp = match (req.method.as_str(), req.url.path()) {
            ("GET", "/pseven/.rest/v1/workflows/") => respond(
                200,
                json!([
                    {"id": "other", "url": "/pseven/.rest/v1/workflows/other/"},
                    {"id": "wf1", "url": "/pseven/.rest/v1/workflows/wf1/"}
                ]),
            ),
            ("POST", "/pseven/.rest/v1/workflows/wf1/runs/") => {
                respond(201, json!({"url": "http://p7.test/runs/1/", "id": 1}))
            }
            ("GET", "/runs/1/") => {
                let state = if st.started {
                    next_state(&mut st.after_start)
                } else {
                    next_state(&mut st.before_start)
                };
                let terminal = matches!(state, "FINISHED" | "FAILED" | "INTERRUPTED");
                if terminal && st.terminal_seen {
                    st.reads_after_terminal += 1;
                }
                st.terminal_seen |= terminal;
                let results = if terminal { st.results.clone() } else { Value::Null };
                respond(
                    200,
                    json!({
                        "url": "http://p7.test/runs/1/",
                        "name": "#1",
                        "state": state,
                        "parameters": st.parameters,
                        "results": results
                    }),
                )
            }
            ("PATCH", "/runs/1/") => {
                if let Some(doc) = json_body {
                    st.parameters = doc["parameters"].clone();
                }
                respond(200, json!({}))
            }
            ("POST", "/runs/1/upload/") => {
                let target = form.iter().find_map(|f| match &f.value {
                    p7run_exec::transport::FormValue::Text(t)
                        if f.name == "destination" || f.name == "directory" =>
                    {
                        Some(t.clone())
                    }
                    _ => None,
                });
                if target.is_some_and(|t| st.failing_uploads.contains(&t)) {
                    respond(500, json!({"detail": "storage error"}))
                } else {
                    respond(200, json!({}))
                }
            }
            ("POST", "/runs/1/run/") => {
                st.started = true;
                respond(200, json!({}))
            }
            ("GET", "/runs/1/download/") => {
                let mut headers = BTreeMap::new();
                headers.insert("Content-Type".to_string(), "text/plain".to_string());
                HttpResponseParts {
                    status: 200,
                    headers,
                    body: b"report body\n".to_vec(),
                }
            }
            _ => respond(404, json!({"detail": "not found"})),
        };
        Ok(resp)
    }
}

pub fn default_parameters() -> Value {
    json!([
        {"name": "a", "schemas": [{"@type": "Real"}], "value": {"value": 3}},
        {"name": "c", "schemas": [{"@type": "List"}],
         "value": {"value": [{"value": 0}, {"value": 0}, {"value": 0}]}},
        {"name": "d", "schemas": [{"@type": "Dictionary"}],
         "value": {"value": [{"key": "", "value": {"value": 0}}, {"key": "", "value": {"value": 0}}]}}
    ])
}

pub fn default_results() -> Value {
    json!([
        {"name": "x", "value": {
            "properties": {"@schema": {"@type": "Dictionary"}},
            "value": [{"key": "p", "value": {"value": 1}}, {"key": "q", "value": {"value": 2}}]
        }},
        {"name": "y", "value": {
            "properties": {"@schema": {"@type": "Real"}},
            "value": 2.5
        }}
    ])
}

/// Records every lifecycle event in order.
#[derive(Default)]
pub struct RecordingSink(pub Mutex<Vec<Event>>);

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

/// Boxable handle onto a shared `RecordingSink`.
pub struct SharedSink(pub Arc<RecordingSink>);

#[async_trait]
impl EventSink for SharedSink {
    async fn emit(&self, event: Event) {
        self.0.emit(event).await;
    }
}

/// Scripted responses for transport-level tests; the last entry repeats.
pub struct ScriptedHttp {
    script: Mutex<VecDeque<Result<HttpResponseParts, HttpError>>>,
    pub calls: Mutex<usize>,
}

impl ScriptedHttp {
    pub fn new(script: Vec<Result<HttpResponseParts, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

pub fn status(code: u16, body: Value) -> Result<HttpResponseParts, HttpError> {
    Ok(respond(code, body))
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn send(
        &self,
        _req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        *self.calls.lock().unwrap() += 1;
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }
}
