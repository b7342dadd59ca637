//! Shared test helpers: a scripted fake `fab` CLI, a recording pacer and
//! reporter, and reply constructors.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use fabric_deploy::application::ports::{ItemCatalog, Pacer, ProgressReporter, RestApi, SessionAuth};
use fabric_deploy::application::services::session::Session;
use fabric_deploy::domain::api::{ApiRequest, CliReply};
use fabric_deploy::domain::config::Pacing;
use fabric_deploy::domain::credentials::ServicePrincipal;
use serde_json::Value;

// ── Reply constructors ───────────────────────────────────────────────────────

/// Process exited 0 with `stdout`.
pub fn ok(stdout: &str) -> CliReply {
    CliReply {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Process exited with `code` and `stderr`.
pub fn exit(code: i32, stderr: &str) -> CliReply {
    CliReply {
        code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// `fab api` envelope with a JSON body.
pub fn api(status: u16, body: Value) -> CliReply {
    ok(&serde_json::json!({ "status_code": status, "text": body }).to_string())
}

/// Process exited 0 and printed nothing.
pub fn blank() -> CliReply {
    ok("")
}

// ── Fake Fabric CLI ──────────────────────────────────────────────────────────

/// Scripted `fab` double.
///
/// Every call is recorded as a one-line key such as `ls ws.Workspace`,
/// `get ws.Workspace -q id`, `create ws.Workspace -P capacityname=fc`, or
/// `api post workspaces/1/git/connect`. Replies are scripted per key
/// fragment; the first rule whose fragment occurs in the key answers. A
/// rule's replies are consumed in order and the last one repeats. Unscripted
/// calls exit 1 with no output.
#[derive(Default)]
pub struct FakeFabric {
    rules: Mutex<Vec<(String, VecDeque<CliReply>)>>,
    calls: Mutex<Vec<String>>,
    bodies: Mutex<Vec<(String, Option<Value>)>>,
}

impl FakeFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `replies` for calls whose key contains `fragment`.
    pub fn on(self, fragment: &str, replies: impl IntoIterator<Item = CliReply>) -> Self {
        self.rules
            .lock()
            .expect("lock")
            .push((fragment.to_string(), replies.into_iter().collect()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    /// Number of recorded calls whose key contains `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.calls().iter().filter(|c| c.contains(fragment)).count()
    }

    /// Body of the first `api` call whose key contains `fragment`.
    pub fn body_of(&self, fragment: &str) -> Option<Value> {
        self.bodies
            .lock()
            .expect("lock")
            .iter()
            .find(|(k, _)| k.contains(fragment))
            .and_then(|(_, b)| b.clone())
    }

    fn answer(&self, key: String) -> CliReply {
        self.calls.lock().expect("lock").push(key.clone());
        let mut rules = self.rules.lock().expect("lock");
        for (fragment, replies) in rules.iter_mut() {
            if key.contains(fragment.as_str()) && !replies.is_empty() {
                return if replies.len() > 1 {
                    replies.pop_front().unwrap_or_default()
                } else {
                    replies.front().cloned().unwrap_or_default()
                };
            }
        }
        exit(1, "")
    }
}

impl SessionAuth for FakeFabric {
    async fn login(&self, principal: &ServicePrincipal) -> Result<CliReply> {
        Ok(self.answer(format!("auth login -u {}", principal.client_id)))
    }
}

impl ItemCatalog for FakeFabric {
    async fn ls(&self, path: &str) -> Result<CliReply> {
        Ok(self.answer(format!("ls {path}")))
    }

    async fn get(&self, path: &str, query: &str) -> Result<CliReply> {
        Ok(self.answer(format!("get {path} -q {query}")))
    }

    async fn create(&self, path: &str, params: &[String]) -> Result<CliReply> {
        let params: Vec<String> = params.iter().map(|p| format!("-P {p}")).collect();
        Ok(self.answer(format!("create {path} {}", params.join(" "))))
    }
}

impl RestApi for FakeFabric {
    async fn call(&self, request: &ApiRequest) -> Result<CliReply> {
        let key = format!("api {} {}", request.method.as_str(), request.path);
        self.bodies
            .lock()
            .expect("lock")
            .push((key.clone(), request.body.clone()));
        Ok(self.answer(key))
    }
}

// ── Recording pacer / reporter ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Section,
    Step,
    Success,
    Warn,
    Error,
}

/// Records waits instead of sleeping, and every progress message.
#[derive(Default)]
pub struct Recorder {
    waits: Mutex<Vec<(String, Duration)>>,
    events: Mutex<Vec<(Level, String)>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, d)| *d)
            .collect()
    }

    pub fn messages(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .expect("lock")
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.events
            .lock()
            .expect("lock")
            .push((level, message.to_string()));
    }
}

impl Pacer for Recorder {
    async fn wait(&self, reason: &str, duration: Duration) {
        self.waits
            .lock()
            .expect("lock")
            .push((reason.to_string(), duration));
    }
}

impl ProgressReporter for Recorder {
    fn section(&self, title: &str) {
        self.push(Level::Section, title);
    }
    fn step(&self, message: &str) {
        self.push(Level::Step, message);
    }
    fn success(&self, message: &str) {
        self.push(Level::Success, message);
    }
    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }
    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}

/// Session over the fake with default pacing.
pub fn session<'a>(
    fake: &'a FakeFabric,
    recorder: &'a Recorder,
    pacing: &'a Pacing,
) -> Session<'a, FakeFabric, Recorder, Recorder> {
    Session {
        cli: fake,
        pacer: recorder,
        reporter: recorder,
        pacing,
    }
}

pub const WS_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
