//! Test doubles for the service and the user-facing capabilities.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::{classify, Backend};
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Complaint, ComplaintStatus, Credentials, LoginResponse, NewComplaint, Registration,
};
use crate::page::Page;
use crate::session::MemorySessionStore;
use crate::ui::{Capabilities, Navigator, Notice, Notifier};

type Responder = Box<dyn Fn() -> ClientResult<serde_json::Value> + Send + Sync>;

/// Backend returning canned replies and recording every call.
#[derive(Default)]
pub struct MockBackend {
    calls: Mutex<Vec<String>>,
    responders: Mutex<HashMap<&'static str, Responder>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(
        self,
        op: &'static str,
        responder: impl Fn() -> ClientResult<serde_json::Value> + Send + Sync + 'static,
    ) -> Self {
        self.responders
            .lock()
            .unwrap()
            .insert(op, Box::new(responder));
        self
    }

    pub fn ok(self, op: &'static str, value: serde_json::Value) -> Self {
        self.respond(op, move || Ok(value.clone()))
    }

    /// Reply with an HTTP error carrying `{"msg": msg}`.
    pub fn fail(self, op: &'static str, status: u16, msg: &str) -> Self {
        let body = serde_json::json!({ "msg": msg }).to_string();
        self.respond(op, move || classify(status, &body, "request failed"))
    }

    pub fn unreachable(self, op: &'static str) -> Self {
        self.respond(op, || {
            Err(ClientError::Transport("connection refused".to_string()))
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(':').next() == Some(op))
            .count()
    }

    fn reply<T: DeserializeOwned>(&self, op: &'static str, record: String) -> ClientResult<T> {
        self.calls.lock().unwrap().push(record);
        let value = match self.responders.lock().unwrap().get(op) {
            Some(responder) => responder()?,
            None if op == "all_complaints" || op == "complaints_for_user" => {
                serde_json::json!([])
            }
            None => serde_json::json!({}),
        };
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn register(&self, registration: &Registration) -> ClientResult<serde_json::Value> {
        self.reply("register", format!("register:{}", registration.email))
    }

    async fn login(&self, credentials: &Credentials) -> ClientResult<LoginResponse> {
        self.reply("login", format!("login:{}", credentials.email))
    }

    async fn create_complaint(
        &self,
        token: &str,
        complaint: &NewComplaint,
    ) -> ClientResult<serde_json::Value> {
        self.reply(
            "create_complaint",
            format!("create_complaint:{}:{}", token, complaint.title),
        )
    }

    async fn complaints_for_user(
        &self,
        token: &str,
        user_id: &str,
    ) -> ClientResult<Vec<Complaint>> {
        self.reply(
            "complaints_for_user",
            format!("complaints_for_user:{}:{}", token, user_id),
        )
    }

    async fn all_complaints(&self, token: &str) -> ClientResult<Vec<Complaint>> {
        self.reply("all_complaints", format!("all_complaints:{}", token))
    }

    async fn update_status(
        &self,
        token: &str,
        complaint_id: &str,
        status: ComplaintStatus,
    ) -> ClientResult<()> {
        self.reply::<serde_json::Value>(
            "update_status",
            format!("update_status:{}:{}:{}", token, complaint_id, status),
        )
        .map(|_| ())
    }
}

/// Notifier that records notices and answers confirmations with a preset.
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
    prompts: Mutex<Vec<String>>,
    answer: bool,
}

impl RecordingNotifier {
    pub fn answering(answer: bool) -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            answer,
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.text.clone())
            .collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pages: Mutex<Vec<Page>>,
}

impl RecordingNavigator {
    pub fn pages(&self) -> Vec<Page> {
        self.pages.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Page> {
        self.pages.lock().unwrap().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, page: Page) {
        self.pages.lock().unwrap().push(page);
    }
}

/// Capabilities over an empty memory store, a confirming notifier and a
/// recording navigator.
pub fn fake_capabilities() -> (Capabilities, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    fake_capabilities_answering(true)
}

pub fn fake_capabilities_answering(
    answer: bool,
) -> (Capabilities, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    let notifier = Arc::new(RecordingNotifier::answering(answer));
    let navigator = Arc::new(RecordingNavigator::default());
    let caps = Capabilities::new(
        Arc::new(MemorySessionStore::new()),
        notifier.clone(),
        navigator.clone(),
    );
    (caps, notifier, navigator)
}

/// Complaint JSON as the service sends it.
pub fn complaint_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "title": format!("Complaint {}", id),
        "category": "Water",
        "location": "Ward 3",
        "status": status,
        "createdAt": "2024-03-12T09:30:00Z"
    })
}
