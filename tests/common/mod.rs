#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use receipt_client::backend::{
    CredentialStore, Credentials, HttpRequest, HttpResponse, MemoryCredentialStore, Method,
    SessionClient, Transport,
};
use receipt_client::error::TransportError;

pub const BASE: &str = "http://api.test";

type Scripted = Result<HttpResponse, TransportError>;

/// Transport that replays scripted responses per (method, url) and records
/// every request. Unscripted requests get a 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(String, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: Method, url: &str, response: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method.to_string(), url.to_string()))
            .or_default()
            .push_back(response);
    }

    pub fn respond_json(&self, method: Method, url: &str, status: u16, body: serde_json::Value) {
        self.respond(
            method,
            url,
            Ok(HttpResponse::new(status).with_body(body.to_string())),
        );
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method.to_string(), request.url.clone());
        self.requests.lock().unwrap().push(request);

        self.routes
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(HttpResponse::new(404)))
    }
}

pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

pub fn logged_in() -> Arc<MemoryCredentialStore> {
    Arc::new(MemoryCredentialStore::with(Credentials {
        access: Some("access-1".to_string()),
        refresh: Some("refresh-1".to_string()),
    }))
}

pub fn client(
    transport: &Arc<FakeTransport>,
    credentials: &Arc<MemoryCredentialStore>,
) -> Arc<SessionClient> {
    let transport: Arc<dyn Transport> = transport.clone();
    let credentials: Arc<dyn CredentialStore> = credentials.clone();
    Arc::new(SessionClient::new(BASE, transport, credentials))
}
