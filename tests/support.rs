#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fenixedu::request::HttpRequest;
use fenixedu::{
    ApplicationConfig, ClientResponse, FenixEduClient, Locale, Transport, TransportError,
};

/// In-memory transport that records requests and replays queued responses.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<ClientResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and body.
    pub fn respond(self, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ClientResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn fail(self, message: &str) -> Self {
        self.responses.lock().unwrap().push_back(Err(message.to_owned()));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: HttpRequest) -> Result<ClientResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(message)),
            None => Err(TransportError::new("no response queued")),
        }
    }
}

pub fn config() -> ApplicationConfig {
    config_for("https://fenix.example")
}

pub fn config_for(base_url: &str) -> ApplicationConfig {
    ApplicationConfig::new("client-id", "client-secret", "https://app.example/callback", base_url)
        .expect("valid configuration")
        .with_locale(Locale::new("en", "US"))
}

/// A client over `transport`, plus a handle to inspect what it sent.
pub fn client(
    transport: RecordingTransport,
) -> (FenixEduClient<RecordingTransport>, Arc<RecordingTransport>) {
    let transport = Arc::new(transport);
    let client = FenixEduClient::with_shared_transport(config(), Arc::clone(&transport));
    (client, transport)
}

/// Every header value and the body of `request`, as text.
pub fn sent_text(request: &HttpRequest) -> String {
    let mut text = request.url().to_string();
    for value in request.headers.values() {
        text.push_str(&String::from_utf8_lossy(value.as_bytes()));
    }
    if let Some(body) = &request.body {
        text.push_str(&String::from_utf8_lossy(body));
    }
    text
}
