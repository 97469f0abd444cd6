//! Mock transport for testing without a network
//!
//! Every request is captured for assertion. Responses are served from a
//! queue, falling back to a default response once the queue is empty.
//! Supports error injection and delay simulation.

use async_trait::async_trait;
use buckybox_transport::{HttpRequest, HttpResponse, Transport, TransportError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A mock transport for testing the client in isolation
#[derive(Clone)]
pub struct MockTransport {
    /// Requests sent through the transport (for assertion)
    requests: Arc<Mutex<Vec<HttpRequest>>>,

    /// Queued responses, served first in first out
    queued: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,

    /// Served when the queue is empty
    fallback: Arc<Mutex<HttpResponse>>,

    /// Number of `send_http` calls
    calls: Arc<AtomicUsize>,

    /// Delay to simulate network time
    delay: Option<Duration>,
}

impl MockTransport {
    /// Transport answering `200 {}` until told otherwise
    pub fn new() -> Self {
        Self::responding(200, "{}")
    }

    /// Transport answering every call with `status` and `body`
    pub fn responding(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            fallback: Arc::new(Mutex::new(HttpResponse::with_body(status, body))),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: None,
        }
    }

    /// Wait `delay` before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `status` and `body` on the next unanswered call
    pub fn queue_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::with_body(status, body)));
    }

    /// Fail the next unanswered call with `error`
    pub fn queue_error(&self, error: TransportError) {
        self.queued.lock().unwrap().push_back(Err(error));
    }

    /// Replace the response served once the queue is empty
    pub fn set_fallback(&self, status: u16, body: impl Into<Vec<u8>>) {
        *self.fallback.lock().unwrap() = HttpResponse::with_body(status, body);
    }

    /// Number of calls that reached the transport
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every captured request, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request
    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.queued.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => Ok(self.fallback.lock().unwrap().clone()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
