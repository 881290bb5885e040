//! Mock connector for testing
//!
//! Replays canned responses and records every request it is asked to send,
//! so providers and the transport can be tested without network access.
//!
//! # Example
//!
//! ```ignore
//! use comlib_translate::http::{MockConnector, RequestOptions, Transport};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_request() {
//!     let mock = Arc::new(MockConnector::new().respond(200, r#"{"ok":true}"#));
//!     let transport = Transport::with_connector(mock.clone());
//!     transport.get("http://example.com/", RequestOptions::new()).await.unwrap();
//!     assert_eq!(mock.call_count(), 1);
//! }
//! ```

use crate::http::connector::{Connection, Connector, HttpResponse};
use crate::http::error::TransportError;
use crate::http::request::PreparedRequest;
use crate::http::url::UrlComponents;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// What the mock does with the next request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with the given status and body
    Respond { status: u16, body: String },
    /// Fail the exchange with a transport error
    Fail(TransportError),
}

/// A request the mock was asked to send
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: UrlComponents,
    pub request: PreparedRequest,
}

#[derive(Debug, Default)]
struct MockState {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
}

impl MockState {
    /// Replies are consumed in order; the last one repeats forever.
    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock().unwrap_or_else(PoisonError::into_inner);
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        reply.unwrap_or(MockReply::Respond {
            status: 200,
            body: String::new(),
        })
    }
}

/// Connector that records requests and replays queued replies.
///
/// With nothing queued every request gets an empty `200` response.
#[derive(Debug, Default)]
pub struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.push(MockReply::Respond {
            status,
            body: body.into(),
        })
    }

    /// Queue a transport failure
    pub fn fail(self, error: TransportError) -> Self {
        self.push(MockReply::Fail(error))
    }

    fn push(self, reply: MockReply) -> Self {
        self.state
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Number of connections opened so far
    pub fn call_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Number of connections closed so far
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &UrlComponents) -> Result<Box<dyn Connection>, TransportError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            state: self.state.clone(),
            url: url.clone(),
            open: true,
        }))
    }
}

struct MockConnection {
    state: Arc<MockState>,
    url: UrlComponents,
    open: bool,
}

#[async_trait]
impl Connection for MockConnection {
    async fn execute(&mut self, request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: self.url.clone(),
                request: request.clone(),
            });

        match self.state.next_reply() {
            MockReply::Respond { status, body } => Ok(HttpResponse { status, body }),
            MockReply::Fail(error) => Err(error),
        }
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
