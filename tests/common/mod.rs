//! Shared helpers for the push listener integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, Response},
    Router,
};
use push_listener::{create_router, Console};
use serde_json::Value;
use tower::ServiceExt;

/// Writer whose contents can be inspected after the console wrote to it.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).expect("console output should be UTF-8")
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that always fails, standing in for a closed stdout.
pub struct ClosedStdout;

impl Write for ClosedStdout {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "stdout closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Router whose requests appear to come from `peer`.
pub fn router_from(peer: SocketAddr, console: Console) -> Router {
    create_router(console).layer(MockConnectInfo(peer))
}

/// Router with a fresh console buffer, requests coming from 203.0.113.5.
pub fn test_router() -> (Router, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let router = router_from(
        SocketAddr::from(([203, 0, 113, 5], 50123)),
        Console::with_writer(buffer.clone()),
    );
    (router, buffer)
}

pub fn post_push(content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/receive_push");
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(router: Router, request: Request<Body>) -> Response<Body> {
    router.oneshot(request).await.expect("failed to make request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body_bytes).expect("response should be valid JSON")
}
