//! In-process webhook endpoint for tests, served by axum on a loopback port.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub enum Reply {
    Fixed { status: u16, body: String },
    /// 200 with the request body sent straight back.
    Echo,
    /// Accept the request and never answer.
    Silent,
}

impl Reply {
    pub fn fixed(status: u16, body: &str) -> Self {
        Reply::Fixed {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

struct EndpointState {
    reply: Reply,
    captured: Mutex<Option<CapturedRequest>>,
}

pub struct MockEndpoint {
    addr: SocketAddr,
    state: Arc<EndpointState>,
}

impl MockEndpoint {
    pub async fn start(reply: Reply) -> Self {
        let state = Arc::new(EndpointState {
            reply,
            captured: Mutex::new(None),
        });
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock endpoint");
        let addr = listener.local_addr().expect("mock endpoint address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}/hook/secret-token", self.addr)
    }

    /// Last request the endpoint read in full.
    pub async fn received(&self) -> Option<CapturedRequest> {
        self.state.captured.lock().await.clone()
    }
}

async fn handle(
    State(state): State<Arc<EndpointState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    *state.captured.lock().await = Some(CapturedRequest {
        method,
        headers,
        body: body.clone(),
    });

    match &state.reply {
        Reply::Fixed { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body.clone()).into_response()
        }
        Reply::Echo => (StatusCode::OK, body).into_response(),
        Reply::Silent => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

/// A URL on a port nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway address");
    drop(listener);
    format!("http://{}/hook", addr)
}
