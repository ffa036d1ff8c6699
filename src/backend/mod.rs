// src/backend/mod.rs
//! Labelled HTTP backends.
//!
//! On a provisioned server the backends are shell loops started over SSH
//! (see [`listener_command`]). [`LabelServer`] is the local equivalent: it
//! answers every request with one line naming the backend, rotating over its
//! labels when it has more than one.
mod rotation;

pub use rotation::RoundRobin;

use crate::error::{Result, ScenarioError};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Shell loop serving `label` on `port`, backgrounded so the SSH session can
/// return.
pub fn listener_command(label: &str, port: u16) -> String {
    format!(
        "while true; do echo -e 'HTTP/1.0 200 OK\\r\\n\\r\\n{}' | sudo nc -l -p {} ; done &",
        label, port
    )
}

/// One listener command per (label, port) pair.
pub fn listener_commands(labels: &[String], ports: &[u16]) -> Vec<String> {
    labels
        .iter()
        .zip(ports)
        .map(|(label, &port)| listener_command(label, port))
        .collect()
}

struct LabelState {
    labels: RoundRobin<String>,
    served: AtomicU64,
}

async fn handle(req: Request<Body>, state: Arc<LabelState>) -> Result<Response<Body>, Infallible> {
    let n = state.served.fetch_add(1, Ordering::SeqCst) + 1;
    let label = state.labels.next().cloned().unwrap_or_default();
    debug!("Request {} {} answered by {}", n, req.uri().path(), label);
    Ok(Response::new(Body::from(format!("{}\n", label))))
}

/// Running label server; shuts down on [`LabelServer::shutdown`] or drop.
pub struct LabelServer {
    addr: SocketAddr,
    state: Arc<LabelState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LabelServer {
    pub async fn bind(addr: SocketAddr, labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(ScenarioError::Config("label server needs at least one label".to_string()));
        }

        let state = Arc::new(LabelState {
            labels: RoundRobin::new(labels),
            served: AtomicU64::new(0),
        });

        let service_state = state.clone();
        let make_svc = make_service_fn(move |_conn| {
            let state = service_state.clone();
            async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, state.clone()))) }
        });

        let server = Server::try_bind(&addr)
            .map_err(|e| ScenarioError::Io(std::io::Error::new(std::io::ErrorKind::AddrInUse, e)))?
            .serve(make_svc);
        let addr = server.local_addr();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let graceful = server.with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });

        info!("Label server listening on http://{} ({} label(s))", addr, state.labels.len());
        let task = tokio::spawn(async move {
            if let Err(e) = graceful.await {
                error!("Label server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn served(&self) -> u64 {
        self.state.served.load(Ordering::SeqCst)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Serve until the task ends (for the CLI).
    pub async fn wait(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for LabelServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
