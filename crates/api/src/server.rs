use std::io::{Cursor, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tiny_http::{Header, Request, Response, Server};

use crate::config::{ConfigError, ServiceConfig};
use crate::service::{ApiRequest, ApiResponse, CatalogService};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),
}

/// Blocking HTTP listener with a fixed pool of worker threads.
pub struct CatalogServer {
    server: Arc<Server>,
    service: CatalogService,
    workers: usize,
    stopping: Arc<AtomicBool>,
}

/// Stops a running [`CatalogServer`] from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
    workers: usize,
    stopping: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::Release);
        for _ in 0..self.workers {
            self.server.unblock();
        }
    }
}

impl CatalogServer {
    pub fn bind(config: &ServiceConfig, service: CatalogService) -> Result<Self, ServerError> {
        config.validate()?;
        let addr = config.socket_addr()?;
        let server = Server::http(addr).map_err(|e| ServerError::Bind {
            addr,
            reason: e.to_string(),
        })?;
        Ok(Self {
            server: Arc::new(server),
            service,
            workers: config.workers,
            stopping: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Bound address; differs from the configured one when port 0 was asked for.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
            workers: self.workers,
            stopping: Arc::clone(&self.stopping),
        }
    }

    /// Serve until [`ShutdownHandle::shutdown`] is called.
    pub fn run(self) -> Result<(), ServerError> {
        tracing::info!(addr = ?self.local_addr(), workers = self.workers, "catalog service listening");
        let mut handles = Vec::with_capacity(self.workers);
        for index in 0..self.workers {
            let server = Arc::clone(&self.server);
            let service = self.service.clone();
            let stopping = Arc::clone(&self.stopping);
            let handle = thread::Builder::new()
                .name(format!("partcat-http-{index}"))
                .spawn(move || worker_loop(&server, &service, &stopping))?;
            handles.push(handle);
        }
        for (index, handle) in handles.into_iter().enumerate() {
            handle.join().map_err(|_| ServerError::WorkerPanicked(index))?;
        }
        tracing::info!("catalog service stopped");
        Ok(())
    }
}

fn worker_loop(server: &Server, service: &CatalogService, stopping: &AtomicBool) {
    loop {
        let request = match server.recv() {
            Ok(rq) => rq,
            Err(err) => {
                if stopping.load(Ordering::Acquire) {
                    break;
                }
                tracing::warn!(%err, "http recv error");
                continue;
            }
        };
        serve_one(request, service);
    }
}

fn serve_one(mut request: Request, service: &CatalogService) {
    let mut body = Vec::new();
    let response = match request.as_reader().read_to_end(&mut body) {
        Ok(_) => service.handle(&ApiRequest {
            method: request.method().as_str().to_owned(),
            target: request.url().to_owned(),
            body,
        }),
        Err(err) => ApiResponse::error(400, &format!("could not read request body: {err}")),
    };
    if let Err(err) = request.respond(to_http(response)) {
        tracing::warn!(%err, "failed to send response");
    }
}

fn to_http(response: ApiResponse) -> Response<Cursor<Vec<u8>>> {
    let mut http = Response::from_data(response.body).with_status_code(response.status);
    for (name, value) in &response.headers {
        match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => http.add_header(header),
            Err(()) => tracing::warn!(header = %name, "dropping invalid response header"),
        }
    }
    http
}
