//! HTTP server implementation

use crate::shutdown::ShutdownSignal;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use limpet_core::{full, Error, Request, Response, Result};
use limpet_files::FileServer;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// HTTP server wrapping a [`FileServer`]
#[derive(Debug)]
pub struct Server {
    listen: SocketAddr,
    files: FileServer,
    shutdown: ShutdownSignal,
}

impl Server {
    /// Create a server for `files` listening on `listen`
    pub fn new(listen: SocketAddr, files: FileServer) -> Self {
        Self {
            listen,
            files,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Listen address
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen
    }

    /// Shutdown signal, for wiring up a [`crate::SignalHandler`]
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run the accept loop until a shutdown signal arrives
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.listen).await.map_err(|e| {
            Error::Runtime(format!("failed to bind to {}: {e}", self.listen))
        })?;

        tracing::info!(
            listen = %self.listen,
            root = %self.files.config().root_dir.display(),
            route = %self.files.config().route_prefix,
            "server listening"
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::trace!(%addr, "accepted connection");
                            let files = self.files.clone();
                            tokio::spawn(async move {
                                let service = service_fn(move |req: Request<Incoming>| {
                                    let files = files.clone();
                                    async move {
                                        files.serve(req).await.or_else(|e| {
                                            tracing::error!(error = %e, "request failed");
                                            Response::builder()
                                                .status(e.to_status_code())
                                                .body(full(format!("error: {e}")))
                                        })
                                    }
                                });

                                let io = TokioIo::new(stream);
                                if let Err(e) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::error!(error = %e, "connection error");
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    tracing::info!("shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }
}
