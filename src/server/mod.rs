// Server module entry point
// Binds the listener and serves connections until a shutdown signal

pub mod connection;
pub mod handler;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::HostConfig;
use crate::logger;
use crate::pipeline::Pipeline;

pub use listener::create_listener;

/// State shared by every connection task
pub struct HostState {
    pub config: HostConfig,
    pub pipeline: Pipeline,
    pub active_connections: AtomicUsize,
}

impl HostState {
    pub const fn new(config: HostConfig, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline,
            active_connections: AtomicUsize::new(0),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("{0}")]
    Address(String),

    #[error("failed to bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Bind the configured address and serve until SIGINT/SIGTERM
pub async fn run(config: HostConfig, pipeline: Pipeline) -> Result<(), HostError> {
    let addr = config.get_socket_addr().map_err(HostError::Address)?;
    let listener = create_listener(addr).map_err(|source| HostError::Bind { addr, source })?;

    logger::log_server_start(&addr, &config);

    let state = Arc::new(HostState::new(config, pipeline));
    serve(listener, state, signal::shutdown_signal()).await;
    Ok(())
}

/// Accept connections on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<HostState>,
    shutdown: impl Future<Output = ()>,
) {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));
}
