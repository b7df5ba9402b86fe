//! The Smoke-Test Server
//!
//! A minimal Tokio TCP server that drives the RESP3 codec end to end: it
//! accepts connections behind a semaphore-bounded concurrency limit, hands
//! each socket to [`crate::conn::handle_connection`], and backs commands
//! with a pluggable [`Storage`] implementation.

use std::fmt::Debug;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use crate::cli::Args;
use crate::conn::handle_connection;
use crate::constants::{ExitCode, CONNECTION_PERMIT_TIMEOUT_MS};
use crate::errors::ServerError;
use crate::log_and_stderr;
use crate::storage::Storage;
use crate::types::ConcurrentStorageType;

/// The smoke-test server.
pub struct Server<S> {
    listener: TcpListener,
    max_conn: Arc<Semaphore>,
    storage: ConcurrentStorageType<S>,
}

impl<S: 'static + Storage + Debug> Server<S> {
    /// Creates an instance of the server, binding its listener immediately.
    pub async fn new(args: Args, storage: ConcurrentStorageType<S>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(format!("{}:{}", args.host, args.port)).await?;
        let addr = listener.local_addr()?;
        log_and_stderr!(info, "Listening on", addr);

        let max_conn = Arc::new(Semaphore::new(args.max_conn));

        Ok(Self {
            listener,
            max_conn,
            storage,
        })
    }

    /// Starts the server: installs the shutdown signal handler, then runs
    /// the accept loop until it returns (which only happens on a fatal
    /// listener error - the accept loop itself never terminates on its own).
    pub async fn start(&self) -> Result<(), ServerError> {
        Self::install_shutdown_handler();
        self.core_loop().await
    }

    /// Accepts connections and spawns one task per socket.
    ///
    /// Supports multiple concurrent clients in addition to multiple
    /// pipelined requests from the same connection.
    async fn core_loop(&self) -> Result<(), ServerError> {
        debug!("starting the core loop...");
        info!("waiting for requests...");

        loop {
            match self.acquire_socket_permit().await {
                Ok((socket, permit)) => {
                    let storage = Arc::clone(&self.storage);

                    // A new task is spawned for each inbound socket; it owns the
                    // socket and the permit for as long as the connection lives.
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(storage, socket).await {
                            log_and_stderr!(warn, "WARN:", e);
                        }
                        drop(permit);
                    });
                }
                Err(e) => {
                    log_and_stderr!(warn, "WARN:", e);
                }
            }
        }
    }

    /// Tries to acquire a permit for a connection socket.
    ///
    /// # Errors
    /// - [`ServerError::IoError`] if a new incoming connection could not be accepted
    /// - [`ServerError::ElapsedError`] if a permit could not be obtained in time
    /// - [`ServerError::AcquireError`] if the permit semaphore has been closed
    async fn acquire_socket_permit(&self) -> Result<(TcpStream, OwnedSemaphorePermit), ServerError> {
        let permit = timeout(
            Duration::from_millis(CONNECTION_PERMIT_TIMEOUT_MS),
            self.max_conn.clone().acquire_owned(),
        )
        .await
        .map_err(|e| ServerError::ElapsedError(format!("{e} ({CONNECTION_PERMIT_TIMEOUT_MS} ms)")))??;
        let (socket, _) = self.listener.accept().await?;
        Ok((socket, permit))
    }

    /// Spawns a single task that waits for Ctrl+C and exits the process.
    fn install_shutdown_handler() {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("CTRL+C received. Shutting down...");
                    exit(ExitCode::Ok as i32);
                }
                Err(err) => {
                    error!("unable to listen for the shutdown signal: {err}");
                    error!("terminating the app ({})...", ExitCode::Shutdown as i32);
                    exit(ExitCode::Shutdown as i32);
                }
            }
        });
    }
}
