//! # RESP3 Smoke-Test Server
//!
//! A small Tokio TCP server that drives the RESP3 codec in this crate
//! against real command traffic: PING/ECHO, a SET/GET key-value store, a
//! HELLO handshake, and CLIENT INFO. Not a Redis reimplementation - see
//! `crate::server` for scope.

use clap::Parser;
use log::info;
use std::sync::Arc;
use tokio::sync::RwLock;

use resp3_codec::cli::Args;
use resp3_codec::errors::ApplicationError;
use resp3_codec::expiry::eviction_loop;
use resp3_codec::server::Server;
use resp3_codec::storage::{InMemoryStorage, Storage};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    env_logger::init();
    info!("starting the server...");

    let args = Args::parse();
    let storage = Arc::new(RwLock::new(InMemoryStorage::new()));

    let evictor_store = Arc::clone(&storage);
    tokio::spawn(eviction_loop(evictor_store));

    let server = Server::new(args, storage).await?;
    server.start().await?;

    Ok(())
}
