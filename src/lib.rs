//! # RESP3 Codec
//!
//! A codec for the RESP3 wire protocol ([`resp`]) plus a small smoke-test
//! server shell ([`server`], [`conn`], [`cmd`], [`storage`], [`expiry`],
//! [`cache`]) that exercises it over a real socket.

pub mod cache;
pub mod cli;
pub mod cmd;
pub mod conn;
pub mod constants;
pub mod errors;
pub mod expiry;
#[macro_use]
pub mod macros;
pub mod resp;
pub mod server;
pub mod storage;
pub mod types;
