//! # The Command-Line Arguments

use crate::constants::{DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, LOCAL_HOST};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "RESP3 smoke-test server")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind to
    #[arg(long, default_value = LOCAL_HOST)]
    pub host: String,

    /// The server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum number of concurrent connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_conn: usize,

    /// Increase log verbosity; may be repeated (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
