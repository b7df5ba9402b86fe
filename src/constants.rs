//! # Constants
//!
//! Constants and types used throughout the application

/// Local host IPv4 address, used by the smoke-test server when no bind address is given.
pub const LOCAL_HOST: &str = "127.0.0.1";

/// Default port for the smoke-test server.
pub const DEFAULT_PORT: u16 = 6379;

/// Size of the per-connection read buffer backing the [`tokio::io::BufReader`]
/// the codec's [`crate::resp::Reader`] wraps. Mirrors the 32 KiB default the
/// upstream RESP3 reader uses for its `bufio.Reader`.
pub const READER_BUFFER_LEN: usize = 32 * 1024;

/// Maximum number of connections the server accepts concurrently.
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

/// How long a new connection waits for a semaphore permit before giving up.
pub const CONNECTION_PERMIT_TIMEOUT_MS: u64 = 5_000;

/// How often the eviction loop wakes up to purge expired keys, in milliseconds.
pub const HZ_MS: u64 = 100;

/// The five-byte prefix that marks a RESP3 streamed string. The reader detects
/// this by exact byte comparison rather than by generic length parsing.
pub const STREAM_MARKER_PREFIX: &[u8; 5] = b"$EOF:";

/// Total length, in bytes, of a streamed-string marker line as returned by
/// `read_line` (`$EOF:` + 40 marker bytes + CRLF).
pub const STREAM_MARKER_LINE_LEN: usize = 47;

/// Length of the opaque boundary marker carried by a streamed-string frame.
pub const STREAM_MARKER_LEN: usize = 40;

pub const CRLF: &[u8; 2] = b"\r\n";

/// Application exit codes
#[derive(Debug)]
pub enum ExitCode {
    Ok = 0,
    Shutdown = -1,
}
