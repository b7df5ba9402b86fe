//! # Connection Handler

use log::{trace, warn};
use tokio::net::TcpStream;

use crate::cmd;
use crate::errors::{ConnectionError, RespError};
use crate::resp::{Reader, Value, Writer};
use crate::storage::Storage;
use crate::types::ConcurrentStorageType;

/// Handles every successive request from one client connection.
///
/// A single request is one top-level RESP3 `Array`, but a client may send
/// several back to back without waiting for a reply, a pattern Redis calls
/// [pipelining](https://redis.io/docs/latest/develop/reference/protocol-spec/#multiple-commands-and-pipelining).
/// The `Reader` here has no notion of "one request" beyond "one top-level
/// value", so simply looping `read_value` until the peer closes the socket
/// is all pipelining needs.
pub async fn handle_connection<S: Storage>(
    storage: ConcurrentStorageType<S>,
    stream: TcpStream,
) -> Result<(), ConnectionError> {
    let peer_addr = stream.peer_addr()?;
    trace!("start handling requests from {peer_addr}");

    let (read_half, write_half) = stream.into_split();
    let mut reader = Reader::new(read_half);
    let mut writer = Writer::new(write_half);

    loop {
        let outcome = match reader.read_value().await {
            Ok(outcome) => outcome,
            Err(RespError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => {
                warn!("{peer_addr}: {err}");
                return Err(err.into());
            }
        };

        let command = match outcome.into_value() {
            Ok(value) => value,
            Err(err) => {
                writer
                    .write_value(&Value::simple_error(format!("ERR {err}")))
                    .await?;
                continue;
            }
        };

        let reply = match cmd::dispatch(&command, &storage, peer_addr).await {
            Ok(value) => value,
            Err(err) => Value::simple_error(format!("ERR {err}")),
        };
        writer.write_value(&reply).await?;
    }

    trace!("stop handling requests from {peer_addr}");
    Ok(())
}
