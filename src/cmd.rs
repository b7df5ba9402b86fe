//! # Command Dispatch
//!
//! [Commands](https://redis.io/docs/latest/commands/)
//!
//! The restricted client-to-server surface of RESP3 is an `Array` of
//! `BlobString`s: the command name followed by its arguments. This module
//! pulls that array apart and runs just enough of a command set to drive
//! every RESP3 value kind end to end over a real socket - it is a smoke
//! test for the codec, not a Redis reimplementation.
//!
//! [Redis serialization protocol specification](https://redis.io/docs/latest/develop/reference/protocol-spec/)

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use crate::errors::CmdError;
use crate::resp::{Value, ValueKind};
use crate::storage::Storage;
use crate::types::ConcurrentStorageType;

/// Pulls the command words out of a value that must be an `Array` of
/// `BlobString`s, per the client-to-server surface of RESP3.
fn command_words(value: &Value) -> Result<Vec<Bytes>, CmdError> {
    let elems = match &value.kind {
        ValueKind::Array(elems) => elems,
        _ => return Err(CmdError::CmdNotArray),
    };
    if elems.is_empty() {
        return Err(CmdError::EmptyArray);
    }
    elems
        .iter()
        .map(|v| match &v.kind {
            ValueKind::BlobString(b) => Ok(b.clone()),
            _ => Err(CmdError::NotAllBulk),
        })
        .collect()
}

/// Dispatches one parsed client command against the storage backend,
/// producing the RESP3 reply value.
pub async fn dispatch<S: Storage>(
    value: &Value,
    storage: &ConcurrentStorageType<S>,
    peer: SocketAddr,
) -> Result<Value, CmdError> {
    let words = command_words(value)?;
    let name = words[0].to_ascii_uppercase();

    match name.as_slice() {
        b"PING" => Ok(ping(&words)),
        b"ECHO" => echo(&words),
        b"HELLO" => hello(&words),
        b"SET" => set(&words, storage).await,
        b"GET" => get(&words, storage).await,
        b"DEL" => del(&words, storage).await,
        b"CLIENT" => client(&words, peer),
        other => Err(CmdError::UnrecognizedCmd(
            String::from_utf8_lossy(other).into_owned(),
        )),
    }
}

/// `PING [message]` -> `+PONG` or the message echoed back as a blob string.
///
/// [PING](https://redis.io/docs/latest/commands/ping/)
fn ping(words: &[Bytes]) -> Value {
    match words.get(1) {
        None => Value::simple_string("PONG"),
        Some(message) => Value::blob_string(message.clone()),
    }
}

/// `ECHO message` -> the message, as a blob string.
///
/// [ECHO](https://redis.io/docs/latest/commands/echo/)
fn echo(words: &[Bytes]) -> Result<Value, CmdError> {
    let message = words.get(1).ok_or(CmdError::MissingArg)?;
    Ok(Value::blob_string(message.clone()))
}

/// `HELLO [protover]` -> a `Map` describing the connection, the way real
/// Redis answers a protocol handshake. Only protocol version 3 is
/// acknowledged; anything else is a wrong-argument error, since this codec
/// has no RESP2 fallback to negotiate down to.
///
/// [HELLO](https://redis.io/docs/latest/commands/hello/)
fn hello(words: &[Bytes]) -> Result<Value, CmdError> {
    if let Some(proto) = words.get(1) {
        if proto.as_ref() != b"3" {
            return Err(CmdError::WrongArg(
                "only RESP3 (HELLO 3) is supported".to_string(),
            ));
        }
    }
    Ok(Value::map(vec![
        (Value::simple_string("server"), Value::simple_string("redis")),
        (Value::simple_string("version"), Value::simple_string("7.0.0")),
        (Value::simple_string("proto"), Value::number(3)),
        (Value::simple_string("id"), Value::number(1)),
        (Value::simple_string("mode"), Value::simple_string("standalone")),
        (Value::simple_string("role"), Value::simple_string("master")),
        (Value::simple_string("modules"), Value::array(vec![])),
    ]))
}

/// `SET key value [EX seconds | PX milliseconds]` -> `+OK`.
///
/// [SET](https://redis.io/docs/latest/commands/set/)
async fn set<S: Storage>(
    words: &[Bytes],
    storage: &ConcurrentStorageType<S>,
) -> Result<Value, CmdError> {
    let key = words.get(1).ok_or(CmdError::MissingArg)?.clone();
    let value = words.get(2).ok_or(CmdError::MissingArg)?.clone();
    let expires_at = parse_expiry(words)?;

    let mut guard = storage.write().await;
    guard.create(key.clone(), value);
    guard.set_expiry(&key, expires_at);
    Ok(Value::simple_string("OK"))
}

/// Parses an optional `EX seconds` or `PX milliseconds` trailer into an
/// absolute expiration timestamp in milliseconds since the Unix epoch.
fn parse_expiry(words: &[Bytes]) -> Result<Option<u128>, CmdError> {
    let Some(opt) = words.get(3) else {
        return Ok(None);
    };
    let amount = words.get(4).ok_or(CmdError::MissingArg).and_then(parse_u64)?;

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CmdError::WrongArg(e.to_string()))?
        .as_millis();

    match opt.to_ascii_uppercase().as_slice() {
        b"EX" => Ok(Some(now_ms + u128::from(amount) * 1000)),
        b"PX" => Ok(Some(now_ms + u128::from(amount))),
        other => Err(CmdError::WrongArg(format!(
            "unsupported SET option {:?}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn parse_u64(b: &Bytes) -> Result<u64, CmdError> {
    std::str::from_utf8(b)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CmdError::WrongArg("expected an unsigned integer".to_string()))
}

/// `GET key` -> the stored blob string, or `Null` if absent.
///
/// [GET](https://redis.io/docs/latest/commands/get/)
async fn get<S: Storage>(
    words: &[Bytes],
    storage: &ConcurrentStorageType<S>,
) -> Result<Value, CmdError> {
    let key = words.get(1).ok_or(CmdError::MissingArg)?;
    let guard = storage.read().await;
    Ok(match guard.read(key) {
        Some(value) => Value::blob_string(value),
        None => Value::null(),
    })
}

/// `DEL key [key ...]` -> the number of keys removed.
///
/// [DEL](https://redis.io/docs/latest/commands/del/)
async fn del<S: Storage>(
    words: &[Bytes],
    storage: &ConcurrentStorageType<S>,
) -> Result<Value, CmdError> {
    if words.len() < 2 {
        return Err(CmdError::MissingArg);
    }
    let mut guard = storage.write().await;
    let removed = words[1..]
        .iter()
        .filter(|key| guard.delete(key).is_some())
        .count();
    Ok(Value::number(removed as i64))
}

/// `CLIENT INFO` -> a simple string describing this connection, decorated
/// with an attribute map carrying the structured fields - this is the
/// command that exercises the attribute-attachment path over a real socket.
///
/// [CLIENT INFO](https://redis.io/docs/latest/commands/client-info/)
fn client(words: &[Bytes], peer: SocketAddr) -> Result<Value, CmdError> {
    let sub = words.get(1).ok_or(CmdError::MissingArg)?;
    if !sub.eq_ignore_ascii_case(b"INFO") {
        return Err(CmdError::WrongArg(format!(
            "unsupported CLIENT subcommand {:?}",
            String::from_utf8_lossy(sub)
        )));
    }
    let info = format!("addr={peer} resp=3");
    let attrs = vec![
        (Value::simple_string("addr"), Value::simple_string(peer.to_string())),
        (Value::simple_string("resp"), Value::number(3)),
    ];
    Ok(Value::simple_string(info).with_attrs(attrs))
}
