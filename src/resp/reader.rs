//! # RESP3 Reader
//!
//! An incremental, recursive-descent parser over any [`tokio::io::AsyncRead`].
//! `read_value` dispatches on the leading tag byte of a CRLF-terminated line:
//! attribute frames are peeled off and attached to the value that follows,
//! the reserved streamed-string marker is detected by exact byte pattern,
//! and aggregates recurse back through the same entry point so attributes
//! and nesting compose at any depth.

use std::future::Future;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use num_bigint::BigInt;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::constants::{
    READER_BUFFER_LEN, STREAM_MARKER_LEN, STREAM_MARKER_LINE_LEN, STREAM_MARKER_PREFIX,
};
use crate::errors::RespError;

use super::value::{Pairs, Tag, Value};

/// A boxed, pinned future. `read_value` recurses into itself (arrays contain
/// values, which may themselves be arrays), and `async fn` cannot recurse
/// directly since its generated state machine would have infinite size; this
/// alias is the standard escape hatch, heap-allocating one frame per nesting
/// level instead.
pub(super) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The result of one top-level [`Reader::read_value`] call: exactly one of a
/// parsed value or the streamed-string boundary marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Value(Value),
    /// The 40 marker bytes of a `$EOF:...` streamed-string frame. Streamed
    /// strings are not decoded further by this reader.
    StreamMarker([u8; STREAM_MARKER_LEN]),
}

impl ReadOutcome {
    pub fn into_value(self) -> Result<Value, RespError> {
        match self {
            ReadOutcome::Value(v) => Ok(v),
            ReadOutcome::StreamMarker(_) => {
                Err(RespError::syntax("expected a value, found a stream marker"))
            }
        }
    }
}

fn expect_value(outcome: ReadOutcome) -> Result<Value, RespError> {
    outcome
        .into_value()
        .map_err(|_| RespError::syntax("nested streamed strings are not supported"))
}

/// Incremental RESP3 reader over a buffered async byte source.
pub struct Reader<R> {
    inner: BufReader<R>,
}

impl<R: AsyncRead + Unpin + Send> Reader<R> {
    /// Wraps `inner` in a buffer sized like the upstream reader's 32 KiB
    /// default `bufio.Reader`.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(READER_BUFFER_LEN, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Reader {
            inner: BufReader::with_capacity(capacity, inner),
        }
    }

    /// Parses one RESP3 value (or signals a streamed-string marker) from the
    /// underlying source.
    pub async fn read_value(&mut self) -> Result<ReadOutcome, RespError> {
        self.read_value_boxed().await
    }

    /// Convenience for the common case where a stream marker would be a
    /// protocol violation for the caller's use case.
    pub async fn read_value_strict(&mut self) -> Result<Value, RespError> {
        self.read_value().await?.into_value()
    }

    fn read_value_boxed(&mut self) -> BoxFuture<'_, Result<ReadOutcome, RespError>> {
        Box::pin(async move {
            let mut line = self.read_line().await?;

            let mut attrs: Option<Pairs> = None;
            if line.first() == Some(&Tag::Attribute.as_u8()) {
                attrs = Some(self.read_pairs(&line).await?);
                line = self.read_line().await?;
            }

            if is_stream_marker(&line) {
                let mut marker = [0u8; STREAM_MARKER_LEN];
                marker.copy_from_slice(&line[5..5 + STREAM_MARKER_LEN]);
                return Ok(ReadOutcome::StreamMarker(marker));
            }

            if line.len() < 3 {
                return Err(RespError::syntax("value line shorter than tag + CRLF"));
            }

            let tag = Tag::try_from(line[0])
                .map_err(|b| RespError::syntax(format!("unsupported RESP3 type byte {b:#04x}")))?;

            let value = match tag {
                Tag::SimpleString => Value::simple_string(body(&line)),
                Tag::SimpleError => Value::simple_error(body(&line)),
                Tag::BlobString => Value::blob_string(self.read_blob(&line).await?),
                Tag::BlobError => Value::blob_error(self.read_blob(&line).await?),
                Tag::VerbatimString => {
                    let raw = self.read_blob(&line).await?;
                    if raw.len() < 4 {
                        return Err(RespError::syntax("verbatim string shorter than 4 bytes"));
                    }
                    let mut format = [0u8; 3];
                    format.copy_from_slice(&raw[..3]);
                    Value::verbatim_string(format, raw.slice(4..))
                }
                Tag::Number => Value::number(parse_number(&line)?),
                Tag::Double => Value::double(parse_double(&line)?),
                Tag::BigNumber => Value::big_number(parse_big_number(&line)?),
                Tag::Boolean => Value::boolean(parse_boolean(&line)?),
                Tag::Null => {
                    if line.len() != 3 {
                        return Err(RespError::syntax("Null frame must be exactly `_\\r\\n`"));
                    }
                    Value::null()
                }
                Tag::Array => Value::array(self.read_elements(&line).await?),
                Tag::Set => Value::set(self.read_elements(&line).await?),
                Tag::Push => Value::push(self.read_elements(&line).await?),
                Tag::Map => Value::map(self.read_pairs(&line).await?),
                Tag::Attribute => {
                    return Err(RespError::syntax("unexpected nested attribute frame"));
                }
            };

            Ok(ReadOutcome::Value(match attrs {
                Some(a) => value.with_attrs(a),
                None => value,
            }))
        })
    }

    pub(super) async fn read_line(&mut self) -> Result<Bytes, RespError> {
        let mut buf = Vec::new();
        let n = self.inner.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Err(RespError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed while reading a RESP3 line",
            )));
        }
        if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
            return Err(RespError::syntax("line is not terminated by CRLF"));
        }
        Ok(Bytes::from(buf))
    }

    pub(super) async fn read_exact_bytes(&mut self, n: usize) -> Result<Vec<u8>, RespError> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf).await?;
        Ok(buf)
    }

    async fn read_blob(&mut self, line: &Bytes) -> Result<Bytes, RespError> {
        let count = get_count(line)?;
        let mut buf = BytesMut::zeroed(count + 2);
        self.inner.read_exact(&mut buf).await?;
        buf.truncate(count);
        Ok(buf.freeze())
    }

    async fn read_elements(&mut self, line: &Bytes) -> Result<Vec<Value>, RespError> {
        let count = get_count(line)?;
        let mut elems = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let outcome = self.read_value_boxed().await?;
            elems.push(expect_value(outcome)?);
        }
        Ok(elems)
    }

    async fn read_pairs(&mut self, line: &Bytes) -> Result<Pairs, RespError> {
        let count = get_count(line)?;
        let mut pairs = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let key = expect_value(self.read_value_boxed().await?)?;
            let val = expect_value(self.read_value_boxed().await?)?;
            pairs.push((key, val));
        }
        Ok(pairs)
    }
}

impl Value {
    /// Parses a one-shot RESP3 value out of a complete in-memory string, the
    /// way a REPL or a unit test wants to. Spins up a tiny current-thread
    /// runtime since the reader itself is async all the way down.
    pub fn from_str(text: &str) -> Result<Value, RespError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(RespError::Io)?;
        runtime.block_on(async {
            let mut reader = Reader::new(std::io::Cursor::new(text.as_bytes().to_vec()));
            reader.read_value_strict().await
        })
    }
}

pub(super) fn is_stream_marker(line: &[u8]) -> bool {
    line.len() == STREAM_MARKER_LINE_LEN && line.starts_with(STREAM_MARKER_PREFIX)
}

/// The textual payload of a line: everything between the tag byte and the
/// trailing CRLF.
fn body(line: &Bytes) -> Bytes {
    line.slice(1..line.len() - 2)
}

fn body_str(line: &Bytes) -> Result<&str, RespError> {
    std::str::from_utf8(&line[1..line.len() - 2])
        .map_err(|_| RespError::syntax("payload is not valid UTF-8"))
}

/// Parses the decimal count between `line[1]` and the first CR. Shared by
/// blob lengths and aggregate/attribute/map element counts. RESP3 has no
/// RESP2 "null" legacy, so a negative count is always a syntax violation.
pub(super) fn get_count(line: &Bytes) -> Result<usize, RespError> {
    let end = memchr::memchr(b'\r', line)
        .ok_or_else(|| RespError::syntax("missing CR in count line"))?;
    let text = std::str::from_utf8(&line[1..end])
        .map_err(|_| RespError::syntax("count is not valid UTF-8"))?;
    let n: i64 = text
        .parse()
        .map_err(|_| RespError::syntax(format!("could not parse {text:?} as a count")))?;
    if n < 0 {
        return Err(RespError::syntax("negative lengths are not supported in RESP3"));
    }
    Ok(n as usize)
}

fn parse_number(line: &Bytes) -> Result<i64, RespError> {
    let text = body_str(line)?;
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    unsigned
        .parse()
        .map_err(|_| RespError::syntax(format!("invalid integer {text:?}")))
}

/// Parses the wire text of a Double. `"inf"`/`"-inf"` decode to true IEEE
/// infinities; anything else that parses to NaN is rejected rather than
/// silently aliased to infinity (see the Double/NaN design note).
fn parse_double(line: &Bytes) -> Result<f64, RespError> {
    let text = body_str(line)?;
    match text {
        "inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        _ => {
            let d: f64 = text
                .parse()
                .map_err(|_| RespError::syntax(format!("invalid double {text:?}")))?;
            if d.is_nan() {
                return Err(RespError::syntax("RESP3 Double payload must not be NaN"));
            }
            Ok(d)
        }
    }
}

fn parse_big_number(line: &Bytes) -> Result<BigInt, RespError> {
    let text = body_str(line)?;
    let digits = text.strip_prefix('+').unwrap_or(text);
    digits
        .parse()
        .map_err(|_| RespError::syntax(format!("invalid big number {text:?}")))
}

fn parse_boolean(line: &Bytes) -> Result<bool, RespError> {
    match body_str(line)? {
        "t" => Ok(true),
        "f" => Ok(false),
        other => Err(RespError::syntax(format!("invalid boolean {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &[u8]) -> Result<ReadOutcome, RespError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut reader = Reader::new(std::io::Cursor::new(input.to_vec()));
            reader.read_value().await
        })
    }

    #[test]
    fn reads_blob_string() {
        let v = read(b"$11\r\nhello world\r\n").unwrap().into_value().unwrap();
        assert_eq!(v, Value::blob_string("hello world"));
    }

    #[test]
    fn reads_verbatim_string() {
        let v = read(b"=15\r\ntxt:Some string\r\n")
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(v, Value::verbatim_string(*b"txt", "Some string"));
    }

    #[test]
    fn reads_array_of_numbers() {
        let v = read(b"*3\r\n:1\r\n:2\r\n:3\r\n").unwrap().into_value().unwrap();
        assert_eq!(
            v,
            Value::array(vec![Value::number(1), Value::number(2), Value::number(3)])
        );
    }

    #[test]
    fn reads_map_preserving_order() {
        let v = read(b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n")
            .unwrap()
            .into_value()
            .unwrap();
        assert_eq!(
            v,
            Value::map(vec![
                (Value::simple_string("first"), Value::number(1)),
                (Value::simple_string("second"), Value::number(2)),
            ])
        );
    }

    #[test]
    fn reads_attribute_and_attaches_to_following_array() {
        let input = b"|1\r\n+key-popularity\r\n%2\r\n$1\r\na\r\n,0.1923\r\n$1\r\nb\r\n,0.0012\r\n*2\r\n:2039123\r\n:9543892\r\n";
        let v = read(input).unwrap().into_value().unwrap();
        assert_eq!(v.kind, Value::array(vec![Value::number(2039123), Value::number(9543892)]).kind);
        let attrs = v.attrs.unwrap();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].0, Value::simple_string("key-popularity"));
        assert_eq!(
            attrs[0].1,
            Value::map(vec![
                (Value::blob_string("a"), Value::double(0.1923)),
                (Value::blob_string("b"), Value::double(0.0012)),
            ])
        );
    }

    #[test]
    fn reads_push_frame() {
        let input = b">4\r\n+pubsub\r\n+message\r\n+somechannel\r\n+this is the message\r\n";
        let v = read(input).unwrap().into_value().unwrap();
        assert_eq!(
            v,
            Value::push(vec![
                Value::simple_string("pubsub"),
                Value::simple_string("message"),
                Value::simple_string("somechannel"),
                Value::simple_string("this is the message"),
            ])
        );
    }

    #[test]
    fn detects_stream_marker_instead_of_parsing_as_blob_string() {
        let marker = b"$EOF:1234567890123456789012345678901234567890\r\n";
        assert_eq!(marker.len(), STREAM_MARKER_LINE_LEN);
        let outcome = read(marker).unwrap();
        match outcome {
            ReadOutcome::StreamMarker(m) => {
                assert_eq!(&m[..], b"1234567890123456789012345678901234567890");
            }
            ReadOutcome::Value(_) => panic!("expected a stream marker, got a value"),
        }
    }

    #[test]
    fn nested_stream_marker_inside_array_is_invalid_syntax() {
        let marker = b"$EOF:1234567890123456789012345678901234567890\r\n";
        let mut input = b"*1\r\n".to_vec();
        input.extend_from_slice(marker);
        let err = read(&input).unwrap_err();
        assert!(matches!(err, RespError::InvalidSyntax(_)));
    }

    #[test]
    fn line_without_crlf_is_invalid_syntax() {
        let err = read(b"+OK\n").unwrap_err();
        assert!(matches!(err, RespError::InvalidSyntax(_)));
    }

    #[test]
    fn negative_length_is_invalid_syntax() {
        let err = read(b"$-1\r\n").unwrap_err();
        assert!(matches!(err, RespError::InvalidSyntax(_)));
    }

    #[test]
    fn double_inf_and_neg_inf_decode_to_true_infinities() {
        let v = read(b",inf\r\n").unwrap().into_value().unwrap();
        assert_eq!(v, Value::double(f64::INFINITY));
        let v = read(b",-inf\r\n").unwrap().into_value().unwrap();
        assert_eq!(v, Value::double(f64::NEG_INFINITY));
    }

    #[test]
    fn big_number_parses_arbitrary_precision_integer() {
        let v = read(b"(3492890328409238509324850943850943825024385\r\n")
            .unwrap()
            .into_value()
            .unwrap();
        let expected: BigInt = "3492890328409238509324850943850943825024385"
            .parse()
            .unwrap();
        assert_eq!(v, Value::big_number(expected));
    }

    #[test]
    fn from_str_convenience_parses_a_value() {
        let v = Value::from_str("+OK\r\n").unwrap();
        assert_eq!(v, Value::simple_string("OK"));
    }
}
