//! # Raw Framing
//!
//! A second read mode over the same [`Reader`]: instead of building a
//! [`Value`] tree, it copies the exact wire bytes of one value through
//! untouched. Useful for proxying or logging a frame without paying for a
//! full parse. Shares the line/count framing rules with the value reader but
//! refuses a streamed string outright, since there is no bounded byte range
//! to copy for one.

use bytes::Bytes;
use tokio::io::AsyncRead;

use crate::errors::RespError;

use super::reader::{get_count, is_stream_marker, BoxFuture, Reader};
use super::value::Tag;

impl<R: AsyncRead + Unpin + Send> Reader<R> {
    /// Reads one value's raw RESP3 bytes, attribute frame included if present.
    pub async fn read_raw(&mut self) -> Result<Bytes, RespError> {
        let mut buf = Vec::new();
        self.read_raw_into(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    /// Appends one value's raw RESP3 bytes to `out`. Recurses through
    /// attribute and aggregate frames the same way [`Reader::read_value`]
    /// does, but only ever copies bytes — it never builds a [`super::Value`].
    pub fn read_raw_into<'a>(
        &'a mut self,
        out: &'a mut Vec<u8>,
    ) -> BoxFuture<'a, Result<(), RespError>> {
        Box::pin(async move {
            let line = self.read_line().await?;
            out.extend_from_slice(&line);

            if line.first() == Some(&Tag::Attribute.as_u8()) {
                let count = get_count(&line)?;
                for _ in 0..2 * count {
                    self.read_raw_into(out).await?;
                }
                // the attribute frame prefixes the value it decorates
                return self.read_raw_into(out).await;
            }

            if is_stream_marker(&line) {
                return Err(RespError::StreamingUnsupported);
            }

            if line.len() < 3 {
                return Err(RespError::syntax("value line shorter than tag + CRLF"));
            }

            let tag = Tag::try_from(line[0])
                .map_err(|b| RespError::syntax(format!("unsupported RESP3 type byte {b:#04x}")))?;

            match tag {
                Tag::BlobString | Tag::BlobError | Tag::VerbatimString => {
                    let count = get_count(&line)?;
                    let payload = self.read_exact_bytes(count + 2).await?;
                    out.extend_from_slice(&payload);
                }
                Tag::Array | Tag::Set | Tag::Push => {
                    let count = get_count(&line)?;
                    for _ in 0..count {
                        self.read_raw_into(out).await?;
                    }
                }
                Tag::Map => {
                    let count = get_count(&line)?;
                    for _ in 0..2 * count {
                        self.read_raw_into(out).await?;
                    }
                }
                Tag::Attribute => unreachable!("attribute frames are handled above"),
                Tag::SimpleString
                | Tag::SimpleError
                | Tag::Number
                | Tag::Double
                | Tag::Boolean
                | Tag::BigNumber
                | Tag::Null => {
                    // the line itself already carries the whole scalar payload
                }
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_raw(input: &[u8]) -> Result<Bytes, RespError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let mut reader = Reader::new(std::io::Cursor::new(input.to_vec()));
            reader.read_raw().await
        })
    }

    #[test]
    fn raw_scalar_is_copied_verbatim() {
        let raw = read_raw(b"+OK\r\n").unwrap();
        assert_eq!(&raw[..], b"+OK\r\n");
    }

    #[test]
    fn raw_array_includes_every_nested_element() {
        let input = b"*2\r\n:1\r\n$5\r\nhello\r\n";
        let raw = read_raw(input).unwrap();
        assert_eq!(&raw[..], &input[..]);
    }

    #[test]
    fn raw_attribute_prefixes_the_decorated_value() {
        let input = b"|1\r\n+ttl\r\n:120\r\n:7\r\n";
        let raw = read_raw(input).unwrap();
        assert_eq!(&raw[..], &input[..]);
    }

    #[test]
    fn raw_reading_twice_in_a_row_is_idempotent_per_frame() {
        let input = b"+OK\r\n+OK\r\n";
        let mut reader = Reader::new(std::io::Cursor::new(input.to_vec()));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let (first, second) = runtime.block_on(async {
            let first = reader.read_raw().await.unwrap();
            let second = reader.read_raw().await.unwrap();
            (first, second)
        });
        assert_eq!(&first[..], b"+OK\r\n");
        assert_eq!(&second[..], b"+OK\r\n");
    }

    #[test]
    fn raw_stream_marker_is_rejected() {
        let marker = b"$EOF:1234567890123456789012345678901234567890\r\n";
        let err = read_raw(marker).unwrap_err();
        assert!(matches!(err, RespError::StreamingUnsupported));
    }
}
