//! # RESP3 Writer
//!
//! The write side of the codec: serializes a [`Value`] (or a client-style
//! command line) and flushes it to an [`tokio::io::AsyncWrite`] sink.

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::constants::READER_BUFFER_LEN;
use crate::errors::RespError;

use super::value::Value;

pub struct Writer<W> {
    inner: BufWriter<W>,
}

impl<W: AsyncWrite + Unpin + Send> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(READER_BUFFER_LEN, inner)
    }

    pub fn with_capacity(capacity: usize, inner: W) -> Self {
        Writer {
            inner: BufWriter::with_capacity(capacity, inner),
        }
    }

    /// Serializes and flushes one value, attribute frame included.
    pub async fn write_value(&mut self, value: &Value) -> Result<(), RespError> {
        self.inner.write_all(&value.to_resp3_bytes()).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Sends a command the way a client does: an array of blob strings, one
    /// per argument.
    pub async fn write_command<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), RespError> {
        let elems = args
            .iter()
            .map(|a| Value::blob_string(a.as_ref().to_owned()))
            .collect();
        self.write_value(&Value::array(elems)).await
    }

    /// Same as [`Writer::write_command`], but for arguments that are not
    /// necessarily valid UTF-8.
    pub async fn write_bytes_command<B: AsRef<[u8]>>(
        &mut self,
        args: &[B],
    ) -> Result<(), RespError> {
        let elems = args
            .iter()
            .map(|a| Value::blob_string(Bytes::copy_from_slice(a.as_ref())))
            .collect();
        self.write_value(&Value::array(elems)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_with<F>(f: F) -> Vec<u8>
    where
        F: for<'a> FnOnce(
            &'a mut Writer<std::io::Cursor<Vec<u8>>>,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + 'a>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut writer = Writer::new(std::io::Cursor::new(Vec::new()));
        runtime.block_on(f(&mut writer));
        writer.inner.into_inner().into_inner()
    }

    #[test]
    fn write_value_flushes_the_serialized_bytes() {
        let out = write_with(|w| {
            Box::pin(async move {
                w.write_value(&Value::simple_string("OK")).await.unwrap();
            })
        });
        assert_eq!(out, b"+OK\r\n");
    }

    #[test]
    fn write_command_encodes_a_blob_string_array() {
        let out = write_with(|w| {
            Box::pin(async move {
                w.write_command(&["SET", "key", "value"]).await.unwrap();
            })
        });
        assert_eq!(out, b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n");
    }

    #[test]
    fn write_bytes_command_handles_non_utf8_arguments() {
        let out = write_with(|w| {
            Box::pin(async move {
                w.write_bytes_command(&[b"SET".as_slice(), &[0xff, 0x00]])
                    .await
                    .unwrap();
            })
        });
        assert_eq!(out, b"*2\r\n$3\r\nSET\r\n$2\r\n\xff\x00\r\n");
    }
}
