//! Line codec for the stdio transport.
//!
//! Frame format: one UTF-8 JSON message per line, terminated by `\n`
//! (a preceding `\r` is tolerated). Outbound messages are compact JSON, which
//! never contains a raw newline.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read one line from the stream, without its terminator.
///
/// Returns `None` on clean EOF. Lines longer than `max_message_bytes` are
/// drained up to their newline and reported as `InvalidData`, leaving the
/// stream positioned at the next message.
pub async fn read_message<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_message_bytes: usize,
) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let limit = max_message_bytes as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() != Some(&b'\n') && buf.len() > max_message_bytes {
        discard_line(reader).await?;
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: exceeds {} bytes", max_message_bytes),
        ));
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(buf))
}

/// Consume bytes up to and including the next newline (or EOF).
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

/// Write one message followed by a newline, then flush.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    writer.write_all(payload).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_reads_lines_and_eof() {
        let data = b"{\"a\":1}\r\n{\"b\":2}\n{\"c\":3}".to_vec();
        let mut reader = BufReader::new(&data[..]);

        assert_eq!(read_message(&mut reader, 1024).await.unwrap().unwrap(), b"{\"a\":1}");
        assert_eq!(read_message(&mut reader, 1024).await.unwrap().unwrap(), b"{\"b\":2}");
        assert_eq!(read_message(&mut reader, 1024).await.unwrap().unwrap(), b"{\"c\":3}");
        assert!(read_message(&mut reader, 1024).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let mut data = vec![b'x'; 64];
        data.extend_from_slice(b"\nok\n");
        let mut reader = BufReader::with_capacity(8, &data[..]);

        let err = read_message(&mut reader, 16).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(read_message(&mut reader, 16).await.unwrap().unwrap(), b"ok");
    }

    #[tokio::test]
    async fn test_line_at_exact_limit_is_accepted() {
        let data = b"0123456789\n".to_vec();
        let mut reader = BufReader::new(&data[..]);
        assert_eq!(read_message(&mut reader, 10).await.unwrap().unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_write_appends_newline() {
        let mut out = Vec::new();
        write_message(&mut out, b"{\"ok\":true}").await.unwrap();
        assert_eq!(out, b"{\"ok\":true}\n");
    }
}
