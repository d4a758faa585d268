//! Newline-delimited JSON framing.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Write one record followed by `\n`, then flush.
pub async fn write_record<W, T>(writer: &mut W, record: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await
}

/// Read the next non-blank line, trimmed. `None` on EOF.
pub async fn read_line<R>(reader: &mut R, buf: &mut String) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    loop {
        buf.clear();
        if reader.read_line(buf).await? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}
