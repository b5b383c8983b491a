use crate::config::RingSettings;
use crate::error::Error;
use crate::ring::{Limit, RingReader, RingWriter};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest request that stays within `limit`.
///
/// The ring only cuts a call short once its budget drops below the ring's
/// length, so a request bigger than the budget has to be trimmed up front.
fn budgeted(limit: Limit, len: usize) -> usize {
    match limit {
        Limit::Bounded(rem) => usize::try_from(rem).map_or(len, |r| r.min(len)),
        Limit::Unlimited => len,
    }
}

/// Streams `input` through a ring of `settings.capacity` bytes and writes the
/// retained window to `output`, oldest byte first.
///
/// Returns the number of bytes written to `output`.
pub async fn tail<R, W>(mut input: R, mut output: W, settings: &RingSettings) -> Result<u64, Error>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    settings.check_window()?;
    let ring = vec![0u8; settings.capacity];
    let mut writer = match settings.limit {
        Limit::Unlimited => RingWriter::new(ring, settings.offset)?,
        Limit::Bounded(n) => RingWriter::with_limit(ring, settings.offset, n)?,
    };

    let mut chunk = vec![0u8; settings.chunk];
    let mut seen = 0u64;
    loop {
        let want = budgeted(writer.remaining(), chunk.len());
        if want == 0 {
            warn!(
                "Write budget spent after {} bytes, not reading further input",
                seen
            );
            break;
        }
        let n = input.read(&mut chunk[..want]).await?;
        if n == 0 {
            break;
        }
        let transfer = writer.write_through(&chunk[..n]);
        seen += transfer.bytes as u64;
    }

    // Before the first wrap the oldest byte still sits at the start offset.
    let capacity = writer.capacity();
    let start = if seen >= capacity as u64 {
        writer.position()
    } else {
        settings.offset
    };
    let window = seen.min(capacity as u64) as usize;
    debug!("Retained {} of {} bytes", window, seen);

    let ring = writer.into_inner();
    let head = (capacity - start).min(window);
    output.write_all(&ring[start..start + head]).await?;
    output.write_all(&ring[..window - head]).await?;
    output.flush().await?;
    Ok(window as u64)
}

/// Writes `count` bytes of `content` to `output`, starting at
/// `settings.offset` and starting over from the beginning at the end.
///
/// `count` falls back to the configured limit; one of the two is required.
pub async fn cycle<W>(
    content: Vec<u8>,
    mut output: W,
    settings: &RingSettings,
    count: Option<u64>,
) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin,
{
    let count = match (count, settings.limit) {
        (Some(n), _) | (None, Limit::Bounded(n)) => n,
        (None, Limit::Unlimited) => {
            return Err(Error::Settings(
                "cycle needs a byte count (--count or ring.limit)".into(),
            ))
        }
    };

    let mut reader = RingReader::with_limit(content, settings.offset, count)?;
    let mut chunk = vec![0u8; settings.chunk];
    let mut emitted = 0u64;
    loop {
        let want = budgeted(reader.remaining(), chunk.len());
        if want == 0 {
            break;
        }
        let transfer = reader.read_through(&mut chunk[..want]);
        if transfer.bytes == 0 {
            break;
        }
        output.write_all(&chunk[..transfer.bytes]).await?;
        emitted += transfer.bytes as u64;
    }
    output.flush().await?;
    debug!("Emitted {} bytes, stopped at offset {}", emitted, reader.position());
    Ok(emitted)
}
