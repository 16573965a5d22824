//! Module `engine`
//!
//! Streams directory listings and file contents over an established
//! data connection in fixed-size chunks. The chunk is one stack buffer
//! per transfer; chunk boundaries carry no protocol meaning.
//!
//! Callers send the 150 preliminary reply before invoking an operation
//! and the terminating 226/550 reply after it returns.

use log::{debug, info, warn};
use std::io::ErrorKind;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::FtpError;

/// Per-transfer buffer size. This is the peak-memory ceiling of a
/// transfer, sized for small embedded hosts.
pub const CHUNK_SIZE: usize = 256;

/// Send one listing line per directory entry over the data connection.
///
/// Permissions, owner, group and date are fixed placeholders; only the
/// type flag, size and name come from the entry. An entry whose stat
/// fails is skipped so one bad entry cannot abort the whole listing.
pub async fn send_listing<W>(dir: &str, data: &mut W) -> Result<(), FtpError>
where
    W: AsyncWrite + Unpin,
{
    let mut entries = fs::read_dir(dir).await?;
    let mut listed = 0usize;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Skipping {} in listing: {}", name, e);
                continue;
            }
        };

        let ftype = if metadata.is_dir() { 'd' } else { '-' };
        let line = format!(
            "{}rw-r--r-- 1 owner group {:8} Jan 1 2000 {}\r\n",
            ftype,
            metadata.len(),
            name
        );
        data.write_all(line.as_bytes()).await?;
        listed += 1;
    }

    data.flush().await?;
    debug!("Listed {} entries in {}", listed, dir);
    Ok(())
}

/// Stream a file to the data connection in `CHUNK_SIZE` chunks.
///
/// The file handle is dropped on every exit path, success or error.
pub async fn send_file<W>(path: &str, data: &mut W) -> Result<(), FtpError>
where
    W: AsyncWrite + Unpin,
{
    let mut file = fs::File::open(path).await?;
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut sent = 0u64;

    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        data.write_all(&chunk[..n]).await?;
        sent += n as u64;
    }

    data.flush().await?;
    info!("Sent {} ({} bytes)", path, sent);
    Ok(())
}

/// Receive a file from the data connection into `<path>.tmp`, then
/// rename it over the target.
///
/// The rename is the only externally visible mutation, so a failure at
/// any point leaves the target untouched; the temporary file is deleted
/// on every error path.
pub async fn receive_file<R>(path: &str, data: &mut R) -> Result<(), FtpError>
where
    R: AsyncRead + Unpin,
{
    let tmp_path = format!("{path}.tmp");

    let received = match write_to_temp(&tmp_path, data).await {
        Ok(received) => received,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
    };

    if let Err(e) = replace_target(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    info!("Received {} ({} bytes)", path, received);
    Ok(())
}

async fn write_to_temp<R>(tmp_path: &str, data: &mut R) -> Result<u64, FtpError>
where
    R: AsyncRead + Unpin,
{
    let mut file = fs::File::create(tmp_path).await?;
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut received = 0u64;

    loop {
        let n = data.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        file.write_all(&chunk[..n]).await?;
        received += n as u64;
    }

    file.flush().await?;
    Ok(received)
}

async fn replace_target(tmp_path: &str, path: &str) -> Result<(), FtpError> {
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    fs::rename(tmp_path, path).await?;
    Ok(())
}
