use crate::catalog::{ObjectBody, ObjectStore};
use crate::errors::{BackupToolError, Result};
use indicatif::ProgressBar;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Stream an object from the store into `destination`.
///
/// Only one chunk is held in memory at a time. On failure the partially
/// written file is removed. Returns the number of bytes written.
pub async fn download<S>(
    store: &S,
    key: &str,
    destination: &Path,
    progress: &ProgressBar,
) -> Result<u64>
where
    S: ObjectStore + ?Sized,
{
    let mut body = store
        .fetch(key)
        .await?
        .ok_or_else(|| BackupToolError::EmptyBody(key.to_string()))?;

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = File::create(destination).await?;

    match copy_body(&mut body, &mut file, progress).await {
        Ok(total) => {
            progress.finish();
            debug!(key = %key, bytes = total, destination = %destination.display(), "Download finished");
            Ok(total)
        }
        Err(source) => {
            progress.abandon();
            drop(file);
            if let Err(e) = fs::remove_file(destination).await {
                warn!(destination = %destination.display(), error = %e, "Could not remove partial download");
            }
            Err(BackupToolError::TransferInterrupted {
                key: key.to_string(),
                source,
            })
        }
    }
}

async fn copy_body(
    body: &mut ObjectBody,
    file: &mut File,
    progress: &ProgressBar,
) -> std::io::Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let read = body.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read]).await?;
        total += read as u64;
        progress.inc(read as u64);
    }

    file.flush().await?;
    file.sync_all().await?;
    Ok(total)
}
