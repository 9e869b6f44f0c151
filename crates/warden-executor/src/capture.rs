//! Length-bounded output capture

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE: usize = 8 * 1024;

/// Bytes captured from one stream
#[derive(Debug, Default)]
pub struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Captured {
    /// Append a chunk, keeping at most `limit` bytes in total
    pub fn push(&mut self, chunk: &[u8], limit: usize) {
        let room = limit.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        let take = chunk.len().min(room);
        self.bytes.extend_from_slice(&chunk[..take]);
    }

    /// Captured text (lossy UTF-8) and the truncation flag
    pub fn finish(&self) -> (String, bool) {
        (String::from_utf8_lossy(&self.bytes).into_owned(), self.truncated)
    }
}

/// Shared capture buffer
///
/// Shared between the reader task and the executor so that output read
/// before a kill survives aborting the reader.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Captured>>,
}

impl CaptureBuffer {
    fn lock(&self) -> MutexGuard<'_, Captured> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the captured text and truncation flag
    pub fn finish(&self) -> (String, bool) {
        self.lock().finish()
    }

    /// Read a stream to its end
    ///
    /// Bytes past `limit` are read and discarded so the child never blocks
    /// on a full pipe.
    pub async fn drain<R>(self, mut reader: R, limit: usize)
    where
        R: AsyncRead + Unpin,
    {
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            match reader.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => self.lock().push(&chunk[..n], limit),
            }
        }
    }
}
