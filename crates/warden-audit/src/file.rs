//! Append-only JSONL audit store

use crate::chain::{parse_line, ChainedLine, GENESIS_HASH};
use crate::{AuditConfig, AuditError};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use warden_domain::{AuditLog, AuditRecord, PersistFailure};

struct Writer {
    file: tokio::fs::File,
    next_seq: u64,
    last_hash: String,
    poisoned: Option<String>,
}

/// Hash-chained, append-only audit trail in a local file
///
/// Appends are serialized behind one lock, so records from concurrent
/// runs never interleave. Each append is written as a whole line and
/// (by default) synced before it returns. The file is owner-only
/// (`0600`) on Unix.
///
/// # Examples
///
/// ```no_run
/// use warden_audit::{AuditConfig, FileAuditLog};
///
/// let log = FileAuditLog::open(&AuditConfig::default()).unwrap();
/// println!("{} records so far", log.path().display());
/// ```
pub struct FileAuditLog {
    path: PathBuf,
    sync: bool,
    writer: Mutex<Writer>,
}

impl FileAuditLog {
    /// Open or create the trail and resume its chain
    ///
    /// # Errors
    ///
    /// - `AuditError::Io` if the file cannot be opened or restricted
    /// - `AuditError::Corrupt` if the last line is not a chained record
    pub fn open(config: &AuditConfig) -> Result<Self, AuditError> {
        let path = config.path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let (next_seq, last_hash) = resume_point(&path)?;

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&path)?;
        restrict_permissions(&path)?;

        info!(path = %path.display(), next_seq, "Opened audit trail");

        Ok(Self {
            path,
            sync: config.sync,
            writer: Mutex::new(Writer {
                file: tokio::fs::File::from_std(file),
                next_seq,
                last_hash,
                poisoned: None,
            }),
        })
    }

    /// Location of the trail
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    /// After a failed write the store refuses further appends with
    /// `AuditError::Poisoned`, since the file may end in a partial line.
    pub async fn append_record(&self, record: &AuditRecord) -> Result<u64, AuditError> {
        let mut writer = self.writer.lock().await;
        if let Some(reason) = &writer.poisoned {
            return Err(AuditError::Poisoned(reason.clone()));
        }

        let line = ChainedLine::link(writer.next_seq, &writer.last_hash, record)?;
        let mut text = serde_json::to_string(&line)?;
        text.push('\n');

        if let Err(e) = write_line(&mut writer.file, text.as_bytes(), self.sync).await {
            writer.poisoned = Some(e.to_string());
            return Err(e.into());
        }

        writer.next_seq = line.seq + 1;
        writer.last_hash = line.hash;
        debug!(seq = line.seq, threat_id = record.threat_id(), "Audit record appended");
        Ok(line.seq)
    }
}

async fn write_line(file: &mut tokio::fs::File, bytes: &[u8], sync: bool) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    if sync {
        file.sync_data().await?;
    }
    Ok(())
}

/// Sequence number and hash to continue from
fn resume_point(path: &Path) -> Result<(u64, String), AuditError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((0, GENESIS_HASH.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let last = content
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .last();

    match last {
        Some((index, text)) => {
            let line = parse_line(text, index + 1)?;
            Ok((line.seq + 1, line.hash))
        }
        None => Ok((0, GENESIS_HASH.to_string())),
    }
}

/// Narrow the file to owner read/write; never widen
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), AuditError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    let mode = perms.mode() & 0o777;
    let narrowed = mode & 0o600;
    if narrowed != mode {
        perms.set_mode(narrowed);
        std::fs::set_permissions(path, perms)?;
        info!(
            path = %path.display(),
            from = %format!("{:o}", mode),
            to = %format!("{:o}", narrowed),
            "Restricted audit trail permissions"
        );
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), AuditError> {
    Ok(())
}

#[async_trait]
impl AuditLog for FileAuditLog {
    async fn append(&self, record: AuditRecord) -> Result<(), PersistFailure> {
        match self.append_record(&record).await {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    threat_id = record.threat_id(),
                    error = %e,
                    "Failed to persist audit record"
                );
                Err(e.into())
            }
        }
    }
}
