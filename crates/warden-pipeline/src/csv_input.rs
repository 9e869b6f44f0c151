//! CSV record source
//!
//! One threat per row. A header row is required and must name a
//! `threat_id` (or `id`) column; `file_path`/`path`, `sha256`/`hash` and
//! `description`/`context` are optional. Any other non-empty cell is kept
//! as `column=value` in the record's context.
//!
//! Rows that cannot become a [`ThreatRecord`] are returned as
//! [`RecordError`]s labelled with their line number, so one bad row never
//! aborts the batch.

use crate::{InputError, RecordError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use warden_domain::ThreatRecord;

/// Column positions resolved from the header row
struct Columns {
    id: usize,
    path: Option<usize>,
    hash: Option<usize>,
    description: Option<usize>,
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, InputError> {
        let names: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| names.iter().position(|n| n == alias))
        };

        let id = find(&["threat_id", "id"])
            .ok_or_else(|| InputError::MissingColumn("threat_id".to_string()))?;
        let path = find(&["file_path", "path"]);
        let hash = find(&["sha256", "hash"]);
        let description = find(&["description", "context"]);

        let known = [Some(id), path, hash, description];
        let extra = names
            .iter()
            .enumerate()
            .filter(|(i, name)| !name.is_empty() && !known.contains(&Some(*i)))
            .map(|(i, name)| (i, name.clone()))
            .collect();

        Ok(Self {
            id,
            path,
            hash,
            description,
            extra,
        })
    }

    fn record(&self, row: &StringRecord) -> Result<ThreatRecord, String> {
        let cell = |index: Option<usize>| {
            index
                .and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let id = row.get(self.id).unwrap_or_default();
        let mut context: Vec<String> = cell(self.description).into_iter().collect();
        context.extend(
            self.extra
                .iter()
                .filter_map(|(i, name)| cell(Some(*i)).map(|v| format!("{}={}", name, v))),
        );
        let context = (!context.is_empty()).then(|| context.join("; "));

        ThreatRecord::new(id)
            .map(|record| {
                record
                    .with_path(cell(self.path))
                    .with_fingerprint(cell(self.hash))
                    .with_context(context)
            })
            .map_err(|e| e.to_string())
    }
}

/// Read threat records from a CSV file
///
/// # Errors
///
/// Fails as a whole only if the file cannot be read or the header row has
/// no id column. Per-row problems are returned inside the vector.
pub fn read_threats_csv(
    path: impl AsRef<Path>,
) -> Result<Vec<Result<ThreatRecord, RecordError>>, InputError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let rows = parse_threats_csv(file)?;
    info!(path = %path.display(), rows = rows.len(), "Read threat records");
    Ok(rows)
}

/// Parse threat records from any CSV reader
///
/// # Examples
///
/// ```
/// use warden_pipeline::parse_threats_csv;
///
/// let data = "threat_id,file_path,sha256\nt1,/tmp/x,aaaa\n,/tmp/y,bbbb\n";
/// let rows = parse_threats_csv(data.as_bytes()).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].as_ref().unwrap().id(), "t1");
/// assert_eq!(rows[1].as_ref().unwrap_err().label, "row-3");
/// ```
pub fn parse_threats_csv<R: Read>(
    reader: R,
) -> Result<Vec<Result<ThreatRecord, RecordError>>, InputError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = Columns::resolve(reader.headers()?)?;

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        // Header is line 1; used only when the reader reports no position
        let fallback_line = index as u64 + 2;
        match result {
            Ok(row) => {
                let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);
                rows.push(columns.record(&row).map_err(|reason| RecordError::row(line, reason)));
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                debug!(line, error = %e, "Unreadable CSV row");
                rows.push(Err(RecordError::row(line, e.to_string())));
            }
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(data: &str) -> Vec<Result<ThreatRecord, RecordError>> {
        parse_threats_csv(data.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_full_row() {
        let rows = parse("threat_id,file_path,sha256,description\nt1,/tmp/x,aaaa,dropper\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.id(), "t1");
        assert_eq!(record.path(), Some("/tmp/x"));
        assert_eq!(record.fingerprint(), Some("aaaa"));
        assert_eq!(record.context(), Some("dropper"));
    }

    #[test]
    fn test_header_aliases_and_case() {
        let rows = parse("ID,Path,HASH\nt1,/tmp/x,aaaa\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.id(), "t1");
        assert_eq!(record.path(), Some("/tmp/x"));
        assert_eq!(record.fingerprint(), Some("aaaa"));
    }

    #[test]
    fn test_cells_are_trimmed_and_blank_is_none() {
        let rows = parse("threat_id,file_path,sha256\n  t1  , ,aaaa\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(record.id(), "t1");
        assert_eq!(record.path(), None);
    }

    #[test]
    fn test_extra_columns_fold_into_context() {
        let rows = parse("threat_id,description,detected_by,family\nt1,dropper,edr,lockbit\n");
        let record = rows[0].as_ref().unwrap();
        assert_eq!(
            record.context(),
            Some("dropper; detected_by=edr; family=lockbit")
        );
    }

    #[test]
    fn test_blank_id_is_row_error() {
        let rows = parse("threat_id,file_path\nt1,/a\n,/b\nt3,/c\n");
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        let err = rows[1].as_ref().unwrap_err();
        assert_eq!(err.label, "row-3");
        assert!(err.reason.contains("threat_id"));
        assert!(rows[2].is_ok());
    }

    #[test]
    fn test_ragged_row_is_row_error() {
        let rows = parse("threat_id,file_path\nt1,/a\nt2,/b,extra\nt3,/c\n");
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert_eq!(rows[1].as_ref().unwrap_err().label, "row-3");
        assert_eq!(rows[2].as_ref().unwrap().id(), "t3");
    }

    #[test]
    fn test_missing_id_column() {
        let result = parse_threats_csv("file_path,sha256\n/tmp/x,aaaa\n".as_bytes());
        assert!(matches!(result, Err(InputError::MissingColumn(c)) if c == "threat_id"));
    }

    #[test]
    fn test_empty_input() {
        let result = parse_threats_csv("".as_bytes());
        assert!(matches!(result, Err(InputError::MissingColumn(_))));
    }

    #[test]
    fn test_header_only() {
        assert!(parse("threat_id,file_path\n").is_empty());
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "threat_id\nt1\nt2\n").unwrap();

        let rows = read_threats_csv(file.path()).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.as_ref().unwrap().id()).collect();
        assert_eq!(ids, vec!["t1", "t2"]);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_threats_csv("/definitely/not/here.csv");
        assert!(matches!(result, Err(InputError::Io(_))));
    }
}
