use std::collections::HashSet;

use crate::record::{Batch, Record};
use crate::storage::RecordSink;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("CSV file has no header row")]
    MissingHeader,
    #[error("CSV header has an empty column name at position {0}")]
    EmptyColumn(usize),
    #[error("CSV header repeats column '{0}'")]
    DuplicateColumn(String),
    #[error("CSV header could not be read: {0}")]
    UnreadableHeader(csv::Error),
    #[error("object content is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("failed to write record {record_id}: {source:#}")]
    Write {
        record_id: String,
        source: anyhow::Error,
    },
}

impl IngestError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::MissingHeader
                | IngestError::EmptyColumn(_)
                | IngestError::DuplicateColumn(_)
                | IngestError::UnreadableHeader(_)
        )
    }
}

/// Writes every well-formed row of `content` as one record of `batch` and returns the count.
#[tracing::instrument(skip(sink, content), fields(file_name = %batch.file_name))]
pub async fn ingest_csv<S>(sink: &S, content: &[u8], batch: &Batch) -> Result<usize, IngestError>
where
    S: RecordSink + ?Sized,
{
    let content = std::str::from_utf8(content)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = validate_header(reader.headers().map_err(IngestError::UnreadableHeader)?)?;

    let mut written = 0;
    for row in reader.records() {
        let columns = match row_columns(&header, row) {
            Ok(columns) => columns,
            Err(skipped) => {
                tracing::warn!(line = skipped.line, reason = %skipped.reason, "skipping row");
                continue;
            }
        };

        let record = Record::new(columns);
        let record_id = record.record_id.clone();

        sink.put_record(record.into_item(batch))
            .await
            .map_err(|source| IngestError::Write { record_id, source })?;
        written += 1;
    }

    tracing::info!(written, "csv ingested");
    Ok(written)
}

#[derive(Debug, PartialEq, Eq)]
struct SkippedRow {
    line: Option<u64>,
    reason: String,
}

/// Pairs a data row with the header, or says why the row is dropped.
fn row_columns(
    header: &[String],
    row: Result<csv::StringRecord, csv::Error>,
) -> Result<Vec<(String, String)>, SkippedRow> {
    let row = row.map_err(|err| SkippedRow {
        line: err.position().map(|p| p.line()),
        reason: err.to_string(),
    })?;

    if row.len() != header.len() {
        return Err(SkippedRow {
            line: row.position().map(|p| p.line()),
            reason: format!("expected {} columns, found {}", header.len(), row.len()),
        });
    }

    Ok(header
        .iter()
        .cloned()
        .zip(row.iter().map(str::to_string))
        .collect())
}

fn validate_header(header: &csv::StringRecord) -> Result<Vec<String>, IngestError> {
    if header.is_empty() {
        return Err(IngestError::MissingHeader);
    }

    let mut seen = HashSet::new();
    for (position, column) in header.iter().enumerate() {
        if column.trim().is_empty() {
            return Err(IngestError::EmptyColumn(position + 1));
        }
        if !seen.insert(column) {
            return Err(IngestError::DuplicateColumn(column.to_string()));
        }
    }

    Ok(header.iter().map(str::to_string).collect())
}
