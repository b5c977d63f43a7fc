//! Parquet table writer
//!
//! Every write goes to a temporary file next to the destination and is renamed
//! into place only once the Parquet footer has been written, so a failed write
//! never leaves a partial table behind.

use crate::config::{Compression, OutputConfig};
use crate::table::{TableError, TableRecord, TableResult, TableRows};
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression as ParquetCompression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use std::path::Path;

/// Metadata key holding the write timestamp (RFC 3339, UTC)
pub const CREATED_AT_KEY: &str = "harvest.created_at";

/// Metadata key naming what produced the table
pub const SOURCE_KEY: &str = "harvest.source";

/// Writes tables as single Parquet files
#[derive(Debug, Clone)]
pub struct TableWriter {
    compression: Compression,
    max_row_group_size: usize,
    source: Option<String>,
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl TableWriter {
    /// Creates a writer from the output configuration
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            compression: config.compression,
            max_row_group_size: config.max_row_group_size,
            source: None,
        }
    }

    /// Tags written files with the name of the producer
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn properties(&self) -> WriterProperties {
        let compression = match self.compression {
            Compression::None => ParquetCompression::UNCOMPRESSED,
            Compression::Snappy => ParquetCompression::SNAPPY,
            Compression::Gzip => ParquetCompression::GZIP(GzipLevel::default()),
            Compression::Zstd => ParquetCompression::ZSTD(ZstdLevel::default()),
        };

        let mut metadata = vec![KeyValue::new(
            CREATED_AT_KEY.to_string(),
            chrono::Utc::now().to_rfc3339(),
        )];
        if let Some(source) = &self.source {
            metadata.push(KeyValue::new(SOURCE_KEY.to_string(), source.clone()));
        }

        WriterProperties::builder()
            .set_compression(compression)
            .set_max_row_group_size(self.max_row_group_size)
            .set_key_value_metadata(Some(metadata))
            .build()
    }

    /// Writes typed records, one row per record in slice order
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of rows written
    /// * `Err(TableError::Empty)` - `records` is empty; nothing is written
    /// * `Err(TableError)` - Conversion or I/O failure
    pub fn write_records<R: TableRecord>(&self, path: &Path, records: &[R]) -> TableResult<usize> {
        let rows = TableRows::from_records(records)?;
        self.write_rows(path, &rows)
    }

    /// Writes an in-memory table, inferring the column types from its values
    pub fn write_rows(&self, path: &Path, rows: &TableRows) -> TableResult<usize> {
        let batch = rows.to_record_batch()?;
        self.write_batches(path, batch.schema(), &[batch])
    }

    /// Writes pre-built Arrow batches sharing `schema`
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file; replaced if it exists
    /// * `schema` - Schema of the table
    /// * `batches` - Batches to write, in order (may be empty)
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Total number of rows written
    /// * `Err(TableError)` - Write failed; `path` is left untouched
    pub fn write_batches(
        &self,
        path: &Path,
        schema: SchemaRef,
        batches: &[RecordBatch],
    ) -> TableResult<usize> {
        if schema.fields().is_empty() {
            return Err(TableError::Schema("table has no columns".to_string()));
        }

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut builder = tempfile::Builder::new();
        builder.prefix(".harvest-").suffix(".parquet.tmp");
        #[cfg(unix)]
        {
            // Same mode as File::create; open() applies the umask
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut tmp = builder.tempfile_in(dir)?;

        let mut rows = 0usize;
        {
            let mut writer = ArrowWriter::try_new(tmp.as_file_mut(), schema, Some(self.properties()))?;
            for batch in batches {
                writer.write(batch)?;
                rows += batch.num_rows();
            }
            writer.close()?;
        }
        tmp.as_file().sync_all()?;

        // A replaced file keeps its permissions
        if let Ok(existing) = std::fs::metadata(path) {
            std::fs::set_permissions(tmp.path(), existing.permissions())?;
        }

        tmp.persist(path).map_err(|e| TableError::Io(e.error))?;

        tracing::debug!(
            "Wrote {} rows to {} ({} compression)",
            rows,
            path.display(),
            self.compression
        );

        Ok(rows)
    }
}
