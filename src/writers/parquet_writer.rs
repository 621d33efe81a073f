use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::utils::constants::*;
use arrow::array::{Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Columnar export of filtered station records.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write station records to a Parquet file. An empty slice still
    /// produces a file with the schema and no rows.
    pub fn write_records(&self, records: &[StationRecord], path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let schema = Self::create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in records.chunks(self.row_group_size.max(1)) {
            let batch = Self::records_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    fn create_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("label", DataType::Utf8, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("metric", DataType::Float64, false),
        ]))
    }

    fn records_to_batch(records: &[StationRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let labels: Vec<&str> = records.iter().map(|r| r.label.as_str()).collect();
        let latitudes: Vec<f64> = records.iter().map(|r| r.latitude).collect();
        let longitudes: Vec<f64> = records.iter().map(|r| r.longitude).collect();
        let metrics: Vec<f64> = records.iter().map(|r| r.metric).collect();

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(labels)),
                Arc::new(Float64Array::from(latitudes)),
                Arc::new(Float64Array::from(longitudes)),
                Arc::new(Float64Array::from(metrics)),
            ],
        )?;

        Ok(batch)
    }

    /// Read records back, up to `limit` (0 = all)
    pub fn read_records(&self, path: &Path, limit: usize) -> Result<Vec<StationRecord>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut records = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;

            let labels = Self::column::<StringArray>(&batch, 0, "label")?;
            let latitudes = Self::column::<Float64Array>(&batch, 1, "latitude")?;
            let longitudes = Self::column::<Float64Array>(&batch, 2, "longitude")?;
            let metrics = Self::column::<Float64Array>(&batch, 3, "metric")?;

            for i in 0..batch.num_rows() {
                if limit > 0 && records.len() >= limit {
                    return Ok(records);
                }
                records.push(StationRecord::new(
                    labels.value(i).to_string(),
                    latitudes.value(i),
                    longitudes.value(i),
                    metrics.value(i),
                ));
            }
        }

        Ok(records)
    }

    fn column<'a, T: Array + 'static>(
        batch: &'a RecordBatch,
        index: usize,
        name: &str,
    ) -> Result<&'a T> {
        batch
            .column(index)
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| ProcessingError::Config(format!("Invalid {} column type", name)))
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows: metadata.file_metadata().num_rows(),
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size: std::fs::metadata(path)?.len(),
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    fn records() -> Vec<StationRecord> {
        vec![
            StationRecord::new("A".into(), -13.010079, -38.5, 10.0),
            StationRecord::new("".into(), -13.0205, -38.6, 0.0),
            StationRecord::new("C".into(), -12.9, -38.45, 7.0),
        ]
    }

    #[test]
    fn test_write_and_read_back() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();

        writer.write_records(&records(), temp_file.path())?;

        assert_eq!(writer.read_records(temp_file.path(), 0)?, records());
        assert_eq!(writer.read_records(temp_file.path(), 1)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_row_groups_follow_size() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new().with_row_group_size(2);

        writer.write_records(&records(), temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 3);
        assert_eq!(info.row_groups, 2);
        assert!(info.summary().contains("Total rows: 3"));
        Ok(())
    }

    #[test]
    fn test_write_empty_records() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        let writer = ParquetWriter::new();

        writer.write_records(&[], temp_file.path())?;
        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 0);
        Ok(())
    }

    #[test]
    fn test_compression_options() {
        for name in ["snappy", "GZIP", "lz4", "zstd", "none"] {
            assert!(ParquetWriter::new().with_compression(name).is_ok());
        }
        assert!(ParquetWriter::new().with_compression("brotli9").is_err());
    }
}
