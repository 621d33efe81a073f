/// Published "CSV" export of the station sheet
pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vSkRLXhmtl4pogs_exu0vZYVCtyVFksBQC-KwUkKLXQqOGRZledH9C0RgQc0cgEJbOpBNrTvZR8T1I6/pub?output=csv";

/// Fetch defaults
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Column names (after trim + lower-case)
pub const DEFAULT_LABEL_COLUMN: &str = "posto";
pub const DEFAULT_LATITUDE_COLUMN: &str = "lat";
pub const DEFAULT_LONGITUDE_COLUMN: &str = "long";
pub const DEFAULT_METRIC_COLUMN: &str = "registros";

/// Metric used when a count cell can't be parsed
pub const DEFAULT_METRIC: f64 = 0.0;

/// Decimal places shown for coordinates in marker text
pub const DISPLAY_PRECISION: usize = 6;

/// Heatmap rendering defaults
pub const DEFAULT_HEAT_RADIUS: u32 = 35;
pub const DEFAULT_HEAT_BLUR: u32 = 25;
pub const DEFAULT_HEAT_MAX_ZOOM: u32 = 17;

/// Initial map zoom
pub const DEFAULT_ZOOM: u32 = 13;

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "STATION_HEATMAP";

/// Parquet defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
