use serde::{Deserialize, Serialize};

/// Trim and lower-case a column name the same way for headers and lookups.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// One sheet row: column name -> raw cell text, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Cell text for a normalized column name. Duplicate headers resolve to
    /// the first occurrence.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A freshly ingested sheet: normalized headers plus rows keyed by them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RowSet {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("  Lat "), "lat");
        assert_eq!(normalize_column_name("REGISTROS"), "registros");
        assert_eq!(normalize_column_name("Nome Posto"), "nome posto");
    }

    #[test]
    fn test_get_first_duplicate() {
        let r = row(&[("lat", "1"), ("long", "2"), ("lat", "3")]);
        assert_eq!(r.get("lat"), Some("1"));
        assert_eq!(r.get("long"), Some("2"));
        assert_eq!(r.get("posto"), None);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn test_row_set_columns() {
        let set = RowSet::new(vec!["posto".into(), "lat".into()], vec![]);
        assert!(set.has_column("lat"));
        assert!(!set.has_column("long"));
        assert!(set.is_empty());
    }
}
