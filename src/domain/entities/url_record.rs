//! URL record entity: one shortened URL and the sequence id it was assigned.

/// A persisted mapping from an original URL to its sequence id.
///
/// Records are append-only. Once inserted they are never changed, so a record
/// read at any time is the record forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub original_url: String,
    pub sequence_id: u64,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(original_url: impl Into<String>, sequence_id: u64) -> Self {
        Self {
            original_url: original_url.into(),
            sequence_id,
        }
    }

    /// Returns the base-36 key this record is reachable under.
    pub fn key(&self) -> String {
        crate::utils::key_codec::encode(self.sequence_id)
    }
}

/// Input data for inserting a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub sequence_id: u64,
}

impl From<NewUrlRecord> for UrlRecord {
    fn from(new_record: NewUrlRecord) -> Self {
        Self {
            original_url: new_record.original_url,
            sequence_id: new_record.sequence_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = UrlRecord::new("https://example.com/a", 0);

        assert_eq!(record.original_url, "https://example.com/a");
        assert_eq!(record.sequence_id, 0);
        assert_eq!(record.key(), "0");
    }

    #[test]
    fn test_record_key_is_base36() {
        assert_eq!(UrlRecord::new("https://example.com", 1295).key(), "zz");
    }

    #[test]
    fn test_new_record_conversion() {
        let new_record = NewUrlRecord {
            original_url: "https://rust-lang.org".to_string(),
            sequence_id: 42,
        };

        let record = UrlRecord::from(new_record);
        assert_eq!(record, UrlRecord::new("https://rust-lang.org", 42));
    }
}
