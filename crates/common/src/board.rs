use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A bulletin board post, encrypted as a single JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub author: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl BoardRecord {
    /// A record stamped with the current time
    pub fn new(author: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            message: message.into(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// A record recovered from the network, with where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardEntry {
    pub height: u64,
    pub commitment: String,
    pub record: BoardRecord,
}

/// Newest first; ties broken by height, then commitment, so the order is stable
pub fn newest_first(a: &BoardEntry, b: &BoardEntry) -> Ordering {
    b.record
        .timestamp
        .cmp(&a.record.timestamp)
        .then_with(|| b.height.cmp(&a.height))
        .then_with(|| a.commitment.cmp(&b.commitment))
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::*;

    fn entry(height: u64, ts: OffsetDateTime) -> BoardEntry {
        BoardEntry {
            height,
            commitment: format!("c{}", height),
            record: BoardRecord {
                author: "a".to_string(),
                message: "m".to_string(),
                timestamp: ts,
            },
        }
    }

    #[test]
    fn test_json_shape() {
        let record = BoardRecord {
            author: "ada".to_string(),
            message: "hi".to_string(),
            timestamp: datetime!(2024-02-03 04:05:06 UTC),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["author"], "ada");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["timestamp"], "2024-02-03T04:05:06Z");

        let back: BoardRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_newest_first() {
        let mut entries = vec![
            entry(1, datetime!(2024-01-01 00:00 UTC)),
            entry(2, datetime!(2024-03-01 00:00 UTC)),
            entry(3, datetime!(2024-02-01 00:00 UTC)),
            entry(4, datetime!(2024-03-01 00:00 UTC)),
        ];
        entries.sort_by(newest_first);
        let heights: Vec<u64> = entries.iter().map(|e| e.height).collect();
        assert_eq!(heights, vec![4, 2, 3, 1]);
    }
}
