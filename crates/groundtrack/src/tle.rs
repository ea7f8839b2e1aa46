//! Named two-line element records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::propagator::{GravityModel, SgpPropagator};

/// A TLE stored under a user-chosen name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TleRecord {
    /// Row identifier (assigned by storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Unique name, e.g. `ISS`.
    pub name: String,

    /// First element line.
    pub line1: String,

    /// Second element line.
    pub line2: String,

    /// BLAKE3 hash of both lines, used to detect unchanged updates.
    pub content_hash: String,

    /// When the record was first stored.
    pub created_at: DateTime<Utc>,

    /// When the lines last changed.
    pub updated_at: DateTime<Utc>,
}

impl TleRecord {
    /// Create a record, trimming the lines and hashing them.
    #[must_use]
    pub fn new(name: impl Into<String>, line1: &str, line2: &str) -> Self {
        let line1 = line1.trim().to_string();
        let line2 = line2.trim().to_string();
        let content_hash = Self::compute_hash(&line1, &line2);
        let now = Utc::now();
        Self {
            id: None,
            name: name.into(),
            line1,
            line2,
            content_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Compute the BLAKE3 hash of a pair of element lines.
    #[must_use]
    pub fn compute_hash(line1: &str, line2: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(line1.as_bytes());
        hasher.update(b"\n");
        hasher.update(line2.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    /// Build a propagator from this record.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored lines do not parse or cannot seed SGP4.
    pub fn propagator(&self, gravity: GravityModel) -> Result<SgpPropagator> {
        SgpPropagator::from_tle(Some(self.name.clone()), &self.line1, &self.line2, gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE1: &str = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
    const LINE2: &str = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

    #[test]
    fn test_new_trims_and_hashes() {
        let record = TleRecord::new("ISS", &format!("  {LINE1}\n"), LINE2);
        assert!(record.id.is_none());
        assert_eq!(record.line1, LINE1);
        assert_eq!(record.content_hash, TleRecord::compute_hash(LINE1, LINE2));
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_hash_depends_on_both_lines() {
        let a = TleRecord::compute_hash(LINE1, LINE2);
        let b = TleRecord::compute_hash(LINE2, LINE1);
        assert_ne!(a, b);
        assert_eq!(a, TleRecord::compute_hash(LINE1, LINE2));
    }

    #[test]
    fn test_propagator_from_record() {
        let record = TleRecord::new("ISS", LINE1, LINE2);
        let propagator = record.propagator(GravityModel::Wgs84).unwrap();
        assert_eq!(propagator.object_name(), Some("ISS"));
    }

    #[test]
    fn test_serialization_skips_missing_id() {
        let record = TleRecord::new("ISS", LINE1, LINE2);
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"id\""));
        let back: TleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
