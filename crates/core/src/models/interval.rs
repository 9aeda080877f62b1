use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time range `[start, end)`.
///
/// Construction through [`TimeInterval::new`] guarantees `start < end`; busy
/// blocks that fail that check are dropped before they reach any algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Parses an RFC 3339 pair, rejecting unparsable or empty ranges.
    pub fn parse_rfc3339(start: &str, end: &str) -> Option<Self> {
        let start = DateTime::parse_from_rfc3339(start.trim()).ok()?;
        let end = DateTime::parse_from_rfc3339(end.trim()).ok()?;
        Self::new(start.with_timezone(&Utc), end.with_timezone(&Utc))
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self, other)
    }
}

/// Half-open overlap test: `a.start < b.end && b.start < a.end`.
///
/// Touching intervals (`a.end == b.start`) do not overlap.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> bool {
    a.start < b.end && b.start < a.end
}
