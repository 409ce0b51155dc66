//! Identifier generation for jobs and applications.

use chrono::Utc;
use uuid::Uuid;

/// Issues record identifiers. Implementations must never repeat an id.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> String;

    /// Called with every id found in loaded data before the first `next_id`.
    fn observe(&mut self, _existing: &str) {}
}

/// Millisecond-timestamp ids, bumped past the last issued value when the
/// clock has not advanced (or went backwards). Once the numeric range is
/// used up (a loaded id at `i64::MAX`) it issues UUIDs, which cannot clash
/// with numeric ids.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator {
    last: i64,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self, now_millis: i64) -> Option<i64> {
        self.last = if now_millis > self.last { now_millis } else { self.last.checked_add(1)? };
        Some(self.last)
    }
}

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&mut self) -> String {
        match self.issue(Utc::now().timestamp_millis()) {
            Some(n) => n.to_string(),
            None => {
                log::warn!("[ids] Timestamp ids exhausted at {}, issuing a UUID", self.last);
                Uuid::new_v4().to_string()
            }
        }
    }

    fn observe(&mut self, existing: &str) {
        if let Ok(n) = existing.parse::<i64>() {
            self.last = self.last.max(n);
        }
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Timestamp,
    Uuid,
}

impl IdStrategy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Some(IdStrategy::Timestamp),
            "uuid" => Some(IdStrategy::Uuid),
            _ => None,
        }
    }

    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Timestamp => Box::new(TimestampIdGenerator::new()),
            IdStrategy::Uuid => Box::new(UuidIdGenerator),
        }
    }
}
