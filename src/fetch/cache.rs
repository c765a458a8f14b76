use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::process::RawTable;

/// Default time-to-live for cached fetches: one hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Time source for expiry checks. Injectable so tests can advance time by
/// hand instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used outside of tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// In-memory fetch cache keyed by URL. An entry is served until its age
/// reaches the TTL, after which `get` treats it as absent.
pub struct FetchCache {
    ttl: Duration,
    clock: Box<dyn Clock>,
    entries: Mutex<HashMap<String, (Instant, Arc<RawTable>)>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached table for `url` if it is still fresh.
    pub fn get(&self, url: &str) -> Option<Arc<RawTable>> {
        let entries = self.entries.lock().unwrap();
        let (stored_at, table) = entries.get(url)?;
        if self.clock.now().duration_since(*stored_at) < self.ttl {
            Some(Arc::clone(table))
        } else {
            None
        }
    }

    /// Store `table` under `url`, stamped with the current time. Returns the
    /// shared handle so callers can keep using the freshly inserted table.
    pub fn insert(&self, url: &str, table: RawTable) -> Arc<RawTable> {
        let table = Arc::new(table);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(url.to_string(), (self.clock.now(), Arc::clone(&table)));
        table
    }
}
