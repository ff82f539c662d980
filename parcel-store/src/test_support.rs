//! Fixtures for tests that run against a shared database
//!
//! Tests that reuse one database file need client ids that no earlier run
//! has used. Each [`ClientIdGenerator`] owns its own RNG instead of relying
//! on process-wide state.

use crate::parcel::{Parcel, ParcelStatus};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// Upper bound (exclusive) for generated client ids
pub const MAX_CLIENT_ID: i64 = 10_000_000;

/// Hands out client ids that are distinct within one generator
pub struct ClientIdGenerator {
    rng: StdRng,
    issued: HashSet<i64>,
}

impl ClientIdGenerator {
    /// Generator seeded from the OS, different on every run
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            issued: HashSet::new(),
        }
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    pub fn next_id(&mut self) -> i64 {
        loop {
            let id = self.rng.random_range(1..MAX_CLIENT_ID);
            if self.issued.insert(id) {
                return id;
            }
        }
    }
}

/// Registered parcel for client 1000 at address "test", stamped now
pub fn sample_parcel() -> Parcel {
    Parcel::registered(1000, "test")
}

/// Registered parcel with a fixed timestamp, for exact comparisons
pub fn fixed_parcel(client: i64) -> Parcel {
    Parcel {
        number: 0,
        client,
        status: ParcelStatus::Registered,
        address: "test".to_string(),
        created_at: "2024-01-01T00:00:00Z".to_string(),
    }
}

/// Log sink shared between the subscriber and the test that reads it
#[cfg(test)]
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
struct CapturedLogsWriter(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogsWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedLogsWriter(self.0.clone())
    }
}

#[cfg(test)]
impl std::io::Write for CapturedLogsWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| std::io::Error::other("log buffer poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a DEBUG-level subscriber and return what it logged.
#[cfg(test)]
pub(crate) fn capture_logs(f: impl FnOnce()) -> String {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = logs.0.lock().map(|b| b.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}
