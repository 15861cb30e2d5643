//! Resource accounting for drill requests

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Resources consumed by one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Bytes transferred from the raster source, at its native sample size
    pub bytes_read: i64,
    /// User CPU time, process-wide, in nanoseconds
    pub user_time_nanos: i64,
    /// System CPU time, process-wide, in nanoseconds
    pub sys_time_nanos: i64,
}

impl AddAssign for RunMetrics {
    fn add_assign(&mut self, other: Self) {
        self.bytes_read += other.bytes_read;
        self.user_time_nanos += other.user_time_nanos;
        self.sys_time_nanos += other.sys_time_nanos;
    }
}

/// Snapshot of the process CPU clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceUsage {
    pub user_nanos: i64,
    pub sys_nanos: i64,
}

impl ResourceUsage {
    /// Current user and system CPU time of this process
    #[cfg(unix)]
    pub fn now() -> Self {
        let mut usage = std::mem::MaybeUninit::<libc::rusage>::zeroed();
        // SAFETY: getrusage only writes into the struct we hand it
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
        if rc != 0 {
            return Self::default();
        }
        // SAFETY: zero-initialised and filled in by a successful call
        let usage = unsafe { usage.assume_init() };
        Self {
            user_nanos: timeval_nanos(&usage.ru_utime),
            sys_nanos: timeval_nanos(&usage.ru_stime),
        }
    }

    /// CPU clocks are not sampled on this platform
    #[cfg(not(unix))]
    pub fn now() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
fn timeval_nanos(tv: &libc::timeval) -> i64 {
    tv.tv_sec as i64 * 1_000_000_000 + tv.tv_usec as i64 * 1_000
}

/// Accumulates the metrics of one request.
///
/// CPU clocks are read when recording starts and when it finishes; bytes are
/// added as each stride group is read.
#[derive(Debug)]
pub struct MetricsRecorder {
    start: ResourceUsage,
    bytes_read: i64,
}

impl MetricsRecorder {
    pub fn start() -> Self {
        Self {
            start: ResourceUsage::now(),
            bytes_read: 0,
        }
    }

    pub fn add_bytes(&mut self, bytes: usize) {
        self.bytes_read = self
            .bytes_read
            .saturating_add(i64::try_from(bytes).unwrap_or(i64::MAX));
    }

    pub fn bytes_read(&self) -> i64 {
        self.bytes_read
    }

    pub fn finish(self) -> RunMetrics {
        let end = ResourceUsage::now();
        RunMetrics {
            bytes_read: self.bytes_read,
            user_time_nanos: (end.user_nanos - self.start.user_nanos).max(0),
            sys_time_nanos: (end.sys_nanos - self.start.sys_nanos).max(0),
        }
    }
}
