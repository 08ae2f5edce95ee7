//! Shared helpers for integration tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use logerr::BufferWriter;
use serde_json::Value;

/// Parse every captured line as JSON.
pub fn json_lines(buf: &BufferWriter) -> Vec<Value> {
    buf.lines()
        .iter()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad line {l:?}: {e}")))
        .collect()
}

/// Serializes tests that touch the process-wide logger.
#[allow(dead_code)]
pub fn global_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}
