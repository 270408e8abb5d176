//! Memory profile: one snapshot of the process after the run

use super::{create_report, current_pid, sample_process, write_report};
use crate::types::DircatError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use sysinfo::System;

/// Snapshot written by `write_memory_profile`
#[derive(Debug, Clone, Serialize)]
pub struct MemoryProfile {
    pub captured_at: DateTime<Utc>,
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    pub system_total_bytes: u64,
    pub system_available_bytes: u64,
}

/// Capture the process memory counters and write them to `path`
pub fn write_memory_profile(path: &Path) -> Result<MemoryProfile, DircatError> {
    let file = create_report(path, "memory")?;
    let pid = current_pid()?;

    let mut sys = System::new();
    sys.refresh_memory();
    let sample = sample_process(&mut sys, pid, 0).ok_or_else(|| {
        DircatError::Profile("could not write memory profile: process not found".to_string())
    })?;

    let profile = MemoryProfile {
        captured_at: Utc::now(),
        resident_bytes: sample.resident_bytes,
        virtual_bytes: sample.virtual_bytes,
        system_total_bytes: sys.total_memory(),
        system_available_bytes: sys.available_memory(),
    };
    write_report(file, &profile, "memory")?;

    tracing::debug!(path = %path.display(), "memory profile written");
    Ok(profile)
}
