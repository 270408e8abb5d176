//! Optional CPU and memory profiling
//!
//! Both reports describe the dircat process itself and are written as JSON.
//! A report failure fails a run that otherwise succeeded; after a copy
//! failure it is only logged.

mod cpu;
mod memory;

pub use cpu::{CpuProfile, CpuProfiler};
pub use memory::{write_memory_profile, MemoryProfile};

use crate::types::DircatError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// One observation of the current process
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProcessSample {
    /// Milliseconds since the profiler started
    pub elapsed_ms: u64,
    /// CPU usage in percent (may exceed 100 on multi-core hosts)
    pub cpu_percent: f32,
    /// Resident set size in bytes
    pub resident_bytes: u64,
    /// Virtual memory size in bytes
    pub virtual_bytes: u64,
}

fn current_pid() -> Result<Pid, DircatError> {
    sysinfo::get_current_pid()
        .map_err(|e| DircatError::Profile(format!("could not resolve current process: {}", e)))
}

/// Refresh only `pid` in `sys` and read its counters.
fn sample_process(sys: &mut System, pid: Pid, elapsed_ms: u64) -> Option<ProcessSample> {
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        ProcessRefreshKind::new().with_cpu().with_memory(),
    );
    sys.process(pid).map(|process| ProcessSample {
        elapsed_ms,
        cpu_percent: process.cpu_usage(),
        resident_bytes: process.memory(),
        virtual_bytes: process.virtual_memory(),
    })
}

/// Create the report file up front so a bad path fails before the run.
fn create_report(path: &Path, what: &str) -> Result<File, DircatError> {
    File::create(path).map_err(|e| {
        DircatError::Profile(format!(
            "could not create {} profile {}: {}",
            what,
            path.display(),
            e
        ))
    })
}

fn write_report<T: Serialize>(file: File, report: &T, what: &str) -> Result<(), DircatError> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| DircatError::Profile(format!("could not write {} profile: {}", what, e)))?;
    writer
        .flush()
        .map_err(|e| DircatError::Profile(format!("could not write {} profile: {}", what, e)))
}
