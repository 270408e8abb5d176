//! CPU profile: periodic samples of the process taken on a background thread

use super::{create_report, current_pid, sample_process, write_report, ProcessSample};
use crate::types::DircatError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use sysinfo::System;

/// Interval between CPU samples
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Report written when the profiler stops
#[derive(Debug, Clone, Serialize)]
pub struct CpuProfile {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub interval_ms: u64,
    pub peak_cpu_percent: f32,
    pub mean_cpu_percent: f32,
    pub samples: Vec<ProcessSample>,
}

impl CpuProfile {
    fn from_samples(
        started_at: DateTime<Utc>,
        interval: Duration,
        samples: Vec<ProcessSample>,
    ) -> Self {
        let peak_cpu_percent = samples
            .iter()
            .map(|s| s.cpu_percent)
            .fold(0.0f32, f32::max);
        let mean_cpu_percent = if samples.is_empty() {
            0.0
        } else {
            samples.iter().map(|s| s.cpu_percent).sum::<f32>() / samples.len() as f32
        };

        Self {
            started_at,
            finished_at: Utc::now(),
            interval_ms: interval.as_millis() as u64,
            peak_cpu_percent,
            mean_cpu_percent,
            samples,
        }
    }
}

/// Samples the current process until stopped, then writes a `CpuProfile`
#[derive(Debug)]
pub struct CpuProfiler {
    path: PathBuf,
    file: Option<File>,
    started_at: DateTime<Utc>,
    interval: Duration,
    stop: Arc<AtomicBool>,
    sampler: Option<JoinHandle<Vec<ProcessSample>>>,
}

impl CpuProfiler {
    /// Create the profile file and start sampling
    pub fn start(path: &Path) -> Result<Self, DircatError> {
        Self::start_with_interval(path, SAMPLE_INTERVAL)
    }

    /// Start sampling every `interval`
    pub fn start_with_interval(path: &Path, interval: Duration) -> Result<Self, DircatError> {
        let file = create_report(path, "CPU")?;
        let pid = current_pid()?;
        let stop = Arc::new(AtomicBool::new(false));

        let sampler = {
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("dircat-cpu-profile".to_string())
                .spawn(move || {
                    let mut sys = System::new();
                    let started = Instant::now();
                    let mut samples = Vec::new();
                    loop {
                        let elapsed_ms = started.elapsed().as_millis() as u64;
                        if let Some(sample) = sample_process(&mut sys, pid, elapsed_ms) {
                            samples.push(sample);
                        }
                        if stop.load(Ordering::Acquire) {
                            break;
                        }
                        thread::park_timeout(interval);
                    }
                    samples
                })
                .map_err(|e| {
                    DircatError::Profile(format!("could not start CPU profile: {}", e))
                })?
        };

        tracing::debug!(path = %path.display(), "CPU profile started");

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            started_at: Utc::now(),
            interval,
            stop,
            sampler: Some(sampler),
        })
    }

    /// Stop sampling and write the report
    pub fn stop(mut self) -> Result<CpuProfile, DircatError> {
        let samples = match self.sampler.take() {
            Some(handle) => {
                self.stop.store(true, Ordering::Release);
                handle.thread().unpark();
                handle
                    .join()
                    .map_err(|_| DircatError::Profile("CPU sampler panicked".to_string()))?
            }
            None => Vec::new(),
        };

        let profile = CpuProfile::from_samples(self.started_at, self.interval, samples);
        let file = self
            .file
            .take()
            .ok_or_else(|| DircatError::Profile("CPU profile already written".to_string()))?;
        write_report(file, &profile, "CPU")?;

        tracing::debug!(
            path = %self.path.display(),
            samples = profile.samples.len(),
            "CPU profile written"
        );
        Ok(profile)
    }
}

impl Drop for CpuProfiler {
    fn drop(&mut self) {
        if let Some(handle) = self.sampler.take() {
            self.stop.store(true, Ordering::Release);
            handle.thread().unpark();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cpu_profile_written_on_stop() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("cpu.json");

        let profiler = CpuProfiler::start_with_interval(&path, Duration::from_millis(10))
            .expect("start profiler");
        thread::sleep(Duration::from_millis(50));
        let profile = profiler.stop().expect("stop profiler");

        assert!(!profile.samples.is_empty());
        assert!(profile.finished_at >= profile.started_at);

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).expect("read profile"))
                .expect("profile is JSON");
        assert_eq!(json["interval_ms"].as_u64(), Some(10));
        assert!(json["samples"].as_array().is_some_and(|s| !s.is_empty()));
    }

    #[test]
    fn test_cpu_profile_bad_path_fails_at_start() {
        let dir = TempDir::new().expect("create tempdir");
        let path = dir.path().join("missing/cpu.json");

        let err = CpuProfiler::start(&path).expect_err("bad path must fail");
        assert!(err.to_string().contains("could not create CPU profile"));
    }

    #[test]
    fn test_mean_and_peak_from_samples() {
        let sample = |cpu| ProcessSample {
            elapsed_ms: 0,
            cpu_percent: cpu,
            resident_bytes: 0,
            virtual_bytes: 0,
        };
        let profile = CpuProfile::from_samples(
            Utc::now(),
            SAMPLE_INTERVAL,
            vec![sample(10.0), sample(30.0)],
        );
        assert_eq!(profile.peak_cpu_percent, 30.0);
        assert_eq!(profile.mean_cpu_percent, 20.0);
        assert_eq!(profile.interval_ms, 200);
    }
}
