//! Main concat command

use crate::executor::{run_pipeline, CopyStats, PipelineEvent};
use crate::profile::{write_memory_profile, CpuProfiler};
use crate::scanner::list_directory;
use crate::types::DircatError;
use crate::ui::ConsoleReporter;
use crate::Config;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Run the concat operation, reporting to stdout
pub fn run(config: &Config) -> Result<CopyStats, DircatError> {
    let reporter = ConsoleReporter::stdout(config.quiet);
    run_with_reporter(config, &reporter)
}

/// Run the concat operation, reporting through `reporter`
///
/// Exactly one `error:` line is printed for a failed run. Copy errors are
/// printed by the reporter as the `Failed` event arrives; any other error is
/// printed here once the profiles have been written. Profiles that were
/// requested are written whatever the copy outcome. A profiling failure fails
/// an otherwise successful run; after a copy failure it is only logged and
/// the copy error is returned.
pub fn run_with_reporter<W: Write + Send>(
    config: &Config,
    reporter: &ConsoleReporter<W>,
) -> Result<CopyStats, DircatError> {
    let cpu_profiler = match &config.cpu_profile {
        Some(path) => match CpuProfiler::start(path) {
            Ok(profiler) => Some(profiler),
            Err(err) => {
                reporter.error(&err);
                return Err(err);
            }
        },
        None => None,
    };

    let concatenated = concat(config, reporter);
    let profiled = write_profiles(cpu_profiler, config);

    let result = match (concatenated, profiled) {
        (Ok(stats), Ok(())) => Ok(stats),
        (Ok(_), Err(profile_err)) => Err(profile_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(profile_err)) => {
            tracing::warn!(error = %profile_err, "profile not written after failed run");
            Err(err)
        }
    };

    match &result {
        Ok(stats) => reporter.summary(stats, &config.output),
        Err(err) if err.is_copy_error() => {}
        Err(err) => reporter.error(err),
    }
    result
}

/// Stop the CPU profiler and write the memory profile, keeping the first
/// failure. Both are attempted even if the first one fails.
fn write_profiles(cpu_profiler: Option<CpuProfiler>, config: &Config) -> Result<(), DircatError> {
    let cpu = cpu_profiler.map_or(Ok(()), |profiler| profiler.stop().map(|_| ()));
    let memory = match &config.mem_profile {
        Some(path) => write_memory_profile(path).map(|_| ()),
        None => Ok(()),
    };
    cpu.and(memory)
}

/// List the source, create the output, run the pipeline, close the output.
fn concat<W: Write + Send>(
    config: &Config,
    reporter: &ConsoleReporter<W>,
) -> Result<CopyStats, DircatError> {
    let entries = list_directory(&config.source, config)?;

    let file = File::create(&config.output).map_err(|source| DircatError::OutputCreate {
        path: config.output.clone(),
        source,
    })?;
    let mut sink = BufWriter::with_capacity(config.buffer_size, file);

    tracing::debug!(
        source = %config.source.display(),
        output = %config.output.display(),
        entries = entries.len(),
        "starting pipeline"
    );

    let on_event = |event: &PipelineEvent<'_>| reporter.handle(event);
    let result = run_pipeline(entries, &mut sink, config.buffer_size, Some(&on_event));

    // Flush on both paths so bytes from files copied before a failure land
    // in the output. The file is closed when `sink` drops.
    let flushed = sink.flush().map_err(|source| DircatError::OutputFlush {
        path: config.output.clone(),
        source,
    });

    let stats = result?;
    flushed?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(source: &Path, output: &Path) -> Config {
        Config {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            ..Config::default()
        }
    }

    fn output_lines(reporter: ConsoleReporter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(reporter.into_inner())
            .expect("utf8 output")
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_concat_prints_discovered_and_progress_lines() {
        let src = TempDir::new().expect("create src tempdir");
        let out_dir = TempDir::new().expect("create out tempdir");
        fs::write(src.path().join("a.txt"), "1").expect("write a");
        fs::write(src.path().join("b.txt"), "2").expect("write b");
        let output = out_dir.path().join("out.txt");

        let reporter = ConsoleReporter::new(Vec::new(), false);
        let stats = run_with_reporter(&config_for(src.path(), &output), &reporter)
            .expect("concat should succeed");
        assert_eq!(stats.files_copied, 2);

        let lines = output_lines(reporter);
        let progress: Vec<_> = lines
            .iter()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .cloned()
            .collect();
        assert_eq!(
            progress,
            vec![
                format!("1: {}", src.path().join("a.txt").display()),
                format!("2: {}", src.path().join("b.txt").display()),
            ]
        );
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("discovered ")).count(),
            2
        );
        assert!(lines
            .last()
            .is_some_and(|l| l.starts_with("Concatenated 2 file(s)")));
        assert_eq!(fs::read(&output).expect("read output"), b"12");
    }

    #[test]
    fn test_concat_missing_source_does_not_create_output() {
        let root = TempDir::new().expect("create root tempdir");
        let output = root.path().join("out.txt");

        let reporter = ConsoleReporter::new(Vec::new(), false);
        let err = run_with_reporter(&config_for(&root.path().join("missing"), &output), &reporter)
            .expect_err("missing source must fail");

        assert!(err.is_setup_error());
        assert!(!output.exists());
        let lines = output_lines(reporter);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("error: read directory"));
    }

    #[test]
    fn test_concat_output_create_failure() {
        let src = TempDir::new().expect("create src tempdir");
        let root = TempDir::new().expect("create root tempdir");
        let output = root.path().join("no/such/dir/out.txt");

        let reporter = ConsoleReporter::new(Vec::new(), true);
        let err = run_with_reporter(&config_for(src.path(), &output), &reporter)
            .expect_err("output create must fail");
        assert!(matches!(err, DircatError::OutputCreate { .. }));
    }

    #[test]
    fn test_concat_writes_requested_profiles() {
        let src = TempDir::new().expect("create src tempdir");
        let out_dir = TempDir::new().expect("create out tempdir");
        fs::write(src.path().join("a.txt"), "payload").expect("write a");

        let mut config = config_for(src.path(), &out_dir.path().join("out.txt"));
        config.cpu_profile = Some(out_dir.path().join("cpu.json"));
        config.mem_profile = Some(out_dir.path().join("mem.json"));

        let reporter = ConsoleReporter::new(Vec::new(), true);
        run_with_reporter(&config, &reporter).expect("concat should succeed");

        assert!(out_dir.path().join("cpu.json").exists());
        assert!(out_dir.path().join("mem.json").exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_concat_copy_failure_wins_over_profile_failure() {
        let src = TempDir::new().expect("create src tempdir");
        let out_dir = TempDir::new().expect("create out tempdir");
        fs::write(src.path().join("a.txt"), "A").expect("write a");
        std::os::unix::fs::symlink(src.path().join("nowhere"), src.path().join("b.txt"))
            .expect("create dangling symlink");

        let output = out_dir.path().join("out.txt");
        let mut config = config_for(src.path(), &output);
        config.mem_profile = Some(out_dir.path().join("missing/mem.json"));

        let reporter = ConsoleReporter::new(Vec::new(), true);
        let err = run_with_reporter(&config, &reporter).expect_err("b.txt cannot be opened");

        assert!(matches!(err, DircatError::Open { .. }));
        assert_eq!(err.path(), Some(src.path().join("b.txt").as_path()));
        assert_eq!(fs::read(&output).expect("read output"), b"A");

        let lines = output_lines(reporter);
        let errors: Vec<_> = lines.iter().filter(|l| l.starts_with("error:")).collect();
        assert_eq!(errors.len(), 1, "lines: {lines:?}");
        assert!(errors[0].starts_with("error: open"));
        assert_eq!(lines.last(), Some(errors[0]));
    }

    #[test]
    fn test_concat_profile_failure_is_fatal() {
        let src = TempDir::new().expect("create src tempdir");
        let out_dir = TempDir::new().expect("create out tempdir");
        let mut config = config_for(src.path(), &out_dir.path().join("out.txt"));
        config.mem_profile = Some(out_dir.path().join("missing/mem.json"));

        let reporter = ConsoleReporter::new(Vec::new(), true);
        let err = run_with_reporter(&config, &reporter).expect_err("profile failure is fatal");
        assert!(matches!(err, DircatError::Profile(_)));
        // The concat itself completed before the profile was written.
        assert!(out_dir.path().join("out.txt").exists());
        let lines = output_lines(reporter);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("error: Profiling error"));
    }
}
