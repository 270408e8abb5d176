//! Configuration management

use crate::types::DircatError;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory read when neither the CLI nor a config file names one
pub const DEFAULT_SOURCE_DIR: &str = "testdata";

/// Output file written when neither the CLI nor a config file names one
pub const DEFAULT_OUTPUT_FILE: &str = "out.txt";

/// Copy buffer size (128KB)
pub const DEFAULT_BUFFER_SIZE: usize = 128 * 1024;

/// dircat - concatenate every file in a directory into one output file
#[derive(Parser, Debug, Default)]
#[command(name = "dircat", version, about, long_about = None)]
pub struct Cli {
    /// Directory whose entries are concatenated [default: testdata]
    #[arg(short = 's', long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Output file, truncated on every run [default: out.txt]
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write cpu profile to `file`
    #[arg(long, value_name = "file")]
    pub cpuprofile: Option<PathBuf>,

    /// Write memory profile to `file`
    #[arg(long, value_name = "file")]
    pub memprofile: Option<PathBuf>,

    /// Load defaults from a TOML config file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip directory entries matching this glob (repeatable)
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Copy buffer size in bytes
    #[arg(long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Only print progress and error lines
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Optional TOML config file; every field is a default the CLI can override
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub buffer_size: Option<usize>,
    pub exclude: Vec<String>,
    pub quiet: Option<bool>,
}

impl ConfigFile {
    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self, DircatError> {
        let text = fs::read_to_string(path).map_err(|e| {
            DircatError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::parse(&text)
            .map_err(|e| DircatError::Config(format!("Invalid config file {:?}: {}", path, e)))
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Run configuration for dircat
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose entries are concatenated
    pub source: PathBuf,

    /// Output file (created/truncated per run)
    pub output: PathBuf,

    /// CPU profile destination, None = disabled
    pub cpu_profile: Option<PathBuf>,

    /// Memory profile destination, None = disabled
    pub mem_profile: Option<PathBuf>,

    /// Exclude patterns (globs matched against entry names)
    pub exclude_patterns: Vec<String>,

    /// Streaming copy buffer size in bytes
    pub buffer_size: usize,

    /// Suppress discovered lines and the summary
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_SOURCE_DIR),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            cpu_profile: None,
            mem_profile: None,
            exclude_patterns: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            quiet: false,
        }
    }
}

impl Config {
    /// Validate configuration
    ///
    /// The source directory itself is not checked here: a listing failure is
    /// reported by the scanner with its own error.
    pub fn validate(&self) -> Result<(), DircatError> {
        if self.source.as_os_str().is_empty() {
            return Err(DircatError::Config(
                "Source directory cannot be empty".to_string(),
            ));
        }

        if self.output.as_os_str().is_empty() {
            return Err(DircatError::Config("Output file cannot be empty".to_string()));
        }

        if self.buffer_size == 0 {
            return Err(DircatError::Config(
                "Buffer size must be greater than zero".to_string(),
            ));
        }

        if output_inside_source(&self.source, &self.output) {
            return Err(DircatError::Config(format!(
                "Output file {:?} cannot be inside the source directory {:?}",
                self.output, self.source
            )));
        }

        Ok(())
    }
}

/// Whether `output` would be listed as an entry of `source`.
fn output_inside_source(source: &Path, output: &Path) -> bool {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(source), fs::canonicalize(parent)) {
        (Ok(source), Ok(parent)) => source == parent,
        // Nothing to compare yet; listing or output creation reports the failure.
        _ => false,
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

impl TryFrom<Cli> for Config {
    type Error = DircatError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let defaults = Config::default();
        let mut exclude_patterns = file.exclude;
        exclude_patterns.extend(cli.exclude);

        let config = Config {
            source: non_empty(cli.source)
                .or(file.source)
                .unwrap_or(defaults.source),
            output: non_empty(cli.output)
                .or(file.output)
                .unwrap_or(defaults.output),
            cpu_profile: non_empty(cli.cpuprofile),
            mem_profile: non_empty(cli.memprofile),
            exclude_patterns,
            buffer_size: cli
                .buffer_size
                .or(file.buffer_size)
                .unwrap_or(defaults.buffer_size),
            quiet: cli.quiet || file.quiet.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}
