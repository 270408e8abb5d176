use clap::Parser;
use dircat::config::Cli;
use dircat::ui::ConsoleReporter;
use dircat::Config;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    dircat::logging::init_logging(cli.verbose)?;

    // Convert CLI args to Config - this validates immediately
    let config = match Config::try_from(cli) {
        Ok(config) => config,
        Err(err) => {
            ConsoleReporter::stdout(false).error(&err);
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    match dircat::commands::concat::run(&config) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        // Already printed by the command
        Err(err) => Ok(ExitCode::from(err.exit_code())),
    }
}
