use anyhow::{Context, Result, anyhow};
use fsprobe::config::resolve_config;
use fsprobe::logger::ProbeLogger;
use fsprobe::outln;
use fsprobe::runner::{self, RunResult};
use log::{Log, debug, error, info};

pub fn main() -> Result<()> {
    let logger = ProbeLogger::new(log::LevelFilter::Trace)
        .init()
        .map_err(|e| anyhow!("Failed to initialize logger: {}", e))?;

    let config = match resolve_config().context("Resolving config") {
        Ok(config) => config,
        Err(e) => {
            logger.set_level(log::LevelFilter::Info);
            logger.print_deferred();
            return Err(e);
        }
    };

    // Now that we've loaded the config, we can set the log level and print
    // out any deferred messages emitted while we were loading it.
    logger.set_level(config.log_level);
    logger.print_deferred();
    for line in config.to_string().lines() {
        debug!("config: {}", line);
    }

    let result = runner::run(&config);
    logger.flush();

    let result = result?;
    match &result {
        RunResult::Passed { probes } => {
            info!("All {} probe(s) passed", probes);
            outln!("PASSED");
        }
        RunResult::Failed(failure) => {
            error!(
                "Stopped at {}; remaining probes were not run",
                failure.probe
            );
            outln!("FAILED");
        }
    }
    logger.flush();
    std::process::exit(result.exit_code());
}
