use clap::Parser;

use rulesync_cli::startup::{LoggingConfig, init_logging};
use rulesync_cli::{Cli, run};
use rulesync_redis::RuleSyncError;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging_config = LoggingConfig::from_env().verbose(cli.verbose);
    let _logging_guard = init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match run(&cli.command) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            match e.downcast_ref::<RuleSyncError>() {
                Some(err) => tracing::error!(code = err.code().code, "{:#}", e),
                None => tracing::error!("{:#}", e),
            }
            Err(e)
        }
    }
}
