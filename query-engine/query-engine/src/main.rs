#[macro_use]
extern crate tracing;

use join_engine::{cli::CliCommand, error::JoinEngineError, logger::Logger, opt::JoinEngineOpt};
use std::{error::Error, process};
use structopt::StructOpt;

type AnyError = Box<dyn Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), AnyError> {
    return main().await.map_err(|err| {
        info!("Encountered error during initialization:");

        if let Err(render_error) = err.render_as_json() {
            eprintln!("Failed to render the error: {render_error}");
        }

        process::exit(1)
    });

    async fn main() -> Result<(), JoinEngineError> {
        let opts = JoinEngineOpt::from_args();

        let mut logger = Logger::new();
        logger.log_format(opts.log_format());
        logger.install()?;

        CliCommand::from_opt(&opts)?.execute().await
    }
}
