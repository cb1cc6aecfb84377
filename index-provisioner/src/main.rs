use std::env;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;

use index_provisioner::cli::{self, Cli};
use index_provisioner::logging::{self, LogFormat};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    logging::init(LogFormat::from_env());

    let cli = Cli::parse();

    ExitCode::from(cli::execute(&cli, |key| env::var(key).ok()).await)
}
