use clap::Parser;
use tenant_authz::{cli::CliArgs, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.load_config()?;
    logging::init_logging(&config.logging)?;
    server::run(config).await
}
