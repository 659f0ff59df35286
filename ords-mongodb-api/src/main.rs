use anyhow::Context as _;
use clap::Parser as _;
use dotenvy::dotenv;
use ords_mongodb_api::cli::{Cli, Commands, StackArgs};
use ords_mongodb_api::logging::init_logging;
use ords_mongodb_api::{diagnostics, OrdsMongoDbApiContainer};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Up { stack } => run_up(&stack).await,
        Commands::Version { stack, expect, min_pool_size, max_pool_size } => {
            run_version(&stack, expect.as_deref(), min_pool_size, max_pool_size).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, error_chain = ?e, "ORDS MongoDB API command failed");
        std::process::exit(1);
    }
}

async fn run_up(stack: &StackArgs) -> anyhow::Result<()> {
    let config = stack.to_config()?;
    let container = OrdsMongoDbApiContainer::start(config).await.context("Failed to start ORDS MongoDB API")?;

    info!(
        connection_string = %container.endpoint().redacted_connection_string()?,
        oracle_port = container.oracle_port().await?,
        service = %container.database_service(),
        "ORDS MongoDB API is up, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await.context("Failed to listen for ctrl+c")?;

    container.stop().await?;
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn run_version(
    stack: &StackArgs,
    expect: Option<&str>,
    min_pool_size: u32,
    max_pool_size: u32,
) -> anyhow::Result<()> {
    let config = stack.to_config()?;
    let container = OrdsMongoDbApiContainer::start(config).await.context("Failed to start ORDS MongoDB API")?;

    let outcome = async {
        let client = container.client(min_pool_size, max_pool_size)?;
        let database = container.database(&client);
        let version = diagnostics::server_version(&database).await?;
        println!("{}", version);

        if let Some(expected) = expect {
            diagnostics::check_version(expected, &version)?;
        }
        anyhow::Ok(())
    }
    .await;

    container.stop().await?;
    outcome
}
