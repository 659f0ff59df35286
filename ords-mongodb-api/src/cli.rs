use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::OrdsMongoConfig;
use crate::constants::*;
use crate::error::{OrdsError, OrdsResult};

#[derive(Parser, Debug)]
#[command(name = "ords-mongodb-api", version, about = "Disposable Oracle Database API for MongoDB backed by ORDS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the containers and keep them running until Ctrl-C
    Up {
        #[command(flatten)]
        stack: StackArgs,
    },
    /// Start the containers, report the version the MongoDB API announces, then stop them
    Version {
        #[command(flatten)]
        stack: StackArgs,

        /// Fail unless the reported version equals this value
        #[arg(env = "ORDS_MONGODB_API_EXPECT_VERSION", long)]
        expect: Option<String>,

        #[arg(env = "ORDS_MONGODB_API_MIN_POOL_SIZE", long, default_value_t = 1)]
        min_pool_size: u32,

        #[arg(env = "ORDS_MONGODB_API_MAX_POOL_SIZE", long, default_value_t = 5)]
        max_pool_size: u32,
    },
}

/// Parameters shared by every command that starts the stack
#[derive(Debug, Clone, Args)]
pub struct StackArgs {
    /// Application user created in the pluggable database and used by MongoDB clients
    #[arg(env = "ORDS_MONGODB_API_USER", long, default_value = DEFAULT_USER)]
    pub user: String,

    /// Password of the application user, SYS and SYSTEM
    #[arg(env = "ORDS_MONGODB_API_PASSWORD", long, default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    pub password: String,

    /// Oracle Database image as name[:tag]
    #[arg(env = "ORDS_MONGODB_API_DATABASE_IMAGE", long, default_value_t = format!("{}:{}", DEFAULT_DATABASE_IMAGE, DEFAULT_DATABASE_TAG))]
    pub database_image: String,

    /// ORDS image as name[:tag]
    #[arg(env = "ORDS_MONGODB_API_GATEWAY_IMAGE", long, default_value_t = format!("{}:{}", DEFAULT_GATEWAY_IMAGE, DEFAULT_GATEWAY_TAG))]
    pub gateway_image: String,

    /// Pluggable database service ORDS connects to
    #[arg(env = "ORDS_MONGODB_API_DATABASE_SERVICE", long, default_value = DEFAULT_DATABASE_SERVICE)]
    pub database_service: String,

    /// Seconds each container may take to report readiness
    #[arg(env = "ORDS_MONGODB_API_STARTUP_TIMEOUT_SECS", long, default_value_t = DEFAULT_STARTUP_TIMEOUT.as_secs())]
    pub startup_timeout_secs: u64,

    /// Copy ORDS output into the log
    #[arg(env = "ORDS_MONGODB_API_FORWARD_GATEWAY_LOGS", long)]
    pub forward_gateway_logs: bool,
}

impl StackArgs {
    pub fn to_config(&self) -> OrdsResult<OrdsMongoConfig> {
        let (database_image, database_tag) = split_image(&self.database_image)?;
        let (gateway_image, gateway_tag) = split_image(&self.gateway_image)?;
        let startup_timeout = Duration::from_secs(self.startup_timeout_secs);

        let config = OrdsMongoConfig::builder()
            .user(&self.user)
            .password(&self.password)
            .database_image(database_image, database_tag)
            .gateway_image(gateway_image, gateway_tag)
            .database_service(&self.database_service)
            .database_startup_timeout(startup_timeout)
            .gateway_startup_timeout(startup_timeout)
            .forward_gateway_logs(self.forward_gateway_logs)
            .build();

        config.validate()?;
        Ok(config)
    }
}

/// Splits `name[:tag]`, a colon inside a registry host (`host:5000/name`) is not a tag separator.
/// Digest references (`name@sha256:...`) are rejected.
pub fn split_image(reference: &str) -> OrdsResult<(&str, &str)> {
    if reference.contains('@') {
        return Err(OrdsError::Config(format!("Digest image references are not supported: {:?}", reference)));
    }

    let (name, tag) = match reference.rsplit_once(':') {
        Some((name, tag)) if !tag.contains('/') => (name, tag),
        _ => (reference, "latest"),
    };

    if name.is_empty() || tag.is_empty() {
        return Err(OrdsError::Config(format!("Invalid image reference: {:?}", reference)));
    }

    Ok((name, tag))
}
