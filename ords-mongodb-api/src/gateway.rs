use std::pin::Pin;

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ContainerRequest, GenericImage, ImageExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::OrdsMongoConfig;
use crate::constants::*;
use crate::database::DatabaseContainer;
use crate::error::OrdsResult;

/// ORDS container serving the MongoDB API on top of the database
pub struct GatewayContainer {
    container: ContainerAsync<GenericImage>,
    log_forwarder: Option<LogForwarder>,
}

impl GatewayContainer {
    /// Environment the ORDS entrypoint uses to install itself into `database_host`
    pub fn environment(config: &OrdsMongoConfig, database_host: &str) -> Vec<(String, String)> {
        vec![
            ("DB_HOSTNAME".to_string(), database_host.to_string()),
            ("DB_SERVICE".to_string(), config.database_service().to_string()),
            ("DB_PORT".to_string(), ORACLE_PORT.to_string()),
            ("SYS_PASSWORD".to_string(), config.password().to_string()),
        ]
    }

    pub fn request(config: &OrdsMongoConfig, database_host: &str) -> ContainerRequest<GenericImage> {
        let mut request = GenericImage::new(config.gateway_image(), config.gateway_tag())
            .with_exposed_port(MONGODB_API_PORT.tcp())
            .with_wait_for(WaitFor::message_on_either_std(GATEWAY_READY_MESSAGE))
            .with_network(config.network_name())
            .with_startup_timeout(config.gateway_startup_timeout());

        for (key, value) in Self::environment(config, database_host) {
            request = request.with_env_var(key, value);
        }

        request
    }

    /// Start ORDS against an already running database and wait for its initialization message
    pub async fn start(config: &OrdsMongoConfig, database: &DatabaseContainer) -> OrdsResult<Self> {
        info!(
            image = %format!("{}:{}", config.gateway_image(), config.gateway_tag()),
            database = %database.name(),
            service = %config.database_service(),
            "Starting ORDS container"
        );

        let container = Self::request(config, database.name()).start().await?;

        let log_forwarder = config.forward_gateway_logs().then(|| forward_logs(&container));
        let gateway = Self { container, log_forwarder };

        info!(id = %gateway.id(), port = gateway.mongodb_port().await?, "ORDS MongoDB API is ready");
        Ok(gateway)
    }

    pub fn id(&self) -> &str {
        self.container.id()
    }

    /// Host-mapped port of the MongoDB API
    pub async fn mongodb_port(&self) -> OrdsResult<u16> {
        Ok(self.container.get_host_port_ipv4(MONGODB_API_PORT.tcp()).await?)
    }

    pub async fn host(&self) -> OrdsResult<String> {
        Ok(self.container.get_host().await?.to_string())
    }

    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }

    pub async fn stop(self) -> OrdsResult<()> {
        info!(id = %self.id(), "Stopping ORDS container");
        drop(self.log_forwarder);
        self.container.stop().await?;
        self.container.rm().await?;
        Ok(())
    }
}

/// Background tasks copying container output into the tracing log, aborted when dropped
struct LogForwarder(Vec<JoinHandle<()>>);

impl Drop for LogForwarder {
    fn drop(&mut self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

fn forward_logs(container: &ContainerAsync<GenericImage>) -> LogForwarder {
    let id = container.id().to_string();
    LogForwarder(vec![
        forward_stream(id.clone(), "stdout", container.stdout(true)),
        forward_stream(id, "stderr", container.stderr(true)),
    ])
}

fn forward_stream(
    id: String,
    stream: &'static str,
    reader: Pin<Box<dyn AsyncBufRead + Send>>,
) -> JoinHandle<()> {
    let mut lines = reader.lines();
    tokio::spawn(async move {
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: "ords_mongodb_api::gateway::logs", container = %id, stream, "{}", line);
        }
    })
}
