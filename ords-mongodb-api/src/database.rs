use async_trait::async_trait;
use testcontainers::core::{CmdWaitFor, ExecCommand, IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ContainerRequest, GenericImage, ImageExt};
use tracing::{debug, info};

use crate::config::OrdsMongoConfig;
use crate::constants::*;
use crate::error::OrdsResult;
use crate::provision::{SqlLogin, SqlOutput, SqlRunner};

/// Oracle Database XE container hosting the application schema
pub struct DatabaseContainer {
    container: ContainerAsync<GenericImage>,
    name: String,
    service: String,
}

impl DatabaseContainer {
    /// Environment consumed by the gvenzl/oracle-xe entrypoint
    pub fn environment(config: &OrdsMongoConfig) -> Vec<(String, String)> {
        vec![
            ("ORACLE_PASSWORD".to_string(), config.password().to_string()),
            ("APP_USER".to_string(), config.user().to_string()),
            ("APP_USER_PASSWORD".to_string(), config.password().to_string()),
        ]
    }

    pub fn request(config: &OrdsMongoConfig) -> ContainerRequest<GenericImage> {
        let mut request = GenericImage::new(config.database_image(), config.database_tag())
            .with_exposed_port(ORACLE_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout(DATABASE_READY_MESSAGE))
            .with_network(config.network_name())
            .with_container_name(config.database_container_name())
            .with_startup_timeout(config.database_startup_timeout());

        for (key, value) in Self::environment(config) {
            request = request.with_env_var(key, value);
        }

        request
    }

    /// Start the database and wait until it reports it is ready to use
    pub async fn start(config: &OrdsMongoConfig) -> OrdsResult<Self> {
        info!(
            image = %format!("{}:{}", config.database_image(), config.database_tag()),
            network = %config.network_name(),
            "Starting Oracle Database container"
        );

        let container = Self::request(config).start().await?;
        let database = Self {
            container,
            name: config.database_container_name().to_string(),
            service: config.database_service().to_string(),
        };

        info!(id = %database.id(), port = database.oracle_port().await?, "Oracle Database is ready");
        Ok(database)
    }

    pub fn id(&self) -> &str {
        self.container.id()
    }

    /// Hostname of the database on the shared container network
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Host-mapped port of the Oracle listener
    pub async fn oracle_port(&self) -> OrdsResult<u16> {
        Ok(self.container.get_host_port_ipv4(ORACLE_PORT.tcp()).await?)
    }

    pub async fn host(&self) -> OrdsResult<String> {
        Ok(self.container.get_host().await?.to_string())
    }

    pub fn container(&self) -> &ContainerAsync<GenericImage> {
        &self.container
    }

    pub async fn stop(self) -> OrdsResult<()> {
        info!(id = %self.id(), "Stopping Oracle Database container");
        self.container.stop().await?;
        self.container.rm().await?;
        Ok(())
    }
}

#[async_trait]
impl SqlRunner for DatabaseContainer {
    async fn run_script(&self, login: &SqlLogin, script: &str) -> OrdsResult<SqlOutput> {
        debug!(user = %login.user, service = %login.service, "Running SQL*Plus inside database container");

        // Script and connect string travel as positional parameters, never through shell parsing
        let command = ExecCommand::new([
            "sh".to_string(),
            "-c".to_string(),
            "printf '%s\\n' \"$0\" | sqlplus -S -L \"$1\"".to_string(),
            script.to_string(),
            login.connect_string(),
        ])
        .with_cmd_ready_condition(CmdWaitFor::exit());

        let mut result = self.container.exec(command).await?;
        let stdout = result.stdout_to_vec().await?;
        let stderr = result.stderr_to_vec().await?;
        let exit_code = result.exit_code().await?;

        let mut output = String::from_utf8_lossy(&stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&stderr));

        debug!(exit_code = ?exit_code, "SQL*Plus finished");
        Ok(SqlOutput { exit_code, output })
    }
}
