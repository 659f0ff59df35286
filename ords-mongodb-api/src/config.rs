use std::time::Duration;

use crate::constants::*;
use crate::error::OrdsResult;
use crate::provision::{validate_identifier, validate_password};
use crate::utils::{available_parallelism, unique_name};

// Final immutable configuration
#[derive(Debug, Clone)]
pub struct OrdsMongoConfig {
    database_image: String,
    database_tag: String,
    gateway_image: String,
    gateway_tag: String,

    user: String,
    password: String,
    database_service: String,

    database_container_name: String,
    network_name: String,
    database_startup_timeout: Duration,
    gateway_startup_timeout: Duration,
    forward_gateway_logs: bool,

    // Client configs
    connect_timeout: Duration,
    max_idle_time: Duration,
    max_connecting: u32,
}

impl Default for OrdsMongoConfig {
    fn default() -> Self {
        Self {
            database_image: DEFAULT_DATABASE_IMAGE.to_string(),
            database_tag: DEFAULT_DATABASE_TAG.to_string(),
            gateway_image: DEFAULT_GATEWAY_IMAGE.to_string(),
            gateway_tag: DEFAULT_GATEWAY_TAG.to_string(),

            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database_service: DEFAULT_DATABASE_SERVICE.to_string(),

            database_container_name: unique_name(DEFAULT_DATABASE_CONTAINER_NAME),
            network_name: unique_name(DEFAULT_NETWORK_NAME),
            database_startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            gateway_startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            forward_gateway_logs: false,

            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_idle_time: DEFAULT_MAX_IDLE_TIME,
            max_connecting: available_parallelism(),
        }
    }
}

impl OrdsMongoConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for the given application user, the password is shared with SYS/SYSTEM
    pub fn for_user(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::builder().user(user).password(password).build()
    }

    /// Create a builder for OrdsMongoConfig
    pub fn builder() -> OrdsMongoConfigBuilder {
        OrdsMongoConfigBuilder::new()
    }

    /// Get the Oracle Database image name
    pub fn database_image(&self) -> &str {
        &self.database_image
    }

    /// Get the Oracle Database image tag
    pub fn database_tag(&self) -> &str {
        &self.database_tag
    }

    /// Get the ORDS image name
    pub fn gateway_image(&self) -> &str {
        &self.gateway_image
    }

    /// Get the ORDS image tag
    pub fn gateway_tag(&self) -> &str {
        &self.gateway_tag
    }

    /// Get the application user
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Get the password
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Get the pluggable database service name
    pub fn database_service(&self) -> &str {
        &self.database_service
    }

    /// Get the database container name, which is also its hostname on the shared network
    pub fn database_container_name(&self) -> &str {
        &self.database_container_name
    }

    /// Get the network both containers join
    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn database_startup_timeout(&self) -> Duration {
        self.database_startup_timeout
    }

    pub fn gateway_startup_timeout(&self) -> Duration {
        self.gateway_startup_timeout
    }

    pub fn forward_gateway_logs(&self) -> bool {
        self.forward_gateway_logs
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn max_idle_time(&self) -> Duration {
        self.max_idle_time
    }

    pub fn max_connecting(&self) -> u32 {
        self.max_connecting
    }

    /// Checks the values that end up in SQL statements and connect strings
    pub fn validate(&self) -> OrdsResult<()> {
        validate_identifier(&self.user)?;
        validate_password(&self.password)?;
        if self.max_connecting == 0 {
            return Err(crate::error::OrdsError::Config("max_connecting must be positive".to_string()));
        }
        Ok(())
    }
}

// Builder type that allows configuration
#[derive(Debug, Clone)]
pub struct OrdsMongoConfigBuilder {
    config: OrdsMongoConfig,
}

impl OrdsMongoConfigBuilder {
    /// Create a new configuration builder with default values
    pub fn new() -> Self {
        Self { config: OrdsMongoConfig::default() }
    }

    /// Build the final immutable configuration
    pub fn build(self) -> OrdsMongoConfig {
        self.config
    }

    /// Set the Oracle Database image (default: gvenzl/oracle-xe:21.3.0-slim)
    pub fn database_image<S: Into<String>, T: Into<String>>(mut self, image: S, tag: T) -> Self {
        self.config.database_image = image.into();
        self.config.database_tag = tag.into();
        self
    }

    /// Set the ORDS image (default: loiclefevre/ords-ol8:latest)
    pub fn gateway_image<S: Into<String>, T: Into<String>>(mut self, image: S, tag: T) -> Self {
        self.config.gateway_image = image.into();
        self.config.gateway_tag = tag.into();
        self
    }

    /// Set the application user (default: test)
    pub fn user<S: Into<String>>(mut self, user: S) -> Self {
        self.config.user = user.into();
        self
    }

    /// Set the password used for the application user and SYS/SYSTEM (default: test)
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.config.password = password.into();
        self
    }

    /// Set the pluggable database service (default: XEPDB1)
    pub fn database_service<S: Into<String>>(mut self, service: S) -> Self {
        self.config.database_service = service.into();
        self
    }

    /// Set the database container name
    pub fn database_container_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.database_container_name = name.into();
        self
    }

    /// Set the network name
    pub fn network_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.network_name = name.into();
        self
    }

    pub fn database_startup_timeout(mut self, timeout: Duration) -> Self {
        self.config.database_startup_timeout = timeout;
        self
    }

    pub fn gateway_startup_timeout(mut self, timeout: Duration) -> Self {
        self.config.gateway_startup_timeout = timeout;
        self
    }

    /// Forward the gateway's stdout into the tracing log
    pub fn forward_gateway_logs(mut self, forward: bool) -> Self {
        self.config.forward_gateway_logs = forward;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn max_idle_time(mut self, idle: Duration) -> Self {
        self.config.max_idle_time = idle;
        self
    }

    pub fn max_connecting(mut self, max_connecting: u32) -> Self {
        self.config.max_connecting = max_connecting;
        self
    }
}

impl Default for OrdsMongoConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrdsError;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = OrdsMongoConfig::default();
        assert_eq!(config.database_image(), "gvenzl/oracle-xe");
        assert_eq!(config.database_tag(), "21.3.0-slim");
        assert_eq!(config.gateway_image(), "loiclefevre/ords-ol8");
        assert_eq!(config.gateway_tag(), "latest");
        assert_eq!(config.user(), "test");
        assert_eq!(config.password(), "test");
        assert_eq!(config.database_service(), "XEPDB1");
        assert!(config.database_container_name().starts_with("ords-oracle-xe-"));
        assert!(config.network_name().starts_with("ords-mongodb-api-"));
        assert_eq!(config.database_startup_timeout(), Duration::from_secs(600));
        assert_eq!(config.gateway_startup_timeout(), Duration::from_secs(600));
        assert!(!config.forward_gateway_logs());
        assert_eq!(config.connect_timeout(), Duration::from_secs(86_400));
        assert_eq!(config.max_idle_time(), Duration::from_secs(120));
        assert!(config.max_connecting() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = OrdsMongoConfig::builder()
            .user("racing")
            .password("Secr3t_pw")
            .database_image("gvenzl/oracle-free", "23-slim")
            .gateway_image("container-registry.oracle.com/database/ords", "24.1.0")
            .database_service("FREEPDB1")
            .network_name("racing-net")
            .database_container_name("racing-db")
            .forward_gateway_logs(true)
            .max_idle_time(Duration::from_secs(600))
            .max_connecting(5)
            .build();

        assert_eq!(config.user(), "racing");
        assert_eq!(config.password(), "Secr3t_pw");
        assert_eq!(config.database_image(), "gvenzl/oracle-free");
        assert_eq!(config.database_tag(), "23-slim");
        assert_eq!(config.gateway_tag(), "24.1.0");
        assert_eq!(config.database_service(), "FREEPDB1");
        assert_eq!(config.network_name(), "racing-net");
        assert_eq!(config.database_container_name(), "racing-db");
        assert!(config.forward_gateway_logs());
        assert_eq!(config.max_idle_time(), Duration::from_secs(600));
        assert_eq!(config.max_connecting(), 5);
    }

    #[test]
    fn test_default_names_are_unique_per_config() {
        let a = OrdsMongoConfig::default();
        let b = OrdsMongoConfig::default();
        // Suffixes are random four digit numbers, a collision on both names at once is practically impossible
        assert!(a.network_name() != b.network_name() || a.database_container_name() != b.database_container_name());
    }

    #[test]
    fn test_validate_rejects_bad_user_and_zero_max_connecting() {
        let config = OrdsMongoConfig::for_user("test; drop user system", "test");
        assert_matches!(config.validate(), Err(OrdsError::InvalidIdentifier(_)));

        let config = OrdsMongoConfig::builder().max_connecting(0).build();
        assert_matches!(config.validate(), Err(OrdsError::Config(_)));
    }
}
