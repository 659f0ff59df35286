use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::{info, info_span, Instrument};

use crate::client::{client_options, ClientOptionsCache, ClientTuning, MongoEndpoint, PoolSizing};
use crate::config::OrdsMongoConfig;
use crate::database::DatabaseContainer;
use crate::error::OrdsResult;
use crate::gateway::GatewayContainer;
use crate::provision::provision_schema;

/// Oracle Database with ORDS in front of it, provisioned and ready for MongoDB clients.
///
/// Startup is strictly sequential: database, then ORDS, then schema provisioning. The first failure
/// aborts the sequence and is returned; containers started before it are removed when dropped.
pub struct OrdsMongoDbApiContainer {
    config: OrdsMongoConfig,
    database: DatabaseContainer,
    gateway: GatewayContainer,
    endpoint: MongoEndpoint,
    client_options: ClientOptionsCache,
}

impl OrdsMongoDbApiContainer {
    pub async fn start(config: OrdsMongoConfig) -> OrdsResult<Self> {
        let span = info_span!("ords_mongodb_api", user = %config.user(), network = %config.network_name());
        Self::start_inner(config).instrument(span).await
    }

    async fn start_inner(config: OrdsMongoConfig) -> OrdsResult<Self> {
        config.validate()?;

        let database = DatabaseContainer::start(&config).await?;
        let gateway = GatewayContainer::start(&config, &database).await?;

        provision_schema(&database, config.user(), config.password(), database.service()).await?;

        let endpoint = MongoEndpoint {
            host: gateway.host().await?,
            port: gateway.mongodb_port().await?,
            user: config.user().to_string(),
            password: config.password().to_string(),
        };
        info!(host = %endpoint.host, port = endpoint.port, "ORDS MongoDB API ready for clients");

        Ok(Self { config, database, gateway, endpoint, client_options: ClientOptionsCache::new() })
    }

    pub fn config(&self) -> &OrdsMongoConfig {
        &self.config
    }

    pub fn user(&self) -> &str {
        self.config.user()
    }

    pub fn database_container(&self) -> &DatabaseContainer {
        &self.database
    }

    pub fn gateway_container(&self) -> &GatewayContainer {
        &self.gateway
    }

    pub fn database_container_id(&self) -> &str {
        self.database.id()
    }

    pub fn database_service(&self) -> &str {
        self.database.service()
    }

    /// Host-mapped Oracle listener port, for SQL clients outside the container network
    pub async fn oracle_port(&self) -> OrdsResult<u16> {
        self.database.oracle_port().await
    }

    pub fn endpoint(&self) -> &MongoEndpoint {
        &self.endpoint
    }

    pub fn mongodb_host(&self) -> &str {
        &self.endpoint.host
    }

    pub fn mongodb_port(&self) -> u16 {
        self.endpoint.port
    }

    pub fn connection_string(&self) -> OrdsResult<String> {
        self.endpoint.connection_string()
    }

    /// Client options for the given pool bounds, built on first use and reused afterwards
    pub fn client_options(&self, min_pool_size: u32, max_pool_size: u32) -> OrdsResult<ClientOptions> {
        let pool = PoolSizing::new(min_pool_size, max_pool_size)?;
        let tuning = ClientTuning {
            connect_timeout: self.config.connect_timeout(),
            max_idle_time: self.config.max_idle_time(),
            max_connecting: self.config.max_connecting(),
        };
        Ok(self.client_options.get_or_build(pool, || client_options(&self.endpoint, pool, tuning)))
    }

    pub fn client(&self, min_pool_size: u32, max_pool_size: u32) -> OrdsResult<Client> {
        Ok(Client::with_options(self.client_options(min_pool_size, max_pool_size)?)?)
    }

    /// The MongoDB API maps each database user's schema to a database of the same name
    pub fn database(&self, client: &Client) -> Database {
        client.database(self.user())
    }

    /// Stops ORDS before the database it depends on
    pub async fn stop(self) -> OrdsResult<()> {
        self.gateway.stop().await?;
        self.database.stop().await?;
        info!("ORDS MongoDB API stack stopped");
        Ok(())
    }
}
