//! Docker-backed checks against a real Oracle Database + ORDS pair.
//!
//! Pulling and initializing both images takes several minutes, so these tests only run on demand:
//! `cargo test -p ords-mongodb-api -- --ignored`

use std::time::Duration;

use mongodb::Client;
use ords_mongodb_api::client::{client_options, ClientTuning, MongoEndpoint};
use ords_mongodb_api::database::DatabaseContainer;
use ords_mongodb_api::gateway::GatewayContainer;
use ords_mongodb_api::provision::provision_schema;
use ords_mongodb_api::{diagnostics, OrdsMongoConfig, OrdsMongoDbApiContainer, PoolSizing};
use rstest::{fixture, rstest};

const DATABASE_USER: &str = "test";
const DATABASE_PASSWORD: &str = "test";
const EXPECTED_MONGODB_VERSION: &str = "4.2.14";

#[fixture]
fn config() -> OrdsMongoConfig {
    OrdsMongoConfig::for_user(DATABASE_USER, DATABASE_PASSWORD)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires Docker and several minutes to initialize Oracle Database"]
async fn wrapper_reports_expected_version(config: OrdsMongoConfig) {
    let stack = OrdsMongoDbApiContainer::start(config).await.unwrap();

    let client = stack.client(1, 5).unwrap();
    let database = stack.database(&client);
    let version = diagnostics::server_version(&database).await.unwrap();
    assert_eq!(version, EXPECTED_MONGODB_VERSION);

    let reused = stack.client_options(1, 5).unwrap();
    assert_eq!(reused.max_pool_size, Some(5));

    client.shutdown().await;
    stack.stop().await.unwrap();
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires Docker and several minutes to initialize Oracle Database"]
async fn hand_composed_stack_reports_expected_version(config: OrdsMongoConfig) {
    let database = DatabaseContainer::start(&config).await.unwrap();
    let gateway = GatewayContainer::start(&config, &database).await.unwrap();
    provision_schema(&database, DATABASE_USER, DATABASE_PASSWORD, database.service()).await.unwrap();

    let endpoint = MongoEndpoint {
        host: gateway.host().await.unwrap(),
        port: gateway.mongodb_port().await.unwrap(),
        user: DATABASE_USER.to_string(),
        password: DATABASE_PASSWORD.to_string(),
    };
    let tuning = ClientTuning {
        connect_timeout: Duration::from_secs(86_400),
        max_idle_time: Duration::from_secs(600),
        max_connecting: 5,
    };
    let options = client_options(&endpoint, PoolSizing::new(1, 5).unwrap(), tuning);
    let client = Client::with_options(options).unwrap();

    let database_handle = client.database(DATABASE_USER);
    diagnostics::ping(&database_handle).await.unwrap();
    diagnostics::ensure_version(&database_handle, EXPECTED_MONGODB_VERSION).await.unwrap();

    client.shutdown().await;
    gateway.stop().await.unwrap();
    database.stop().await.unwrap();
}
