//! MongoDB client configuration for the ORDS MongoDB API.
//!
//! ORDS authenticates MongoDB clients against database users with the `PLAIN` mechanism over TLS,
//! using the `$external` authentication source. Its certificate is self-signed, so the client
//! trusts any server certificate. The endpoint is a single load-balanced host.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use mongodb::options::{AuthMechanism, ClientOptions, Credential, ServerAddress, Tls, TlsOptions};
use url::Url;

use crate::constants::EXTERNAL_AUTH_SOURCE;
use crate::error::{OrdsError, OrdsResult};

const APP_NAME: &str = "ords-mongodb-api";
const REDACTED_PASSWORD: &str = "****";

/// Connection pool bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolSizing {
    min: u32,
    max: u32,
}

impl PoolSizing {
    pub fn new(min: u32, max: u32) -> OrdsResult<Self> {
        if max == 0 || min > max {
            return Err(OrdsError::InvalidPoolSizing { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

/// Everything needed to reach the MongoDB API of a running gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoEndpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl MongoEndpoint {
    /// URI equivalent of [`client_options`], usable with mongosh and other drivers
    pub fn connection_string(&self) -> OrdsResult<String> {
        self.uri(&self.password)
    }

    /// Same URI with the password masked, safe to log
    pub fn redacted_connection_string(&self) -> OrdsResult<String> {
        self.uri(REDACTED_PASSWORD)
    }

    fn uri(&self, password: &str) -> OrdsResult<String> {
        let mut url = Url::parse(&format!("mongodb://{}:{}/", self.host, self.port))
            .map_err(|e| OrdsError::Config(format!("Invalid MongoDB endpoint: {}", e)))?;
        url.set_username(&self.user)
            .and_then(|_| url.set_password(Some(password)))
            .map_err(|_| OrdsError::Config("MongoDB endpoint cannot carry credentials".to_string()))?;
        url.set_path(&self.user);
        url.set_query(Some(&format!(
            "authMechanism=PLAIN&authSource={}&tls=true&tlsAllowInvalidCertificates=true&loadBalanced=true&retryWrites=false",
            EXTERNAL_AUTH_SOURCE
        )));
        Ok(url.to_string())
    }
}

/// Client tuning that does not depend on the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTuning {
    pub connect_timeout: Duration,
    pub max_idle_time: Duration,
    pub max_connecting: u32,
}

pub fn client_options(endpoint: &MongoEndpoint, pool: PoolSizing, tuning: ClientTuning) -> ClientOptions {
    let credential = Credential::builder()
        .username(endpoint.user.clone())
        .password(endpoint.password.clone())
        .source(EXTERNAL_AUTH_SOURCE.to_string())
        .mechanism(AuthMechanism::Plain)
        .build();

    let tls = TlsOptions::builder().allow_invalid_certificates(true).build();

    let mut options = ClientOptions::builder()
        .hosts(vec![ServerAddress::Tcp { host: endpoint.host.clone(), port: Some(endpoint.port) }])
        .app_name(APP_NAME.to_string())
        .credential(credential)
        .tls(Tls::Enabled(tls))
        .min_pool_size(pool.min())
        .max_pool_size(pool.max())
        .max_connecting(tuning.max_connecting)
        .max_idle_time(tuning.max_idle_time)
        .connect_timeout(tuning.connect_timeout)
        .retry_writes(false)
        .build();
    // The builder does not expose a setter for this field
    options.load_balanced = Some(true);
    options
}

/// Built options are reused for every later request with the same pool sizing
#[derive(Debug, Default)]
pub struct ClientOptionsCache {
    options: Mutex<HashMap<PoolSizing, ClientOptions>>,
}

impl ClientOptionsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&self, pool: PoolSizing, build: impl FnOnce() -> ClientOptions) -> ClientOptions {
        let mut options = self.options.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        options.entry(pool).or_insert_with(build).clone()
    }

    pub fn len(&self) -> usize {
        self.options.lock().map(|options| options.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
