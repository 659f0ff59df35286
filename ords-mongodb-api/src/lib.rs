//! Disposable Oracle Database API for MongoDB
//!
//! Starts an Oracle Database XE container and an Oracle REST Data Services (ORDS) container
//! serving the MongoDB-compatible API on top of it, provisions the application schema, and hands
//! out MongoDB client options that work against the result.
//!
//! ```rust,ignore
//! use ords_mongodb_api::{diagnostics, OrdsMongoConfig, OrdsMongoDbApiContainer};
//!
//! let stack = OrdsMongoDbApiContainer::start(OrdsMongoConfig::for_user("test", "test")).await?;
//! let client = stack.client(1, 5)?;
//! let version = diagnostics::server_version(&stack.database(&client)).await?;
//! assert_eq!(version, "4.2.14");
//! stack.stop().await?;
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod container;
pub mod database;
pub mod diagnostics;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod provision;
pub mod utils;

pub use client::{MongoEndpoint, PoolSizing};
pub use config::{OrdsMongoConfig, OrdsMongoConfigBuilder};
pub use container::OrdsMongoDbApiContainer;
pub use error::{OrdsError, OrdsResult};
