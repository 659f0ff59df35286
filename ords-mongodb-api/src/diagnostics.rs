use mongodb::bson::{self, doc, Document};
use mongodb::Database;
use serde::Deserialize;
use tracing::info;

use crate::error::{OrdsError, OrdsResult};

/// Subset of the `buildInfo` reply the MongoDB API returns
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: String,
    #[serde(default)]
    pub git_version: Option<String>,
    #[serde(default)]
    pub version_array: Vec<i32>,
    #[serde(default)]
    pub max_bson_object_size: Option<i64>,
}

impl BuildInfo {
    pub fn from_document(document: Document) -> OrdsResult<Self> {
        Ok(bson::from_document(document)?)
    }
}

pub async fn build_info(database: &Database) -> OrdsResult<BuildInfo> {
    let reply = database.run_command(doc! { "buildInfo": 1 }).await?;
    BuildInfo::from_document(reply)
}

/// Version string the server reports through `buildInfo`
pub async fn server_version(database: &Database) -> OrdsResult<String> {
    let version = build_info(database).await?.version;
    info!(version = %version, database = %database.name(), "MongoDB version");
    Ok(version)
}

pub async fn ensure_version(database: &Database, expected: &str) -> OrdsResult<()> {
    let actual = server_version(database).await?;
    check_version(expected, &actual)
}

pub fn check_version(expected: &str, actual: &str) -> OrdsResult<()> {
    if expected != actual {
        return Err(OrdsError::VersionMismatch { expected: expected.to_string(), actual: actual.to_string() });
    }
    Ok(())
}

pub async fn ping(database: &Database) -> OrdsResult<()> {
    database.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
