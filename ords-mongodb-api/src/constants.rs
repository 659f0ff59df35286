use std::time::Duration;

pub const DEFAULT_DATABASE_IMAGE: &str = "gvenzl/oracle-xe";
pub const DEFAULT_DATABASE_TAG: &str = "21.3.0-slim";
pub const DEFAULT_DATABASE_CONTAINER_NAME: &str = "ords-oracle-xe";
pub const DEFAULT_DATABASE_SERVICE: &str = "XEPDB1";
pub const ORACLE_PORT: u16 = 1521;
pub const DATABASE_READY_MESSAGE: &str = "DATABASE IS READY TO USE!";

pub const DEFAULT_GATEWAY_IMAGE: &str = "loiclefevre/ords-ol8";
pub const DEFAULT_GATEWAY_TAG: &str = "latest";
pub const DEFAULT_GATEWAY_CONTAINER_NAME: &str = "ords-gateway";
pub const MONGODB_API_PORT: u16 = 27017;
pub const GATEWAY_READY_MESSAGE: &str = "Oracle REST Data Services initialized";

pub const DEFAULT_NETWORK_NAME: &str = "ords-mongodb-api";
pub const DEFAULT_USER: &str = "test";
pub const DEFAULT_PASSWORD: &str = "test";
pub const ADMIN_USER: &str = "SYSTEM";

pub const EXTERNAL_AUTH_SOURCE: &str = "$external";

pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(600);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(86_400);
pub const DEFAULT_MAX_IDLE_TIME: Duration = Duration::from_secs(120);
