//! Store configuration resolved once at startup.

use serde::{Deserialize, Serialize};

/// Connection string and fixed system collection names.
///
/// Resolved once at startup and passed to backend builders and to the
/// registry/service constructors. The defaults target a local development
/// deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Connection string for the backing document store.
    pub connection_string: String,
    /// Name of the system database.
    pub database: String,
    /// Name of the fixed users collection. No index is required on it.
    pub users_collection: String,
    /// Name of the application catalog collection. Carries a unique index
    /// over the `name` field, ensured once per connection.
    pub applications_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_string: "mongodb://localhost:27017".to_string(),
            database: "tenbase".to_string(),
            users_collection: "users".to_string(),
            applications_collection: "applications".to_string(),
        }
    }
}
