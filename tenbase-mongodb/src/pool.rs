//! Process-wide connection pool keyed by connection string.
//!
//! One long-lived client exists per distinct connection string, created
//! lazily on first use and never torn down during normal operation. The map
//! is guarded by an async mutex so concurrent first-use callers race to dial
//! at most once; losers reuse the winner's client. Each logical operation
//! obtains its own [`SessionHandle`], a cheap independent view of the pooled
//! client that is released when dropped.

use mea::mutex::Mutex;
use mongodb::{options::ClientOptions, Client, Collection, Database};
use std::{
    collections::{HashMap, HashSet},
    sync::OnceLock,
};

use bson::Document;
use tenbase_core::error::{StoreError, StoreResult};

#[derive(Debug)]
struct PoolEntry {
    client: Client,
    /// Collections whose index bootstrap already ran on this connection.
    ensured_indexes: HashSet<String>,
}

static POOL: OnceLock<Mutex<HashMap<String, PoolEntry>>> = OnceLock::new();

fn pool() -> &'static Mutex<HashMap<String, PoolEntry>> {
    POOL.get_or_init(|| Mutex::new(HashMap::new()))
}

/// A per-operation, independently releasable view of a pooled client.
///
/// Handles are never shared across concurrent operations; each operation
/// acquires its own and releases it by dropping it on every exit path.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    client: Client,
}

impl SessionHandle {
    /// Derives a database handle from this session.
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Derives a collection handle from this session.
    pub fn collection(&self, database: &str, name: &str) -> Collection<Document> {
        self.database(database).collection(name)
    }
}

/// Acquires a session for the given connection string, dialing the backing
/// store on first use. A first-use dial failure is a fatal configuration
/// error: the process cannot serve any request against that store.
pub async fn acquire(connection_string: &str) -> StoreResult<SessionHandle> {
    let mut pool = pool().lock().await;

    if !pool.contains_key(connection_string) {
        let options = ClientOptions::parse(connection_string)
            .await
            .map_err(|err| StoreError::Config(err.to_string()))?;
        let client =
            Client::with_options(options).map_err(|err| StoreError::Config(err.to_string()))?;

        tracing::info!(connection_string, "dialed backing store");

        pool.insert(
            connection_string.to_string(),
            PoolEntry {
                client,
                ensured_indexes: HashSet::new(),
            },
        );
    }

    // The entry exists at this point; copies of the pooled client are cheap
    // and safe for concurrent use by different operations.
    Ok(SessionHandle {
        client: pool[connection_string].client.clone(),
    })
}

/// Records that the index bootstrap for `collection` is about to run on this
/// connection. Returns `true` only the first time it is called for a given
/// (connection string, collection) pair; the pool entry must already exist.
pub(crate) async fn mark_index_ensured(connection_string: &str, collection: &str) -> bool {
    let mut pool = pool().lock().await;

    match pool.get_mut(connection_string) {
        Some(entry) => entry.ensured_indexes.insert(collection.to_string()),
        None => false,
    }
}
