//! Named system collection stores: the fixed users collection and the
//! application catalog.

use bson::doc;
use std::sync::Arc;

use tenbase::{memory::MemoryStore, prelude::*};

#[tokio::test]
async fn users_store_is_bound_to_the_configured_collection() {
    let backend = Arc::new(MemoryStore::new());
    let config = StoreConfig::default();
    let users = CollectionStore::users(Arc::clone(&backend), &config);

    assert_eq!(users.collection(), config.users_collection);

    let id = users
        .insert(doc! { "name": "admin", "role": "owner" })
        .await
        .unwrap();
    let user = users.find_by_id(&id).await.unwrap();
    assert_eq!(user.get_str("role").unwrap(), "owner");
    assert!(user.get_datetime(FIELD_CREATED_AT).is_ok());
}

#[tokio::test]
async fn registry_writes_land_in_the_application_catalog() {
    let backend = Arc::new(MemoryStore::new());
    let config = StoreConfig::default();
    let registry = TypeRegistry::new(Arc::clone(&backend), &config);
    let applications = CollectionStore::applications(Arc::clone(&backend), &config);

    registry.register("a1", "person").await.unwrap();

    let record = applications.find_by_id("a1").await.unwrap();
    let types = record.get_array("types").unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].as_str().unwrap(), "person");
}
