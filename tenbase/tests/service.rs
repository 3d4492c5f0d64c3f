//! End-to-end behavior of the type service against the in-memory backend:
//! CRUD semantics plus the change messages each mutation must (or must not)
//! produce.

use async_trait::async_trait;
use bson::doc;
use mea::mutex::Mutex;
use std::{sync::Arc, time::Duration};

use tenbase::{memory::MemoryStore, prelude::*};

#[derive(Debug)]
struct RecordingTransport {
    messages: Mutex<Vec<ChangeMessage>>,
}

impl RecordingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    async fn wait_for(&self, count: usize) -> Vec<ChangeMessage> {
        for _ in 0..500 {
            {
                let messages = self.messages.lock().await;
                if messages.len() >= count {
                    return messages.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("timed out waiting for {count} change messages");
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn publish(&self, message: ChangeMessage) -> StoreResult<()> {
        self.messages.lock().await.push(message);
        Ok(())
    }
}

/// Transport that always fails, for verifying dispatch isolation.
#[derive(Debug)]
struct FailingTransport;

#[async_trait]
impl NotificationTransport for FailingTransport {
    async fn publish(&self, _message: ChangeMessage) -> StoreResult<()> {
        Err(StoreError::Dispatch("transport unavailable".to_string()))
    }
}

fn service_with_transport(
    transport: Arc<dyn NotificationTransport>,
) -> (TypeService<MemoryStore>, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let service = TypeService::new(Arc::clone(&backend), &StoreConfig::default(), transport);
    (service, backend)
}

#[tokio::test]
async fn insert_then_find_by_id_returns_fields_plus_created_at() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport.clone());
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    let id = service
        .insert(&ctx, &partition, doc! { "name": "Ann" })
        .await
        .unwrap();

    let found = service.find_by_id(&ctx, &partition, &id).await.unwrap();
    assert_eq!(found.get_str("name").unwrap(), "Ann");
    assert_eq!(found.get_str(FIELD_ID).unwrap(), id);
    assert!(found.get_datetime(FIELD_CREATED_AT).is_ok());

    let messages = transport.wait_for(1).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].operation, Operation::Create);
    assert_eq!(messages[0].origin, ORIGIN_API);
    assert_eq!(messages[0].app_id, "a1");
    assert_eq!(messages[0].type_name, "person");
    assert_eq!(messages[0].token, "token-1");
    assert_eq!(messages[0].payload.get_str("name").unwrap(), "Ann");
    assert_eq!(messages[0].payload.get_str(FIELD_ID).unwrap(), id);
}

#[tokio::test]
async fn caller_supplied_id_is_preserved() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport);
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    let id = service
        .insert(&ctx, &partition, doc! { "_id": "person-7", "name": "Ann" })
        .await
        .unwrap();

    assert_eq!(id, "person-7");
}

#[tokio::test]
async fn update_dispatches_delta_payload() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport.clone());
    let ctx = RequestContext::new("token-1").with_options(doc! { "notify": "self" });
    let partition = Partition::new("a1", "person");

    let id = service
        .insert(&ctx, &partition, doc! { "name": "Ann" })
        .await
        .unwrap();
    service
        .update_by_id(&ctx, &partition, &id, doc! { "age": 30 })
        .await
        .unwrap();

    let found = service.find_by_id(&ctx, &partition, &id).await.unwrap();
    assert_eq!(found.get_str("name").unwrap(), "Ann");
    assert_eq!(found.get_i32("age").unwrap(), 30);

    let messages = transport.wait_for(2).await;
    let update = messages
        .iter()
        .find(|m| m.operation == Operation::Update)
        .expect("one UPDATE message");
    // Consumers must treat update payloads as deltas, not full documents.
    assert_eq!(update.payload.get_i32("age").unwrap(), 30);
    assert_eq!(update.payload.get_str(FIELD_ID).unwrap(), id);
    assert!(update.payload.get("name").is_none());
    assert_eq!(update.options.get_str("notify").unwrap(), "self");
}

#[tokio::test]
async fn remove_then_find_is_not_found_and_payload_is_bare_id() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport.clone());
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    let id = service
        .insert(&ctx, &partition, doc! { "name": "Ann" })
        .await
        .unwrap();
    service.remove_by_id(&ctx, &partition, &id).await.unwrap();

    let err = service.find_by_id(&ctx, &partition, &id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(..)));

    let messages = transport.wait_for(2).await;
    let delete = messages
        .iter()
        .find(|m| m.operation == Operation::Delete)
        .expect("one DELETE message");
    assert_eq!(delete.payload.get_str(FIELD_ID).unwrap(), id);
    assert_eq!(delete.payload.len(), 1);
}

#[tokio::test]
async fn update_of_missing_id_is_not_found_and_produces_no_message() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport.clone());
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    let err = service
        .update_by_id(&ctx, &partition, "missing", doc! { "age": 30 })
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(..)));

    // A subsequent successful insert is the only message that ever arrives.
    service
        .insert(&ctx, &partition, doc! { "name": "Ann" })
        .await
        .unwrap();

    let messages = transport.wait_for(1).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].operation, Operation::Create);
}

#[tokio::test]
async fn reads_produce_no_messages() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport.clone());
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    let id = service
        .insert(&ctx, &partition, doc! { "name": "Ann" })
        .await
        .unwrap();

    service
        .find(&ctx, &partition, None, None)
        .await
        .unwrap();
    service.find_by_id(&ctx, &partition, &id).await.unwrap();
    service
        .update_by_id(&ctx, &partition, &id, doc! { "age": 30 })
        .await
        .unwrap();

    // One CREATE and one UPDATE; the reads in between added nothing.
    let messages = transport.wait_for(2).await;
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.operation == Operation::Create)
            .count(),
        1
    );
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.operation == Operation::Update)
            .count(),
        1
    );
}

#[tokio::test]
async fn dispatch_failure_never_rolls_back_storage() {
    let (service, _) = service_with_transport(Arc::new(FailingTransport));
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    let id = service
        .insert(&ctx, &partition, doc! { "name": "Ann" })
        .await
        .unwrap();
    service
        .update_by_id(&ctx, &partition, &id, doc! { "age": 30 })
        .await
        .unwrap();

    // Both mutations committed even though every publish failed.
    let found = service.find_by_id(&ctx, &partition, &id).await.unwrap();
    assert_eq!(found.get_i32("age").unwrap(), 30);
}

#[tokio::test]
async fn find_with_filter_and_projection() {
    let transport = RecordingTransport::new();
    let (service, _) = service_with_transport(transport);
    let ctx = RequestContext::new("token-1");
    let partition = Partition::new("a1", "person");

    service
        .insert(&ctx, &partition, doc! { "name": "Ann", "age": 30 })
        .await
        .unwrap();
    service
        .insert(&ctx, &partition, doc! { "name": "Bob", "age": 40 })
        .await
        .unwrap();

    let all = service.find(&ctx, &partition, None, None).await.unwrap();
    assert_eq!(all.len(), 2);

    let anns = service
        .find(
            &ctx,
            &partition,
            Some(doc! { "name": "Ann" }),
            Some(doc! { "age": 1 }),
        )
        .await
        .unwrap();
    assert_eq!(anns.len(), 1);
    assert_eq!(anns[0].get_i32("age").unwrap(), 30);
    assert!(anns[0].get("name").is_none());
}
