//! Asynchronous change-notification dispatch.
//!
//! The dispatcher hands each [`ChangeMessage`] to the notification transport
//! on a detached task, after the storage operation has committed and without
//! holding the caller's response on delivery. Storage commit and notification
//! are not transactional together: dispatch is at-most-once best-effort from
//! this layer's perspective, with retry and durability, if any, owned by the
//! transport.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{error::StoreResult, message::ChangeMessage};

/// Publish contract of the notification transport (the pub/sub bus receiving
/// built messages). Delivery guarantees are the transport's responsibility.
#[async_trait]
pub trait NotificationTransport: Send + Sync + Debug {
    async fn publish(&self, message: ChangeMessage) -> StoreResult<()>;
}

/// Forwards change messages to the transport, detached from the caller.
#[derive(Debug, Clone)]
pub struct Notifier {
    transport: Arc<dyn NotificationTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn NotificationTransport>) -> Self {
        Self { transport }
    }

    /// Publishes the message on a detached task. Dispatch failures are
    /// logged, not retried, and never roll back the storage mutation that
    /// produced the message.
    ///
    /// The returned handle may be ignored; dropping it does not cancel the
    /// publish.
    pub fn dispatch(&self, message: ChangeMessage) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);

        tokio::spawn(async move {
            let operation = message.operation;
            let app_id = message.app_id.clone();
            let type_name = message.type_name.clone();

            if let Err(err) = transport.publish(message).await {
                tracing::warn!(
                    %operation,
                    app_id = %app_id,
                    type_name = %type_name,
                    error = %err,
                    "change notification dispatch failed",
                );
            }
        })
    }
}
