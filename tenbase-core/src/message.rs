//! Change message construction.
//!
//! Every successful create/update/delete is translated into exactly one
//! [`ChangeMessage`] carrying enough context (operation kind, origin, actor
//! token, options) for downstream consumers to act correctly. Reads never
//! produce one.

use bson::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin tag for changes produced by the external API surface.
///
/// Consumers use the origin to distinguish API-originated changes from other
/// producing surfaces (e.g. direct backend writes) without re-deriving it.
pub const ORIGIN_API: &str = "api";

/// The kind of mutation a change message records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// The immutable record of one accepted mutation.
///
/// For update and delete operations the payload is the minimal known delta:
/// the partial update plus the identifier, or just the identifier for
/// deletes. Consumers must treat those payloads as deltas, not full
/// documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeMessage {
    pub operation: Operation,
    pub origin: String,
    pub payload: Document,
    pub options: Document,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "app")]
    pub app_id: String,
    pub token: String,
}

/// Builds change messages for one producing surface.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    origin: String,
}

impl MessageBuilder {
    /// A builder tagging messages with the given origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    /// A builder for the external API surface.
    pub fn api() -> Self {
        Self::new(ORIGIN_API)
    }

    /// Constructs a message from a completed mutation plus request context.
    pub fn build(
        &self,
        operation: Operation,
        payload: Document,
        options: Document,
        type_name: &str,
        app_id: &str,
        token: &str,
    ) -> ChangeMessage {
        ChangeMessage {
            operation,
            origin: self.origin.clone(),
            payload,
            options,
            type_name: type_name.to_string(),
            app_id: app_id.to_string(),
            token: token.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn builder_carries_full_context() {
        let message = MessageBuilder::api().build(
            Operation::Create,
            doc! { "name": "Ann", "_id": "x1" },
            doc! {},
            "person",
            "a1",
            "token-1",
        );

        assert_eq!(message.operation, Operation::Create);
        assert_eq!(message.origin, ORIGIN_API);
        assert_eq!(message.type_name, "person");
        assert_eq!(message.app_id, "a1");
        assert_eq!(message.token, "token-1");
        assert_eq!(message.payload.get_str("_id").unwrap(), "x1");
    }

    #[test]
    fn operation_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Operation::Update).unwrap(), r#""update""#);
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
