//! Key sanitization for MongoDB compatibility.
//!
//! MongoDB restricts field names and collection names from containing
//! certain characters used by its query syntax. Partition names are derived
//! from caller-supplied application and type identifiers, and document keys
//! are caller-supplied too, so both pass through this sanitizer before they
//! reach the driver.

use bson::{Bson, Document};

/// Sanitizes and restores names to handle MongoDB key restrictions.
///
/// Dollar signs (`$`) and null bytes (`\0`) are replaced with safe escaped
/// versions that can be stored and reverted on the way out. Dots are left
/// alone in collection names (partition names embed one by construction) but
/// escaped inside document keys.
pub(crate) struct KeySanitizer;

impl KeySanitizer {
    /// Character replacements for document keys.
    const KEY_REPLACEMENTS: [(&'static str, &'static str); 3] = [
        (".", "__dot__"),
        ("$", "__dollar__"),
        ("\0", "__null__"),
    ];

    /// Character replacements for collection names.
    const COLLECTION_REPLACEMENTS: [(&'static str, &'static str); 2] =
        [("$", "__dollar__"), ("\0", "__null__")];

    /// Sanitizes a collection (partition) name.
    pub(crate) fn sanitize_collection(name: &str) -> String {
        Self::replace(name, &Self::COLLECTION_REPLACEMENTS)
    }

    /// Recursively sanitizes the keys of a document. Values pass through
    /// untouched; only key names are escaped.
    pub(crate) fn sanitize_keys(document: &Document) -> Document {
        document
            .iter()
            .map(|(key, value)| (Self::sanitize_key(key), Self::sanitize_nested(value)))
            .collect()
    }

    /// Recursively restores the keys of a document retrieved from MongoDB.
    pub(crate) fn restore_keys(document: &Document) -> Document {
        document
            .iter()
            .map(|(key, value)| (Self::restore_key(key), Self::restore_nested(value)))
            .collect()
    }

    fn sanitize_key(key: &str) -> String {
        Self::replace(key, &Self::KEY_REPLACEMENTS)
    }

    fn restore_key(key: &str) -> String {
        let mut restored = key.to_string();
        for (target, replacement) in Self::KEY_REPLACEMENTS.iter().rev() {
            restored = restored.replace(*replacement, *target);
        }
        restored
    }

    fn sanitize_nested(value: &Bson) -> Bson {
        match value {
            Bson::Document(doc) => Bson::Document(Self::sanitize_keys(doc)),
            Bson::Array(arr) => Bson::Array(arr.iter().map(Self::sanitize_nested).collect()),
            _ => value.clone(),
        }
    }

    fn restore_nested(value: &Bson) -> Bson {
        match value {
            Bson::Document(doc) => Bson::Document(Self::restore_keys(doc)),
            Bson::Array(arr) => Bson::Array(arr.iter().map(Self::restore_nested).collect()),
            _ => value.clone(),
        }
    }

    fn replace(input: &str, replacements: &[(&str, &str)]) -> String {
        let mut sanitized = input.to_string();
        for (target, replacement) in replacements {
            sanitized = sanitized.replace(*target, *replacement);
        }
        sanitized
    }
}
