use std::fmt;

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A product as stored: an opaque JSON object whose only interpreted field is `_id`.
pub type ProductDocument = Map<String, Value>;

/// Store-native product identifier (24 hexadecimal characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(ObjectId);

impl ProductId {
    /// Returns `None` unless `raw` is exactly 24 hex digits.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != 24 || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        ObjectId::parse_str(raw).ok().map(Self)
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

// ── Store acknowledgments ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Value>,
    pub upserted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}
